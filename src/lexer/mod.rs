//! Lexer for the tally expression language
//!
//! Turns source text into a flat token vector terminated by a single `Eof`.
//! Tokenization is eager: either the whole input lexes or the first bad
//! character is reported.

mod tokens;

pub use tokens::{Token, TokenKind};

use crate::common::Span;
use crate::diagnostics::LexError;
use logos::Logos;
use num_bigint::BigUint;

/// Tokenize `source`
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        let text = lexer.slice();

        match result {
            Ok(TokenKind::Number) => {
                let value = text
                    .parse::<BigUint>()
                    .map_err(|_| unexpected_character(source, span.start))?;
                tokens.push(Token::number(value, span, text));
            }
            Ok(kind) => tokens.push(Token::new(kind, span, text)),
            Err(()) => return Err(unexpected_character(source, span.start)),
        }
    }

    tokens.push(Token::eof(source.len()));
    tracing::trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

fn unexpected_character(source: &str, position: usize) -> LexError {
    let ch = source[position..].chars().next().unwrap_or('\0');
    LexError::UnexpectedCharacter {
        ch,
        position,
        span: Span::new(position, position + ch.len_utf8()).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_carries_value() {
        let tokens = lex("007").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].value, Some(BigUint::from(7u32)));
        assert_eq!(tokens[0].text, "007");
    }

    #[test]
    fn test_error_reports_multibyte_char() {
        let err = lex("1 + é").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                ch: 'é',
                position: 4,
                span: Span::new(4, 6).into(),
            }
        );
    }
}
