//! Parser for the tally language
//!
//! A recursive descent parser with one token of lookahead. Grammar, lowest
//! precedence first:
//!
//! ```text
//! statement      := "render" "(" assignment ")" | assignment
//! assignment     := additive ( "=" assignment )?
//! additive       := multiplicative ( ("+"|"-") multiplicative )*
//! multiplicative := power ( ("*"|"/"|"%") power )*
//! power          := unary ( "^" unary )*
//! unary          := ("+"|"-"|"!") unary | primary
//! primary        := NUMBER | IDENTIFIER | "(" additive ")"
//! ```
//!
//! Every binary operator is left-associative, `^` included, so `2 ^ 2 ^ 3`
//! is `(2 ^ 2) ^ 3`.
//!
//! Nesting is bounded by [`MAX_NESTING_DEPTH`]. Groups, prefix operators,
//! chained assignments and each operator in a binary chain count one level,
//! so every accepted tree is shallow enough to evaluate, render and drop
//! without exhausting the stack.

use crate::ast::*;
use crate::common::Span;
use crate::diagnostics::ParseError;
use crate::lexer::{Token, TokenKind};
use num_bigint::BigInt;

/// Deepest nesting the parser accepts
pub const MAX_NESTING_DEPTH: usize = 512;

/// Parse a token stream into a statement
pub fn parse(tokens: &[Token]) -> Result<Stmt, ParseError> {
    let mut parser = Parser::new(tokens);
    let stmt = parser.parse_statement()?;
    parser.expect_end()?;

    tracing::trace!(
        "parsed {} statement",
        match stmt {
            Stmt::Render(_) => "render",
            Stmt::Expr(_) => "expression",
        }
    );
    Ok(stmt)
}

/// Parser state
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    /// Stands in for a missing terminator when handed an empty slice
    eof: Token,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            depth: 0,
            eof: Token::eof(end),
        }
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&self.eof)
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> &Token {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.tokens
            .get(self.pos.saturating_sub(1))
            .unwrap_or(&self.eof)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(format!("`{}`", kind)))
        }
    }

    fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token
    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Error for the current token given what the grammar wanted
    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let expected = expected.into();
        let span = self.span().into();
        match self.peek() {
            TokenKind::Eof => ParseError::UnexpectedEndOfInput { expected, span },
            found => ParseError::UnexpectedToken {
                expected,
                found,
                span,
            },
        }
    }

    /// Descend one nesting level
    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span: self.span().into(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Eof => Ok(()),
            found => Err(ParseError::TrailingTokens {
                found,
                span: self.span().into(),
            }),
        }
    }

    // ==================== STATEMENTS ====================

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        if self.at(TokenKind::Render) {
            self.advance();
            self.expect(TokenKind::LParen)?;
            let expr = self.parse_assignment()?;
            self.expect(TokenKind::RParen)?;
            return Ok(Stmt::Render(expr));
        }

        Ok(Stmt::Expr(self.parse_assignment()?))
    }

    /// `=` is right-associative and only valid after a bare variable
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();
        let target = self.parse_expr()?;

        if !self.at(TokenKind::Assign) {
            return Ok(target);
        }

        match target {
            Expr::Variable(name) => {
                self.enter()?;
                self.advance();
                let value = self.parse_assignment()?;
                self.leave();
                Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                })
            }
            _ => Err(ParseError::InvalidAssignmentTarget {
                span: Span::new(start.start, self.prev_span().end).into(),
            }),
        }
    }

    // ==================== EXPRESSIONS ====================

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_with_precedence(0)
    }

    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_unary()?;

        while let Some((op, prec)) = self.binary_op_info() {
            if prec < min_prec {
                break;
            }

            // `left` grows one level deeper per operator
            self.enter()?;
            self.advance();
            let right = self.parse_expr_with_precedence(prec + 1)?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth = base;
        Ok(left)
    }

    fn binary_op_info(&self) -> Option<(BinaryOp, u8)> {
        let info = match self.peek() {
            TokenKind::Plus => (BinaryOp::Add, 1),
            TokenKind::Minus => (BinaryOp::Sub, 1),
            TokenKind::Star => (BinaryOp::Mul, 2),
            TokenKind::Slash => (BinaryOp::Div, 2),
            TokenKind::Percent => (BinaryOp::Mod, 2),
            TokenKind::Caret => (BinaryOp::Pow, 3),
            _ => return None,
        };
        Some(info)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::Factorial,
            _ => return self.parse_primary(),
        };

        self.enter()?;
        self.advance();
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Number => {
                let token = self.advance();
                let value = token.value.clone().map(BigInt::from).unwrap_or_default();
                Ok(Expr::Number(value))
            }
            TokenKind::Ident => {
                let name = self.advance().text.clone();
                Ok(Expr::Variable(name))
            }
            TokenKind::LParen => {
                self.enter()?;
                self.advance();
                // Groups hold arithmetic only; `(x = 1)` stops at `=`
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.leave();
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn test_prev_span_tracks_consumed_tokens() {
        let tokens = lex("ab + c").unwrap();
        let mut parser = Parser::new(&tokens);
        assert_eq!(parser.prev_span(), Span::default());
        parser.advance();
        assert_eq!(parser.prev_span(), Span::new(0, 2));
    }

    #[test]
    fn test_empty_slice_behaves_like_eof() {
        let err = parse(&[]).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfInput { .. }));
    }

    #[test]
    fn test_invalid_target_label_covers_target() {
        let tokens = lex("(x + 1) = 5").unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidAssignmentTarget {
                span: Span::new(0, 7).into()
            }
        );
    }

    #[test]
    fn test_depth_unwinds_after_each_group() {
        let source = format!("{}1{} + 2", "(".repeat(10), ")".repeat(10));
        let tokens = lex(&source).unwrap();
        let mut parser = Parser::new(&tokens);
        parser.parse_statement().unwrap();
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn test_nesting_error_points_at_offending_token() {
        let source = "-".repeat(MAX_NESTING_DEPTH + 1) + "1";
        let tokens = lex(&source).unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span: Span::new(MAX_NESTING_DEPTH, MAX_NESTING_DEPTH + 1).into(),
            }
        );
    }
}
