//! Interactive read-eval-print loop
//!
//! Line handling lives in [`Session`] so it can be driven without a
//! terminal; [`run`] wires it to rustyline.

use miette::{IntoDiagnostic, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::config::ReplConfig;
use crate::interp::{Interpreter, Limits, Value};

const HELP: &str = "\
Commands:
  :help, :h    Show this help
  :vars        List variables
  :reset       Forget all variables
  exit, quit   Leave the REPL

Syntax:
  2 + 3 * 4          arithmetic (+ - * / % ^), / and % floor
  !5                 prefix factorial
  x = y = 5          assignment (right-associative)
  render(2 + 3)      print the parse tree instead of evaluating";

/// What the loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to print
    Skip,
    /// Print this text
    Print(String),
    /// End the session
    Quit,
}

/// One REPL session: a single interpreter for every line
#[derive(Debug, Default)]
pub struct Session {
    interp: Interpreter,
}

impl Session {
    pub fn new(limits: Limits) -> Self {
        Self {
            interp: Interpreter::with_limits(limits),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interp
    }

    /// Handle one input line
    pub fn handle_line(&mut self, line: &str) -> Action {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Action::Skip;
        }

        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            return Action::Quit;
        }

        match trimmed {
            ":help" | ":h" => Action::Print(HELP.to_string()),
            ":vars" => {
                if self.interp.env().is_empty() {
                    return Action::Print("(no variables)".to_string());
                }
                let lines: Vec<String> = self
                    .interp
                    .env()
                    .sorted()
                    .into_iter()
                    .map(|(name, value)| format!("{} = {}", name, value))
                    .collect();
                Action::Print(lines.join("\n"))
            }
            ":reset" => {
                self.interp.reset();
                Action::Print("Variables cleared".to_string())
            }
            _ => match self.interp.run(trimmed) {
                Ok(Value::Int(n)) => Action::Print(format!("= {}", n)),
                Ok(Value::Tree(tree)) => Action::Print(tree),
                Err(e) => Action::Print(format!("Error: {}", e)),
            },
        }
    }
}

/// Run the REPL on the terminal until `exit` or end of input
pub fn run(config: &ReplConfig, limits: Limits) -> Result<()> {
    let mut editor = DefaultEditor::new().into_diagnostic()?;
    if let Some(path) = &config.history_file {
        // A missing history file is normal on first start
        if let Err(e) = editor.load_history(path) {
            tracing::debug!("no history loaded from {}: {}", path.display(), e);
        }
    }

    println!("tally v{}", crate::VERSION);
    println!("Type :help for help, exit to quit");
    println!();
    tracing::info!("REPL session started");

    let mut session = Session::new(limits);
    loop {
        match editor.readline(&config.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str()).into_diagnostic()?;
                }
                match session.handle_line(&line) {
                    Action::Skip => {}
                    Action::Print(text) => println!("{}", text),
                    Action::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).into_diagnostic(),
        }
    }

    if let Some(path) = &config.history_file {
        if let Err(e) = editor.save_history(path) {
            tracing::warn!("failed to save history to {}: {}", path.display(), e);
        }
    }

    tracing::info!("REPL session ended");
    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_persist_across_lines() {
        let mut session = Session::default();
        assert_eq!(session.handle_line("x = 4"), Action::Print("= 4".into()));
        assert_eq!(session.handle_line("x ^ 2"), Action::Print("= 16".into()));
        assert_eq!(
            session.handle_line(":vars"),
            Action::Print("x = 4".into())
        );
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let mut session = Session::default();
        assert_eq!(
            session.handle_line("1 / 0"),
            Action::Print("Error: Division by zero".into())
        );
        assert_eq!(session.handle_line("1 + 1"), Action::Print("= 2".into()));
    }

    #[test]
    fn test_quit_and_blank() {
        let mut session = Session::default();
        assert_eq!(session.handle_line("   "), Action::Skip);
        assert_eq!(session.handle_line("EXIT"), Action::Quit);
        assert_eq!(session.handle_line("quit"), Action::Quit);
    }

    #[test]
    fn test_reset_clears_variables() {
        let mut session = Session::default();
        session.handle_line("a = 1");
        session.handle_line(":reset");
        assert!(session.interpreter().env().is_empty());
        assert_eq!(
            session.handle_line(":vars"),
            Action::Print("(no variables)".into())
        );
    }

    #[test]
    fn test_render_prints_tree() {
        let mut session = Session::default();
        assert_eq!(
            session.handle_line("render(-1)"),
            Action::Print("└── UNARY_OP(-)\n    └── NUMBER(1)".into())
        );
    }
}
