//! tally CLI
//!
//! Main entry point for the `tally` command.

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tally::config::Config;
use tally::interp::Interpreter;
use tally::{SourceFile, Stmt, TallyError};

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A small integer expression language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Largest operand accepted by `!`
    #[arg(long, global = true, value_name = "N")]
    max_factorial: Option<u64>,

    /// Largest exponent accepted by `^`
    #[arg(long, global = true, value_name = "N")]
    max_exponent: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate expressions in order, sharing variables
    Eval {
        /// Expressions to evaluate
        #[arg(value_name = "EXPR", required = true)]
        exprs: Vec<String>,
    },

    /// Print the parse tree of an expression
    Render {
        #[arg(value_name = "EXPR")]
        expr: String,
    },

    /// Print the token stream of an expression
    Tokens {
        #[arg(value_name = "EXPR")]
        expr: String,
    },

    /// Print the parsed statement as JSON
    Ast {
        #[arg(value_name = "EXPR")]
        expr: String,
    },

    /// Start the interactive REPL
    Repl,

    /// Serve the `calculate` tool over JSON-RPC on stdin/stdout
    Serve,

    /// Show information about tally
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with results
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Eval { exprs } => eval(&config, &exprs),
        Commands::Render { expr } => render(&expr),
        Commands::Tokens { expr } => tokens(&expr),
        Commands::Ast { expr } => ast(&expr),
        Commands::Repl => tally::repl::run(&config.repl, config.limits),
        Commands::Serve => {
            let mut server = tally::server::ToolServer::new(config.limits);
            server
                .serve(std::io::stdin().lock(), std::io::stdout().lock())
                .into_diagnostic()
        }
        Commands::Info => info(),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading config from {:?}", path);
            Config::load(path)?
        }
        None => Config::default(),
    };

    if let Some(n) = cli.max_factorial {
        config.limits.max_factorial = n;
    }
    if let Some(n) = cli.max_exponent {
        config.limits.max_exponent = n;
    }
    Ok(config)
}

fn eval(config: &Config, exprs: &[String]) -> Result<()> {
    let mut interpreter = Interpreter::with_limits(config.limits);

    for expr in exprs {
        tracing::debug!("Evaluating {:?}", expr);
        let source = SourceFile::new("<expr>", expr.as_str());
        let value = interpreter.run(expr).map_err(|e| source.report(e))?;
        println!("{}", value);
    }
    Ok(())
}

fn render(expr: &str) -> Result<()> {
    let source = SourceFile::new("<expr>", expr);
    let stmt = tally::parse_source(expr).map_err(|e| source.report(e))?;

    match stmt {
        Stmt::Expr(e) => {
            println!("{}", tally::render::render(&e));
            Ok(())
        }
        Stmt::Render(_) => Err(miette::miette!(
            "`render` already prints a tree; pass the expression on its own"
        )),
    }
}

fn tokens(expr: &str) -> Result<()> {
    let source = SourceFile::new("<expr>", expr);
    let tokens = tally::lexer::lex(expr).map_err(|e| source.report(TallyError::from(e)))?;

    for token in &tokens {
        println!("{}", token);
    }
    Ok(())
}

fn ast(expr: &str) -> Result<()> {
    let source = SourceFile::new("<expr>", expr);
    let stmt = tally::parse_source(expr).map_err(|e| source.report(e))?;

    let json = serde_json::to_string_pretty(&stmt)
        .map_err(|e| miette::miette!("Failed to serialize AST: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn info() -> Result<()> {
    println!("tally - integer expression language");
    println!("Version: {}", tally::VERSION);
    println!();
    println!("Operators (loosest to tightest):");
    println!("  =          assignment, right-associative");
    println!("  + -        additive");
    println!("  * / %      multiplicative, / and % round toward -infinity");
    println!("  ^          power, left-associative");
    println!("  + - !      prefix plus, negation, factorial");
    println!();
    println!("Statements:");
    println!("  render(expr)   print the parse tree instead of evaluating");

    Ok(())
}
