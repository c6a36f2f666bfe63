use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser as ClapParser, Subcommand};
use log::{debug, info};

use bellamy::object::{Environment, Object};
use bellamy::repl::{self, Mode};
use bellamy::{evaluator, parser};

#[derive(ClapParser, Debug)]
#[command(version, about = "Interpreter for the bellamy expression language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Raise the log level (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a script and prints the value of its last statement
    Run { filename: PathBuf },

    /// Starts an interactive session (the default)
    Repl {
        #[arg(long, value_enum, default_value_t = Mode::Eval)]
        mode: Mode,
    },
}

fn init_logger(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Exit status for a script that doesn't parse.
const EXIT_PARSE_ERROR: i32 = 65;
/// Exit status for a script whose evaluation produced an error.
const EXIT_EVAL_ERROR: i32 = 70;

fn run_file(filename: PathBuf) -> Result<()> {
    info!("Reading file: {:?}", filename);
    let source = fs::read_to_string(&filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    let program = match parser::parse(&source) {
        Ok(program) => program,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            process::exit(EXIT_PARSE_ERROR);
        }
    };

    info!("Parsed {} statements", program.statements.len());

    let env = Environment::new().into_env();
    match evaluator::eval(&program, &env) {
        Object::Error(message) => {
            eprintln!("ERROR: {}", message);
            process::exit(EXIT_EVAL_ERROR);
        }
        result => println!("{}", result),
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logger(args.verbose);

    debug!("CLI arguments: {:?}", args);

    match args.command {
        Some(Command::Run { filename }) => run_file(filename),
        Some(Command::Repl { mode }) => start_repl(mode),
        None => start_repl(Mode::default()),
    }
}

fn start_repl(mode: Mode) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    repl::start(mode, stdin.lock(), &mut stdout.lock()).context("REPL I/O failed")
}
