use crate::evaluator;
use crate::lexer::Lexer;
use crate::object::Environment;
use crate::parser::{self, ParserError};
use clap::ValueEnum;
use log::info;
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = ">> ";

/// What the REPL does with each line it reads.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    /// Evaluate the line and print the result
    #[default]
    Eval,
    /// Print the parsed program in its fully parenthesised form
    Parse,
    /// Print the tokens of the line
    Lex,
}

/// Reads lines from `input` until it is exhausted, writing prompts and results to `output`.
/// In `Mode::Eval` bindings made on one line are visible on the following ones.
pub fn start<R: BufRead, W: Write>(mode: Mode, input: R, output: &mut W) -> io::Result<()> {
    info!("starting REPL in {:?} mode", mode);

    let env = Environment::new().into_env();
    let mut lines = input.lines();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        match mode {
            Mode::Lex => {
                for token in Lexer::new(&line) {
                    writeln!(output, "{}", token)?;
                }
            }
            Mode::Parse => match parser::parse(&line) {
                Ok(program) => writeln!(output, "{}", program)?,
                Err(errors) => print_parser_errors(output, &errors)?,
            },
            Mode::Eval => match parser::parse(&line) {
                Ok(program) => writeln!(output, "{}", evaluator::eval(&program, &env))?,
                Err(errors) => print_parser_errors(output, &errors)?,
            },
        }
    }
}

pub fn print_parser_errors<W: Write>(output: &mut W, errors: &[ParserError]) -> io::Result<()> {
    writeln!(
        output,
        r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#
    )?;
    writeln!(output, "Woops! We ran into some monkey business here!")?;
    for error in errors {
        writeln!(output, "\t{}", error)?;
    }

    Ok(())
}
