//! dsc -- translate between canonical Ds and the Dsp surface syntax.
//!
//! `dsc parse` reads Dsp and writes Ds; `dsc unparse` reads Ds and writes
//! Dsp. Each command takes an optional file argument and reads standard
//! input when none is given. Diagnostics go to stderr with line/column
//! positions; the exit code is zero only on success.

mod tracing_setup;

use std::io::Read;

/// Failure of one translation run.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Translate(#[from] ds_surface::SurfaceError),
}

/// Translation direction, named after the surface operations.
#[derive(Clone, Copy)]
enum Command {
    /// Dsp -> Ds.
    Parse,
    /// Ds -> Dsp.
    Unparse,
}

fn main() {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        std::process::exit(2);
    };
    let command = match command.as_str() {
        "parse" => Command::Parse,
        "unparse" => Command::Unparse,
        "--help" | "-h" => {
            print_usage();
            return;
        }
        other => {
            eprintln!("unknown command `{other}`");
            print_usage();
            std::process::exit(2);
        }
    };

    match run(command, args.get(2).map(String::as_str)) {
        Ok(output) => println!("{output}"),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

fn run(command: Command, path: Option<&str>) -> Result<String, CliError> {
    let input = read_input(path)?;
    tracing::debug!(
        bytes = input.len(),
        from_stdin = path.is_none(),
        "translating"
    );
    let output = match command {
        Command::Parse => ds_surface::parse(&input)?,
        Command::Unparse => ds_surface::unparse(&input)?,
    };
    Ok(output)
}

fn read_input(path: Option<&str>) -> Result<String, std::io::Error> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn print_usage() {
    eprintln!("Usage: dsc <command> [file]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  parse     translate Dsp surface syntax to canonical Ds");
    eprintln!("  unparse   translate canonical Ds to Dsp surface syntax");
    eprintln!();
    eprintln!("Reads the file argument, or standard input when omitted.");
}
