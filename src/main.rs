//! `dost` - drives a dynamic order-statistics tree from a line-oriented command script.
//!
//! Commands are read from `--input` or stdin, one per line; each reply line goes to stdout.
//! Malformed lines are reported as `Error: <reason>` and skipped.

mod cli;
mod config;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use clap::Parser;
use dos_tree::DosTree;
use dos_tree::command::{self, Command};
use log::{LevelFilter, debug, info, warn};
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use crate::cli::Cli;
use crate::config::Config;

fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

/// Executes every line of `input` against a fresh tree, writing replies to `output`.
///
/// Stops at the first I/O failure or invariant violation.
fn run<R: BufRead, W: Write>(input: R, output: &mut W, check_invariants: bool) -> Result<(), Box<dyn Error>> {
    let mut tree = DosTree::new();
    let mut executed = 0usize;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                warn!("line {}: {err}", index + 1);
                writeln!(output, "Error: {err}")?;
                continue;
            }
        };

        let response = command::execute(&mut tree, command)?;
        writeln!(output, "{response}")?;
        executed += 1;

        if check_invariants && command.is_mutating() {
            tree.validate()?;
            debug!("line {}: invariants hold after {}", index + 1, command.name());
        }
    }

    output.flush()?;
    info!(
        "executed {executed} commands; {} entries, height {}",
        tree.len(),
        tree.height()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_cli(Cli::parse())?;
    init_logging(config.log_level)?;
    info!("dost starting (check_invariants: {})", config.check_invariants);

    let mut output = BufWriter::new(io::stdout().lock());
    match &config.input {
        Some(path) => {
            info!("reading commands from {}", path.display());
            run(BufReader::new(File::open(path)?), &mut output, config.check_invariants)
        }
        None => run(io::stdin().lock(), &mut output, config.check_invariants),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn replies(script: &str, check_invariants: bool) -> String {
        let mut output = Vec::new();
        run(script.as_bytes(), &mut output, check_invariants).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn replies_line_by_line() {
        let script = "insert 2\ninsert 1\n\nfind 1\nselect 2\nrank 3\n";
        assert_eq!(
            replies(script, true),
            "Node with key 2 inserted successfully.\n\
             Node with key 1 inserted successfully.\n\
             Node with key 1 found. Value: 1\n\
             Key at rank 2: 2\n\
             No node with key 3 found.\n"
        );
    }

    #[test]
    fn malformed_lines_are_reported_and_skipped() {
        let script = "insert 4\nfrobnicate 1\ninsert\nfind 4\n";
        assert_eq!(
            replies(script, false),
            "Node with key 4 inserted successfully.\n\
             Error: unknown command 'frobnicate'\n\
             Error: 'insert' expects an argument <key>\n\
             Node with key 4 found. Value: 4\n"
        );
    }
}
