//! Offline draw tool.
//!
//! # Responsibility
//! - Run the assignment engine over names given on the command line.
//! - Print the core crate version for linkage checks.

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use santa_core::compute_assignment;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "santa_cli", about = "Secret Santa draw utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draws givers and receivers for the given names.
    Draw {
        /// Participant names; at least three, all distinct.
        #[arg(required = true)]
        names: Vec<String>,
        /// Seed for a reproducible draw.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Prints the core crate version.
    Version,
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Command::Draw { names, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match compute_assignment(&names, &mut rng) {
                Ok(assignment) => {
                    for (giver, receiver) in assignment.pairs() {
                        println!("{giver} -> {receiver}");
                    }
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("santa_cli: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Version => {
            println!("santa_core version={}", santa_core::core_version());
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn draw_parses_names_and_seed() {
        let cli =
            Cli::try_parse_from(["santa_cli", "draw", "A", "B", "C", "--seed", "7"]).unwrap();
        match cli.command {
            Command::Draw { names, seed } => {
                assert_eq!(names, vec!["A", "B", "C"]);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn draw_requires_names() {
        assert!(Cli::try_parse_from(["santa_cli", "draw"]).is_err());
    }
}
