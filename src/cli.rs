// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "An interactive CLI tool to log workouts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a workout interactively
    Log,
    /// Workout analysis (not available yet)
    Analysis,
    /// List recent workouts
    History {
        /// Show only the last N workouts
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one workout with all of its sets
    Show {
        /// ID of the workout
        id: i64,
    },
    /// List every exercise logged so far with its unit
    ListExercises,
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate a shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
