//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::{stdout, Write};
use tracing_subscriber::EnvFilter;

use fitlog_lib::{
    run_session, AppService, CatalogEntry, DbError, Line, LineSource, SessionOutcome,
    StoredWorkout, TerminalInput, WorkoutSummary,
};

const LOG_ENV_VAR: &str = "FITLOG_LOG";

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never mix with the prompts on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli_args = cli::parse_args();

    if let Some(cli::Commands::GenerateCompletion { shell }) = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;

    match cli_args.command {
        None => main_menu(&mut service)?,
        Some(cli::Commands::GenerateCompletion { .. }) => {
            unreachable!("Completion generation should have exited already");
        }
        Some(cli::Commands::Log) => {
            let mut input = TerminalInput::new()?;
            log_workout(&mut service, &mut input)?;
        }
        Some(cli::Commands::Analysis) => print_analysis(),
        Some(cli::Commands::History { limit }) => match service.list_recent_workouts(limit) {
            Ok(workouts) if workouts.is_empty() => println!("No workouts logged yet."),
            Ok(workouts) => print_history_table(&workouts, header_color(&service)),
            Err(e) => bail!("Error listing workouts: {e:#}"),
        },
        Some(cli::Commands::Show { id }) => match service.get_workout(id) {
            Ok(workout) => print_workout_detail(&workout, header_color(&service)),
            Err(e) => {
                if let Some(DbError::WorkoutNotFound(id)) = e.downcast_ref::<DbError>() {
                    println!("Workout ID {id} not found.");
                    return Ok(());
                }
                bail!("Error showing workout {id}: {e:#}");
            }
        },
        Some(cli::Commands::ListExercises) => match service.list_exercise_catalog() {
            Ok(entries) if entries.is_empty() => println!("No exercises logged yet."),
            Ok(entries) => print_exercise_catalog(&entries, header_color(&service)),
            Err(e) => bail!("Error listing exercises: {e:#}"),
        },
        Some(cli::Commands::DbPath) => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        Some(cli::Commands::ConfigPath) => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

fn main_menu(service: &mut AppService) -> Result<()> {
    let mut input = TerminalInput::new()?;
    loop {
        println!();
        println!("{}", "=".repeat(40));
        println!("         FIT LOG");
        println!("{}", "=".repeat(40));
        println!("1. Log workout");
        println!("2. Analysis");
        println!("3. Exit");
        println!();

        let choice = match input.read_line("Select option: ", &[])? {
            Line::Text(choice) => choice,
            Line::Interrupted | Line::Eof => break,
        };
        match choice.trim() {
            "1" => log_workout(service, &mut input)?,
            "2" => print_analysis(),
            "3" => break,
            _ => println!("Invalid option."),
        }
    }
    println!("\nGoodbye!");
    Ok(())
}

fn log_workout<S: LineSource>(service: &mut AppService, input: &mut S) -> Result<()> {
    let mut out = stdout();
    let outcome = run_session(service, input, &mut out)?;
    out.flush()?;
    if let SessionOutcome::Committed(committed) = outcome {
        println!("Saved as workout ID {}.", committed.workout_id);
    }
    Ok(())
}

fn print_analysis() {
    println!("{}", "=".repeat(40));
    println!("         ANALYSIS");
    println!("{}", "=".repeat(40));
    println!();
    println!("Coming soon...");
}

fn header_color(service: &AppService) -> Color {
    fitlog_lib::parse_color(&service.config.theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green) // Fallback
}

// --- Table Printing Functions ---

fn print_history_table(workouts: &[WorkoutSummary], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Exercises").fg(header_color),
            Cell::new("Sets").fg(header_color),
            Cell::new("Notes").fg(header_color),
        ]);

    for workout in workouts {
        table.add_row(vec![
            Cell::new(workout.id.to_string()),
            Cell::new(
                workout
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
            Cell::new(workout.exercise_count.to_string()),
            Cell::new(workout.set_count.to_string()),
            Cell::new(workout.notes.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn print_workout_detail(workout: &StoredWorkout, header_color: Color) {
    println!(
        "Workout {} - {}",
        workout.id,
        workout.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    if let Some(notes) = &workout.notes {
        println!("Notes: {notes}");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Exercise").fg(header_color),
            Cell::new("Set").fg(header_color),
            Cell::new("Result").fg(header_color),
        ]);

    for exercise in &workout.exercises {
        let name = fitlog_lib::resolve::title_case(&exercise.name);
        for set in &exercise.sets {
            table.add_row(vec![
                Cell::new(&name),
                Cell::new(set.set_order.to_string()),
                Cell::new(exercise.unit.format_set(set.weight, set.reps)),
            ]);
        }
    }
    println!("{table}");
}

fn print_exercise_catalog(entries: &[CatalogEntry], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Exercise").fg(header_color),
            Cell::new("Unit").fg(header_color),
            Cell::new("Times Logged").fg(header_color),
        ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(fitlog_lib::resolve::title_case(&entry.name)),
            Cell::new(entry.unit.to_string()),
            Cell::new(entry.times_logged.to_string()),
        ]);
    }
    println!("{table}");
}
