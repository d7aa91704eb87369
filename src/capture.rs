// src/capture.rs
//! The interactive logging session.
//!
//! Two nested loops: exercises, then the sets of the current exercise. Every
//! finished exercise is staged in a [`WorkoutDraft`]; the store is only touched
//! once the user confirms the whole draft, and then in a single transaction.
//!
//! Interrupt scope:
//! - exercise name prompt: ends the session, the draft is discarded
//! - unit prompt: drops the current exercise
//! - set prompt: drops the current exercise, after confirmation if sets are pending
//!
//! End of input at any capture prompt ends the session like an interrupt at the
//! exercise prompt.

use crate::catalog::ExerciseCatalog;
use crate::confirm::{ask_yes_no, confirm_draft, is_affirmative};
use crate::db::CommittedWorkout;
use crate::draft::{ExerciseEntry, SetEntry, WorkoutDraft};
use crate::prompt::{Line, LineSource};
use crate::resolve::{
    read_exercise_name, read_set, resolve_unit, title_case, ExerciseInput, SetInput,
    UnitResolution,
};
use crate::units::Unit;
use crate::AppService;
use anyhow::Result;
use std::io::Write;
use tracing::{debug, info};

pub const NOTES_PROMPT: &str = "Workout notes (optional): ";
pub const RETRY_PROMPT: &str = "Retry saving? (y/N): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Committed(CommittedWorkout),
    /// Answered no at the confirmation step.
    Rejected,
    /// Nothing was entered.
    Empty,
    /// Interrupted at the exercise prompt; the staged exercises were dropped.
    Abandoned { discarded_exercises: usize },
    /// Saving failed and the user chose not to retry.
    NotSaved,
}

enum Capture {
    Finished(WorkoutDraft),
    Abandoned(WorkoutDraft),
}

enum SetLoop {
    Finished(Vec<SetEntry>),
    Cancelled,
    EndOfInput,
}

/// Runs one complete logging session: capture, confirmation, commit.
pub fn run_session<S, W>(
    service: &mut AppService,
    input: &mut S,
    out: &mut W,
) -> Result<SessionOutcome>
where
    S: LineSource,
    W: Write,
{
    let default_unit = service.config.default_unit()?;
    let mut catalog = ExerciseCatalog::load(&service.conn)?;
    debug!(known = catalog.names().len(), "logging session started");

    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "         LOG WORKOUT")?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out)?;

    let mut draft = match capture_draft(service, &mut catalog, input, out, default_unit)? {
        Capture::Finished(draft) => draft,
        Capture::Abandoned(draft) => {
            if !draft.is_empty() {
                writeln!(
                    out,
                    "\nSession cancelled. {} exercise(s) were not saved.",
                    draft.len()
                )?;
            }
            info!(exercises = draft.len(), "logging session abandoned");
            return Ok(SessionOutcome::Abandoned {
                discarded_exercises: draft.len(),
            });
        }
    };

    if draft.is_empty() {
        writeln!(out, "No exercises logged.")?;
        return Ok(SessionOutcome::Empty);
    }

    if service.config.ask_for_notes {
        draft.notes = read_notes(input)?;
    }

    if !confirm_draft(input, out, &draft)? {
        writeln!(out, "Workout not saved.")?;
        info!(exercises = draft.len(), "workout rejected at confirmation");
        return Ok(SessionOutcome::Rejected);
    }

    loop {
        match service.commit_workout(&draft) {
            Ok(committed) => {
                writeln!(
                    out,
                    "Workout logged successfully! ({} exercise(s), {} set(s))",
                    committed.exercises, committed.sets
                )?;
                return Ok(SessionOutcome::Committed(committed));
            }
            Err(e) => {
                writeln!(out, "  Error: {e:#}")?;
                if !ask_yes_no(input, RETRY_PROMPT)? {
                    writeln!(out, "Workout not saved.")?;
                    return Ok(SessionOutcome::NotSaved);
                }
            }
        }
    }
}

fn capture_draft<S, W>(
    service: &AppService,
    catalog: &mut ExerciseCatalog,
    input: &mut S,
    out: &mut W,
    default_unit: Unit,
) -> Result<Capture>
where
    S: LineSource,
    W: Write,
{
    let mut draft = WorkoutDraft::new();
    loop {
        let name = match read_exercise_name(input, out, catalog.names())? {
            ExerciseInput::Name(name) => name,
            ExerciseInput::Finished => return Ok(Capture::Finished(draft)),
            ExerciseInput::Interrupted => return Ok(Capture::Abandoned(draft)),
        };

        let (unit, is_new) =
            match resolve_unit(input, out, catalog, &service.conn, &name, default_unit)? {
                UnitResolution::Resolved { unit, is_new } => (unit, is_new),
                UnitResolution::Abandoned => {
                    writeln!(out, "  Skipped '{}'.", title_case(&name))?;
                    continue;
                }
                UnitResolution::EndOfInput => return Ok(Capture::Abandoned(draft)),
            };

        match capture_sets(input, out, &name, unit)? {
            SetLoop::Finished(sets) => {
                let set_count = sets.len();
                let added = draft.push(ExerciseEntry {
                    name: name.clone(),
                    unit,
                    sets,
                    is_new,
                });
                if added {
                    catalog.remember(&name, unit);
                    debug!(exercise = %name, %unit, sets = set_count, "exercise staged");
                }
            }
            SetLoop::Cancelled => debug!(exercise = %name, "exercise cancelled"),
            SetLoop::EndOfInput => {
                debug!(exercise = %name, "input ended during set entry");
                return Ok(Capture::Abandoned(draft));
            }
        }
        writeln!(out)?;
    }
}

fn capture_sets<S, W>(input: &mut S, out: &mut W, name: &str, unit: Unit) -> Result<SetLoop>
where
    S: LineSource,
    W: Write,
{
    let mut pending: Vec<SetEntry> = Vec::new();
    loop {
        let ordinal = pending.len() + 1;
        match read_set(input, out, unit, ordinal)? {
            SetInput::Set(set) => {
                writeln!(out, "  ✓ Set {ordinal}: {}", unit.format_set(set.value, set.reps))?;
                pending.push(set);
            }
            SetInput::NoMoreSets => return Ok(SetLoop::Finished(pending)),
            SetInput::EndOfInput => return Ok(SetLoop::EndOfInput),
            SetInput::Cancelled if pending.is_empty() => return Ok(SetLoop::Cancelled),
            SetInput::Cancelled => {
                let prompt = format!(
                    "Discard {} unsaved set(s) for {}? (y/N): ",
                    pending.len(),
                    title_case(name)
                );
                // Ctrl-C here keeps the sets.
                match input.read_line(&prompt, &[])? {
                    Line::Text(answer) if is_affirmative(&answer) => {
                        writeln!(out, "  Discarded '{}'.", title_case(name))?;
                        return Ok(SetLoop::Cancelled);
                    }
                    Line::Eof => return Ok(SetLoop::EndOfInput),
                    Line::Text(_) | Line::Interrupted => {}
                }
            }
        }
    }
}

fn read_notes<S: LineSource>(input: &mut S) -> Result<Option<String>> {
    Ok(match input.read_line(NOTES_PROMPT, &[])? {
        Line::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Line::Text(_) | Line::Interrupted | Line::Eof => None,
    })
}
