// src/resolve.rs
//! Single-prompt resolvers used by the capture loop. Each one retries locally on
//! malformed input and only returns once it has a usable answer or a control signal.

use crate::catalog::{ExerciseCatalog, KnownExercise};
use crate::draft::SetEntry;
use crate::prompt::{Line, LineSource};
use crate::units::{Unit, UnitCategory};
use anyhow::Result;
use rusqlite::Connection;
use std::io::Write;

pub const EXERCISE_PROMPT: &str = "Exercise name (empty to finish): ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseInput {
    Name(String),
    /// Empty line: no more exercises in this workout.
    Finished,
    /// Interrupt or end of input: abandon the whole session.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitResolution {
    Resolved { unit: Unit, is_new: bool },
    /// Interrupt at the unit prompt: drop this exercise and ask for the next one.
    Abandoned,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetInput {
    Set(SetEntry),
    NoMoreSets,
    Cancelled,
    EndOfInput,
}

/// Keeps `[A-Za-z0-9 -]`, lower-cases and trims.
pub fn normalize_exercise_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// `bench press` -> `Bench Press`
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn read_exercise_name<S, W>(
    input: &mut S,
    out: &mut W,
    known_names: &[String],
) -> Result<ExerciseInput>
where
    S: LineSource,
    W: Write,
{
    loop {
        let text = match input.read_line(EXERCISE_PROMPT, known_names)? {
            Line::Interrupted | Line::Eof => return Ok(ExerciseInput::Interrupted),
            Line::Text(text) => text,
        };
        if text.trim().is_empty() {
            return Ok(ExerciseInput::Finished);
        }
        let name = normalize_exercise_name(&text);
        if name.is_empty() {
            writeln!(out, "  Exercise names need at least one letter or digit.")?;
            continue;
        }
        return Ok(ExerciseInput::Name(name));
    }
}

/// Reuses the unit already bound to `name`, otherwise asks for one.
pub fn resolve_unit<S, W>(
    input: &mut S,
    out: &mut W,
    catalog: &ExerciseCatalog,
    conn: &Connection,
    name: &str,
    default_unit: Unit,
) -> Result<UnitResolution>
where
    S: LineSource,
    W: Write,
{
    match catalog.lookup(conn, name)? {
        Some(KnownExercise { unit, stored: true }) => {
            writeln!(out, "  Reusing existing exercise '{}' ({unit}).", title_case(name))?;
            return Ok(UnitResolution::Resolved { unit, is_new: false });
        }
        Some(KnownExercise { unit, stored: false }) => {
            writeln!(out, "  '{}' is already in this workout ({unit}).", title_case(name))?;
            return Ok(UnitResolution::Resolved { unit, is_new: true });
        }
        None => {}
    }

    let unit_names = Unit::names();
    let prompt = format!("Unit [{}] (default {default_unit}): ", unit_names.join("/"));
    loop {
        let text = match input.read_line(&prompt, &unit_names)? {
            Line::Interrupted => return Ok(UnitResolution::Abandoned),
            Line::Eof => return Ok(UnitResolution::EndOfInput),
            Line::Text(text) => text,
        };
        if text.trim().is_empty() {
            return Ok(UnitResolution::Resolved {
                unit: default_unit,
                is_new: true,
            });
        }
        match text.parse::<Unit>() {
            Ok(unit) => return Ok(UnitResolution::Resolved { unit, is_new: true }),
            Err(e) => writeln!(out, "  {e}. Choose one of: {}", unit_names.join(", "))?,
        }
    }
}

/// Parses one non-empty set line for `unit`. `None` means malformed.
pub fn parse_set(unit: Unit, text: &str) -> Option<SetEntry> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match (unit.category(), tokens.as_slice()) {
        (UnitCategory::WeightAndReps, [weight, reps]) => {
            let value = parse_value(weight)?;
            let reps = reps.parse::<i64>().ok().filter(|r| *r >= 1)?;
            Some(SetEntry { value, reps })
        }
        (UnitCategory::SingleValue, [value]) => Some(SetEntry {
            value: parse_value(value)?,
            reps: 1,
        }),
        _ => None,
    }
}

fn parse_value(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn read_set<S, W>(input: &mut S, out: &mut W, unit: Unit, ordinal: usize) -> Result<SetInput>
where
    S: LineSource,
    W: Write,
{
    let prompt = unit.set_prompt(ordinal);
    loop {
        let text = match input.read_line(&prompt, &[])? {
            Line::Interrupted => return Ok(SetInput::Cancelled),
            Line::Eof => return Ok(SetInput::EndOfInput),
            Line::Text(text) => text,
        };
        if text.trim().is_empty() {
            return Ok(SetInput::NoMoreSets);
        }
        match parse_set(unit, &text) {
            Some(set) => return Ok(SetInput::Set(set)),
            None => writeln!(out, "{}", unit.format_error())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_and_lowercases() {
        assert_eq!(normalize_exercise_name("  Bench Press "), "bench press");
        assert_eq!(normalize_exercise_name("T-Bar Row!!"), "t-bar row");
        assert_eq!(normalize_exercise_name("Curl (EZ bar) #2"), "curl ez bar 2");
        assert_eq!(normalize_exercise_name("!!!"), "");
    }

    #[test]
    fn title_case_keeps_hyphens() {
        assert_eq!(title_case("bench press"), "Bench Press");
        assert_eq!(title_case("t-bar row"), "T-bar Row");
    }

    #[test]
    fn weight_sets_need_two_tokens() {
        assert_eq!(
            parse_set(Unit::Lbs, "135 5"),
            Some(SetEntry { value: 135.0, reps: 5 })
        );
        assert_eq!(
            parse_set(Unit::Kg, " 62.5   8 "),
            Some(SetEntry { value: 62.5, reps: 8 })
        );
        assert_eq!(parse_set(Unit::Lbs, "135"), None);
        assert_eq!(parse_set(Unit::Lbs, "135 5 5"), None);
        assert_eq!(parse_set(Unit::Lbs, "135 5.5"), None);
        assert_eq!(parse_set(Unit::Lbs, "heavy 5"), None);
        assert_eq!(parse_set(Unit::Lbs, "135 0"), None);
    }

    #[test]
    fn single_value_sets_fix_reps_to_one() {
        assert_eq!(
            parse_set(Unit::Reps, "20"),
            Some(SetEntry { value: 20.0, reps: 1 })
        );
        assert_eq!(
            parse_set(Unit::Miles, "3.1"),
            Some(SetEntry { value: 3.1, reps: 1 })
        );
        assert_eq!(parse_set(Unit::Reps, "abc"), None);
        assert_eq!(parse_set(Unit::Minutes, "20 5"), None);
    }

    #[test]
    fn rejects_non_finite_and_negative_values() {
        assert_eq!(parse_set(Unit::Seconds, "NaN"), None);
        assert_eq!(parse_set(Unit::Seconds, "inf"), None);
        assert_eq!(parse_set(Unit::Km, "-3"), None);
        assert_eq!(parse_set(Unit::Lbs, "-10 5"), None);
    }
}
