// src/confirm.rs
use crate::draft::WorkoutDraft;
use crate::prompt::{Line, LineSource};
use crate::resolve::title_case;
use anyhow::Result;
use std::io::Write;

pub const CONFIRM_PROMPT: &str = "Save this workout? (y/N): ";

/// Writes the draft for review: one heading per exercise, sets numbered from 1.
pub fn render_draft<W: Write>(out: &mut W, draft: &WorkoutDraft) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "         WORKOUT SUMMARY")?;
    writeln!(out, "{}", "=".repeat(40))?;
    for entry in draft.entries() {
        let marker = if entry.is_new { " [new]" } else { "" };
        writeln!(out, "{} ({}){marker}", title_case(&entry.name), entry.unit)?;
        for (i, set) in entry.sets.iter().enumerate() {
            writeln!(out, "  Set {}: {}", i + 1, entry.unit.format_set(set.value, set.reps))?;
        }
    }
    if let Some(notes) = &draft.notes {
        writeln!(out, "Notes: {notes}")?;
    }
    writeln!(
        out,
        "{} exercise(s), {} set(s)",
        draft.len(),
        draft.total_sets()
    )?;
    writeln!(out)?;
    Ok(())
}

/// `true` for `y`/`yes` in any case; everything else, interrupts included, is a no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn ask_yes_no<S: LineSource>(input: &mut S, prompt: &str) -> Result<bool> {
    Ok(match input.read_line(prompt, &[])? {
        Line::Text(answer) => is_affirmative(&answer),
        Line::Interrupted | Line::Eof => false,
    })
}

/// Shows the draft and asks whether to keep it. No side effects on the store.
pub fn confirm_draft<S, W>(input: &mut S, out: &mut W, draft: &WorkoutDraft) -> Result<bool>
where
    S: LineSource,
    W: Write,
{
    render_draft(out, draft)?;
    ask_yes_no(input, CONFIRM_PROMPT)
}
