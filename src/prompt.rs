// src/prompt.rs
//! Line-oriented input for the capture session.
//!
//! Every prompt blocks until the user submits a line, raises an interrupt
//! (Ctrl-C) or input ends (Ctrl-D, or a closed pipe). End of input is its own
//! signal: no further line will ever arrive, so callers must not prompt again.

use anyhow::{Context as _, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::collections::VecDeque;

/// Result of one blocking prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    Interrupted,
    Eof,
}

/// Source of user lines. `suggestions` are offered as completions while typing.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str, suggestions: &[String]) -> Result<Line>;
}

/// Candidates matching `typed`, case-insensitively: prefix matches first, then substring matches.
pub fn matching_suggestions<'a>(candidates: &'a [String], typed: &str) -> Vec<&'a str> {
    let needle = typed.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.iter().map(String::as_str).collect();
    }
    let (mut prefix, mut inner): (Vec<&str>, Vec<&str>) = (Vec::new(), Vec::new());
    for candidate in candidates {
        let lower = candidate.to_lowercase();
        if lower.starts_with(&needle) {
            prefix.push(candidate);
        } else if lower.contains(&needle) {
            inner.push(candidate);
        }
    }
    prefix.append(&mut inner);
    prefix
}

#[derive(Default)]
struct SuggestHelper {
    candidates: Vec<String>,
}

impl Completer for SuggestHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let pairs = matching_suggestions(&self.candidates, &line[..pos])
            .into_iter()
            .map(|c| Pair {
                display: c.to_string(),
                replacement: c.to_string(),
            })
            .collect();
        Ok((0, pairs))
    }
}

impl Hinter for SuggestHelper {
    type Hint = String;

    // Greyed-out tail of the first prefix match, accepted with the right arrow.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if line.is_empty() || pos < line.len() {
            return None;
        }
        let typed = line.to_lowercase();
        self.candidates
            .iter()
            .find(|c| c.len() > typed.len() && c.to_lowercase().starts_with(&typed))
            .and_then(|c| c.get(typed.len()..))
            .map(str::to_string)
    }
}

impl Highlighter for SuggestHelper {}
impl Validator for SuggestHelper {}
impl Helper for SuggestHelper {}

/// Interactive terminal input backed by rustyline.
pub struct TerminalInput {
    editor: Editor<SuggestHelper, DefaultHistory>,
}

impl TerminalInput {
    pub fn new() -> Result<Self> {
        let mut editor = Editor::<SuggestHelper, DefaultHistory>::new()
            .context("Failed to initialise terminal line editor")?;
        editor.set_helper(Some(SuggestHelper::default()));
        Ok(Self { editor })
    }
}

impl LineSource for TerminalInput {
    fn read_line(&mut self, prompt: &str, suggestions: &[String]) -> Result<Line> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.candidates = suggestions.to_vec();
        }
        match self.editor.readline(prompt) {
            Ok(text) => Ok(Line::Text(text)),
            Err(ReadlineError::Interrupted) => Ok(Line::Interrupted),
            Err(ReadlineError::Eof) => Ok(Line::Eof),
            Err(e) => Err(e).context("Failed to read from terminal"),
        }
    }
}

/// Pre-recorded input. `None` entries are interrupts; running out of script is end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<Option<String>>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(|l| l.map(Into::into)).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str, _suggestions: &[String]) -> Result<Line> {
        self.prompts.push(prompt.to_string());
        Ok(match self.lines.pop_front() {
            Some(Some(text)) => Line::Text(text),
            Some(None) => Line::Interrupted,
            None => Line::Eof,
        })
    }
}
