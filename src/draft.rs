// src/draft.rs
use crate::units::Unit;

/// One set as entered: primary value and repetition count (1 for single-value units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetEntry {
    pub value: f64,
    pub reps: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseEntry {
    pub name: String, // normalized
    pub unit: Unit,
    pub sets: Vec<SetEntry>,
    pub is_new: bool, // display only
}

/// The in-memory workout being captured. Nothing reaches the store until it is committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutDraft {
    entries: Vec<ExerciseEntry>,
    pub notes: Option<String>,
}

impl WorkoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finished exercise. Entries without sets are dropped.
    pub fn push(&mut self, entry: ExerciseEntry) -> bool {
        if entry.sets.is_empty() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[ExerciseEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_sets(&self) -> usize {
        self.entries.iter().map(|e| e.sets.len()).sum()
    }
}
