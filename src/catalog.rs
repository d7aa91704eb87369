// src/catalog.rs
use crate::db;
use crate::resolve::normalize_exercise_name;
use crate::units::Unit;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A unit already bound to an exercise name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownExercise {
    pub unit: Unit,
    /// `true` when the binding comes from the store, `false` when only this session has seen it.
    pub stored: bool,
}

/// Known exercise names for suggestion, plus the units chosen during the current session.
///
/// Stored names are keyed by their normalized form, so rows written with raw
/// names (`Bench Press (kg)`) are offered and matched as `bench press kg`.
/// Session-scoped: built from the store with [`ExerciseCatalog::load`] and extended with
/// [`ExerciseCatalog::remember`] as new exercises are staged.
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    names: Vec<String>,
    stored_units: BTreeMap<String, Unit>,
    session_units: HashMap<String, Unit>,
}

impl ExerciseCatalog {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut catalog = Self::default();
        catalog.refresh(conn)?;
        Ok(catalog)
    }

    /// Reloads stored names and forgets session-only units.
    pub fn refresh(&mut self, conn: &Connection) -> Result<()> {
        let rows = db::exercise_units(conn).context("Failed to load known exercises")?;
        self.stored_units.clear();
        for (raw, unit) in rows {
            let name = normalize_exercise_name(&raw);
            if !name.is_empty() {
                // Oldest row first, so the first recorded unit is kept.
                self.stored_units.entry(name).or_insert(unit);
            }
        }
        self.names = self.stored_units.keys().cloned().collect();
        self.session_units.clear();
        debug!(count = self.names.len(), "exercise catalog refreshed");
        Ok(())
    }

    /// Sorted, distinct names used for suggestion.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Unit bound to `name`: the store first, then this session.
    pub fn lookup(&self, conn: &Connection, name: &str) -> Result<Option<KnownExercise>> {
        let stored = db::unit_for_exercise(conn, name)
            .with_context(|| format!("Failed to look up unit for '{name}'"))?
            .or_else(|| self.stored_units.get(name).copied());
        if let Some(unit) = stored {
            return Ok(Some(KnownExercise { unit, stored: true }));
        }
        Ok(self
            .session_units
            .get(name)
            .map(|&unit| KnownExercise { unit, stored: false }))
    }

    /// Binds a newly introduced name to `unit` for the rest of the session.
    pub fn remember(&mut self, name: &str, unit: Unit) {
        self.session_units.entry(name.to_string()).or_insert(unit);
        if let Err(pos) = self.names.binary_search_by(|n| n.as_str().cmp(name)) {
            self.names.insert(pos, name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Result<Connection> {
        let conn = Connection::open_in_memory()?;
        db::init_db(&conn)?;
        conn.execute_batch(
            "INSERT INTO workouts (id, date) VALUES (1, '2024-03-01T10:00:00');
             INSERT INTO exercises (workout_id, name, unit) VALUES (1, 'Bench Press (kg)', 'kg');
             INSERT INTO exercises (workout_id, name, unit) VALUES (1, 'bench press kg', 'lbs');
             INSERT INTO exercises (workout_id, name, unit) VALUES (1, 'squat', 'kg');",
        )?;
        Ok(conn)
    }

    #[test]
    fn raw_stored_names_are_offered_normalized() -> Result<()> {
        let conn = store()?;
        let catalog = ExerciseCatalog::load(&conn)?;
        assert_eq!(catalog.names(), ["bench press kg", "squat"]);
        Ok(())
    }

    #[test]
    fn exact_stored_name_wins_over_normalized_match() -> Result<()> {
        let conn = store()?;
        let catalog = ExerciseCatalog::load(&conn)?;
        assert_eq!(
            catalog.lookup(&conn, "bench press kg")?,
            Some(KnownExercise {
                unit: Unit::Lbs,
                stored: true
            })
        );
        Ok(())
    }

    #[test]
    fn session_units_come_after_the_store() -> Result<()> {
        let conn = store()?;
        let mut catalog = ExerciseCatalog::load(&conn)?;
        catalog.remember("squat", Unit::Lbs);
        catalog.remember("dips", Unit::Reps);
        assert_eq!(
            catalog.lookup(&conn, "squat")?.map(|k| k.unit),
            Some(Unit::Kg)
        );
        assert_eq!(
            catalog.lookup(&conn, "dips")?,
            Some(KnownExercise {
                unit: Unit::Reps,
                stored: false
            })
        );
        assert_eq!(catalog.names(), ["bench press kg", "dips", "squat"]);
        Ok(())
    }
}
