// src/lib.rs
use anyhow::{Context, Result};
// Use anyhow::Result as standard Result for service layer
use chrono::Utc;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// --- Declare modules ---
pub mod capture;
pub mod catalog;
mod config;
pub mod confirm;
pub mod db;
pub mod draft;
pub mod prompt;
pub mod resolve;
pub mod units;

// --- Expose public types ---
pub use capture::{run_session, SessionOutcome};
pub use catalog::ExerciseCatalog;
pub use config::{parse_color, Config, ConfigError, StandardColor, Theme};
pub use db::{
    CatalogEntry, CommittedWorkout, DbError, StoredExercise, StoredSet, StoredWorkout,
    WorkoutSummary,
};
pub use draft::{ExerciseEntry, SetEntry, WorkoutDraft};
pub use prompt::{Line, LineSource, ScriptedInput, TerminalInput};
pub use units::{Unit, UnitCategory, UnitKind};

pub struct AppService {
    pub config: Config,
    pub conn: Connection,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => db::get_db_path().context("Failed to determine database path")?,
        };
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        db::init_db(&conn).context("Failed to initialize database schema")?;

        Ok(Self {
            config,
            conn,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Unit first recorded for a normalized exercise name.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants.
    pub fn unit_for_exercise(&self, name: &str) -> Result<Option<Unit>> {
        db::unit_for_exercise(&self.conn, name)
            .with_context(|| format!("Failed to look up unit for '{name}'"))
    }

    /// Sorted distinct names of every exercise ever logged.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants.
    pub fn known_exercise_names(&self) -> Result<Vec<String>> {
        db::known_exercise_names(&self.conn).context("Failed to list known exercise names")
    }

    /// Persists a confirmed draft atomically, timestamped now.
    /// On failure nothing is written and the draft can be committed again.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants.
    pub fn commit_workout(&mut self, draft: &WorkoutDraft) -> Result<CommittedWorkout> {
        match db::insert_workout(&mut self.conn, draft, Utc::now()) {
            Ok(committed) => {
                info!(
                    workout_id = committed.workout_id,
                    exercises = committed.exercises,
                    sets = committed.sets,
                    "workout committed"
                );
                Ok(committed)
            }
            Err(e) => {
                warn!(error = %e, "workout commit rolled back");
                Err(anyhow::Error::new(e).context("Failed to save workout"))
            }
        }
    }

    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants.
    pub fn list_recent_workouts(&self, limit: u32) -> Result<Vec<WorkoutSummary>> {
        db::list_recent_workouts(&self.conn, limit).context("Failed to list workouts")
    }

    /// # Errors
    /// Returns `DbError::WorkoutNotFound` (wrapped) if no workout has this ID.
    pub fn get_workout(&self, id: i64) -> Result<StoredWorkout> {
        db::get_workout(&self.conn, id).with_context(|| format!("Failed to load workout {id}"))
    }

    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants.
    pub fn list_exercise_catalog(&self) -> Result<Vec<CatalogEntry>> {
        db::list_exercise_catalog(&self.conn).context("Failed to list exercises")
    }
}
