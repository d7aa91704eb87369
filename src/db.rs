// src/db.rs
use crate::draft::WorkoutDraft;
use crate::units::Unit;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const DB_FILE_NAME: &str = "fitlog.db";
const APP_DATA_DIR: &str = "fitlog";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Exercise '{name}' is recorded in {stored}, cannot log it in {requested}")]
    UnitConflict {
        name: String,
        stored: Unit,
        requested: Unit,
    },
    #[error("Workout not found: ID {0}")]
    WorkoutNotFound(i64),
}

/// Row counts written by one successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedWorkout {
    pub workout_id: i64,
    pub exercises: usize,
    pub sets: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    pub exercise_count: i64,
    pub set_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSet {
    pub id: i64,
    pub weight: f64,
    pub reps: i64,
    pub set_order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredExercise {
    pub id: i64,
    pub name: String,
    pub unit: Unit,
    pub sets: Vec<StoredSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredWorkout {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    pub exercises: Vec<StoredExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub unit: Unit,
    pub times_logged: i64,
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database, creating parent directories as needed.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Connection::open(path).map_err(DbError::Connection)
}

/// Initializes the database tables if they don't exist.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,               -- RFC 3339, assigned at commit
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER,
            name TEXT NOT NULL,
            unit TEXT DEFAULT 'lbs',
            FOREIGN KEY (workout_id) REFERENCES workouts (id)
        );

        CREATE TABLE IF NOT EXISTS sets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            exercise_id INTEGER,
            weight REAL,
            reps INTEGER,
            set_order INTEGER,
            FOREIGN KEY (exercise_id) REFERENCES exercises (id)
        );

        CREATE INDEX IF NOT EXISTS idx_exercises_name ON exercises (name);",
    )
    .map_err(DbError::Connection)
}

// A NULL unit means the column default; anything outside the fixed set is treated as weight-like.
fn unit_from_db(raw: Option<String>, name: &str) -> Unit {
    match raw {
        None => Unit::STORE_DEFAULT,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(exercise = name, "{e} in database, treating it as {}", Unit::STORE_DEFAULT);
            Unit::STORE_DEFAULT
        }),
    }
}

// Rows written by older versions carry a naive local timestamp instead of RFC 3339.
fn parse_timestamp(raw: &str, column: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                format!("invalid timestamp '{raw}'").into(),
            )
        })
}

/// Unit first recorded for `name` (matched case-insensitively), if the exercise is known.
pub fn unit_for_exercise(conn: &Connection, name: &str) -> Result<Option<Unit>, DbError> {
    let raw: Option<Option<String>> = conn
        .query_row(
            "SELECT unit FROM exercises WHERE name = ?1 COLLATE NOCASE ORDER BY id ASC LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .map_err(DbError::QueryFailed)?;
    Ok(raw.map(|unit| unit_from_db(unit, name)))
}

/// Sorted distinct exercise names, lower-cased.
pub fn known_exercise_names(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT lower(name) AS n FROM exercises ORDER BY n ASC")
        .map_err(DbError::QueryFailed)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;
    Ok(names)
}

/// Every exercise row's raw name and unit, oldest first.
pub fn exercise_units(conn: &Connection) -> Result<Vec<(String, Unit)>, DbError> {
    let mut stmt = conn
        .prepare("SELECT name, unit FROM exercises ORDER BY id ASC")
        .map_err(DbError::QueryFailed)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;
    Ok(rows
        .into_iter()
        .map(|(name, unit)| {
            let unit = unit_from_db(unit, &name);
            (name, unit)
        })
        .collect())
}

/// Writes one workout, its exercises and their sets in a single transaction.
///
/// Any failure rolls back every row written by this call. The draft is only read.
pub fn insert_workout(
    conn: &mut Connection,
    draft: &WorkoutDraft,
    timestamp: DateTime<Utc>,
) -> Result<CommittedWorkout, DbError> {
    let tx = conn.transaction().map_err(DbError::Connection)?;

    tx.execute(
        "INSERT INTO workouts (date, notes) VALUES (?1, ?2)",
        params![timestamp.to_rfc3339(), draft.notes],
    )
    .map_err(DbError::InsertFailed)?;
    let workout_id = tx.last_insert_rowid();

    let mut set_count = 0;
    {
        let mut insert_exercise = tx
            .prepare("INSERT INTO exercises (workout_id, name, unit) VALUES (?1, ?2, ?3)")
            .map_err(DbError::QueryFailed)?;
        let mut insert_set = tx
            .prepare(
                "INSERT INTO sets (exercise_id, weight, reps, set_order) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(DbError::QueryFailed)?;

        for entry in draft.entries() {
            // First unit written for a name stays its unit.
            if let Some(stored) = unit_for_exercise(&tx, &entry.name)? {
                if stored != entry.unit {
                    return Err(DbError::UnitConflict {
                        name: entry.name.clone(),
                        stored,
                        requested: entry.unit,
                    });
                }
            }

            insert_exercise
                .execute(params![workout_id, entry.name, entry.unit.as_str()])
                .map_err(DbError::InsertFailed)?;
            let exercise_id = tx.last_insert_rowid();

            for (position, set) in (1_i64..).zip(&entry.sets) {
                insert_set
                    .execute(params![exercise_id, set.value, set.reps, position])
                    .map_err(DbError::InsertFailed)?;
                set_count += 1;
            }
        }
    }

    tx.commit().map_err(DbError::Connection)?;

    Ok(CommittedWorkout {
        workout_id,
        exercises: draft.len(),
        sets: set_count,
    })
}

fn map_row_to_summary(row: &Row) -> Result<WorkoutSummary, rusqlite::Error> {
    let date: String = row.get(1)?;
    Ok(WorkoutSummary {
        id: row.get(0)?,
        timestamp: parse_timestamp(&date, 1)?,
        notes: row.get(2)?,
        exercise_count: row.get(3)?,
        set_count: row.get(4)?,
    })
}

/// Most recent workouts first.
pub fn list_recent_workouts(conn: &Connection, limit: u32) -> Result<Vec<WorkoutSummary>, DbError> {
    let mut stmt = conn
        .prepare(
            "SELECT w.id, w.date, w.notes,
                (SELECT COUNT(*) FROM exercises e WHERE e.workout_id = w.id),
                (SELECT COUNT(*) FROM sets s JOIN exercises e ON s.exercise_id = e.id
                    WHERE e.workout_id = w.id)
            FROM workouts w
            ORDER BY w.id DESC
            LIMIT ?1",
        )
        .map_err(DbError::QueryFailed)?;
    let summaries = stmt
        .query_map(params![limit], map_row_to_summary)
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;
    Ok(summaries)
}

/// One workout with its exercises in entry order and sets in `set_order`.
pub fn get_workout(conn: &Connection, id: i64) -> Result<StoredWorkout, DbError> {
    let header = conn
        .query_row(
            "SELECT id, date, notes FROM workouts WHERE id = ?1",
            params![id],
            |row| {
                let date: String = row.get(1)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    parse_timestamp(&date, 1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()
        .map_err(DbError::QueryFailed)?;
    let (id, timestamp, notes) = header.ok_or(DbError::WorkoutNotFound(id))?;

    let mut exercise_stmt = conn
        .prepare("SELECT id, name, unit FROM exercises WHERE workout_id = ?1 ORDER BY id ASC")
        .map_err(DbError::QueryFailed)?;
    let rows = exercise_stmt
        .query_map(params![id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;

    let mut set_stmt = conn
        .prepare(
            "SELECT id, weight, reps, set_order FROM sets
            WHERE exercise_id = ?1 ORDER BY set_order ASC, id ASC",
        )
        .map_err(DbError::QueryFailed)?;

    let mut exercises = Vec::with_capacity(rows.len());
    for (exercise_id, name, unit) in rows {
        let sets = set_stmt
            .query_map(params![exercise_id], |row| {
                Ok(StoredSet {
                    id: row.get(0)?,
                    weight: row.get::<_, Option<f64>>(1)?.unwrap_or_default(),
                    reps: row.get::<_, Option<i64>>(2)?.unwrap_or(1),
                    set_order: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
                })
            })
            .map_err(DbError::QueryFailed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::QueryFailed)?;
        let unit = unit_from_db(unit, &name);
        exercises.push(StoredExercise {
            id: exercise_id,
            name,
            unit,
            sets,
        });
    }

    Ok(StoredWorkout {
        id,
        timestamp,
        notes,
        exercises,
    })
}

/// Every known exercise with its unit and how many workouts it appears in.
pub fn list_exercise_catalog(conn: &Connection) -> Result<Vec<CatalogEntry>, DbError> {
    let mut stmt = conn
        .prepare(
            "SELECT lower(e.name) AS n,
                (SELECT e2.unit FROM exercises e2 WHERE e2.name = e.name COLLATE NOCASE
                    ORDER BY e2.id ASC LIMIT 1),
                COUNT(*)
            FROM exercises e
            GROUP BY n
            ORDER BY n ASC",
        )
        .map_err(DbError::QueryFailed)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;

    Ok(rows
        .into_iter()
        .map(|(name, unit, times_logged)| CatalogEntry {
            unit: unit_from_db(unit, &name),
            name,
            times_logged,
        })
        .collect())
}
