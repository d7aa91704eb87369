// src/units.rs
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

/// Measurement unit of an exercise. Fixed the first time an exercise name is stored.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
pub enum Unit {
    Lbs,
    Kg,
    Minutes,
    Reps,
    Miles,
    Km,
    Seconds,
    Hours,
}

/// What the primary value of a set measures. Drives prompt phrasing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnitKind {
    Weight,
    Distance,
    Duration,
    Reps,
}

/// Shape of one set: a single number, or a weight plus a repetition count.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnitCategory {
    SingleValue,
    WeightAndReps,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown unit '{0}'")]
pub struct UnknownUnit(pub String);

impl Unit {
    /// Unit stored when an exercise row carries no unit.
    pub const STORE_DEFAULT: Unit = Unit::Lbs;

    pub const fn kind(self) -> UnitKind {
        match self {
            Unit::Lbs | Unit::Kg => UnitKind::Weight,
            Unit::Miles | Unit::Km => UnitKind::Distance,
            Unit::Minutes | Unit::Seconds | Unit::Hours => UnitKind::Duration,
            Unit::Reps => UnitKind::Reps,
        }
    }

    pub const fn category(self) -> UnitCategory {
        self.kind().category()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::Lbs => "lbs",
            Unit::Kg => "kg",
            Unit::Minutes => "minutes",
            Unit::Reps => "reps",
            Unit::Miles => "miles",
            Unit::Km => "km",
            Unit::Seconds => "seconds",
            Unit::Hours => "hours",
        }
    }

    /// Every unit name, in prompt order.
    pub fn names() -> Vec<String> {
        Unit::iter().map(|u| u.as_str().to_string()).collect()
    }

    /// Prompt for set number `ordinal` of an exercise measured in this unit.
    pub fn set_prompt(self, ordinal: usize) -> String {
        match self.kind() {
            UnitKind::Weight => format!(
                "Set {ordinal} - weight ({}) and reps, e.g. \"135 5\" (empty to finish): ",
                self
            ),
            UnitKind::Distance => format!("Set {ordinal} - distance in {self} (empty to finish): "),
            UnitKind::Duration => format!("Set {ordinal} - duration in {self} (empty to finish): "),
            UnitKind::Reps => format!("Set {ordinal} - number of reps (empty to finish): "),
        }
    }

    /// One-line diagnostic printed when a set line does not parse.
    pub const fn format_error(self) -> &'static str {
        match self.kind() {
            UnitKind::Weight => "  Invalid format. Use: Weight Reps (e.g. 135 5)",
            UnitKind::Distance => "  Invalid distance. Enter a single number.",
            UnitKind::Duration => "  Invalid duration. Enter a single number.",
            UnitKind::Reps => "  Invalid rep count. Enter a single number.",
        }
    }

    /// Renders one set, e.g. `135 lbs x 5` or `20 reps`.
    pub fn format_set(self, value: f64, reps: i64) -> String {
        match self.category() {
            UnitCategory::WeightAndReps => format!("{} {} x {}", format_value(value), self, reps),
            UnitCategory::SingleValue => format!("{} {}", format_value(value), self),
        }
    }
}

impl UnitKind {
    pub const fn category(self) -> UnitCategory {
        match self {
            UnitKind::Weight => UnitCategory::WeightAndReps,
            UnitKind::Distance | UnitKind::Duration | UnitKind::Reps => UnitCategory::SingleValue,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Unit::iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownUnit(wanted.to_string()))
    }
}

/// Formats a set value without a trailing `.0` for whole numbers.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
