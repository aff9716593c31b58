//! Experiment domain models.

use std::fmt;
use std::str::FromStr;

use expboard_db::queries::experiments::ExperimentRow;
use serde::{Deserialize, Serialize};

use crate::error::ExpError;

/// A tracked experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: ExperimentStatus,
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub revenue_signal: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Experiment {
    /// Create an Experiment from a database row.
    pub fn from_row(row: ExperimentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            // The table CHECK constraint keeps this parse total.
            status: row.status.parse().unwrap_or_default(),
            owner: row.owner,
            start_date: row.start_date,
            end_date: row.end_date,
            revenue_signal: row.revenue_signal,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Experiment status (board column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl ExperimentStatus {
    /// Every status, in board column order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Review, Self::Done];

    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Column heading shown on the board.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentStatus {
    type Err = ExpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            other => Err(ExpError::validation(format!(
                "Invalid status '{}': expected one of todo, in-progress, review, done",
                other
            ))),
        }
    }
}

/// Candidate record for the create operation.
///
/// Everything is optional at the type level so a missing `name` surfaces as a
/// validation error instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewExperiment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub revenue_signal: Option<String>,
}

impl NewExperiment {
    /// Candidate with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Partial record for the update operation.
///
/// `None` (absent or JSON `null`) keeps the stored value. An empty string
/// clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub revenue_signal: Option<String>,
}

impl ExperimentPatch {
    /// Patch that only changes the status.
    pub fn status(status: ExperimentStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }
}
