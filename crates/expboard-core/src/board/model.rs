//! Board domain models for the experiment kanban.

use serde::{Deserialize, Serialize};

use crate::experiment::model::{Experiment, ExperimentStatus};

/// The four fixed columns, in display order, with their accent colors.
pub const COLUMNS: &[(ExperimentStatus, &str)] = &[
    (ExperimentStatus::Todo, "#6b7280"),
    (ExperimentStatus::InProgress, "#3b82f6"),
    (ExperimentStatus::Review, "#f59e0b"),
    (ExperimentStatus::Done, "#10b981"),
];

/// A kanban board: every experiment, partitioned by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

/// A column within the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub status: ExperimentStatus,
    pub label: String,
    pub color: String,
    pub experiments: Vec<Experiment>,
}

impl Column {
    fn empty(status: ExperimentStatus, color: &str) -> Self {
        Self {
            status,
            label: status.label().to_string(),
            color: color.to_string(),
            experiments: Vec::new(),
        }
    }
}

impl Board {
    /// A board with all four columns and no experiments.
    pub fn empty() -> Self {
        Self {
            columns: COLUMNS
                .iter()
                .map(|(status, color)| Column::empty(*status, color))
                .collect(),
        }
    }

    /// Partition experiments into their status columns.
    ///
    /// Each experiment lands in exactly one column; order within a column
    /// follows the input order.
    pub fn from_experiments(experiments: impl IntoIterator<Item = Experiment>) -> Self {
        let mut board = Self::empty();
        for experiment in experiments {
            if let Some(column) = board
                .columns
                .iter_mut()
                .find(|c| c.status == experiment.status)
            {
                column.experiments.push(experiment);
            }
        }
        board
    }

    /// Column for a status.
    pub fn column(&self, status: ExperimentStatus) -> Option<&Column> {
        self.columns.iter().find(|c| c.status == status)
    }

    /// Number of experiments across all columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.experiments.len()).sum()
    }
}
