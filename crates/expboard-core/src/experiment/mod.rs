//! Experiment records: list, get, create, partial update and delete.

pub mod model;

use crate::error::{ExpError, ExpResult};
use expboard_db::queries::experiments::{self as queries, ExperimentPatchRow, NewExperimentRow};
use expboard_db::DbPool;
use model::{Experiment, ExperimentPatch, ExperimentStatus, NewExperiment};

/// Treat empty strings as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_status(value: &Option<String>) -> ExpResult<Option<ExperimentStatus>> {
    non_empty(value).map(str::parse).transpose()
}

/// List every experiment, newest first.
pub fn list_experiments(pool: &DbPool) -> ExpResult<Vec<Experiment>> {
    let rows = queries::list_experiments(pool)?;
    Ok(rows.into_iter().map(Experiment::from_row).collect())
}

/// Get an experiment by ID.
pub fn get_experiment(pool: &DbPool, id: i64) -> ExpResult<Experiment> {
    queries::find_experiment(pool, id)?
        .map(Experiment::from_row)
        .ok_or(ExpError::ExperimentNotFound(id))
}

/// Create a new experiment.
///
/// `name` is required; status defaults to `todo` and empty optional fields
/// are stored as null.
pub fn create_experiment(pool: &DbPool, new: &NewExperiment) -> ExpResult<Experiment> {
    let name = new
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ExpError::validation("Name is required"))?;
    let status = parse_status(&new.status)?.unwrap_or_default();

    let id = queries::insert_experiment(
        pool,
        &NewExperimentRow {
            name,
            description: non_empty(&new.description),
            status: status.as_str(),
            owner: non_empty(&new.owner),
            start_date: non_empty(&new.start_date),
            end_date: non_empty(&new.end_date),
            revenue_signal: non_empty(&new.revenue_signal),
        },
    )?;
    tracing::info!(id, name, %status, "Created experiment");

    get_experiment(pool, id)
}

/// Apply a partial update and return the stored result.
///
/// Fields left as `None` keep their value; `updated_at` is always refreshed.
pub fn update_experiment(pool: &DbPool, id: i64, patch: &ExperimentPatch) -> ExpResult<Experiment> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ExpError::validation("Name cannot be empty"));
    }
    let status = parse_status(&patch.status)?;

    queries::update_experiment(
        pool,
        id,
        &ExperimentPatchRow {
            name: patch.name.as_deref(),
            description: patch.description.as_deref(),
            status: status.map(|s| s.as_str()),
            owner: patch.owner.as_deref(),
            start_date: patch.start_date.as_deref(),
            end_date: patch.end_date.as_deref(),
            revenue_signal: patch.revenue_signal.as_deref(),
        },
    )?;

    let experiment = get_experiment(pool, id)?;
    tracing::info!(id, status = %experiment.status, "Updated experiment");
    Ok(experiment)
}

/// Move an experiment to another column. Any status may follow any other.
pub fn move_experiment(pool: &DbPool, id: i64, status: ExperimentStatus) -> ExpResult<Experiment> {
    update_experiment(pool, id, &ExperimentPatch::status(status))
}

/// Delete an experiment.
pub fn delete_experiment(pool: &DbPool, id: i64) -> ExpResult<()> {
    if queries::delete_experiment(pool, id)? == 0 {
        return Err(ExpError::ExperimentNotFound(id));
    }
    tracing::info!(id, "Deleted experiment");
    Ok(())
}
