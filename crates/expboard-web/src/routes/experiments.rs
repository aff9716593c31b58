//! Experiment JSON route handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use expboard_core::experiment::{
    self,
    model::{Experiment, ExperimentPatch, NewExperiment},
};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::{AppState, WebSocketMessage};

/// Acknowledgement returned by delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// A non-numeric id cannot match any record.
fn experiment_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::not_found())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// GET /experiments
pub async fn list_experiments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Experiment>>, ApiError> {
    let experiments = experiment::list_experiments(&state.db)
        .map_err(|e| ApiError::from_core(e, "Failed to fetch experiments"))?;

    Ok(Json(experiments))
}

/// GET /experiments/{id}
pub async fn get_experiment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Experiment>, ApiError> {
    let id = experiment_id(path)?;
    let experiment = experiment::get_experiment(&state.db, id)
        .map_err(|e| ApiError::from_core(e, "Failed to fetch experiment"))?;

    Ok(Json(experiment))
}

/// POST /experiments
pub async fn create_experiment(
    State(state): State<AppState>,
    body: Result<Json<NewExperiment>, JsonRejection>,
) -> Result<(StatusCode, Json<Experiment>), ApiError> {
    let req = json_body(body)?;
    let experiment = experiment::create_experiment(&state.db, &req)
        .map_err(|e| ApiError::from_core(e, "Failed to create experiment"))?;

    state.broadcast(WebSocketMessage::BoardRefresh);

    Ok((StatusCode::CREATED, Json(experiment)))
}

/// PUT /experiments/{id}
pub async fn update_experiment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ExperimentPatch>, JsonRejection>,
) -> Result<Json<Experiment>, ApiError> {
    let id = experiment_id(path)?;
    let patch = json_body(body)?;
    let experiment = experiment::update_experiment(&state.db, id, &patch)
        .map_err(|e| ApiError::from_core(e, "Failed to update experiment"))?;

    state.broadcast(WebSocketMessage::ExperimentUpdated {
        experiment_id: experiment.id,
        status: experiment.status.to_string(),
    });

    Ok(Json(experiment))
}

/// DELETE /experiments/{id}
pub async fn delete_experiment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = experiment_id(path)?;
    experiment::delete_experiment(&state.db, id)
        .map_err(|e| ApiError::from_core(e, "Failed to delete experiment"))?;

    state.broadcast(WebSocketMessage::ExperimentDeleted { experiment_id: id });

    Ok(Json(DeleteResponse { success: true }))
}
