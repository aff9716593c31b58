//! HTMX-driven board route handlers.
//!
//! The page and every mutation response carry the full set of columns,
//! re-fetched from the store. A failed mutation answers `204 No Content`
//! so HTMX leaves the board as it was.

use askama::Template;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use expboard_core::board::{self, Board, Column};
use expboard_core::experiment::{
    self,
    model::{Experiment, ExperimentPatch, ExperimentStatus, NewExperiment},
};
use expboard_core::ExpError;
use serde::Deserialize;

use crate::state::{AppState, WebSocketMessage};

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "board.html")]
struct BoardTemplate {
    columns: Vec<ColumnView>,
    statuses: Vec<StatusOption>,
}

#[derive(Template)]
#[template(path = "partials/columns.html")]
struct ColumnsTemplate {
    columns: Vec<ColumnView>,
}

/// View model for a column.
struct ColumnView {
    label: &'static str,
    color: String,
    count: usize,
    cards: Vec<CardView>,
}

/// View model for a card. Absent fields render as empty strings.
struct CardView {
    id: i64,
    name: String,
    description: String,
    owner: String,
    revenue_signal: String,
    dates: String,
    options: Vec<StatusOption>,
}

struct StatusOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn status_options(current: ExperimentStatus) -> Vec<StatusOption> {
    ExperimentStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: *status == current,
        })
        .collect()
}

impl CardView {
    fn from_experiment(exp: &Experiment) -> Self {
        let dates = match (&exp.start_date, &exp.end_date) {
            (Some(start), Some(end)) => format!("{} → {}", start, end),
            (Some(start), None) => format!("from {}", start),
            (None, Some(end)) => format!("until {}", end),
            (None, None) => String::new(),
        };

        Self {
            id: exp.id,
            name: exp.name.clone(),
            description: exp.description.clone().unwrap_or_default(),
            owner: exp.owner.clone().unwrap_or_default(),
            revenue_signal: exp.revenue_signal.clone().unwrap_or_default(),
            dates,
            options: status_options(exp.status),
        }
    }
}

impl ColumnView {
    fn from_column(col: &Column) -> Self {
        Self {
            label: col.status.label(),
            color: col.color.clone(),
            count: col.experiments.len(),
            cards: col.experiments.iter().map(CardView::from_experiment).collect(),
        }
    }
}

fn column_views(board: &Board) -> Vec<ColumnView> {
    board.columns.iter().map(ColumnView::from_column).collect()
}

// ============================================================
// REQUEST TYPES
// ============================================================

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
}

// ============================================================
// HANDLERS
// ============================================================

/// GET / - Render the full board page.
pub async fn index(State(state): State<AppState>) -> Response {
    let board = fetch_board(&state);
    render(&BoardTemplate {
        columns: column_views(&board),
        statuses: status_options(ExperimentStatus::Todo),
    })
}

/// GET /board/columns - Re-fetch and render just the columns.
pub async fn columns(State(state): State<AppState>) -> Response {
    render_columns(&state)
}

/// POST /board/experiments - Create an experiment from the board form.
pub async fn create_experiment(
    State(state): State<AppState>,
    Form(form): Form<NewExperiment>,
) -> Response {
    match experiment::create_experiment(&state.db, &form) {
        Ok(_) => {
            state.broadcast(WebSocketMessage::BoardRefresh);
            render_columns(&state)
        }
        Err(e) => unchanged("create", e),
    }
}

/// POST /board/experiments/{id}/status - Change only the status.
pub async fn update_status(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Ok(Path(id)) = path else {
        return bad_id("update status");
    };
    let patch = ExperimentPatch {
        status: Some(form.status),
        ..Default::default()
    };

    match experiment::update_experiment(&state.db, id, &patch) {
        Ok(exp) => {
            state.broadcast(WebSocketMessage::ExperimentUpdated {
                experiment_id: exp.id,
                status: exp.status.to_string(),
            });
            render_columns(&state)
        }
        Err(e) => unchanged("update status", e),
    }
}

/// DELETE /board/experiments/{id} - Delete after the client confirmed.
pub async fn delete_experiment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = path else {
        return bad_id("delete");
    };
    match experiment::delete_experiment(&state.db, id) {
        Ok(()) => {
            state.broadcast(WebSocketMessage::ExperimentDeleted { experiment_id: id });
            render_columns(&state)
        }
        Err(e) => unchanged("delete", e),
    }
}

// ============================================================
// HELPERS
// ============================================================

/// Full list fetch. A failed fetch shows an empty board.
fn fetch_board(state: &AppState) -> Board {
    board::get_board(&state.db).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch experiments, showing an empty board");
        Board::empty()
    })
}

fn render_columns(state: &AppState) -> Response {
    let board = fetch_board(state);
    render(&ColumnsTemplate {
        columns: column_views(&board),
    })
}

fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template error");
            (StatusCode::INTERNAL_SERVER_ERROR, Html("Template error".to_string())).into_response()
        }
    }
}

fn unchanged(action: &str, err: ExpError) -> Response {
    tracing::warn!(action, error = %err, "Board mutation failed");
    StatusCode::NO_CONTENT.into_response()
}

/// A non-numeric id names no card.
fn bad_id(action: &str) -> Response {
    tracing::warn!(action, "Board mutation with a malformed experiment id");
    StatusCode::NO_CONTENT.into_response()
}
