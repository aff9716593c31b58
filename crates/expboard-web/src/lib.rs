//! Experiment board web server.
//!
//! Axum-based server for the JSON record API and the HTMX board page.

pub mod error;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};
use expboard_db::DbPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/experiments",
            get(routes::experiments::list_experiments).post(routes::experiments::create_experiment),
        )
        .route(
            "/experiments/{id}",
            get(routes::experiments::get_experiment)
                .put(routes::experiments::update_experiment)
                .delete(routes::experiments::delete_experiment),
        );

    // HTMX-driven HTML routes for the board
    let board_routes = Router::new()
        .route("/", get(routes::board_html::index))
        .route("/board/columns", get(routes::board_html::columns))
        .route("/board/experiments", post(routes::board_html::create_experiment))
        .route(
            "/board/experiments/{id}",
            axum::routing::delete(routes::board_html::delete_experiment),
        )
        .route(
            "/board/experiments/{id}/status",
            post(routes::board_html::update_status),
        );

    Router::new()
        .merge(api_routes)
        .merge(board_routes)
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until the process is stopped.
pub async fn run_server(db: Arc<DbPool>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(db);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
