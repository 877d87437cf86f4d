use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::shared_state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    /// If the store can be read
    store: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // Hangs rather than failing if a writer never releases the lock.
    let store = state.db.read(|_| true);

    (
        StatusCode::OK,
        Json(HealthResponse {
            healthy: store,
            store,
        }),
    )
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
