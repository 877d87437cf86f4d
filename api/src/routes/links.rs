use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
    Json, Router,
};
use ideaboard_db::object_id::ResourceId;

use crate::{auth::Authenticated, shared_state::AppState, Result};

async fn link(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((idea_id, project_id)): Path<(ResourceId, ResourceId)>,
) -> Result<impl IntoResponse> {
    let link = state
        .engine
        .link_resources(user.user_id, idea_id, project_id)?;
    Ok((StatusCode::OK, Json(link)))
}

async fn unlink(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((idea_id, project_id)): Path<(ResourceId, ResourceId)>,
) -> Result<impl IntoResponse> {
    let link = state
        .engine
        .unlink_resources(user.user_id, idea_id, project_id)?;
    Ok((StatusCode::OK, Json(link)))
}

pub fn configure() -> Router<AppState> {
    Router::new().route(
        "/ideas/:idea_id/projects/:project_id",
        put(link).delete(unlink),
    )
}
