use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use ideaboard_db::{
    content::{NewBookmark, NewNote, NewReference, NewTopic},
    object_id::ResourceId,
};

use crate::{auth::Authenticated, shared_state::AppState, Result};

async fn list_notes(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let notes = state.engine.list_notes(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(notes)))
}

async fn add_note(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
    Json(payload): Json<NewNote>,
) -> Result<impl IntoResponse> {
    let note = state.engine.add_note(user.user_id, resource_id, payload)?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn list_references(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let references = state.engine.list_references(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(references)))
}

async fn add_reference(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
    Json(payload): Json<NewReference>,
) -> Result<impl IntoResponse> {
    let reference = state
        .engine
        .add_reference(user.user_id, resource_id, payload)?;
    Ok((StatusCode::CREATED, Json(reference)))
}

async fn list_topics(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let topics = state.engine.list_topics(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(topics)))
}

async fn add_topic(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
    Json(payload): Json<NewTopic>,
) -> Result<impl IntoResponse> {
    let topic = state.engine.add_topic(user.user_id, resource_id, payload)?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn list_bookmarks(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let bookmarks = state.engine.list_bookmarks(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(bookmarks)))
}

async fn add_bookmark(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
    Json(payload): Json<NewBookmark>,
) -> Result<impl IntoResponse> {
    let bookmark = state
        .engine
        .add_bookmark(user.user_id, resource_id, payload)?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route(
            "/resources/:resource_id/notes",
            get(list_notes).post(add_note),
        )
        .route(
            "/resources/:resource_id/references",
            get(list_references).post(add_reference),
        )
        .route(
            "/resources/:resource_id/topics",
            get(list_topics).post(add_topic),
        )
        .route(
            "/resources/:resource_id/bookmarks",
            get(list_bookmarks).post(add_bookmark),
        )
}
