use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ideaboard_db::users::{NewUser, User};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::{
    auth::{Authenticated, UserInfo},
    shared_state::AppState,
    Error, Result,
};

#[derive(Debug, Serialize)]
struct RegisteredUser {
    user: User,
    /// Shown once. Only its hash is kept.
    api_key: String,
}

/// Open registration. Returns the new user and an API key for it.
#[instrument(skip_all)]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(Error::BadRequest("name and email are required"));
    }

    let user = state.db.transaction(|tables| tables.users.insert(payload))?;
    let key = state
        .api_keys
        .create_key(user.user_id, Some("registration".to_string()), None)?;

    event!(Level::INFO, user=%user.user_id, email=%user.email, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            user,
            api_key: key.key,
        }),
    ))
}

async fn me(
    State(state): State<AppState>,
    Authenticated(UserInfo { user_id }): Authenticated,
) -> Result<impl IntoResponse> {
    let user = state.db.read(|tables| tables.users.get(user_id).cloned())?;
    Ok((StatusCode::OK, Json(user)))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let users = state.db.read(|tables| {
        tables
            .users
            .search(&query.q, Some(user.user_id))
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    });

    Ok((StatusCode::OK, Json(users)))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", get(me))
        .route("/users/search", get(search))
}
