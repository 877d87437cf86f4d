use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use ideaboard_auth::Access;
use ideaboard_db::{object_id::ResourceId, resources::ResourceUpdate, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    auth::{Authenticated, UserInfo},
    shared_state::AppState,
    Error, Result,
};

#[derive(Debug, Deserialize)]
struct ResourceInput {
    title: String,
    #[serde(default)]
    description: String,
}

async fn create_resource(
    state: AppState,
    user: UserInfo,
    kind: ResourceKind,
    payload: ResourceInput,
) -> Result<impl IntoResponse> {
    if payload.title.trim().is_empty() {
        return Err(Error::BadRequest("title is required"));
    }

    let created =
        state
            .engine
            .create_resource(user.user_id, kind, payload.title, payload.description)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn new_idea(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(payload): Json<ResourceInput>,
) -> Result<impl IntoResponse> {
    create_resource(state, user, ResourceKind::Idea, payload).await
}

async fn new_project(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(payload): Json<ResourceInput>,
) -> Result<impl IntoResponse> {
    create_resource(state, user, ResourceKind::Project, payload).await
}

async fn list_ideas(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> impl IntoResponse {
    let ideas = state
        .engine
        .accessible_resources(user.user_id, Some(ResourceKind::Idea));
    (StatusCode::OK, Json(ideas))
}

async fn list_projects(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> impl IntoResponse {
    let projects = state
        .engine
        .accessible_resources(user.user_id, Some(ResourceKind::Project));
    (StatusCode::OK, Json(projects))
}

async fn get_resource(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let resource = state.engine.get_resource(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(resource)))
}

async fn write_resource(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
    Json(payload): Json<ResourceUpdate>,
) -> Result<impl IntoResponse> {
    if matches!(&payload.title, Some(title) if title.trim().is_empty()) {
        return Err(Error::BadRequest("title can not be empty"));
    }

    let resource = state
        .engine
        .update_resource(user.user_id, resource_id, payload)?;
    Ok((StatusCode::OK, Json(resource)))
}

async fn delete_resource(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let deleted = state.engine.delete_resource(user.user_id, resource_id)?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "id": deleted.resource.resource_id,
            "memberships_removed": deleted.memberships.len(),
            "links_removed": deleted.links.len(),
        })),
    ))
}

#[derive(Serialize)]
struct PermissionsOutput {
    access: Access,
    #[serde(flatten)]
    permissions: ideaboard_auth::PermissionSet,
}

/// Never fails. A resource the user can't see looks the same as one that doesn't exist:
/// every permission is false.
async fn get_permissions(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> impl IntoResponse {
    let access = state.engine.access_for(user.user_id, resource_id);
    (
        StatusCode::OK,
        Json(PermissionsOutput {
            access,
            permissions: access.permissions(),
        }),
    )
}

async fn list_linked_resources(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let linked = state.engine.linked_resources(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(linked)))
}

async fn list_activities(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let activities = state.engine.activities(user.user_id, resource_id)?;
    Ok((StatusCode::OK, Json(activities)))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/ideas", get(list_ideas).post(new_idea))
        .route("/projects", get(list_projects).post(new_project))
        .route(
            "/resources/:resource_id",
            get(get_resource).put(write_resource).delete(delete_resource),
        )
        .route("/resources/:resource_id/permissions", get(get_permissions))
        .route("/resources/:resource_id/links", get(list_linked_resources))
        .route("/resources/:resource_id/activities", get(list_activities))
}
