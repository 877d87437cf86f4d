use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use ideaboard_db::{
    memberships::Membership,
    object_id::{ResourceId, UserId},
    Role, Tables,
};
use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::{auth::Authenticated, shared_state::AppState, Error, Result};

/// A membership with enough of the user attached to show it in a member list.
#[derive(Debug, Serialize)]
struct MemberOutput {
    #[serde(flatten)]
    membership: Membership,
    name: String,
    email: String,
}

fn with_user(tables: &Tables, membership: Membership) -> MemberOutput {
    let (name, email) = match tables.users.get(membership.user_id) {
        Ok(user) => (user.name.clone(), user.email.clone()),
        Err(_) => {
            event!(
                Level::WARN,
                resource=%membership.resource_id,
                user=%membership.user_id,
                "membership refers to a missing user"
            );
            (String::new(), String::new())
        }
    };

    MemberOutput {
        membership,
        name,
        email,
    }
}

#[derive(Debug, Deserialize)]
struct NewMemberInput {
    user_id: Option<UserId>,
    email: Option<String>,
    role: String,
}

#[derive(Debug, Deserialize)]
struct RoleInput {
    role: String,
}

async fn list_members(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse> {
    let members = state.engine.list_members(user.user_id, resource_id)?;
    let members = state.db.read(|tables| {
        members
            .into_iter()
            .map(|m| with_user(tables, m))
            .collect::<Vec<_>>()
    });

    Ok((StatusCode::OK, Json(members)))
}

async fn add_member(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(resource_id): Path<ResourceId>,
    Json(payload): Json<NewMemberInput>,
) -> Result<impl IntoResponse> {
    let role = payload.role.parse::<Role>()?;
    let target = match (payload.user_id, payload.email) {
        (Some(user_id), _) => user_id,
        (None, Some(email)) => {
            // Only member managers may find out which emails are registered.
            if !state
                .engine
                .permissions_for(user.user_id, resource_id)
                .can_manage_members
            {
                return Err(Error::Auth(ideaboard_auth::Error::Forbidden));
            }
            state
                .db
                .read(|tables| tables.users.find_by_email(&email).map(|u| u.user_id))?
        }
        (None, None) => return Err(Error::BadRequest("user_id or email is required")),
    };

    let membership = state
        .engine
        .add_member(user.user_id, resource_id, target, role)?;
    let output = state.db.read(|tables| with_user(tables, membership));
    Ok((StatusCode::CREATED, Json(output)))
}

async fn get_member(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((resource_id, member_id)): Path<(ResourceId, UserId)>,
) -> Result<impl IntoResponse> {
    let membership = state
        .engine
        .get_member(user.user_id, resource_id, member_id)?;
    let output = state.db.read(|tables| with_user(tables, membership));
    Ok((StatusCode::OK, Json(output)))
}

async fn change_role(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((resource_id, member_id)): Path<(ResourceId, UserId)>,
    Json(payload): Json<RoleInput>,
) -> Result<impl IntoResponse> {
    let role = payload.role.parse::<Role>()?;
    let membership = state
        .engine
        .change_role(user.user_id, resource_id, member_id, role)?;
    let output = state.db.read(|tables| with_user(tables, membership));
    Ok((StatusCode::OK, Json(output)))
}

async fn remove_member(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((resource_id, member_id)): Path<(ResourceId, UserId)>,
) -> Result<impl IntoResponse> {
    let removed = state
        .engine
        .remove_member(user.user_id, resource_id, member_id)?;
    Ok((StatusCode::OK, Json(removed)))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route(
            "/resources/:resource_id/members",
            get(list_members).post(add_member),
        )
        .route(
            "/resources/:resource_id/members/:user_id",
            get(get_member).put(change_role).delete(remove_member),
        )
}

#[cfg(test)]
mod tests {
    use ideaboard_db::{
        object_id::UserId, resources::NewResource, users::NewUser, ResourceKind, Role, Tables,
    };

    use super::with_user;

    #[test]
    fn member_output_with_and_without_user() {
        let mut tables = Tables::default();
        let owner = tables
            .users
            .insert(NewUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .unwrap();
        let member = tables
            .users
            .insert(NewUser {
                name: "Bo".to_string(),
                email: "bo@example.com".to_string(),
            })
            .unwrap();
        let idea = tables.resources.insert(NewResource {
            kind: ResourceKind::Idea,
            owner_id: owner.user_id,
            title: "Idea".to_string(),
            description: String::new(),
        });

        let known = tables
            .memberships
            .add(&idea, member.user_id, Role::Viewer, owner.user_id)
            .unwrap();
        let output = with_user(&tables, known);
        assert_eq!(output.name, "Bo");
        assert_eq!(output.email, "bo@example.com");

        // The table layer doesn't check users, so a dangling row can be built by hand.
        let dangling = tables
            .memberships
            .add(&idea, UserId::new(), Role::Viewer, owner.user_id)
            .unwrap();
        let output = with_user(&tables, dangling);
        assert_eq!(output.name, "");
        assert_eq!(output.email, "");
    }
}
