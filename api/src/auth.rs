use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use ideaboard_auth::extract_token::{extract_bearer_auth_value, invalid_message};
use ideaboard_db::object_id::UserId;
use tracing::{event, Level};

use crate::{shared_state::AppState, Error};

#[derive(Debug, Clone)]
pub struct UserInfo {
    pub user_id: UserId,
}

/// The user behind the API key in the `Authorization` header. Handlers that take this
/// reject unauthenticated requests with a 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub UserInfo);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_bearer_auth_value(&parts.headers)?.ok_or_else(invalid_message)?;

        let user_id = state.api_keys.authenticate(&key).map_err(|e| {
            event!(Level::DEBUG, error=%e, "rejected API key");
            Error::from(e).into_response()
        })?;

        Ok(Authenticated(UserInfo { user_id }))
    }
}
