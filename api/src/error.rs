use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ideaboard_auth::Error as AuthError;
use ideaboard_db::Error as StoreError;
use thiserror::Error;

use ideaboard_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Server error: {0}")]
    ServerError(#[from] hyper::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Bad request: {0}")]
    BadRequest(&'static str),
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Auth(AuthError::Store(e))
    }
}

impl Error {
    fn error_kind(&self) -> &'static str {
        match self {
            Error::ServerError(_) => "internal_server_error",
            Error::BadRequest(_) => "bad_request",
            Error::Auth(e) => match e {
                AuthError::Forbidden => "forbidden",
                AuthError::CannotRemoveOwner => "cannot_remove_owner",
                AuthError::InvalidApiKeyFormat | AuthError::Unauthenticated => "unauthenticated",
                AuthError::Store(e) => match e {
                    StoreError::NotFound(_) => "not_found",
                    StoreError::DuplicateMember => "duplicate_member",
                    StoreError::DuplicateLink => "duplicate_link",
                    StoreError::DuplicateEmail(_) => "duplicate_email",
                    StoreError::InvalidRole(_) => "invalid_role",
                    StoreError::SelfMembership => "self_membership",
                    StoreError::KindMismatch { .. } => "kind_mismatch",
                    StoreError::DuplicateTopic(_) => "duplicate_topic",
                    StoreError::InvalidUrl(_) => "invalid_url",
                    StoreError::MissingField(_) => "missing_field",
                },
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Auth(e) => match e {
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::CannotRemoveOwner => StatusCode::BAD_REQUEST,
                AuthError::InvalidApiKeyFormat | AuthError::Unauthenticated => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Store(e) => match e {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::DuplicateMember
                    | StoreError::DuplicateLink
                    | StoreError::DuplicateEmail(_)
                    | StoreError::DuplicateTopic(_) => StatusCode::CONFLICT,
                    StoreError::InvalidRole(_)
                    | StoreError::SelfMembership
                    | StoreError::KindMismatch { .. }
                    | StoreError::InvalidUrl(_)
                    | StoreError::MissingField(_) => StatusCode::BAD_REQUEST,
                },
            },
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        (
            self.status_code(),
            ErrorResponseData::new(self.error_kind(), self.to_string()),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        json.into_response_with_status(code)
    }
}
