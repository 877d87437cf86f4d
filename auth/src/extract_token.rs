use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

pub fn invalid_message() -> Response {
    // Intentionally vague error message
    (StatusCode::UNAUTHORIZED, "401 Unauthorized").into_response()
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
/// A missing header is `Ok(None)`. A header in any other shape is rejected.
pub fn extract_bearer_auth_value(headers: &HeaderMap) -> Result<Option<String>, Response> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let (auth_type, token) = value
                .to_str()
                .map_err(|_| invalid_message())?
                .split_once(' ')
                .ok_or_else(invalid_message)?;

            if auth_type != "Bearer" || token.is_empty() {
                return Err(invalid_message());
            }

            Ok(Some(token.trim().to_string()))
        }
    }
}
