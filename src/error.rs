use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// ApiError
///
/// The single error taxonomy for the application. Every failure an operation can
/// surface is one of these variants, and all of them are terminal for the current
/// request — nothing is retried internally.
///
/// The variants deliberately carry more distinction than the HTTP layer exposes:
/// `Malformed`, `InvalidSignature` and `Expired` all collapse to the same generic
/// 401 body so that a client (or attacker) cannot tell which check rejected the
/// token. The internal distinction exists only for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Login failed. Covers both "no such account" and "wrong password" —
    /// the two must be indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration attempted with an email that already has an account.
    #[error("email is already registered")]
    DuplicateIdentity,

    /// Token failed structural decoding.
    #[error("malformed token")]
    Malformed,

    /// Token signature did not verify against the signing key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token expiry instant is in the past.
    #[error("token expired")]
    Expired,

    /// Neither the Authorization header nor the auth cookie carried a token.
    #[error("no credential supplied")]
    NoCredential,

    /// The token validated but its subject no longer maps to an account.
    /// A legitimate consequence of account deletion, so an auth failure
    /// rather than a server error.
    #[error("principal not found")]
    PrincipalNotFound,

    /// The authenticated principal may not perform the requested action.
    #[error("forbidden")]
    Forbidden,

    /// The addressed resource does not exist.
    #[error("not found")]
    NotFound,

    /// Unexpected record-store failure. Propagated as an opaque 500, never
    /// masked as an authorization outcome.
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // The whole token/credential family maps to one generic 401. The client
            // reaction is the same in every case: reauthenticate.
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid email or password"),
            ApiError::Malformed
            | ApiError::InvalidSignature
            | ApiError::Expired
            | ApiError::NoCredential
            | ApiError::PrincipalNotFound => (StatusCode::UNAUTHORIZED, "authentication required"),

            ApiError::DuplicateIdentity => (StatusCode::CONFLICT, "email is already registered"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found"),

            ApiError::Database(e) => {
                // Log the underlying failure for diagnostics but keep the body opaque.
                tracing::error!("database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
