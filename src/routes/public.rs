use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// These cover the identity gateway (register/login/logout), the anonymous
/// read surface, and the health probe.
///
/// Security Mandate:
/// The journal listing here must enforce `is_public=true` at the Repository
/// level — a private journal must never appear in an anonymous response.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register
        // Creates a new account and signs the user in immediately: the response
        // carries the token and sets the HTTP-only auth cookie.
        .route("/auth/register", post(handlers::register))
        // POST /auth/login
        // Verifies credentials and issues a fresh token. Unknown email and wrong
        // password are indistinguishable in the rejection.
        .route("/auth/login", post(handlers::login))
        // POST /auth/logout
        // Clears the auth cookie. Deliberately unauthenticated: clearing a cookie
        // must work even when the session already expired.
        .route("/auth/logout", post(handlers::logout))
        // GET /journals/public?page=...&size=...
        // Paged listing of public journals, newest first.
        .route("/journals/public", get(handlers::get_public_journals))
        // GET /locations/search?q=...
        // Case-insensitive substring search over stored journal locations.
        .route("/locations/search", get(handlers::search_locations))
}
