use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: profile access, journal CRUD, commenting, and
/// reactions.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. Handlers receive a
/// validated `AuthUser` and route every ownership/visibility decision through
/// the central authorization table in `guard` — never inline.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile ---
        // GET /auth/me
        // Retrieves the currently authenticated user's own profile.
        // PUT /auth/me
        // Partial profile update; absent fields are left untouched.
        .route("/auth/me", get(handlers::get_me).put(handlers::update_me))
        // GET /auth/users/{id}
        // Public profile of any user by id.
        .route("/auth/users/{id}", get(handlers::get_user))
        // --- Journals ---
        // GET /journals
        // Lists all journals owned by the caller, private ones included.
        // POST /journals
        // Creates a journal owned by the caller. Ownership comes from the
        // session, never from the payload.
        .route(
            "/journals",
            get(handlers::get_my_journals).post(handlers::create_journal),
        )
        // GET/PUT/DELETE /journals/{id}
        // Read is gated by the visibility rule (with the 404 collapse for
        // private journals); update and delete are owner-only.
        .route(
            "/journals/{id}",
            get(handlers::get_journal)
                .put(handlers::update_journal)
                .delete(handlers::delete_journal),
        )
        // GET /journals/share/{id}
        // Resolves a journal for sharing. Same visibility rule as a plain read.
        .route("/journals/share/{id}", get(handlers::share_journal))
        // --- Commenting ---
        // POST /journals/{id}/comments
        // Posts a comment; allowed whenever the journal is readable by the caller.
        .route("/journals/{id}/comments", post(handlers::add_comment))
        // DELETE /journals/{id}/comments/{comment_id}
        // Two independent authorization paths: comment author, or journal owner.
        .route(
            "/journals/{id}/comments/{comment_id}",
            delete(handlers::delete_comment),
        )
        // --- Reactions ---
        // POST /journals/{id}/reactions
        // Idempotent add; the composite unique key on `reactions` makes a
        // duplicate a silent no-op.
        .route("/journals/{id}/reactions", post(handlers::add_reaction))
        // DELETE /journals/{id}/reactions/{type}
        // Removes the caller's own reaction of that type; absent is a no-op.
        .route(
            "/journals/{id}/reactions/{type}",
            delete(handlers::remove_reaction),
        )
}
