use crate::{
    AppState,
    auth::{self, AuthUser, TokenCodec},
    error::ApiError,
    guard::{self, Action, Resource},
    models::{
        AuthRequest, AuthResponse, Comment, CreateCommentRequest, Journal, JournalDto,
        JournalRequest, LocationDto, Reaction, ReactionRequest, ReactionSummary, ReactionType,
        UpdateProfileRequest, UserDto,
    },
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PageFilter
///
/// Query parameters for the public journal listing (GET /journals/public).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageFilter {
    /// Zero-based page index. Defaults to 0.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100. Defaults to 20.
    pub size: Option<i64>,
}

/// LocationQuery
///
/// Query parameter for location search (GET /locations/search).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LocationQuery {
    /// Substring matched case-insensitively against name, country, and city.
    pub q: String,
}

// --- Helpers ---

/// Assembles the enriched journal view: row + location + images + comments +
/// reaction summary. Pure read composition, no authorization here — callers
/// must have passed the guard already.
async fn hydrate_journal(repo: &RepositoryState, journal: Journal) -> Result<JournalDto, ApiError> {
    let location = repo.get_location(journal.id).await?.map(LocationDto::from);
    let images = repo.get_images(journal.id).await?;
    let comments = repo.get_comments(journal.id).await?;
    let reactions = repo.get_reaction_summary(journal.id).await?;

    Ok(JournalDto {
        id: journal.id,
        user_id: journal.user_id,
        title: journal.title,
        content: journal.content,
        is_public: journal.is_public,
        created_at: journal.created_at,
        updated_at: journal.updated_at,
        location,
        images,
        comments,
        reactions,
    })
}

// --- Auth Handlers ---

/// register
///
/// [Public Route] Creates a new account, hashes the password (the plaintext is
/// never persisted or logged), and signs the user in immediately: a token is
/// issued and set as the HTTP-only auth cookie.
///
/// Rejects with 409 when the email already has an account.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<AuthRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if state.repo.email_exists(&payload.email).await? {
        return Err(ApiError::DuplicateIdentity);
    }

    let password_hash = auth::hash_password(&payload.password);
    let name = payload.name.unwrap_or_default();
    let user = state
        .repo
        .create_user(&name, &payload.email, &password_hash)
        .await?;

    let codec = TokenCodec::from_config(&state.config);
    let token = codec.issue(&user.email, Utc::now());
    let jar = jar.add(auth::auth_cookie(token.clone(), state.config.token_ttl_secs));

    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// login
///
/// [Public Route] Verifies an email/password pair and issues a fresh token.
///
/// *Security*: an unknown email and a wrong password produce the exact same
/// `InvalidCredentials` rejection — the caller can never tell which failed.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<AuthRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let codec = TokenCodec::from_config(&state.config);
    let token = codec.issue(&user.email, Utc::now());
    let jar = jar.add(auth::auth_cookie(token.clone(), state.config.token_ttl_secs));

    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// logout
///
/// [Public Route] Clears the auth cookie (same name, empty value, zero max-age).
///
/// Note the deliberate asymmetry: only the cookie is cleared. A client that
/// kept a bearer copy of the token can keep using it until expiry — there is
/// no server-side revocation.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Cookie cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.add(auth::clear_auth_cookie()), StatusCode::NO_CONTENT)
}

/// get_me
///
/// [Authenticated Route] Returns the authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses((status = 200, description = "Profile", body = UserDto))
)]
pub async fn get_me(AuthUser { user }: AuthUser) -> Json<UserDto> {
    Json(user.into())
}

/// update_me
///
/// [Authenticated Route] Partial update of the authenticated user's profile.
/// Only fields present in the payload are touched (COALESCE in the repository).
/// Email and password are not updatable through this endpoint.
#[utoipa::path(
    put,
    path = "/auth/me",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Updated", body = UserDto))
)]
pub async fn update_me(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let updated = state
        .repo
        .update_user(user.id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated.into()))
}

/// get_user
///
/// [Authenticated Route] Public profile of any user by id.
#[utoipa::path(
    get,
    path = "/auth/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "Profile", body = UserDto))
)]
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .repo
        .find_user_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

// --- Journal Handlers ---

/// get_public_journals
///
/// [Public Route] Paged listing of public journals, newest first.
///
/// *Security*: the repository query enforces `is_public = true` unconditionally,
/// so private journals can never leak into an anonymous listing.
#[utoipa::path(
    get,
    path = "/journals/public",
    params(PageFilter),
    responses((status = 200, description = "Public journals", body = [JournalDto]))
)]
pub async fn get_public_journals(
    State(state): State<AppState>,
    Query(filter): Query<PageFilter>,
) -> Result<Json<Vec<JournalDto>>, ApiError> {
    let size = filter.size.unwrap_or(20).clamp(1, 100);
    let page = filter.page.unwrap_or(0).max(0);

    let journals = state
        .repo
        .list_public_journals(size, page * size)
        .await?;

    let mut dtos = Vec::with_capacity(journals.len());
    for journal in journals {
        dtos.push(hydrate_journal(&state.repo, journal).await?);
    }
    Ok(Json(dtos))
}

/// get_my_journals
///
/// [Authenticated Route] Lists all journals owned by the requesting user,
/// private ones included.
#[utoipa::path(
    get,
    path = "/journals",
    responses((status = 200, description = "My journals", body = [JournalDto]))
)]
pub async fn get_my_journals(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<JournalDto>>, ApiError> {
    let journals = state.repo.list_user_journals(user.id).await?;

    let mut dtos = Vec::with_capacity(journals.len());
    for journal in journals {
        dtos.push(hydrate_journal(&state.repo, journal).await?);
    }
    Ok(Json(dtos))
}

/// get_journal
///
/// [Authenticated Route] Single journal by id, gated by the read rule
/// (public, or owned by the caller).
///
/// *Security*: a read denial is collapsed to 404 so that an unauthorized
/// caller cannot distinguish a private journal from a nonexistent one.
#[utoipa::path(
    get,
    path = "/journals/{id}",
    params(("id" = Uuid, Path, description = "Journal ID")),
    responses(
        (status = 200, description = "Found", body = JournalDto),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn get_journal(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalDto>, ApiError> {
    let journal = state.repo.get_journal(id).await?.ok_or(ApiError::NotFound)?;

    guard::authorize(&user, Resource::Journal(&journal), Action::Read)
        .map_err(|_| ApiError::NotFound)?;

    Ok(Json(hydrate_journal(&state.repo, journal).await?))
}

/// share_journal
///
/// [Authenticated Route] Resolves a journal for sharing. Same visibility rule
/// (and the same 404 collapse) as a plain read.
#[utoipa::path(
    get,
    path = "/journals/share/{id}",
    params(("id" = Uuid, Path, description = "Journal ID")),
    responses((status = 200, description = "Found", body = JournalDto))
)]
pub async fn share_journal(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalDto>, ApiError> {
    let journal = state.repo.get_journal(id).await?.ok_or(ApiError::NotFound)?;

    guard::authorize(&user, Resource::Journal(&journal), Action::Read)
        .map_err(|_| ApiError::NotFound)?;

    Ok(Json(hydrate_journal(&state.repo, journal).await?))
}

/// create_journal
///
/// [Authenticated Route] Creates a journal entry owned by the caller. The owner
/// is taken from the authenticated session, never from the payload, and is
/// immutable afterwards.
#[utoipa::path(
    post,
    path = "/journals",
    request_body = JournalRequest,
    responses((status = 200, description = "Created", body = JournalDto))
)]
pub async fn create_journal(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<JournalRequest>,
) -> Result<Json<JournalDto>, ApiError> {
    let journal = state.repo.create_journal(user.id, &payload).await?;
    Ok(Json(hydrate_journal(&state.repo, journal).await?))
}

/// update_journal
///
/// [Authenticated Route] Replaces a journal's content fields, location, and
/// image set. Owner only.
#[utoipa::path(
    put,
    path = "/journals/{id}",
    params(("id" = Uuid, Path, description = "Journal ID")),
    request_body = JournalRequest,
    responses(
        (status = 200, description = "Updated", body = JournalDto),
        (status = 403, description = "Not owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_journal(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JournalRequest>,
) -> Result<Json<JournalDto>, ApiError> {
    let journal = state.repo.get_journal(id).await?.ok_or(ApiError::NotFound)?;

    guard::authorize(&user, Resource::Journal(&journal), Action::Update)?;

    let updated = state
        .repo
        .update_journal(id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(hydrate_journal(&state.repo, updated).await?))
}

/// delete_journal
///
/// [Authenticated Route] Deletes a journal and everything hanging off it.
/// Owner only.
#[utoipa::path(
    delete,
    path = "/journals/{id}",
    params(("id" = Uuid, Path, description = "Journal ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_journal(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let journal = state.repo.get_journal(id).await?.ok_or(ApiError::NotFound)?;

    guard::authorize(&user, Resource::Journal(&journal), Action::Delete)?;

    state.repo.delete_journal(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Comment Handlers ---

/// add_comment
///
/// [Authenticated Route] Posts a comment on a journal. Allowed whenever the
/// journal is readable by the caller; a denial is collapsed to 404 like any
/// other read of a private journal.
#[utoipa::path(
    post,
    path = "/journals/{id}/comments",
    params(("id" = Uuid, Path, description = "Journal ID")),
    request_body = CreateCommentRequest,
    responses((status = 200, description = "Comment added", body = Comment))
)]
pub async fn add_comment(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(journal_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let journal = state
        .repo
        .get_journal(journal_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Placeholder comment for the create check; only the parent journal matters.
    let draft = Comment::default();
    guard::authorize(
        &user,
        Resource::Comment {
            comment: &draft,
            journal: &journal,
        },
        Action::Create,
    )
    .map_err(|_| ApiError::NotFound)?;

    let comment = state
        .repo
        .add_comment(journal.id, user.id, &payload.content)
        .await?;
    Ok(Json(comment))
}

/// delete_comment
///
/// [Authenticated Route] Deletes a comment. Two independent authorization
/// paths: the comment's author, or the owner of the journal it sits on.
#[utoipa::path(
    delete,
    path = "/journals/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Journal ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Neither author nor journal owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_comment(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path((journal_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // The comment must belong to the journal named in the path.
    if comment.journal_id != journal_id {
        return Err(ApiError::NotFound);
    }

    let journal = state
        .repo
        .get_journal(journal_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    guard::authorize(
        &user,
        Resource::Comment {
            comment: &comment,
            journal: &journal,
        },
        Action::Delete,
    )?;

    state.repo.delete_comment(comment.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Reaction Handlers ---

/// add_reaction
///
/// [Authenticated Route] Adds a reaction to a journal and returns the updated
/// summary.
///
/// *Idempotency*: if the identical (journal, user, type) reaction already
/// exists, no new record is created and the call still succeeds.
#[utoipa::path(
    post,
    path = "/journals/{id}/reactions",
    params(("id" = Uuid, Path, description = "Journal ID")),
    request_body = ReactionRequest,
    responses((status = 200, description = "Updated summary", body = [ReactionSummary]))
)]
pub async fn add_reaction(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(journal_id): Path<Uuid>,
    Json(payload): Json<ReactionRequest>,
) -> Result<Json<Vec<ReactionSummary>>, ApiError> {
    let journal = state
        .repo
        .get_journal(journal_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let draft = Reaction {
        journal_id: journal.id,
        user_id: user.id,
        kind: payload.kind,
        ..Reaction::default()
    };
    guard::authorize(
        &user,
        Resource::Reaction {
            reaction: &draft,
            journal: &journal,
        },
        Action::Create,
    )
    .map_err(|_| ApiError::NotFound)?;

    // The insert is ON CONFLICT DO NOTHING; a duplicate is still success.
    state
        .repo
        .add_reaction(journal.id, user.id, payload.kind)
        .await?;

    Ok(Json(state.repo.get_reaction_summary(journal.id).await?))
}

/// remove_reaction
///
/// [Authenticated Route] Removes the caller's own reaction of the given type
/// and returns the updated summary. Removing a reaction that does not exist is
/// a no-op, not an error.
#[utoipa::path(
    delete,
    path = "/journals/{id}/reactions/{type}",
    params(
        ("id" = Uuid, Path, description = "Journal ID"),
        ("type" = ReactionType, Path, description = "Reaction type")
    ),
    responses((status = 200, description = "Updated summary", body = [ReactionSummary]))
)]
pub async fn remove_reaction(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path((journal_id, kind)): Path<(Uuid, ReactionType)>,
) -> Result<Json<Vec<ReactionSummary>>, ApiError> {
    let journal = state
        .repo
        .get_journal(journal_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Deletion is keyed by the caller's own id, so the target reaction is
    // theirs by construction; the check still runs through the guard table.
    let target = Reaction {
        journal_id: journal.id,
        user_id: user.id,
        kind,
        ..Reaction::default()
    };
    guard::authorize(
        &user,
        Resource::Reaction {
            reaction: &target,
            journal: &journal,
        },
        Action::Delete,
    )?;

    state.repo.remove_reaction(journal.id, user.id, kind).await?;

    Ok(Json(state.repo.get_reaction_summary(journal.id).await?))
}

// --- Location Handlers ---

/// search_locations
///
/// [Public Route] Case-insensitive substring search over stored journal
/// locations (name, country, city).
#[utoipa::path(
    get,
    path = "/locations/search",
    params(LocationQuery),
    responses((status = 200, description = "Matches", body = [LocationDto]))
)]
pub async fn search_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Vec<LocationDto>>, ApiError> {
    let locations = state.repo.search_locations(&query.q).await?;
    Ok(Json(locations.into_iter().map(LocationDto::from).collect()))
}
