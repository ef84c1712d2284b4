use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical principal record stored in the `users` table. The email doubles as
/// the externally presented token subject, so it is unique and compared with
/// case-sensitive exact matching.
///
/// Deliberately not serializable: the password hash must never leave the process.
/// Responses use [`UserDto`] instead.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    // Unique identifier presented as the token subject.
    pub email: String,
    pub name: String,
    // Salted Argon2 hash of the password. The plaintext is never persisted or logged.
    pub password_hash: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    // Free-text home location, not a geocoded one.
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Journal
///
/// A journal entry row from the `journals` table. The owner (`user_id`) is immutable
/// after creation and, together with `is_public`, gates all access to the journal and
/// its dependent comments and reactions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Journal {
    pub id: Uuid,
    // FK to users.id (Owner). Never transferred.
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    // Controls read access for non-owners (enforced by the guard).
    pub is_public: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Location
///
/// Optional one-to-one geodata attached to a journal, stored in the `locations` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Location {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Comment
///
/// A comment row from the `comments` table, augmented with the author's display name
/// and avatar (a join operation). A comment belongs to exactly one journal and has
/// exactly one author.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Loaded via a JOIN with users in the repository query.
    #[sqlx(default)]
    pub author_name: Option<String>,
    #[sqlx(default)]
    pub author_avatar: Option<String>,
}

/// ReactionType
///
/// The closed set of reactions a user can leave on a journal. Serialized lowercase
/// on the wire ("like", "love", "wow", "globe") and stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReactionType {
    #[default]
    Like,
    Love,
    Wow,
    Globe,
}

impl ReactionType {
    /// The lowercase text form used for storage and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
            ReactionType::Wow => "wow",
            ReactionType::Globe => "globe",
        }
    }
}

/// Reaction
///
/// A (journal, user, type) triple. The database enforces at most one reaction per
/// triple with a unique constraint; inserts use `ON CONFLICT DO NOTHING` so the
/// operation stays idempotent under concurrent writers.
#[derive(Debug, Clone, Default)]
pub struct Reaction {
    pub id: Uuid,
    pub journal_id: Uuid,
    // The user who created the reaction; the only one allowed to remove it.
    pub user_id: Uuid,
    pub kind: ReactionType,
}

/// ReactionSummary
///
/// Aggregated reaction counts for a journal, grouped by type.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ReactionSummary {
    // Serialized as "type" for API compatibility; `type` is reserved in Rust.
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
}

// --- Request Payloads (Input Schemas) ---

/// AuthRequest
///
/// Input payload shared by registration (POST /auth/register) and login
/// (POST /auth/login). `name` is only consulted during registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// JournalRequest
///
/// Input payload for creating or replacing a journal entry. Image URLs arrive here
/// already uploaded elsewhere; this service only stores the references.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct JournalRequest {
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub location: Option<LocationDto>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// ReactionRequest
///
/// Input payload for adding a reaction to a journal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

/// UpdateProfileRequest
///
/// Partial update payload for the authenticated user's profile (PUT /auth/me).
///
/// Uses `Option<T>` for all fields so only provided fields are touched; the
/// repository maps each `None` to a COALESCE against the existing column value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// --- Output Schemas ---

/// UserDto
///
/// The public view of a principal. Everything in [`User`] except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar: user.avatar,
            bio: user.bio,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

/// AuthResponse
///
/// Output schema for successful registration and login: the public profile plus the
/// freshly issued token. The same token is also set as an HTTP-only cookie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

/// LocationDto
///
/// Wire form of a journal's location, used both for input (inside [`JournalRequest`])
/// and output (inside [`JournalDto`]).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LocationDto {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        LocationDto {
            name: location.name,
            latitude: location.latitude,
            longitude: location.longitude,
            country: location.country,
            city: location.city,
        }
    }
}

/// JournalDto
///
/// The enriched journal view returned by read endpoints: the row itself plus its
/// location, image URLs, comments, and aggregated reactions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct JournalDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub location: Option<LocationDto>,
    pub images: Vec<String>,
    pub comments: Vec<Comment>,
    pub reactions: Vec<ReactionSummary>,
}
