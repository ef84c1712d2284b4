use crate::models::{
    Comment, Journal, JournalRequest, Location, ReactionSummary, ReactionType,
    UpdateProfileRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// handlers and the auth extractor to interact with the data layer without
/// knowing the specific implementation (Postgres, Mock, etc.).
///
/// Every method returns `Result`: an unexpected store failure must propagate to
/// the caller as an opaque infrastructure error, never be swallowed or masked
/// as an authorization outcome. No method retries internally.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Case-sensitive exact match on the stored email; used by login and by the
    // principal resolver after token validation.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error>;
    // Partial profile update via COALESCE; None when the user does not exist.
    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<Option<User>, sqlx::Error>;

    // --- Journals ---
    async fn create_journal(
        &self,
        user_id: Uuid,
        req: &JournalRequest,
    ) -> Result<Journal, sqlx::Error>;
    async fn get_journal(&self, id: Uuid) -> Result<Option<Journal>, sqlx::Error>;
    async fn list_public_journals(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Journal>, sqlx::Error>;
    async fn list_user_journals(&self, user_id: Uuid) -> Result<Vec<Journal>, sqlx::Error>;
    // Full replacement of the content fields; ownership is checked by the guard
    // before this is called, so no user_id filter here.
    async fn update_journal(
        &self,
        id: Uuid,
        req: &JournalRequest,
    ) -> Result<Option<Journal>, sqlx::Error>;
    async fn delete_journal(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Journal Attachments ---
    async fn get_location(&self, journal_id: Uuid) -> Result<Option<Location>, sqlx::Error>;
    async fn get_images(&self, journal_id: Uuid) -> Result<Vec<String>, sqlx::Error>;
    // Case-insensitive substring search across name, country, and city.
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, sqlx::Error>;

    // --- Comments ---
    async fn add_comment(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error>;
    async fn get_comments(&self, journal_id: Uuid) -> Result<Vec<Comment>, sqlx::Error>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Reactions ---
    // Idempotent: true if a row was inserted, false if the identical
    // (journal, user, type) triple already existed. Both are success.
    async fn add_reaction(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        kind: ReactionType,
    ) -> Result<bool, sqlx::Error>;
    // No-op when no matching reaction exists; true if a row was removed.
    async fn remove_reaction(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        kind: ReactionType,
    ) -> Result<bool, sqlx::Error>;
    async fn get_reaction_summary(
        &self,
        journal_id: Uuid,
    ) -> Result<Vec<ReactionSummary>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries use the runtime-checked sqlx API with positional binds throughout.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, avatar, bio, location, created_at";
const JOURNAL_COLUMNS: &str = "id, user_id, title, content, is_public, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, name, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    /// update_user
    ///
    /// Uses the PostgreSQL `COALESCE` function to handle `Option<T>` fields,
    /// only updating a column when the corresponding field is `Some`.
    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET name = COALESCE($2, name), \
                 avatar = COALESCE($3, avatar), \
                 bio = COALESCE($4, bio), \
                 location = COALESCE($5, location) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.avatar)
        .bind(req.bio)
        .bind(req.location)
        .fetch_optional(&self.pool)
        .await
    }

    // --- JOURNALS ---

    /// create_journal
    ///
    /// Inserts the journal plus its optional location and image references in
    /// one transaction, so a half-created journal is never visible to readers.
    async fn create_journal(
        &self,
        user_id: Uuid,
        req: &JournalRequest,
    ) -> Result<Journal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let journal = sqlx::query_as::<_, Journal>(&format!(
            "INSERT INTO journals (id, user_id, title, content, is_public, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {JOURNAL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.is_public)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(location) = &req.location {
            sqlx::query(
                "INSERT INTO locations (id, journal_id, name, latitude, longitude, country, city) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4())
            .bind(journal.id)
            .bind(&location.name)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(&location.country)
            .bind(&location.city)
            .execute(&mut *tx)
            .await?;
        }

        for url in &req.images {
            sqlx::query("INSERT INTO journal_images (id, journal_id, url) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(journal.id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(journal)
    }

    async fn get_journal(&self, id: Uuid) -> Result<Option<Journal>, sqlx::Error> {
        sqlx::query_as::<_, Journal>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// list_public_journals
    ///
    /// **Security**: strictly enforces `WHERE is_public = true` in the query.
    /// Private journals never appear in anonymous listings.
    async fn list_public_journals(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Journal>, sqlx::Error> {
        sqlx::query_as::<_, Journal>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE is_public = true \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_user_journals(&self, user_id: Uuid) -> Result<Vec<Journal>, sqlx::Error> {
        sqlx::query_as::<_, Journal>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// update_journal
    ///
    /// Replaces the content fields and re-writes the location and image set in
    /// one transaction. An empty image list removes all images.
    async fn update_journal(
        &self,
        id: Uuid,
        req: &JournalRequest,
    ) -> Result<Option<Journal>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let journal = sqlx::query_as::<_, Journal>(&format!(
            "UPDATE journals SET title = $2, content = $3, is_public = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {JOURNAL_COLUMNS}"
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.is_public)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(journal) = journal else {
            return Ok(None);
        };

        if let Some(location) = &req.location {
            sqlx::query("DELETE FROM locations WHERE journal_id = $1")
                .bind(journal.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO locations (id, journal_id, name, latitude, longitude, country, city) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4())
            .bind(journal.id)
            .bind(&location.name)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(&location.country)
            .bind(&location.city)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM journal_images WHERE journal_id = $1")
            .bind(journal.id)
            .execute(&mut *tx)
            .await?;
        for url in &req.images {
            sqlx::query("INSERT INTO journal_images (id, journal_id, url) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(journal.id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(journal))
    }

    /// delete_journal
    ///
    /// Dependent locations, images, comments, and reactions are removed by the
    /// schema's ON DELETE CASCADE constraints.
    async fn delete_journal(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- JOURNAL ATTACHMENTS ---

    async fn get_location(&self, journal_id: Uuid) -> Result<Option<Location>, sqlx::Error> {
        sqlx::query_as::<_, Location>(
            "SELECT id, journal_id, name, latitude, longitude, country, city \
             FROM locations WHERE journal_id = $1",
        )
        .bind(journal_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_images(&self, journal_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT url FROM journal_images WHERE journal_id = $1")
            .bind(journal_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, sqlx::Error> {
        // Case-insensitive substring match across the searchable fields.
        let pattern = format!("%{}%", query);
        sqlx::query_as::<_, Location>(
            "SELECT id, journal_id, name, latitude, longitude, country, city FROM locations \
             WHERE name ILIKE $1 OR country ILIKE $1 OR city ILIKE $1 \
             ORDER BY name ASC",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
    }

    // --- COMMENTS ---

    /// add_comment
    ///
    /// Uses a CTE to perform the insert and the author join in one query,
    /// returning the comment already enriched with the author's name and avatar.
    async fn add_comment(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "WITH inserted AS ( \
                 INSERT INTO comments (id, journal_id, user_id, content, created_at) \
                 VALUES ($1, $2, $3, $4, NOW()) \
                 RETURNING id, journal_id, user_id, content, created_at \
             ) \
             SELECT i.id, i.journal_id, i.user_id, i.content, i.created_at, \
                    u.name AS author_name, u.avatar AS author_avatar \
             FROM inserted i JOIN users u ON i.user_id = u.id",
        )
        .bind(Uuid::new_v4())
        .bind(journal_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.journal_id, c.user_id, c.content, c.created_at, \
                    u.name AS author_name, u.avatar AS author_avatar \
             FROM comments c JOIN users u ON c.user_id = u.id WHERE c.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_comments(&self, journal_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.journal_id, c.user_id, c.content, c.created_at, \
                    u.name AS author_name, u.avatar AS author_avatar \
             FROM comments c JOIN users u ON c.user_id = u.id \
             WHERE c.journal_id = $1 ORDER BY c.created_at ASC",
        )
        .bind(journal_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- REACTIONS ---

    /// add_reaction
    ///
    /// The unique constraint on (journal_id, user_id, type) plus
    /// `ON CONFLICT DO NOTHING` makes this **idempotent** and race-free under
    /// concurrent writers: at most one row per triple, no error on the duplicate.
    async fn add_reaction(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        kind: ReactionType,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO reactions (id, journal_id, user_id, type) VALUES ($1, $2, $3, $4) \
             ON CONFLICT DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(journal_id)
        .bind(user_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_reaction(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        kind: ReactionType,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM reactions WHERE journal_id = $1 AND user_id = $2 AND type = $3",
        )
        .bind(journal_id)
        .bind(user_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_reaction_summary(
        &self,
        journal_id: Uuid,
    ) -> Result<Vec<ReactionSummary>, sqlx::Error> {
        sqlx::query_as::<_, ReactionSummary>(
            "SELECT type AS kind, COUNT(*) AS count FROM reactions \
             WHERE journal_id = $1 GROUP BY type",
        )
        .bind(journal_id)
        .fetch_all(&self.pool)
        .await
    }
}
