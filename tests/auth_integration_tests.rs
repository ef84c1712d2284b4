use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, Method, Request, Uri, header, request::Parts},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;
use waypoint::{
    ApiError, AppState,
    auth::{AUTH_COOKIE, AuthUser, TokenCodec},
    config::AppConfig,
    models::{
        Comment, Journal, JournalRequest, Location, ReactionSummary, ReactionType,
        UpdateProfileRequest, User,
    },
    repository::Repository,
};

// --- Mock Repository for Auth Logic ---

// Only `find_user_by_email` matters for the extractor; everything else is a
// placeholder to satisfy the trait.
#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_to_return.clone())
    }
    async fn find_user_by_id(&self, _id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_to_return.clone())
    }
    async fn email_exists(&self, _email: &str) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn create_user(
        &self,
        _name: &str,
        _email: &str,
        _password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        Ok(User::default())
    }
    async fn update_user(
        &self,
        _id: Uuid,
        _req: UpdateProfileRequest,
    ) -> Result<Option<User>, sqlx::Error> {
        Ok(None)
    }
    async fn create_journal(
        &self,
        _user_id: Uuid,
        _req: &JournalRequest,
    ) -> Result<Journal, sqlx::Error> {
        Ok(Journal::default())
    }
    async fn get_journal(&self, _id: Uuid) -> Result<Option<Journal>, sqlx::Error> {
        Ok(None)
    }
    async fn list_public_journals(
        &self,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<Journal>, sqlx::Error> {
        Ok(vec![])
    }
    async fn list_user_journals(&self, _user_id: Uuid) -> Result<Vec<Journal>, sqlx::Error> {
        Ok(vec![])
    }
    async fn update_journal(
        &self,
        _id: Uuid,
        _req: &JournalRequest,
    ) -> Result<Option<Journal>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_journal(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn get_location(&self, _journal_id: Uuid) -> Result<Option<Location>, sqlx::Error> {
        Ok(None)
    }
    async fn get_images(&self, _journal_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        Ok(vec![])
    }
    async fn search_locations(&self, _query: &str) -> Result<Vec<Location>, sqlx::Error> {
        Ok(vec![])
    }
    async fn add_comment(
        &self,
        _journal_id: Uuid,
        _user_id: Uuid,
        _content: &str,
    ) -> Result<Comment, sqlx::Error> {
        Ok(Comment::default())
    }
    async fn get_comment(&self, _id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        Ok(None)
    }
    async fn get_comments(&self, _journal_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
        Ok(vec![])
    }
    async fn delete_comment(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn add_reaction(
        &self,
        _journal_id: Uuid,
        _user_id: Uuid,
        _kind: ReactionType,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn remove_reaction(
        &self,
        _journal_id: Uuid,
        _user_id: Uuid,
        _kind: ReactionType,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn get_reaction_summary(
        &self,
        _journal_id: Uuid,
    ) -> Result<Vec<ReactionSummary>, sqlx::Error> {
        Ok(vec![])
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_EMAIL: &str = "alice@example.com";

fn test_user(email: &str) -> User {
    User {
        id: Uuid::from_u128(1),
        email: email.to_string(),
        name: "Alice".to_string(),
        ..User::default()
    }
}

fn create_app_state(repo: MockAuthRepo) -> AppState {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

fn create_token(subject: &str, ttl_secs: i64) -> String {
    TokenCodec::new(TEST_JWT_SECRET, ttl_secs).issue(subject, Utc::now())
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
}

fn cookie(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{AUTH_COOKIE}={token}")).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_bearer_token() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(test_user(TEST_EMAIL)),
    });

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &create_token(TEST_EMAIL, 3600));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    assert_eq!(auth_user.unwrap().user.email, TEST_EMAIL);
}

#[tokio::test]
async fn test_auth_success_with_cookie() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(test_user(TEST_EMAIL)),
    });

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    cookie(&mut parts, &create_token(TEST_EMAIL, 3600));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    assert_eq!(auth_user.unwrap().user.email, TEST_EMAIL);
}

#[tokio::test]
async fn test_auth_header_takes_precedence_over_cookie() {
    // The header carries a token for one subject, the cookie for another; the
    // resolved identity must come from the header.
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(test_user("header@example.com")),
    });

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &create_token("header@example.com", 3600));
    cookie(&mut parts, &create_token("cookie@example.com", 3600));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(auth_user.user.email, "header@example.com");
}

#[tokio::test]
async fn test_auth_failure_with_missing_credential() {
    let app_state = create_app_state(MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NoCredential));
}

#[tokio::test]
async fn test_auth_failure_with_expired_token() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(test_user(TEST_EMAIL)),
    });

    // Issued far enough in the past that the TTL has elapsed.
    let expired = TokenCodec::new(TEST_JWT_SECRET, 3600)
        .issue(TEST_EMAIL, Utc::now() - Duration::seconds(7200));

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &expired);

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Expired));
}

#[tokio::test]
async fn test_auth_failure_with_tampered_signature() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(test_user(TEST_EMAIL)),
    });

    let foreign = TokenCodec::new("attacker-controlled-secret", 3600).issue(TEST_EMAIL, Utc::now());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &foreign);

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidSignature));
}

#[tokio::test]
async fn test_auth_failure_when_principal_deleted() {
    // A structurally valid, correctly signed, unexpired token whose subject no
    // longer maps to an account: the account was deleted after issuance.
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: None,
    });

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &create_token("ghost@example.com", 3600));

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PrincipalNotFound));
}
