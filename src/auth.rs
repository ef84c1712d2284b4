//! Stateless session tokens and request authentication.
//!
//! Tokens are self-contained HS256-signed JWTs; the server keeps no session
//! state and no revocation list. Logout therefore only clears the cookie — a
//! bearer copy of the same token stays valid until its expiry. The TTL is kept
//! short to make that an acceptable tradeoff.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::ApiError,
    models::User,
    repository::RepositoryState,
};

/// Name of the HTTP-only cookie carrying the session token.
pub const AUTH_COOKIE: &str = "waypoint-token";

/// Claims
///
/// The payload signed into every session token. The subject is the principal's
/// email — the stable external identifier — and validity is purely a function of
/// the signature and `exp`; nothing else is consulted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the principal's email address.
    pub sub: String,
    /// Issued At (iat): Unix timestamp of token creation.
    pub iat: usize,
    /// Expiration Time (exp): Unix timestamp after which the token must be rejected.
    pub exp: usize,
}

/// TokenCodec
///
/// Creates and validates session tokens. Construction is cheap (two key wraps),
/// so callers build one from the config wherever they need it. Both operations
/// take the current instant as an argument: validation is a pure function of
/// (token, signing key, now), which keeps it trivially safe under concurrency
/// and deterministic in tests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    /// issue
    ///
    /// Binds `subject` and `now`/`now + TTL` into a compact signed token.
    /// Symmetric signing is acceptable here because issuer and verifier are the
    /// same trust domain.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .expect("HS256 signing of serializable claims cannot fail")
    }

    /// validate
    ///
    /// Recomputes the signature and checks expiry against the supplied `now`.
    /// Returns the embedded subject only when the token decodes, the signature
    /// verifies, and `exp > now`.
    ///
    /// Expiry is checked here rather than delegated to the JWT library so that
    /// the current time stays an explicit input.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => ApiError::InvalidSignature,
                // Defense in depth: the library never reaches this arm with
                // validate_exp off, but map it faithfully anyway.
                ErrorKind::ExpiredSignature => ApiError::Expired,
                _ => ApiError::Malformed,
            }
        })?;

        if data.claims.exp as i64 <= now.timestamp() {
            return Err(ApiError::Expired);
        }

        Ok(data.claims.sub)
    }
}

/// resolve_token
///
/// Extracts the candidate token from an inbound request: the Authorization
/// header (case-sensitive `"Bearer "` prefix) first, then the named cookie.
/// Header takes precedence when both are present. Absence of both is
/// `NoCredential` — distinct from an invalid token, so callers can tell
/// "not logged in" from "bad token" if they want to.
pub fn resolve_token(headers: &HeaderMap, cookies: &CookieJar) -> Result<String, ApiError> {
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Ok(bearer.to_string());
    }

    if let Some(cookie) = cookies.get(AUTH_COOKIE) {
        return Ok(cookie.value().to_string());
    }

    Err(ApiError::NoCredential)
}

// --- Password Hashing ---

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// hash_password
///
/// Hashes a plaintext password with salted Argon2id for storage. The plaintext
/// is never persisted or logged.
pub fn hash_password(plain: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .expect("argon2 hashing with default params cannot fail")
        .to_string()
}

/// verify_password
///
/// Checks a plaintext password against a stored Argon2 hash using the scheme's
/// own verification (not string equality). Any failure — unparseable hash or
/// mismatch — is a plain `false`; callers map it to `InvalidCredentials`
/// without distinguishing the cause.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// --- Cookie Contract ---

/// auth_cookie
///
/// Builds the session cookie set alongside a successful login or registration:
/// HTTP-only, fixed path, max-age equal to the token TTL.
pub fn auth_cookie(token: String, ttl_secs: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(ttl_secs));
    cookie
}

/// clear_auth_cookie
///
/// Builds the logout cookie: same name, empty value, zero max-age. This only
/// clears the client's copy — the token itself remains valid until expiry.
pub fn clear_auth_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(0));
    cookie
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the full principal record,
/// produced by the extractor below. Handlers take this as an argument wherever
/// they need a verified caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. The full resolution chain runs here:
///
/// 1. Token Resolution: Authorization header first, then the auth cookie.
/// 2. Token Validation: signature and expiry checks via [`TokenCodec`].
/// 3. Principal Resolution: the validated subject is looked up in the record
///    store. A missing account (deleted after issuance) rejects with
///    `PrincipalNotFound` — an authentication failure, not a server error.
///
/// Rejection: every failure maps through [`ApiError`] to a generic 401.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the repository from the app state.
    RepositoryState: FromRef<S>,
    // Allows the extractor to pull the AppConfig (signing secret and TTL).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let cookies = CookieJar::from_headers(&parts.headers);
        let token = resolve_token(&parts.headers, &cookies)?;

        let codec = TokenCodec::from_config(&config);
        let subject = codec.validate(&token, Utc::now())?;

        let user = repo
            .find_user_by_email(&subject)
            .await?
            .ok_or(ApiError::PrincipalNotFound)?;

        Ok(AuthUser { user })
    }
}
