use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use waypoint::{
    ApiError,
    auth::{self, AUTH_COOKIE, TokenCodec},
};

// --- Helpers ---

const TEST_SECRET: &str = "test-secret-value-1234567890";
const TEST_TTL: i64 = 3600;

fn codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, TEST_TTL)
}

fn jar_with_cookie(value: &str) -> (HeaderMap, CookieJar) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{AUTH_COOKIE}={value}")).unwrap(),
    );
    let jar = CookieJar::from_headers(&headers);
    (headers, jar)
}

// --- Token Codec Tests ---

#[test]
fn test_issue_then_validate_returns_subject() {
    let codec = codec();
    let now = Utc::now();

    let token = codec.issue("alice@example.com", now);
    let subject = codec.validate(&token, now).unwrap();

    assert_eq!(subject, "alice@example.com");
}

#[test]
fn test_token_valid_just_before_expiry() {
    let codec = codec();
    let issued = Utc::now();

    let token = codec.issue("alice@example.com", issued);
    let almost_expired = issued + Duration::seconds(TEST_TTL - 1);

    assert!(codec.validate(&token, almost_expired).is_ok());
}

#[test]
fn test_token_rejected_at_exact_expiry_instant() {
    let codec = codec();
    let issued = Utc::now();

    let token = codec.issue("alice@example.com", issued);
    // exp is issued + TTL; a token is invalid from that instant on, not after it.
    let at_expiry = issued + Duration::seconds(TEST_TTL);

    let err = codec.validate(&token, at_expiry).unwrap_err();
    assert!(matches!(err, ApiError::Expired));
}

#[test]
fn test_token_rejected_after_expiry() {
    let codec = codec();
    let issued = Utc::now();

    let token = codec.issue("alice@example.com", issued);
    let later = issued + Duration::seconds(TEST_TTL + 60);

    let err = codec.validate(&token, later).unwrap_err();
    assert!(matches!(err, ApiError::Expired));
}

#[test]
fn test_token_signed_with_other_key_rejected() {
    let now = Utc::now();
    let token = TokenCodec::new("a-completely-different-secret", TEST_TTL).issue("eve@example.com", now);

    let err = codec().validate(&token, now).unwrap_err();
    assert!(matches!(err, ApiError::InvalidSignature));
}

#[test]
fn test_garbage_token_is_malformed() {
    let err = codec().validate("not.a.jwt", Utc::now()).unwrap_err();
    assert!(matches!(err, ApiError::Malformed));

    let err = codec().validate("", Utc::now()).unwrap_err();
    assert!(matches!(err, ApiError::Malformed));
}

#[test]
fn test_expired_check_is_pure_in_now() {
    // The same token string must flip from valid to expired purely as a
    // function of the `now` argument.
    let codec = codec();
    let issued = Utc::now();
    let token = codec.issue("alice@example.com", issued);

    assert!(codec.validate(&token, issued).is_ok());
    assert!(codec.validate(&token, issued + Duration::days(2)).is_err());
    // And back: validation has no internal state.
    assert!(codec.validate(&token, issued).is_ok());
}

// --- Token Resolver Tests ---

#[test]
fn test_resolver_prefers_authorization_header() {
    let (mut headers, jar) = jar_with_cookie("cookie-token");
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer header-token"),
    );

    let token = auth::resolve_token(&headers, &jar).unwrap();
    assert_eq!(token, "header-token");
}

#[test]
fn test_resolver_falls_back_to_cookie() {
    let (headers, jar) = jar_with_cookie("cookie-token");

    let token = auth::resolve_token(&headers, &jar).unwrap();
    assert_eq!(token, "cookie-token");
}

#[test]
fn test_resolver_ignores_non_bearer_scheme() {
    // A Basic credential in the header must not shadow the cookie.
    let (mut headers, jar) = jar_with_cookie("cookie-token");
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let token = auth::resolve_token(&headers, &jar).unwrap();
    assert_eq!(token, "cookie-token");
}

#[test]
fn test_resolver_without_any_credential() {
    let headers = HeaderMap::new();
    let jar = CookieJar::from_headers(&headers);

    let err = auth::resolve_token(&headers, &jar).unwrap_err();
    assert!(matches!(err, ApiError::NoCredential));
}

#[test]
fn test_resolver_bearer_prefix_is_case_sensitive() {
    let (mut headers, jar) = jar_with_cookie("cookie-token");
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("bearer header-token"),
    );

    // Lowercase scheme does not match; the cookie wins.
    let token = auth::resolve_token(&headers, &jar).unwrap();
    assert_eq!(token, "cookie-token");
}

// --- Cookie Contract Tests ---

#[test]
fn test_auth_cookie_contract() {
    let cookie = auth::auth_cookie("some-token".to_string(), TEST_TTL);

    assert_eq!(cookie.name(), AUTH_COOKIE);
    assert_eq!(cookie.value(), "some-token");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::seconds(TEST_TTL)));
}

#[test]
fn test_clear_cookie_contract() {
    let cookie = auth::clear_auth_cookie();

    // Same name and path as the auth cookie so the browser overwrites it.
    assert_eq!(cookie.name(), AUTH_COOKIE);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::seconds(0)));
}

// --- Password Hashing Tests ---

#[test]
fn test_password_hash_roundtrip() {
    let hash = auth::hash_password("correct horse battery staple");

    assert!(auth::verify_password("correct horse battery staple", &hash));
    assert!(!auth::verify_password("wrong password", &hash));
}

#[test]
fn test_password_hashes_are_salted() {
    // Two hashes of the same plaintext must differ (random salt), and both
    // must still verify.
    let first = auth::hash_password("same-password");
    let second = auth::hash_password("same-password");

    assert_ne!(first, second);
    assert!(auth::verify_password("same-password", &first));
    assert!(auth::verify_password("same-password", &second));
}

#[test]
fn test_unparseable_stored_hash_fails_closed() {
    assert!(!auth::verify_password("anything", "not-an-argon2-hash"));
    assert!(!auth::verify_password("anything", ""));
}
