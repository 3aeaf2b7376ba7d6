use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    response::IntoResponse,
};
use chrono::Utc;
use recipebook::{
    AppState, MemoryRepository,
    auth::{AuthRejection, AuthUser, Claims, decode_session_token, encode_session_token},
    config::{AppConfig, Env},
    models::User,
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn claims_for(user_id: Uuid, exp: u64) -> Claims {
    Claims {
        sub: user_id,
        name: "Ada Lovelace".to_string(),
        given_name: None,
        family_name: None,
        picture: Some("https://example.com/ada.png".to_string()),
        iat: now() as usize,
        exp: exp as usize,
    }
}

fn create_token(user_id: Uuid, secret: &str) -> String {
    encode_session_token(&claims_for(user_id, now() + 3600), secret).unwrap()
}

fn test_user(id: Uuid) -> User {
    User {
        id,
        display_name: "Ada Lovelace".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        image: None,
        created_at: Utc::now(),
    }
}

async fn create_app_state(env: Env, users: Vec<User>) -> AppState {
    let repo = MemoryRepository::new();
    for user in users {
        repo.seed_user(user).await;
    }

    let mut config = AppConfig::default();
    config.env = env;
    config.session_secret = TEST_SECRET.to_string();

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_header(mut parts: Parts, name: header::HeaderName, value: &str) -> Parts {
    parts
        .headers
        .insert(name, header::HeaderValue::from_str(value).unwrap());
    parts
}

// --- Token Tests ---

#[test]
fn test_session_token_roundtrip_keeps_profile_claims() {
    let token = create_token(TEST_USER_ID, TEST_SECRET);
    let claims = decode_session_token(&token, TEST_SECRET).unwrap();

    assert_eq!(claims.sub, TEST_USER_ID);
    assert_eq!(claims.name, "Ada Lovelace");
    assert_eq!(claims.picture.as_deref(), Some("https://example.com/ada.png"));
}

#[test]
fn test_session_token_wrong_secret_rejected() {
    let token = create_token(TEST_USER_ID, "some-other-secret");
    assert!(decode_session_token(&token, TEST_SECRET).is_err());
}

#[test]
fn test_session_token_expired_rejected() {
    // Well past the default validation leeway.
    let claims = claims_for(TEST_USER_ID, now() - 3600);
    let token = encode_session_token(&claims, TEST_SECRET).unwrap();

    assert!(decode_session_token(&token, TEST_SECRET).is_err());
}

#[test]
fn test_claims_to_new_user_splits_display_name() {
    let user = claims_for(TEST_USER_ID, now() + 60).to_new_user();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.first_name, "Ada");
    assert_eq!(user.last_name, "Lovelace");

    let mut claims = claims_for(TEST_USER_ID, now() + 60);
    claims.given_name = Some("Augusta".to_string());
    claims.family_name = Some("King".to_string());
    let user = claims.to_new_user();
    assert_eq!(user.first_name, "Augusta");
    assert_eq!(user.last_name, "King");
    assert_eq!(user.display_name, "Ada Lovelace");
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_auth_success_with_session_cookie() {
    let state = create_app_state(Env::Production, vec![test_user(TEST_USER_ID)]).await;
    let token = create_token(TEST_USER_ID, TEST_SECRET);

    let mut parts = with_header(
        get_request_parts(Method::GET, "/dashboard".parse().unwrap()),
        header::COOKIE,
        &format!("theme=dark; session={token}"),
    );

    let user = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .expect("valid session cookie should authenticate");
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.first_name, "Ada");
}

#[tokio::test]
async fn test_auth_success_with_bearer_header() {
    let state = create_app_state(Env::Production, vec![test_user(TEST_USER_ID)]).await;
    let token = create_token(TEST_USER_ID, TEST_SECRET);

    let mut parts = with_header(
        get_request_parts(Method::GET, "/dashboard".parse().unwrap()),
        header::AUTHORIZATION,
        &format!("Bearer {token}"),
    );

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
}

#[tokio::test]
async fn test_auth_missing_session_redirects_to_login() {
    let state = create_app_state(Env::Production, vec![]).await;
    let mut parts = get_request_parts(Method::GET, "/dashboard".parse().unwrap());

    let rejection = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert!(matches!(rejection, AuthRejection::LoginRequired));

    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_auth_forged_token_rejected() {
    let state = create_app_state(Env::Production, vec![test_user(TEST_USER_ID)]).await;
    let token = create_token(TEST_USER_ID, "attacker-secret");

    let mut parts = with_header(
        get_request_parts(Method::GET, "/".parse().unwrap()),
        header::COOKIE,
        &format!("session={token}"),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AuthRejection::LoginRequired)));
}

#[tokio::test]
async fn test_auth_valid_token_for_unknown_user_rejected() {
    // The token verifies, but the user no longer exists in the store.
    let state = create_app_state(Env::Production, vec![]).await;
    let token = create_token(TEST_USER_ID, TEST_SECRET);

    let mut parts = with_header(
        get_request_parts(Method::GET, "/".parse().unwrap()),
        header::COOKIE,
        &format!("session={token}"),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AuthRejection::LoginRequired)));
}

#[tokio::test]
async fn test_auth_store_failure_is_server_error() {
    let mut config = AppConfig::default();
    config.session_secret = TEST_SECRET.to_string();
    let state = AppState {
        repo: Arc::new(MemoryRepository::new_failing()),
        config,
    };
    let token = create_token(TEST_USER_ID, TEST_SECRET);

    let mut parts = with_header(
        get_request_parts(Method::GET, "/".parse().unwrap()),
        header::COOKIE,
        &format!("session={token}"),
    );

    let rejection = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert!(matches!(rejection, AuthRejection::Store(_)));
    assert_eq!(
        rejection.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_auth_uses_identity_attached_by_middleware() {
    // Nothing in the store and no token: the attached identity alone is enough.
    let state = create_app_state(Env::Production, vec![]).await;
    let attached = AuthUser {
        id: TEST_USER_ID,
        display_name: "Ada Lovelace".to_string(),
        first_name: "Ada".to_string(),
    };

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.extensions.insert(attached.clone());

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user, attached);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let user_id = Uuid::new_v4();
    let state = create_app_state(Env::Local, vec![test_user(user_id)]).await;

    let mut parts = with_header(
        get_request_parts(Method::GET, "/".parse().unwrap()),
        header::HeaderName::from_static("x-user-id"),
        &user_id.to_string(),
    );

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user.id, user_id);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let user_id = Uuid::new_v4();
    let state = create_app_state(Env::Production, vec![test_user(user_id)]).await;

    // Provide ONLY the local bypass header
    let mut parts = with_header(
        get_request_parts(Method::GET, "/".parse().unwrap()),
        header::HeaderName::from_static("x-user-id"),
        &user_id.to_string(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AuthRejection::LoginRequired)));
}

#[tokio::test]
async fn test_local_bypass_unknown_user_falls_through_to_token() {
    let state = create_app_state(Env::Local, vec![test_user(TEST_USER_ID)]).await;
    let token = create_token(TEST_USER_ID, TEST_SECRET);

    let parts = with_header(
        get_request_parts(Method::GET, "/".parse().unwrap()),
        header::HeaderName::from_static("x-user-id"),
        &Uuid::new_v4().to_string(),
    );
    let mut parts = with_header(parts, header::COOKIE, &format!("session={token}"));

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
}
