use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{NewUser, User},
    repository::{RepoError, RepositoryState},
};

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/";
/// Where signed-in visitors of the guest-only landing page are sent.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Claims
///
/// Payload of the session token handed over by the identity provider. The token is an
/// HS256 JWT signed with `AppConfig::session_secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id, primary key of the `users` table.
    pub sub: Uuid,
    /// Full display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration Time (exp). Always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

impl Claims {
    /// Profile fields for the find-or-create on sign-in. Missing name parts are derived
    /// from the display name.
    pub fn to_new_user(&self) -> NewUser {
        let mut parts = self.name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let rest = parts.collect::<Vec<_>>().join(" ");

        NewUser {
            id: self.sub,
            display_name: self.name.clone(),
            first_name: self.given_name.clone().unwrap_or(first),
            last_name: self.family_name.clone().unwrap_or(rest),
            image: self.picture.clone(),
        }
    }
}

pub fn encode_session_token(
    claims: &Claims,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_session_token(
    token: &str,
    secret: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// session_cookie
///
/// The cookie that carries the session token. HttpOnly and SameSite=Lax always, Secure in
/// production.
pub fn session_cookie(config: &AppConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.env == Env::Production)
        .build()
}

pub fn expired_session_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), String::new()))
        .path("/")
        .build()
}

/// AuthUser
///
/// The resolved identity of the session user. Handlers take it as an argument; it is also
/// attached to the request extensions by `require_auth`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub display_name: String,
    pub first_name: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            first_name: user.first_name,
        }
    }
}

/// AuthRejection
///
/// Why a required session could not be resolved. A missing or invalid session is not an
/// error, only a redirect to the login page; a failing user store is a server error.
#[derive(Debug)]
pub enum AuthRejection {
    LoginRequired,
    Store(RepoError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::LoginRequired => Redirect::to(LOGIN_PATH).into_response(),
            AuthRejection::Store(e) => AppError::from(e).into_response(),
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Resolution order:
/// 1. Identity already attached to the request by `require_auth`.
/// 2. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
/// 3. The session token, from the session cookie or an `Authorization: Bearer` header.
/// 4. User lookup: the token subject must still exist in the store.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await
            .map_err(AuthRejection::Store)?
            .ok_or(AuthRejection::LoginRequired)
    }
}

/// Optional form used by the guest-only gate: `None` when nobody is signed in.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(resolve_session(parts, state).await?)
    }
}

async fn resolve_session<S>(parts: &Parts, state: &S) -> Result<Option<AuthUser>, RepoError>
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    if let Some(user) = parts.extensions.get::<AuthUser>() {
        return Ok(Some(user.clone()));
    }

    let repo = RepositoryState::from_ref(state);
    let config = AppConfig::from_ref(state);

    // Falls through to the token check if the header is malformed or names no user.
    if config.env == Env::Local {
        if let Some(user_id) = bypass_user_id(parts) {
            if let Some(user) = repo.get_user(user_id).await? {
                return Ok(Some(user.into()));
            }
        }
    }

    let Some(token) = session_token(parts, &config) else {
        return Ok(None);
    };

    let claims = match decode_session_token(&token, &config.session_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "rejected session token");
            return Ok(None);
        }
    };

    // A valid token for a deleted user grants nothing.
    Ok(repo.get_user(claims.sub).await?.map(AuthUser::from))
}

fn bypass_user_id(parts: &Parts) -> Option<Uuid> {
    let raw = parts.headers.get("x-user-id")?.to_str().ok()?;
    Uuid::parse_str(raw).ok()
}

fn session_token(parts: &Parts, config: &AppConfig) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(&config.session_cookie) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// require_auth
///
/// Gate for the authenticated route group. Extracting `AuthUser` redirects to the login page
/// when no session resolves; on success the identity is attached to the request so the
/// handler's own `AuthUser` argument is served without a second lookup.
pub async fn require_auth(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// guest_only
///
/// Gate for the landing page: signed-in users are sent to their dashboard instead.
pub async fn guest_only(user: Option<AuthUser>, request: Request, next: Next) -> Response {
    match user {
        Some(_) => Redirect::to(DASHBOARD_PATH).into_response(),
        None => next.run(request).await,
    }
}
