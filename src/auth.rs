use std::{
    convert::Infallible,
    fmt,
    str::FromStr,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    repository::RepositoryState,
};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "session";

/// Header accepted in `Env::Local` to impersonate an existing user.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Role
///
/// The closed set of roles stored in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// SessionClaims
///
/// Payload of the signed session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: `users.id` of the session owner.
    pub sub: i64,
    /// Role at the time the session was issued. Informational only; the role used
    /// for authorization is re-read from the database on every request.
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// SessionUser
///
/// The resolved identity of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: i64,
    pub role: Role,
    pub name: String,
}

/// Session
///
/// Extractor that resolves the caller's session. It never rejects: a missing, expired
/// or forged session, or one pointing at a deleted user, yields `Session(None)` and
/// the handler's role gate decides how to answer (redirect or 403).
#[derive(Debug, Clone, Default)]
pub struct Session(pub Option<SessionUser>);

/// AccessDenied
///
/// Returned by `require_role` when the gate fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied;

/// require_role
///
/// The role gate: passes only when a session exists and carries exactly `role`.
pub fn require_role(session: &Session, role: Role) -> Result<&SessionUser, AccessDenied> {
    match &session.0 {
        Some(user) if user.role == role => Ok(user),
        _ => Err(AccessDenied),
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let user_id = if let Some(id) = dev_bypass_user_id(&config, &parts.headers) {
            tracing::warn!(user_id = id, "session taken from {} header", DEV_USER_HEADER);
            Some(id)
        } else {
            session_token(&parts.headers)
                .and_then(|token| verify_session_token(&token, &config.session_secret))
                .map(|claims| claims.sub)
        };

        let Some(user_id) = user_id else {
            return Ok(Session(None));
        };

        // The user may have been deleted or demoted since the session was issued.
        let user = match repo.get_user(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!(user_id, "session refers to unknown user");
                return Ok(Session(None));
            }
            Err(e) => {
                tracing::error!(user_id, "session lookup failed: {}", e);
                return Ok(Session(None));
            }
        };

        let role = match user.role.parse::<Role>() {
            Ok(role) => role,
            Err(UnknownRole(raw)) => {
                tracing::warn!(user_id, role = %raw, "user has an unknown role");
                return Ok(Session(None));
            }
        };

        Ok(Session(Some(SessionUser {
            id: user.id,
            role,
            name: user.name,
        })))
    }
}

fn dev_bypass_user_id(config: &AppConfig, headers: &HeaderMap) -> Option<i64> {
    if config.env != Env::Local {
        return None;
    }
    headers
        .get(DEV_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// session_token
///
/// Looks for the token in the `session` cookie first, then in `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        });

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    })
}

/// verify_session_token
///
/// Decodes and validates (signature and expiry) a session token.
pub fn verify_session_token(token: &str, secret: &str) -> Option<SessionClaims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<SessionClaims>(token, &decoding_key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("rejected session token: {}", e);
            None
        }
    }
}

/// issue_session_token
///
/// Signs a session token for `user_id`, valid for `ttl`.
pub fn issue_session_token(
    user_id: i64,
    role: Role,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let claims = SessionClaims {
        sub: user_id,
        role: role.to_string(),
        iat: now.as_secs() as usize,
        exp: (now + ttl).as_secs() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
