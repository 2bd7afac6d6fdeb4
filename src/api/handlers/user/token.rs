//! Bearer token issue and verification.
//!
//! Tokens are HS256-signed with the shared application secret and embed the
//! identity plus the currently-known session key, so a later login can reuse
//! the key without a network exchange.

use crate::api::handlers::user::error::LoginError;
use crate::wechat::WxProfile;
use anyhow::anyhow;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const BEARER_SCHEME: &str = "Bearer ";

/// Claim set carried by every bearer token. Field names are part of the wire
/// contract with the mini-program client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub uid: i64,
    pub open_id: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub session_key: String,
    pub iat: u64,
    pub exp: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

pub(crate) fn new_claims(
    uid: i64,
    profile: &WxProfile,
    session_key: &str,
    ttl_seconds: u64,
) -> Claims {
    let now = unix_now();
    Claims {
        uid,
        open_id: profile.open_id.clone(),
        nick_name: profile.nick_name.clone(),
        avatar_url: profile.avatar_url.clone(),
        session_key: session_key.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    }
}

/// Sign a claim set. Only fails on signing-key misuse, which startup
/// validation rules out.
pub(crate) fn issue(claims: &Claims, secret: &SecretString) -> Result<String, LoginError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|err| LoginError::Internal(anyhow!("token signing failed: {err}")))
}

/// Verify signature and expiry, returning the embedded claims.
pub(crate) fn verify(token: &str, secret: &SecretString) -> Result<Claims, LoginError> {
    let mut validation = Validation::default();
    // No leeway: an expired token is expired at the boundary.
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| LoginError::AuthInvalid)
}

/// Strip the `Bearer ` scheme from an `Authorization` header value and
/// verify the remainder.
pub(crate) fn from_authorization_header(
    value: &str,
    secret: &SecretString,
) -> Result<Claims, LoginError> {
    let token = strip_bearer(value).ok_or(LoginError::AuthInvalid)?;
    verify(token, secret)
}

fn strip_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix(BEARER_SCHEME)
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() { None } else { Some(token) }
}
