//! Session key resolution.
//!
//! Tries progressively more expensive sources so a login does not pay for a
//! network exchange it does not need: the secret embedded in a still-valid
//! bearer token, then the session-bound record in the identity store, then
//! the jscode2session exchange. The first two are best-effort; their
//! failures are logged and swallowed so resolution falls through.

use crate::api::handlers::user::{error::LoginError, state::AuthState, token};
use tracing::{debug, warn};

pub(crate) struct ResolveRequest<'a> {
    /// Client's claim that its cached session key is still usable; when
    /// false, the cached sources are skipped entirely.
    pub session_key_is_valid: bool,
    /// Raw `Authorization` header value, if one was sent.
    pub bearer: Option<&'a str>,
    /// Session-bound record id recovered from the server-side session.
    pub bound_record_id: Option<i64>,
    /// One-time exchange code.
    pub code: &'a str,
}

pub(crate) async fn resolve_session_key(
    state: &AuthState,
    request: ResolveRequest<'_>,
) -> Result<String, LoginError> {
    if request.session_key_is_valid {
        if let Some(key) = from_bearer(state, request.bearer) {
            debug!("session key recovered from bearer token");
            return Ok(key);
        }
        if let Some(key) = from_bound_record(state, request.bound_record_id).await {
            debug!("session key recovered from session-bound record");
            return Ok(key);
        }
    }

    let session = state
        .exchanger()
        .code_to_session(request.code)
        .await
        .map_err(LoginError::SecretResolutionFailed)?;

    debug!("session key obtained via code exchange");
    Ok(session.session_key)
}

fn from_bearer(state: &AuthState, bearer: Option<&str>) -> Option<String> {
    let header = bearer?;
    match token::from_authorization_header(header, state.config().jwt_secret()) {
        Ok(claims) if !claims.session_key.is_empty() => Some(claims.session_key),
        Ok(_) => {
            debug!("bearer token carries no session key");
            None
        }
        Err(err) => {
            debug!("bearer token did not yield a session key: {err}");
            None
        }
    }
}

async fn from_bound_record(state: &AuthState, record_id: Option<i64>) -> Option<String> {
    let record_id = record_id?;
    match state.store().session_key_record(record_id).await {
        Ok(Some(record)) if !record.session_key.is_empty() => Some(record.session_key),
        Ok(_) => {
            debug!(record_id, "session-bound record is missing or empty");
            None
        }
        Err(err) => {
            warn!(record_id, "session key record lookup failed: {err}");
            None
        }
    }
}
