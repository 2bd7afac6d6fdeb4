//! Authenticated route gate.
//!
//! One explicit classification table keyed by exact path decides whether a
//! request may pass unauthenticated; everything else must present a valid
//! bearer token. Rejections short-circuit with a fixed 401 body instead of
//! propagating the decode error.

use crate::api::handlers::user::{
    error::{LoginError, UNAUTHORIZED_BODY},
    state::AuthState,
    token::{self, Claims},
};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Routes served without a bearer token. `/user/login` stays listed even
/// though the route itself is not mounted; requests to it 404 at the router.
const PUBLIC_PATHS: [&str; 3] = ["/user/login", "/user/weixin-login", "/user/web-view"];

#[must_use]
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Decoded identity injected into the request context for downstream
/// handlers.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: i64,
    pub open_id: String,
    pub nick_name: String,
    pub avatar_url: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.uid,
            open_id: claims.open_id,
            nick_name: claims.nick_name,
            avatar_url: claims.avatar_url,
        }
    }
}

pub async fn require_bearer(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let decoded = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(LoginError::AuthInvalid)
        .and_then(|header| token::from_authorization_header(header, state.config().jwt_secret()));

    match decoded {
        Ok(claims) => {
            request.extensions_mut().insert(Identity::from(claims));
            next.run(request).await
        }
        Err(err) => {
            debug!(path = request.uri().path(), "rejecting request: {err}");
            (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_exact_path_match() {
        assert!(is_public("/user/login"));
        assert!(is_public("/user/weixin-login"));
        assert!(is_public("/user/web-view"));

        // Substring lookalikes must not slip through the table.
        assert!(!is_public("/user/home"));
        assert!(!is_public("/user/web-view/extra"));
        assert!(!is_public("/user/my-login-page"));
        assert!(!is_public("/user/weixin-login/"));
    }

    #[test]
    fn identity_copies_claim_fields() {
        let claims = Claims {
            uid: 9,
            open_id: "ext-9".to_string(),
            nick_name: "Bob".to_string(),
            avatar_url: "https://example.com/b.png".to_string(),
            session_key: "secret".to_string(),
            iat: 0,
            exp: 0,
        };
        let identity = Identity::from(claims);
        assert_eq!(identity.uid, 9);
        assert_eq!(identity.open_id, "ext-9");
        assert_eq!(identity.nick_name, "Bob");
    }
}
