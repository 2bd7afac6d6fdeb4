//! Login-flow error taxonomy and its HTTP mapping.

use crate::api::handlers::user::types::ApiMessage;
use crate::wechat::{CryptError, ExchangeError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

/// Fixed diagnostic body for requests rejected by the route gate. Kept
/// byte-stable so clients can rely on it.
pub const UNAUTHORIZED_BODY: &str = "401 Unauthorized: bearer token missing, invalid, or expired";

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Missing, malformed, unsigned, or expired bearer token.
    #[error("bearer token missing, malformed, or expired")]
    AuthInvalid,

    /// Every secret source was exhausted without a usable session key.
    #[error("could not resolve a session key")]
    SecretResolutionFailed(#[source] ExchangeError),

    /// The payload did not decrypt or was encrypted for another application.
    #[error(transparent)]
    Payload(#[from] CryptError),

    /// Persistence or signing failure; details stay server-side.
    #[error("login failed")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        // Wrong secrets and tampered payloads will not become right on
        // retry, so every mapping here is terminal for the attempt.
        let (status, msg) = match &self {
            Self::AuthInvalid => {
                return (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response();
            }
            Self::SecretResolutionFailed(err) => {
                error!("session key resolution failed: {err}");
                (StatusCode::BAD_GATEWAY, "could not resolve a session key")
            }
            Self::Payload(CryptError::DecryptionFailed(_)) => {
                error!("login payload failed to decrypt: {self}");
                (StatusCode::BAD_REQUEST, "payload decryption failed")
            }
            Self::Payload(CryptError::WatermarkMismatch) => (
                StatusCode::BAD_REQUEST,
                "payload watermark does not match the application id",
            ),
            Self::Internal(err) => {
                error!("login failed: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "login failed")
            }
        };

        (
            status,
            Json(ApiMessage {
                code: status.as_u16(),
                msg: msg.to_string(),
            }),
        )
            .into_response()
    }
}
