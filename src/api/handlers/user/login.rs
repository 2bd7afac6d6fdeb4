//! The weixin-login route: resolve the session key, decrypt the profile,
//! upsert identity rows, bind the session, and issue a bearer token.

use crate::api::handlers::user::{
    error::LoginError,
    resolver::{self, ResolveRequest},
    session,
    state::AuthState,
    token,
    types::{ApiMessage, WeixinLoginData, WeixinLoginRequest, WeixinLoginResponse},
};
use crate::wechat::decrypt_profile;
use anyhow::anyhow;
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

#[utoipa::path(
    post,
    path = "/user/weixin-login",
    request_body = WeixinLoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = WeixinLoginResponse),
        (status = 400, description = "Payload missing, undecryptable, or watermarked for another app", body = ApiMessage),
        (status = 502, description = "No session key could be resolved", body = ApiMessage)
    ),
    tag = "user"
)]
pub async fn weixin_login(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<WeixinLoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage {
                code: 400,
                msg: "Missing payload".to_string(),
            }),
        )
            .into_response();
    };

    match login_flow(&state, &headers, request).await {
        Ok((body, set_cookie)) => {
            let mut response_headers = HeaderMap::new();
            if let Some(cookie) = set_cookie {
                response_headers.insert(SET_COOKIE, cookie);
            }
            (StatusCode::OK, response_headers, Json(body)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// All-or-nothing login flow; any error aborts the attempt with no rows or
/// session bindings half-written beyond the idempotent upserts.
async fn login_flow(
    state: &AuthState,
    headers: &HeaderMap,
    request: WeixinLoginRequest,
) -> Result<(WeixinLoginResponse, Option<HeaderValue>), LoginError> {
    let (session_id, is_new_session) = session::client_session(headers);
    let bound_record_id = state
        .sessions()
        .get(&session_id)
        .and_then(|data| data.session_key_record_id);
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let session_key = resolver::resolve_session_key(
        state,
        ResolveRequest {
            session_key_is_valid: request.session_key_is_valid,
            bearer,
            bound_record_id,
            code: &request.code,
        },
    )
    .await?;

    let profile = decrypt_profile(
        &session_key,
        &request.encrypted_data,
        &request.iv,
        state.config().app_id(),
    )?;

    let user = state
        .store()
        .find_or_create_user(&profile, state.config().update_profile_on_login())
        .await?;
    let record = state
        .store()
        .upsert_session_key(user.id, &session_key)
        .await?;

    state
        .sessions()
        .update(&session_id, |data| data.session_key_record_id = Some(record.id));

    let claims = token::new_claims(
        user.id,
        &profile,
        &session_key,
        state.config().token_ttl_seconds(),
    );
    let authorization_token = token::issue(&claims, state.config().jwt_secret())?;

    info!(uid = user.id, record_id = record.id, "login complete");

    let set_cookie = if is_new_session {
        Some(
            session::build_cookie(&session_id, state.config().session_ttl_seconds())
                .map_err(|err| LoginError::Internal(anyhow!("session cookie: {err}")))?,
        )
    } else {
        None
    };

    Ok((
        WeixinLoginResponse {
            code: 200,
            msg: "ok".to_string(),
            data: WeixinLoginData {
                profile,
                authorization_token,
            },
        },
        set_cookie,
    ))
}
