//! Authenticated home route: echoes a query parameter and the caller's
//! session-bound record id.

use crate::api::handlers::user::{
    error::UNAUTHORIZED_BODY,
    gate::Identity,
    session,
    state::AuthState,
    types::{ApiMessage, HomeParams},
};
use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/user/home",
    responses(
        (status = 200, description = "Echo of the name parameter and the session-bound record id", body = ApiMessage),
        (status = 401, description = "Bearer token missing, invalid, or expired")
    ),
    tag = "user"
)]
pub async fn home(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    identity: Option<Extension<Identity>>,
    Query(params): Query<HomeParams>,
) -> impl IntoResponse {
    // The gate always runs first; a missing identity here means the route
    // was wired without it.
    let Some(Extension(identity)) = identity else {
        return (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response();
    };
    debug!(uid = identity.uid, open_id = %identity.open_id, "home");

    let record_id = session::session_id_from_headers(&headers)
        .and_then(|session_id| state.sessions().get(&session_id))
        .and_then(|data| data.session_key_record_id)
        .map_or_else(|| "none".to_string(), |id| id.to_string());

    let name = params.name.unwrap_or_default();
    (
        StatusCode::OK,
        Json(ApiMessage {
            code: 200,
            msg: format!("ok, {name}, {record_id}"),
        }),
    )
        .into_response()
}
