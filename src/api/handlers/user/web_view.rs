//! Unauthenticated web-view route loaded inside the mini-program.
//!
//! Counts page hits per server-side session and, when the client passes its
//! bearer token on the URL, writes it into a cookie the embedded page's
//! script can read.

use crate::api::handlers::user::{session, state::AuthState, types::WebViewParams};
use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/user/web-view",
    responses(
        (status = 200, description = "HTML page with the per-session view counter", content_type = "text/html")
    ),
    tag = "user"
)]
pub async fn web_view(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    Query(params): Query<WebViewParams>,
) -> impl IntoResponse {
    let (session_id, is_new_session) = session::client_session(&headers);
    let data = state
        .sessions()
        .update(&session_id, |data| data.view_count += 1);

    let mut response_headers = HeaderMap::new();
    if is_new_session {
        if let Ok(cookie) = session::build_cookie(&session_id, state.config().session_ttl_seconds())
        {
            response_headers.append(SET_COOKIE, cookie);
        }
    }

    if let Some(token) = params.token.filter(|token| !token.is_empty()) {
        // Deliberately not HttpOnly: the embedded page's script reads it.
        match HeaderValue::from_str(&format!("Authorization=Bearer {token}; Path=/")) {
            Ok(cookie) => {
                response_headers.append(SET_COOKIE, cookie);
            }
            Err(err) => debug!("token not writable as a cookie: {err}"),
        }
    }

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>web view from server</title></head>\n\
         <body>\n<h1>web view from server</h1>\n\
         <p>views this session: {}</p>\n<p>{now}</p>\n</body>\n</html>\n",
        data.view_count
    );

    (StatusCode::OK, response_headers, Html(body))
}
