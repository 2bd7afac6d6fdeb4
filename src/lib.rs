//! # Weapp Auth
//!
//! `weapp-auth` is a session-authenticated backend for a WeChat mini-program
//! client. Its core is the session/identity reconciliation flow: a
//! client-supplied one-time `code`, this service's own signed bearer token,
//! and the platform-issued session key can each expire or be lost
//! independently, while the database keeps exactly one durable session-key
//! record per user.
//!
//! ## Login flow
//!
//! `POST /user/weixin-login` resolves the session key through a best-effort
//! cascade (embedded token secret, then the session-bound record, then the
//! jscode2session network exchange), decrypts the client payload with it,
//! upserts the user and session-key rows, binds the record id into the
//! server-side session, and returns a 3-day bearer token.
//!
//! ## Route gate
//!
//! Every `/user/*` route except an explicit allow-list requires
//! `Authorization: Bearer <token>`; failures short-circuit with a fixed
//! plain-text 401 body.

pub mod api;
pub mod cli;
pub mod wechat;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
