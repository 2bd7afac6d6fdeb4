//! Request/response types for the user endpoints.

use crate::wechat::WxProfile;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform `{code, msg}` body used by non-payload responses.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ApiMessage {
    pub code: u16,
    pub msg: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WeixinLoginRequest {
    /// One-time login code from the mini-program client.
    pub code: String,
    /// Unencrypted profile hint sent by the client; the decrypted payload is
    /// authoritative, so this is accepted but unused.
    #[serde(default)]
    pub user_info: Option<serde_json::Value>,
    pub encrypted_data: String,
    pub iv: String,
    /// Client's claim that its cached session key is still usable.
    #[serde(default)]
    pub session_key_is_valid: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WeixinLoginData {
    #[serde(flatten)]
    pub profile: WxProfile,
    pub authorization_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct WeixinLoginResponse {
    pub code: u16,
    pub msg: String,
    pub data: WeixinLoginData,
}

#[derive(Deserialize, Debug)]
pub struct HomeParams {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct WebViewParams {
    #[serde(default)]
    pub token: Option<String>,
}
