//! jscode2session exchange against the platform's token endpoint.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info_span, warn, Instrument};

const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("jscode2session request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("jscode2session returned error {code}: {message}")]
    Platform { code: i64, message: String },

    #[error("jscode2session response carried no session key")]
    MissingSessionKey,
}

/// Successful exchange result.
#[derive(Debug, Clone)]
pub struct JsCodeSession {
    pub open_id: String,
    pub session_key: String,
    pub expires_in: Option<u64>,
}

/// Seam for the one-time-code exchange so the login flow can be exercised
/// without the network.
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn code_to_session(&self, code: &str) -> Result<JsCodeSession, ExchangeError>;
}

pub struct WeixinClient {
    http: Client,
    base_url: String,
    app_id: String,
    app_secret: SecretString,
}

impl WeixinClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        app_id: String,
        app_secret: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id,
            app_secret,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn request(&self, code: &str) -> Result<JsCodeSession, ExchangeError> {
        let url = format!("{}/sns/jscode2session", self.base_url);

        let span = info_span!(
            "wechat.jscode2session",
            http.method = "GET",
            url = %url
        );
        let response = self
            .http
            .get(&url)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.expose_secret()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .instrument(span)
            .await?;

        // The platform reports failures inside a 200 body via errcode.
        let raw: RawSessionResponse = response.json().await?;
        if raw.errcode.unwrap_or(0) != 0 {
            return Err(ExchangeError::Platform {
                code: raw.errcode.unwrap_or(-1),
                message: raw.errmsg.unwrap_or_default(),
            });
        }

        let session_key = raw
            .session_key
            .filter(|key| !key.is_empty())
            .ok_or(ExchangeError::MissingSessionKey)?;

        Ok(JsCodeSession {
            open_id: raw.openid.unwrap_or_default(),
            session_key,
            expires_in: raw.expires_in,
        })
    }
}

#[async_trait]
impl CodeExchanger for WeixinClient {
    async fn code_to_session(&self, code: &str) -> Result<JsCodeSession, ExchangeError> {
        // One retry with a short backoff, for transport errors only. Platform
        // errors (bad code, bad credentials) will not become right on retry.
        let mut last_transport: Option<ExchangeError> = None;

        for attempt in 0..2 {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            match self.request(code).await {
                Ok(session) => return Ok(session),
                Err(ExchangeError::Transport(err)) => {
                    warn!("jscode2session attempt {} failed: {err}", attempt + 1);
                    last_transport = Some(ExchangeError::Transport(err));
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_transport.unwrap_or(ExchangeError::MissingSessionKey))
    }
}

#[derive(Debug, Deserialize)]
struct RawSessionResponse {
    session_key: Option<String>,
    openid: Option<String>,
    expires_in: Option<u64>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}
