//! Shared configuration and state for the user endpoints.

use crate::api::handlers::user::session::SessionStore;
use crate::api::handlers::user::storage::IdentityStore;
use crate::wechat::CodeExchanger;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 259_200; // 3 days
const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;
const DEFAULT_EXCHANGE_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    app_id: String,
    app_secret: SecretString,
    token_ttl_seconds: u64,
    session_ttl_seconds: u64,
    exchange_timeout_seconds: u64,
    update_profile_on_login: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString, app_id: String, app_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            app_id,
            app_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            exchange_timeout_seconds: DEFAULT_EXCHANGE_TIMEOUT_SECONDS,
            update_profile_on_login: false,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_exchange_timeout_seconds(mut self, seconds: u64) -> Self {
        self.exchange_timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_update_profile_on_login(mut self, update: bool) -> Self {
        self.update_profile_on_login = update;
        self
    }

    #[must_use]
    pub fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn app_secret(&self) -> &SecretString {
        &self.app_secret
    }

    #[must_use]
    pub const fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_seconds)
    }

    #[must_use]
    pub const fn update_profile_on_login(&self) -> bool {
        self.update_profile_on_login
    }
}

/// Injected dependencies for the login flow: configuration, the server-side
/// session store, the identity store, and the code exchanger.
pub struct AuthState {
    config: AuthConfig,
    sessions: SessionStore,
    store: Arc<dyn IdentityStore>,
    exchanger: Arc<dyn CodeExchanger>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn IdentityStore>,
        exchanger: Arc<dyn CodeExchanger>,
    ) -> Self {
        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_seconds()));
        Self {
            config,
            sessions,
            store,
            exchanger,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn exchanger(&self) -> &dyn CodeExchanger {
        self.exchanger.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_documented_values() {
        let config = AuthConfig::new(
            SecretString::from("signing"),
            "wx1234567890".to_string(),
            SecretString::from("app-secret"),
        );

        assert_eq!(config.token_ttl_seconds(), 259_200);
        assert_eq!(config.session_ttl_seconds(), 86_400);
        assert_eq!(config.exchange_timeout(), Duration::from_secs(5));
        assert!(!config.update_profile_on_login());
    }

    #[test]
    fn config_builders_override_defaults() {
        let config = AuthConfig::new(
            SecretString::from("signing"),
            "wx1234567890".to_string(),
            SecretString::from("app-secret"),
        )
        .with_token_ttl_seconds(60)
        .with_session_ttl_seconds(30)
        .with_exchange_timeout_seconds(1)
        .with_update_profile_on_login(true);

        assert_eq!(config.token_ttl_seconds(), 60);
        assert_eq!(config.session_ttl_seconds(), 30);
        assert_eq!(config.exchange_timeout(), Duration::from_secs(1));
        assert!(config.update_profile_on_login());
    }
}
