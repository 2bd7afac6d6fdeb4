use crate::{api, api::handlers::user::AuthConfig, cli::actions::Action};
use anyhow::Result;
use secrecy::SecretString;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            app_id,
            app_secret,
            jwt_secret,
            token_ttl_seconds,
            session_ttl_seconds,
            exchange_timeout_seconds,
            update_profile_on_login,
        } => {
            // Fail fast on an unparseable DSN instead of at pool connect time.
            let dsn = Url::parse(&dsn)?;

            let config = AuthConfig::new(
                SecretString::from(jwt_secret),
                app_id,
                SecretString::from(app_secret),
            )
            .with_token_ttl_seconds(token_ttl_seconds)
            .with_session_ttl_seconds(session_ttl_seconds)
            .with_exchange_timeout_seconds(exchange_timeout_seconds)
            .with_update_profile_on_login(update_profile_on_login);

            api::new(port, dsn.to_string(), config).await?;
        }
    }

    Ok(())
}
