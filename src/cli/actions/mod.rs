pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        app_id: String,
        app_secret: String,
        jwt_secret: String,
        token_ttl_seconds: u64,
        session_ttl_seconds: u64,
        exchange_timeout_seconds: u64,
        update_profile_on_login: bool,
    },
}
