//! Session auth for the mini-program client.

pub mod error;
pub mod gate;
pub mod home;
pub mod login;
pub mod resolver;
pub mod session;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;
pub mod web_view;

pub use gate::{is_public, require_bearer, Identity};
pub use home::home;
pub use login::weixin_login;
pub use state::{AuthConfig, AuthState};
pub use web_view::web_view;
