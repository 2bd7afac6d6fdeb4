//! Route handlers for the weapp-auth service.

pub mod health;
pub mod user;
