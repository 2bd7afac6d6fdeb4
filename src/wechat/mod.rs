//! Client for the WeChat mini-program platform: the jscode2session code
//! exchange and decryption of the encrypted profile payload.

pub mod client;
pub mod crypt;

pub use client::{CodeExchanger, ExchangeError, JsCodeSession, WeixinClient};
pub use crypt::{decrypt_profile, CryptError, Watermark, WxProfile};
