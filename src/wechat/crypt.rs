//! Decryption of the mini-program's encrypted profile payload.
//!
//! The platform's documented scheme is AES-128-CBC with PKCS#7 padding; key,
//! iv and ciphertext all arrive base64 encoded. The decrypted JSON carries a
//! watermark naming the application id the payload was encrypted for, which
//! catches a stale or foreign session key even when the padding happens to
//! verify.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const SESSION_KEY_LEN: usize = 16;
const IV_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CryptError {
    #[error("payload decryption failed: {0}")]
    DecryptionFailed(&'static str),

    #[error("payload watermark does not match the application id")]
    WatermarkMismatch,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    pub appid: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Profile attributes recovered from the encrypted payload.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WxProfile {
    pub open_id: String,
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub gender: i16,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub avatar_url: String,
    pub watermark: Watermark,
}

/// Decrypt and deserialize an encrypted profile payload, then check its
/// watermark against the application id the service is configured for.
///
/// # Errors
/// `DecryptionFailed` when any decode, size, padding, or parse step fails
/// (wrong secret and tampered ciphertext both land here — never a silently
/// wrong profile); `WatermarkMismatch` when the payload was encrypted for a
/// different application.
pub fn decrypt_profile(
    session_key: &str,
    encrypted_data: &str,
    iv: &str,
    expected_app_id: &str,
) -> Result<WxProfile, CryptError> {
    let key = STANDARD
        .decode(session_key)
        .map_err(|_| CryptError::DecryptionFailed("session key is not valid base64"))?;
    let iv = STANDARD
        .decode(iv)
        .map_err(|_| CryptError::DecryptionFailed("iv is not valid base64"))?;
    let ciphertext = STANDARD
        .decode(encrypted_data)
        .map_err(|_| CryptError::DecryptionFailed("ciphertext is not valid base64"))?;

    if key.len() != SESSION_KEY_LEN {
        return Err(CryptError::DecryptionFailed("session key has wrong length"));
    }
    if iv.len() != IV_LEN {
        return Err(CryptError::DecryptionFailed("iv has wrong length"));
    }

    let plaintext = Aes128CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| CryptError::DecryptionFailed("cipher setup failed"))?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptError::DecryptionFailed("padding did not verify"))?;

    let profile: WxProfile = serde_json::from_slice(&plaintext)
        .map_err(|_| CryptError::DecryptionFailed("plaintext is not a profile document"))?;

    if profile.watermark.appid != expected_app_id {
        debug!(
            expected = expected_app_id,
            actual = %profile.watermark.appid,
            "payload watermark mismatch"
        );
        return Err(CryptError::WatermarkMismatch);
    }

    Ok(profile)
}
