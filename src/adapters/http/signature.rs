//! Webhook payload signature verification.
//!
//! The provider signs every delivery with HMAC-SHA256 over the raw body
//! and sends the hex digest in `X-Hub-Signature-256` as `sha256=<hex>`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature verification failures.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature header missing")]
    MissingHeader,

    #[error("signature header malformed")]
    MalformedHeader,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify webhook signature using HMAC-SHA256.
///
/// # Security
///
/// Uses constant-time comparison to prevent timing attacks.
pub fn verify_signature(
    app_secret: &Secret<String>,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::MissingHeader)?;
    let hex_digest = header
        .strip_prefix("sha256=")
        .ok_or(SignatureError::MalformedHeader)?;
    let provided = hex_decode(hex_digest).ok_or(SignatureError::MalformedHeader)?;

    let mut mac = HmacSha256::new_from_slice(app_secret.expose_secret().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    if expected.as_slice().ct_eq(&provided).unwrap_u8() != 1 {
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(&hex[i..i + 2], 16).ok()?;
        bytes.push(byte);
    }
    Some(bytes)
}
