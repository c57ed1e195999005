//! Webhook signature check.
//!
//! LINE signs every callback body with the channel secret:
//! `X-Line-Signature: base64(HMAC-SHA256(secret, body))`.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use lr_domain::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Compute the expected signature for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify `signature` (the raw header value) against `body`.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: Option<&str>) -> Result<()> {
    let provided = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Signature("missing X-Line-Signature header".into()))?;

    let expected = sign(channel_secret, body);

    // Constant-time comparison to prevent timing attacks.
    if expected.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() != 1 {
        return Err(Error::Signature("signature mismatch".into()));
    }
    Ok(())
}
