//! Inbound request verification
//!
//! The chat platform signs each webhook body with HMAC-SHA256 over the shared
//! app key and sends the hex digest in the `x-app-signature` header.
//! Verification uses the MAC's constant-time comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-app-signature";

/// Verify a request body against its signature header value.
pub fn verify(app_key: &str, body: &[u8], signature_hex: Option<&str>) -> bool {
    let Some(signature_hex) = signature_hex else {
        warn!("request missing signature header");
        return false;
    };
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        warn!("request signature is not valid hex");
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(app_key.as_bytes()).expect("HMAC can take any size key");
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Compute the hex signature for a body (used by tests and local tooling).
pub fn sign(app_key: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(app_key.as_bytes()).expect("HMAC can take any size key");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Strip markup-significant characters and cap length before text reaches the
/// scheduling core.
pub fn sanitize_text(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '<' && *c != '>').collect();
    let cleaned = cleaned.replace("javascript:", "");
    let mut trimmed = cleaned.trim().to_string();
    trimmed.truncate(slated_domain::constants::MAX_MESSAGE_LEN);
    trimmed
}
