//! Per-value token encryption
//!
//! AES-256-GCM with a random nonce per value, encoded as
//! `nonce_hex:ciphertext_hex` so every stored field is independently
//! decryptable. The key is fixed process configuration: construction fails on
//! anything but exactly 32 bytes, and there is no fallback key.
//!
//! Decryption is deliberately forgiving in one direction only: an empty or
//! malformed stored value decrypts to the empty string instead of erroring,
//! so records whose grant carried no refresh token read back cleanly.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use slated_domain::{Result, SlatedError};
use tracing::warn;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher for individual secret values.
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").field("key", &"[REDACTED]").finish()
    }
}

impl TokenCipher {
    /// Create a cipher from the configured key. The key must be exactly 32
    /// bytes; a misconfigured key is a startup error, not a runtime one.
    pub fn new(key: &str) -> Result<Self> {
        let bytes = key.as_bytes();
        if bytes.len() != KEY_LEN {
            return Err(SlatedError::Config(format!(
                "encryption key must be exactly {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(bytes)
            .map_err(|e| SlatedError::Config(format!("failed to initialise cipher: {e}")))?;
        Ok(Self { cipher })
    }

    /// Encrypt a value. Empty input encrypts to the empty string so optional
    /// secrets (e.g. a missing refresh token) round-trip as empty.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| SlatedError::Internal(format!("encryption failed: {e}")))?;

        Ok(format!("{}:{}", hex::encode(nonce_bytes), hex::encode(ciphertext)))
    }

    /// Decrypt a stored value. Empty or malformed input yields the empty
    /// string rather than an error.
    pub fn decrypt(&self, stored: &str) -> String {
        if stored.is_empty() {
            return String::new();
        }

        match self.try_decrypt(stored) {
            Some(plaintext) => plaintext,
            None => {
                warn!("failed to decrypt stored value; treating as empty");
                String::new()
            }
        }
    }

    fn try_decrypt(&self, stored: &str) -> Option<String> {
        let (nonce_hex, ct_hex) = stored.split_once(':')?;
        let nonce_bytes = hex::decode(nonce_hex).ok()?;
        if nonce_bytes.len() != NONCE_LEN {
            return None;
        }
        let ciphertext = hex::decode(ct_hex).ok()?;
        let plaintext =
            self.cipher.decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref()).ok()?;
        String::from_utf8(plaintext).ok()
    }
}
