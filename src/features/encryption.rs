//! Authenticated encryption for pipeline stages.
//!
//! Ciphertext layout is `nonce (12) || ciphertext || tag (16)`, using
//! ChaCha20-Poly1305 with a fresh random nonce per message.

use std::fmt;

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("ciphertext of {len} bytes is shorter than nonce and tag ({} bytes)", NONCE_LEN + TAG_LEN)]
    Truncated { len: usize },

    #[error("authentication failed: wrong key or corrupted ciphertext")]
    AuthenticationFailed,
}

/// A 256-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Derives a key as the SHA-256 digest of `passphrase`.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        EncryptionKey(key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

impl From<&str> for EncryptionKey {
    fn from(passphrase: &str) -> Self {
        EncryptionKey::from_passphrase(passphrase)
    }
}

impl From<[u8; 32]> for EncryptionKey {
    fn from(bytes: [u8; 32]) -> Self {
        EncryptionKey(bytes)
    }
}

pub fn encrypt(data: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, EncryptionError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill(&mut nonce);

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), data)
        .map_err(|_| EncryptionError::EncryptionFailed)?;

    let mut result = Vec::with_capacity(NONCE_LEN + sealed.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&sealed);
    Ok(result)
}

pub fn decrypt(data: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(EncryptionError::Truncated { len: data.len() });
    }

    let (nonce, sealed) = data.split_at(NONCE_LEN);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| EncryptionError::AuthenticationFailed)
}
