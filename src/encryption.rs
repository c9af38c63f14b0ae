//! Crypto provider seam and the built-in AES-256-GCM provider.
//!
//! The volume never implements cryptography itself: it resolves a named
//! provider from a registry at construction time, calls `protect` on the
//! write path and `unprotect` on the read path, and maps failures onto its
//! own error taxonomy. An authentication failure on `unprotect` is an
//! integrity violation, reported distinctly from format corruption so
//! callers can tell "damaged" apart from "tampered/wrong key".
//!
//! Built-in provider format: `[nonce: 12 bytes][ciphertext][tag: 16 bytes]`.

use crate::error::{Result, VolumeError};
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;

/// Encryption key (32 bytes for AES-256).
pub type EncryptionKey = [u8; 32];

/// Nonce size for AES-GCM (96 bits / 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits / 16 bytes).
pub const TAG_SIZE: usize = 16;

/// Overhead added by the built-in provider (nonce + tag).
pub const ENCRYPTION_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Scheme name of the built-in provider.
pub const AES_256_GCM: &str = "aes-256-gcm";

/// A named encryption algorithm consumed by the volume.
pub trait CryptoProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Encrypt a payload.
    fn protect(&self, plain: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt and verify a payload. Authentication failure must be
    /// `VolumeError::IntegrityViolation`; other algorithm failures are
    /// `VolumeError::DecipherError`.
    fn unprotect(&self, cipher: &[u8]) -> Result<Vec<u8>>;
}

/// AES-256-GCM provider with a random per-payload nonce.
pub struct Aes256GcmProvider {
    key: EncryptionKey,
}

impl Aes256GcmProvider {
    pub fn new(key: EncryptionKey) -> Self {
        Aes256GcmProvider { key }
    }

    /// Generate a random 256-bit key.
    pub fn generate_key() -> EncryptionKey {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }
}

impl CryptoProvider for Aes256GcmProvider {
    fn name(&self) -> &str {
        AES_256_GCM
    }

    fn protect(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new((&self.key).into());

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plain)
            .map_err(|e| VolumeError::DecipherError(format!("encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn unprotect(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < ENCRYPTION_OVERHEAD {
            // Shorter than a nonce plus tag cannot authenticate.
            return Err(VolumeError::IntegrityViolation);
        }

        let cipher = Aes256Gcm::new((&self.key).into());
        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);

        // AEAD reports tampering and wrong keys as a single opaque failure.
        cipher
            .decrypt(nonce, &data[NONCE_SIZE..])
            .map_err(|_| VolumeError::IntegrityViolation)
    }
}

/// Resolves encryption scheme names to providers.
///
/// A scheme named in volume metadata that the registry cannot resolve is a
/// configuration error surfaced at construction, never at first read.
#[derive(Default)]
pub struct CryptoRegistry {
    providers: HashMap<String, Arc<dyn CryptoProvider>>,
}

impl CryptoRegistry {
    pub fn new() -> Self {
        CryptoRegistry::default()
    }

    /// Registry preloaded with the built-in AES-256-GCM provider.
    pub fn with_aes_256_gcm(key: EncryptionKey) -> Self {
        let mut registry = CryptoRegistry::new();
        registry.register(Arc::new(Aes256GcmProvider::new(key)));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn CryptoProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CryptoProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| VolumeError::UnsupportedScheme(name.to_string()))
    }
}
