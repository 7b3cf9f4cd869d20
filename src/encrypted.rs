//! Encrypted Cache
//!
//! Stores values so the backing-store operator cannot read them, while keys
//! stay efficiently lookupable. Keys are not encrypted, only hashed: the
//! lookup key, the encryption key and the nonce are all sliced from one
//! per-entry digest of the logical key and a shared secret, so the
//! clear-text key is required to recover a value and every value is
//! encrypted under its own key and nonce.
//!
//! # Derivation
//!
//! `digest = SHA-512(key ‖ secret)`, 64 bytes, recomputed per operation and
//! never persisted. Slices (ranges may overlap; the pieces serve
//! independent purposes):
//!
//! | cipher      | lookup key     | cipher key | nonce/iv |
//! |-------------|----------------|------------|----------|
//! | Salsa20     | `[..hsize]`    | `[32..64]` | `[24..32]` |
//! | ChaCha20    | `[..hsize]`    | `[32..64]` | `[20..32]` |
//! | AES-128-CBC | `[..hsize]`    | `[48..64]` | `[32..48]` |
//!
//! # Stored layout
//!
//! `[checksum (0 or csize bytes)] ‖ ciphertext`, checksum =
//! `SHA-256(plaintext)[..csize]`. On mismatch the value is reported as a
//! miss: an untrusted store makes corruption and absence indistinguishable
//! by design.

use std::str::FromStr;

use bytes::Bytes;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use salsa20::Salsa20;
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;

use crate::error::{Error, Result};
use crate::stats::StatsReport;
use crate::traits::KvStore;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Minimum secret length in bytes.
const MIN_SECRET: usize = 16;

// =============================================================================
// Ciphers
// =============================================================================

/// Value ciphers available to [`EncryptedCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    /// Salsa20 stream cipher (default).
    Salsa20,
    /// ChaCha20 stream cipher.
    ChaCha20,
    /// AES-128 in CBC mode with PKCS#7 padding.
    Aes128Cbc,
}

impl FromStr for CipherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "salsa20" => Ok(CipherKind::Salsa20),
            "chacha20" => Ok(CipherKind::ChaCha20),
            "aes" | "aes-128" | "aes-128-cbc" => Ok(CipherKind::Aes128Cbc),
            other => Err(Error::config(format!("unexpected cipher: {other}"))),
        }
    }
}

impl CipherKind {
    fn bad_material() -> Error {
        // Material is sliced from a fixed-size digest, so lengths cannot
        // actually be wrong; surfaced as a backing error rather than a panic.
        Error::backing("cipher rejected derived key material")
    }

    fn encrypt(&self, derived: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            CipherKind::Salsa20 => {
                let mut cipher = Salsa20::new_from_slices(&derived[32..64], &derived[24..32])
                    .map_err(|_| Self::bad_material())?;
                let mut buf = plaintext.to_vec();
                cipher.apply_keystream(&mut buf);
                Ok(buf)
            }
            CipherKind::ChaCha20 => {
                let mut cipher = ChaCha20::new_from_slices(&derived[32..64], &derived[20..32])
                    .map_err(|_| Self::bad_material())?;
                let mut buf = plaintext.to_vec();
                cipher.apply_keystream(&mut buf);
                Ok(buf)
            }
            CipherKind::Aes128Cbc => {
                let cipher = Aes128CbcEnc::new_from_slices(&derived[48..64], &derived[32..48])
                    .map_err(|_| Self::bad_material())?;
                Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
            }
        }
    }

    fn decrypt(&self, derived: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        match self {
            // Stream ciphers: decryption is the same keystream application.
            CipherKind::Salsa20 | CipherKind::ChaCha20 => self.encrypt(derived, ciphertext),
            CipherKind::Aes128Cbc => {
                let cipher = Aes128CbcDec::new_from_slices(&derived[48..64], &derived[32..48])
                    .map_err(|_| Self::bad_material())?;
                cipher
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                    .map_err(|_| {
                        debug!("cbc padding invalid, reporting value as corrupted");
                        Error::Integrity
                    })
            }
        }
    }
}

// =============================================================================
// EncryptedCache
// =============================================================================

/// Decorator encrypting values and hashing keys on their way to the inner
/// mapping.
///
/// ```
/// use bytes::Bytes;
/// use cachestack::{EncryptedCache, KvStore, MemoryStore};
///
/// let cache = EncryptedCache::new(MemoryStore::new(), b"a secret of 16+ bytes".to_vec()).unwrap();
/// cache.set(b"who", Bytes::from_static(b"plain")).unwrap();
/// assert_eq!(cache.get(b"who").unwrap(), Bytes::from_static(b"plain"));
/// ```
#[derive(Debug)]
pub struct EncryptedCache<S> {
    inner: S,
    secret: Vec<u8>,
    hsize: usize,
    csize: usize,
    cipher: CipherKind,
}

impl<S: KvStore> EncryptedCache<S> {
    /// Wraps a store with the default parameters: Salsa20, 16-byte lookup
    /// keys, no checksum.
    pub fn new(inner: S, secret: Vec<u8>) -> Result<Self> {
        Self::with_options(inner, secret, 16, 0, "salsa20")
    }

    /// Wraps a store with explicit parameters.
    ///
    /// - `secret`: at least 16 bytes;
    /// - `hsize`: lookup-key length, 8 to 32 bytes;
    /// - `csize`: plaintext-checksum length, 0 (disabled) to 32 bytes;
    /// - `cipher`: `"salsa20"`, `"chacha20"` or `"aes-128-cbc"`.
    ///
    /// All parameters are validated here; nothing is deferred to the first
    /// operation.
    pub fn with_options(
        inner: S,
        secret: Vec<u8>,
        hsize: usize,
        csize: usize,
        cipher: &str,
    ) -> Result<Self> {
        if secret.len() < MIN_SECRET {
            return Err(Error::config(format!(
                "secret must be at least {MIN_SECRET} bytes, got {}",
                secret.len()
            )));
        }
        if !(8..=32).contains(&hsize) {
            return Err(Error::config(format!(
                "hash size must be within [8, 32], got {hsize}"
            )));
        }
        if csize > 32 {
            return Err(Error::config(format!(
                "checksum size must be within [0, 32], got {csize}"
            )));
        }
        Ok(Self {
            inner,
            secret,
            hsize,
            csize,
            cipher: cipher.parse()?,
        })
    }

    /// Consumes the decorator and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Per-entry digest of logical key and secret.
    fn derive(&self, key: &[u8]) -> [u8; 64] {
        let mut hasher = Sha512::new();
        hasher.update(key);
        hasher.update(&self.secret);
        let mut digest = [0u8; 64];
        digest.copy_from_slice(&hasher.finalize());
        digest
    }

    fn checksum(&self, plaintext: &[u8]) -> Vec<u8> {
        Sha256::digest(plaintext)[..self.csize].to_vec()
    }
}

impl<S: KvStore> KvStore for EncryptedCache<S> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        let digest = self.derive(key);
        self.inner.contains(&digest[..self.hsize])
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        let digest = self.derive(key);
        let stored = self.inner.get(&digest[..self.hsize])?;

        let (checksum, ciphertext) = if self.csize > 0 {
            if stored.len() < self.csize {
                debug!("stored value shorter than its checksum, reporting as corrupted");
                return Err(Error::Integrity);
            }
            stored.split_at(self.csize)
        } else {
            (&stored[..0], &stored[..])
        };

        let plaintext = self.cipher.decrypt(&digest, ciphertext)?;

        if self.csize > 0 && checksum != self.checksum(&plaintext).as_slice() {
            debug!("plaintext checksum mismatch, reporting as corrupted");
            return Err(Error::Integrity);
        }
        Ok(Bytes::from(plaintext))
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        let digest = self.derive(key);
        let ciphertext = self.cipher.encrypt(&digest, &value)?;

        let stored = if self.csize > 0 {
            let mut framed = self.checksum(&value);
            framed.extend_from_slice(&ciphertext);
            framed
        } else {
            ciphertext
        };
        self.inner.set(&digest[..self.hsize], Bytes::from(stored))
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let digest = self.derive(key);
        self.inner.delete(&digest[..self.hsize])
    }

    fn len(&self) -> Result<usize> {
        self.inner.len()
    }

    /// Enumerates the hashed lookup keys; logical keys are not recoverable.
    fn keys(&self) -> Result<Vec<Bytes>> {
        self.inner.keys()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn stats(&self) -> Option<StatsReport> {
        self.inner.stats()
    }

    fn hit_rate(&self) -> Option<f64> {
        self.inner.hit_rate()
    }

    fn reset_stats(&self) {
        self.inner.reset_stats()
    }
}

// =============================================================================
// Tests
// =============================================================================
