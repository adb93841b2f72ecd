//! Cipher layers for the cascade.
//!
//! Every supported algorithm is an AEAD, so each layer can detect a wrong key
//! or corrupted input on its own. Algorithms form a closed set
//! ([`CipherAlgorithm`]); each variant resolves to a [`LayerCipher`]
//! implementation through an exhaustive match.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use aes_gcm::{Aes128Gcm, Aes256Gcm};
use aes_gcm_siv::Aes256GcmSiv;
use chacha20poly1305::aead::generic_array::typenum::Unsigned;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, Nonce, Payload};
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};
use thiserror::Error;

use crate::config::normalize_identifier;
use crate::error::InscryptError;

/// Errors raised by a single cipher layer.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed")]
    DecryptionFailed,
}

/// A symmetric cipher usable as one layer of the cascade.
pub trait LayerCipher: Send + Sync {
    /// Key length in bytes.
    fn key_len(&self) -> usize;

    /// Nonce (IV) length in bytes.
    fn nonce_len(&self) -> usize;

    /// Authentication tag length in bytes.
    fn tag_len(&self) -> usize;

    /// Encrypts `plaintext`, returning ciphertext with the tag attached.
    fn seal(&self, key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8])
        -> Result<Vec<u8>, CipherError>;

    /// Decrypts and verifies output of [`LayerCipher::seal`].
    fn open(&self, key: &[u8], nonce: &[u8], aad: &[u8], ciphertext: &[u8])
        -> Result<Vec<u8>, CipherError>;
}

/// [`LayerCipher`] backed by any RustCrypto AEAD.
pub struct AeadLayer<C>(PhantomData<fn() -> C>);

impl<C> AeadLayer<C> {
    const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> AeadLayer<C>
where
    C: KeyInit + Aead,
{
    fn init(&self, key: &[u8], nonce: &[u8]) -> Result<C, CipherError> {
        if nonce.len() != self.nonce_len() {
            return Err(CipherError::InvalidNonceLength {
                expected: self.nonce_len(),
                actual: nonce.len(),
            });
        }
        C::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
            expected: self.key_len(),
            actual: key.len(),
        })
    }
}

impl<C> LayerCipher for AeadLayer<C>
where
    C: KeyInit + Aead,
{
    fn key_len(&self) -> usize {
        C::key_size()
    }

    fn nonce_len(&self) -> usize {
        <C as AeadCore>::NonceSize::USIZE
    }

    fn tag_len(&self) -> usize {
        <C as AeadCore>::TagSize::USIZE
    }

    fn seal(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let cipher = self.init(key, nonce)?;
        cipher
            .encrypt(Nonce::<C>::from_slice(nonce), Payload { msg: plaintext, aad })
            .map_err(|_| CipherError::EncryptionFailed)
    }

    fn open(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let cipher = self.init(key, nonce)?;
        cipher
            .decrypt(Nonce::<C>::from_slice(nonce), Payload { msg: ciphertext, aad })
            .map_err(|_| CipherError::DecryptionFailed)
    }
}

static AES_128_GCM: AeadLayer<Aes128Gcm> = AeadLayer::new();
static AES_256_GCM: AeadLayer<Aes256Gcm> = AeadLayer::new();
static AES_256_GCM_SIV: AeadLayer<Aes256GcmSiv> = AeadLayer::new();
static CHACHA20_POLY1305: AeadLayer<ChaCha20Poly1305> = AeadLayer::new();
static XCHACHA20_POLY1305: AeadLayer<XChaCha20Poly1305> = AeadLayer::new();

/// Supported cipher algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    Aes128Gcm,
    Aes256Gcm,
    Aes256GcmSiv,
    ChaCha20Poly1305,
    XChaCha20Poly1305,
}

impl CipherAlgorithm {
    /// Every supported algorithm, in listing order.
    pub const ALL: [CipherAlgorithm; 5] = [
        Self::Aes128Gcm,
        Self::Aes256Gcm,
        Self::Aes256GcmSiv,
        Self::ChaCha20Poly1305,
        Self::XChaCha20Poly1305,
    ];

    /// Canonical identifier, as stored in codebooks.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Aes128Gcm => "aes-128-gcm",
            Self::Aes256Gcm => "aes-256-gcm",
            Self::Aes256GcmSiv => "aes-256-gcm-siv",
            Self::ChaCha20Poly1305 => "chacha20-poly1305",
            Self::XChaCha20Poly1305 => "xchacha20-poly1305",
        }
    }

    /// The implementation backing this algorithm.
    pub fn cipher(&self) -> &'static dyn LayerCipher {
        match self {
            Self::Aes128Gcm => &AES_128_GCM,
            Self::Aes256Gcm => &AES_256_GCM,
            Self::Aes256GcmSiv => &AES_256_GCM_SIV,
            Self::ChaCha20Poly1305 => &CHACHA20_POLY1305,
            Self::XChaCha20Poly1305 => &XCHACHA20_POLY1305,
        }
    }

    pub fn key_len(&self) -> usize {
        self.cipher().key_len()
    }

    pub fn nonce_len(&self) -> usize {
        self.cipher().nonce_len()
    }

    /// Bytes one layer of this algorithm adds to its input.
    pub fn overhead(&self) -> usize {
        self.cipher().nonce_len() + self.cipher().tag_len()
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = InscryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_identifier(s).as_str() {
            "aes-128-gcm" | "aes128" | "aes128-gcm" => Ok(Self::Aes128Gcm),
            "aes-256-gcm" | "aes256" | "aes256-gcm" | "aes" => Ok(Self::Aes256Gcm),
            "aes-256-gcm-siv" | "aes-gcm-siv" | "aes256-gcm-siv" => Ok(Self::Aes256GcmSiv),
            "chacha20-poly1305" | "chacha20" => Ok(Self::ChaCha20Poly1305),
            "xchacha20-poly1305" | "xchacha20" => Ok(Self::XChaCha20Poly1305),
            other => Err(InscryptError::config(format!(
                "unsupported cipher algorithm '{}'",
                other
            ))),
        }
    }
}
