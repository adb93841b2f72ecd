//! Cryptographic operations for Inscrypt.
//!
//! This module provides:
//! - Per-layer key derivation from a password (HKDF / SHAKE)
//! - AEAD cipher layers (AES-GCM, AES-GCM-SIV, ChaCha20-Poly1305, XChaCha20-Poly1305)
//! - The cascade that chains them

pub mod cascade;
pub mod cipher;
pub mod kdf;

pub use cascade::{sealed_len, Cascade};
pub use cipher::{AeadLayer, CipherAlgorithm, CipherError, LayerCipher};
pub use kdf::{derive_layer_keys, HashAlgorithm, LayerKey};
