//! Key derivation for the cipher cascade.
//!
//! One password yields an independent `(key, iv)` pair per cipher layer:
//! - SHA-1, SHA-2, SHA-3, Keccak and Whirlpool use HKDF over HMAC
//! - BLAKE2 uses HKDF over `SimpleHmac`
//! - SHAKE and cSHAKE squeeze the material directly from the XOF
//!
//! Derivation is deterministic: the same password, hash and cipher list always
//! produce the same pairs, which is what lets extraction replay an embed.

use std::fmt;
use std::str::FromStr;

use blake2::{Blake2b512, Blake2s256};
use hkdf::{Hkdf, SimpleHkdf};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{
    CShake128, CShake128Core, CShake256, CShake256Core, Keccak256, Sha3_224, Sha3_256, Sha3_384,
    Sha3_512, Shake128, Shake256,
};
use whirlpool::Whirlpool;
use zeroize::Zeroizing;

use crate::config::{normalize_identifier, MAX_CIPHER_LAYERS};
use crate::crypto::cipher::CipherAlgorithm;
use crate::error::{InscryptError, Result};

/// Domain separator for the pipeline salt.
const SALT_DOMAIN: &[u8] = b"inscrypt/kdu/salt/v1";

/// Domain separator for per-layer info strings.
const LAYER_DOMAIN: &[u8] = b"inscrypt/kdu/layer/v1";

/// cSHAKE customization string. Keeps cSHAKE output apart from plain SHAKE.
const CSHAKE_CUSTOMIZATION: &[u8] = b"inscrypt/kdu";

/// Hash functions the key derivation can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Keccak256,
    Blake2b,
    Blake2s,
    Shake128,
    Shake256,
    CShake128,
    CShake256,
    Whirlpool,
}

impl HashAlgorithm {
    /// Every supported hash, in listing order.
    pub const ALL: [HashAlgorithm; 17] = [
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
        Self::Keccak256,
        Self::Blake2b,
        Self::Blake2s,
        Self::Shake128,
        Self::Shake256,
        Self::CShake128,
        Self::CShake256,
        Self::Whirlpool,
    ];

    /// Canonical identifier, as stored in codebooks.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3-224",
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
            Self::Keccak256 => "keccak256",
            Self::Blake2b => "blake2b",
            Self::Blake2s => "blake2s",
            Self::Shake128 => "shake128",
            Self::Shake256 => "shake256",
            Self::CShake128 => "cshake128",
            Self::CShake256 => "cshake256",
            Self::Whirlpool => "whirlpool",
        }
    }

    /// Fills `out` with key material bound to `salt` and `info`.
    fn expand(&self, salt: &[u8], password: &[u8], info: &[u8], out: &mut [u8]) -> Result<()> {
        let expanded = match self {
            Self::Sha1 => Hkdf::<Sha1>::new(Some(salt), password).expand(info, out),
            Self::Sha224 => Hkdf::<Sha224>::new(Some(salt), password).expand(info, out),
            Self::Sha256 => Hkdf::<Sha256>::new(Some(salt), password).expand(info, out),
            Self::Sha384 => Hkdf::<Sha384>::new(Some(salt), password).expand(info, out),
            Self::Sha512 => Hkdf::<Sha512>::new(Some(salt), password).expand(info, out),
            Self::Sha3_224 => Hkdf::<Sha3_224>::new(Some(salt), password).expand(info, out),
            Self::Sha3_256 => Hkdf::<Sha3_256>::new(Some(salt), password).expand(info, out),
            Self::Sha3_384 => Hkdf::<Sha3_384>::new(Some(salt), password).expand(info, out),
            Self::Sha3_512 => Hkdf::<Sha3_512>::new(Some(salt), password).expand(info, out),
            Self::Keccak256 => Hkdf::<Keccak256>::new(Some(salt), password).expand(info, out),
            Self::Whirlpool => Hkdf::<Whirlpool>::new(Some(salt), password).expand(info, out),
            Self::Blake2b => SimpleHkdf::<Blake2b512>::new(Some(salt), password).expand(info, out),
            Self::Blake2s => SimpleHkdf::<Blake2s256>::new(Some(salt), password).expand(info, out),
            Self::Shake128 => {
                squeeze(Shake128::default(), salt, password, info, out);
                Ok(())
            }
            Self::Shake256 => {
                squeeze(Shake256::default(), salt, password, info, out);
                Ok(())
            }
            Self::CShake128 => {
                let xof = CShake128::from_core(CShake128Core::new(CSHAKE_CUSTOMIZATION));
                squeeze(xof, salt, password, info, out);
                Ok(())
            }
            Self::CShake256 => {
                let xof = CShake256::from_core(CShake256Core::new(CSHAKE_CUSTOMIZATION));
                squeeze(xof, salt, password, info, out);
                Ok(())
            }
        };
        expanded.map_err(|_| {
            InscryptError::config(format!(
                "{} cannot derive {} bytes of key material",
                self.id(),
                out.len()
            ))
        })
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HashAlgorithm {
    type Err = InscryptError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_identifier(s).as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha224" | "sha-224" => Ok(Self::Sha224),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha384" | "sha-384" => Ok(Self::Sha384),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            "sha3-224" => Ok(Self::Sha3_224),
            "sha3-256" => Ok(Self::Sha3_256),
            "sha3-384" => Ok(Self::Sha3_384),
            "sha3-512" => Ok(Self::Sha3_512),
            "keccak" | "keccak256" | "keccak-256" => Ok(Self::Keccak256),
            "blake2b" | "blake2b512" => Ok(Self::Blake2b),
            "blake2s" | "blake2s256" => Ok(Self::Blake2s),
            "shake128" => Ok(Self::Shake128),
            "shake256" => Ok(Self::Shake256),
            "cshake128" => Ok(Self::CShake128),
            "cshake256" => Ok(Self::CShake256),
            "whirlpool" => Ok(Self::Whirlpool),
            other => Err(InscryptError::config(format!(
                "unsupported hash algorithm '{}'",
                other
            ))),
        }
    }
}

fn squeeze<X>(mut xof: X, salt: &[u8], password: &[u8], info: &[u8], out: &mut [u8])
where
    X: Update + ExtendableOutput,
{
    xof.update(salt);
    xof.update(&(password.len() as u32).to_be_bytes());
    xof.update(password);
    xof.update(info);
    xof.finalize_xof().read(out);
}

/// Key and IV for one cipher layer. Both are wiped on drop.
pub struct LayerKey {
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
}

impl LayerKey {
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl fmt::Debug for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerKey")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("iv", &format_args!("<{} bytes>", self.iv.len()))
            .finish()
    }
}

/// Salt shared by every layer of one pipeline configuration.
fn pipeline_salt(hash: HashAlgorithm, ciphers: &[CipherAlgorithm]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    Digest::update(&mut hasher, SALT_DOMAIN);
    Digest::update(&mut hasher, hash.id().as_bytes());
    for cipher in ciphers {
        Digest::update(&mut hasher, [0u8]);
        Digest::update(&mut hasher, cipher.id().as_bytes());
    }
    hasher.finalize().into()
}

fn layer_info(index: usize, cipher: CipherAlgorithm) -> Vec<u8> {
    let mut info = Vec::with_capacity(LAYER_DOMAIN.len() + 4 + cipher.id().len());
    info.extend_from_slice(LAYER_DOMAIN);
    info.extend_from_slice(&(index as u32).to_be_bytes());
    info.extend_from_slice(cipher.id().as_bytes());
    info
}

/// Derives one [`LayerKey`] per cipher, in cascade order.
///
/// Fails with `InvalidConfiguration` for an empty password or a layer count
/// outside `1..=5`.
pub fn derive_layer_keys(
    password: &str,
    hash: HashAlgorithm,
    ciphers: &[CipherAlgorithm],
) -> Result<Vec<LayerKey>> {
    if password.is_empty() {
        return Err(InscryptError::config("password must not be empty"));
    }
    if ciphers.is_empty() || ciphers.len() > MAX_CIPHER_LAYERS {
        return Err(InscryptError::config(format!(
            "cipher layer count must be between 1 and {}, got {}",
            MAX_CIPHER_LAYERS,
            ciphers.len()
        )));
    }

    let salt = pipeline_salt(hash, ciphers);
    let mut keys = Vec::with_capacity(ciphers.len());

    for (index, cipher) in ciphers.iter().enumerate() {
        let key_len = cipher.key_len();
        let mut material = Zeroizing::new(vec![0u8; key_len + cipher.nonce_len()]);
        hash.expand(&salt, password.as_bytes(), &layer_info(index, *cipher), &mut material)?;

        keys.push(LayerKey {
            key: Zeroizing::new(material[..key_len].to_vec()),
            iv: Zeroizing::new(material[key_len..].to_vec()),
        });
    }

    log::debug!(
        "derived {} layer key(s) with {}",
        keys.len(),
        hash.id()
    );
    Ok(keys)
}
