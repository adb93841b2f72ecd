//! The cipher cascade.
//!
//! Layers are applied in configured order on encryption and peeled in
//! reverse on decryption. Each layer's output is
//! `nonce_mask || ciphertext || tag`; the nonce actually used is the random
//! mask XORed with the layer's derived IV. The layer position and cipher id
//! are bound in as associated data, so a layer cannot be reordered or
//! relabelled without failing authentication.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::cancel::{checkpoint, CancelToken};
use crate::config::PipelineConfig;
use crate::crypto::cipher::CipherAlgorithm;
use crate::crypto::kdf::{derive_layer_keys, LayerKey};
use crate::error::{InscryptError, Result};

/// A keyed cascade, ready to encrypt or decrypt.
#[derive(Debug)]
pub struct Cascade {
    layers: Vec<(CipherAlgorithm, LayerKey)>,
}

impl Cascade {
    /// Derives the per-layer keys for `config` from `password`.
    pub fn new(config: &PipelineConfig, password: &str) -> Result<Self> {
        let ciphers = config.ciphers();
        let keys = derive_layer_keys(password, config.hash_algorithm(), &ciphers)?;

        Ok(Self {
            layers: ciphers.into_iter().zip(keys).collect(),
        })
    }

    /// Applies every layer in order.
    pub fn encrypt(&self, plaintext: &[u8], cancel: Option<&CancelToken>) -> Result<Vec<u8>> {
        let mut current = Zeroizing::new(plaintext.to_vec());

        for (position, (algorithm, key)) in self.layers.iter().enumerate() {
            checkpoint(cancel)?;

            let mut mask = vec![0u8; algorithm.nonce_len()];
            OsRng.fill_bytes(&mut mask);
            let nonce = xor(&mask, key.iv());

            let sealed = algorithm
                .cipher()
                .seal(key.key(), &nonce, &associated_data(position, *algorithm), &current)
                .map_err(|e| InscryptError::config(format!("layer {}: {}", position, e)))?;

            let mut next = Vec::with_capacity(mask.len() + sealed.len());
            next.extend_from_slice(&mask);
            next.extend_from_slice(&sealed);
            current = Zeroizing::new(next);

            log::debug!("layer {} ({}) sealed {} bytes", position, algorithm, current.len());
        }

        Ok(std::mem::take(&mut *current))
    }

    /// Peels every layer, last first.
    ///
    /// The first layer that fails to authenticate aborts with
    /// `AuthenticationFailure` naming its position.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        cancel: Option<&CancelToken>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let mut current = Zeroizing::new(ciphertext.to_vec());

        for (position, (algorithm, key)) in self.layers.iter().enumerate().rev() {
            checkpoint(cancel)?;

            let nonce_len = algorithm.nonce_len();
            if current.len() < algorithm.overhead() {
                log::debug!("layer {} input too short ({} bytes)", position, current.len());
                return Err(InscryptError::AuthenticationFailure { layer: position });
            }

            let (mask, body) = current.split_at(nonce_len);
            let nonce = xor(mask, key.iv());

            let opened = algorithm
                .cipher()
                .open(key.key(), &nonce, &associated_data(position, *algorithm), body)
                .map_err(|_| InscryptError::AuthenticationFailure { layer: position })?;

            current = Zeroizing::new(opened);
        }

        Ok(current)
    }
}

/// Length of the cascade output for a plaintext of `plain_len` bytes.
pub fn sealed_len(plain_len: usize, ciphers: &[CipherAlgorithm]) -> usize {
    plain_len + ciphers.iter().map(|c| c.overhead()).sum::<usize>()
}

fn associated_data(position: usize, algorithm: CipherAlgorithm) -> Vec<u8> {
    let mut aad = Vec::with_capacity(4 + algorithm.id().len());
    aad.extend_from_slice(&(position as u32).to_be_bytes());
    aad.extend_from_slice(algorithm.id().as_bytes());
    aad
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}
