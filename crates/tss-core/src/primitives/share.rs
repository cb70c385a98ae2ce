//! Encrypted secret share container

use std::fmt;

use super::SCALAR_SIZE;
use crate::{Error, Result};

/// Byte length of the encryption nonce
pub const NONCE_SIZE: usize = 16;

/// Byte length of an encrypted secret share (`ciphertext || nonce`)
pub const ENC_SECRET_SHARE_SIZE: usize = SCALAR_SIZE + NONCE_SIZE;

/// A secret share encrypted for exactly one recipient
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncSecretShare([u8; ENC_SECRET_SHARE_SIZE]);

impl EncSecretShare {
    pub fn new(ciphertext: &[u8; SCALAR_SIZE], nonce: &[u8; NONCE_SIZE]) -> Self {
        let mut out = [0u8; ENC_SECRET_SHARE_SIZE];
        out[..SCALAR_SIZE].copy_from_slice(ciphertext);
        out[SCALAR_SIZE..].copy_from_slice(nonce);
        Self(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: ENC_SECRET_SHARE_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    pub fn to_bytes(&self) -> [u8; ENC_SECRET_SHARE_SIZE] {
        self.0
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.0[..SCALAR_SIZE]
    }

    pub fn nonce(&self) -> &[u8] {
        &self.0[SCALAR_SIZE..]
    }
}

impl fmt::Debug for EncSecretShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncSecretShare({})", hex::encode(self.0))
    }
}
