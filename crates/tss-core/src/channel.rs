//! Point-to-point share encryption
//!
//! Both ends derive the same Diffie-Hellman point from their one-time keys.
//! `keccak256(point)` is the AES key material; the cipher key is
//! `HKDF-SHA512(material)` with no salt and empty info, and the share is
//! encrypted in AES-256-CTR mode with a fresh 16-byte nonce as IV.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hkdf::Hkdf;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::hash::hash;
use crate::primitives::{EncSecretShare, Point, PrivateKey, Scalar, NONCE_SIZE, SCALAR_SIZE};
use crate::{Error, Result};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Byte length of the AES key material fed to HKDF
pub const AES_KEY_SIZE: usize = 32;

/// `my_priv * their_pub`, identical from either side
pub fn derive_shared_key(my_priv: &PrivateKey, their_pub: &Point) -> Result<Point> {
    (*their_pub * *my_priv.as_scalar()).ensure_not_identity()
}

/// AES key material of a shared point: `keccak256(compressed point)`
pub fn aes_key(key_sym: &Point) -> Zeroizing<[u8; AES_KEY_SIZE]> {
    let bytes = key_sym.to_bytes();
    Zeroizing::new(hash(&[bytes.as_ref()]))
}

fn check_field(field: &'static str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::InvalidFieldLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn apply_keystream(aes_key: &[u8], nonce: &[u8], buf: &mut [u8]) -> Result<()> {
    let hkdf = Hkdf::<Sha512>::new(None, aes_key);
    let mut okm = Zeroizing::new([0u8; 32]);
    hkdf.expand(&[], okm.as_mut())
        .map_err(|e| Error::Parse(e.to_string()))?;

    let mut cipher = Aes256Ctr::new_from_slices(okm.as_ref(), nonce).map_err(|_| {
        Error::InvalidFieldLength {
            field: "nonce",
            expected: NONCE_SIZE,
            actual: nonce.len(),
        }
    })?;
    cipher.apply_keystream(buf);
    Ok(())
}

/// Encrypt a 32-byte share under raw AES key material, returning only the
/// 32-byte ciphertext
pub fn encrypt_hkdf(share: &[u8], aes_key: &[u8], nonce: &[u8]) -> Result<[u8; SCALAR_SIZE]> {
    check_field("share", share, SCALAR_SIZE)?;
    check_field("aesKey", aes_key, AES_KEY_SIZE)?;
    check_field("nonce", nonce, NONCE_SIZE)?;

    let mut buf = [0u8; SCALAR_SIZE];
    buf.copy_from_slice(share);
    apply_keystream(aes_key, nonce, &mut buf)?;
    Ok(buf)
}

/// Inverse of [`encrypt_hkdf`] over the 48-byte `ciphertext || nonce`
pub fn decrypt_hkdf(enc: &[u8], aes_key: &[u8]) -> Result<Zeroizing<[u8; SCALAR_SIZE]>> {
    let enc = EncSecretShare::from_bytes(enc)?;
    check_field("aesKey", aes_key, AES_KEY_SIZE)?;

    let mut buf = Zeroizing::new([0u8; SCALAR_SIZE]);
    buf.copy_from_slice(enc.ciphertext());
    apply_keystream(aes_key, enc.nonce(), buf.as_mut())?;
    Ok(buf)
}

/// Encrypt a raw 32-byte share for the holder of `key_sym`
pub fn encrypt(share: &[u8], key_sym: &Point, nonce: &[u8; NONCE_SIZE]) -> Result<EncSecretShare> {
    let ciphertext = encrypt_hkdf(share, aes_key(key_sym).as_ref(), nonce)?;
    Ok(EncSecretShare::new(&ciphertext, nonce))
}

/// Inverse of [`encrypt`]; the input must be exactly 48 bytes
pub fn decrypt(ciphertext: &[u8], key_sym: &Point) -> Result<Zeroizing<[u8; SCALAR_SIZE]>> {
    decrypt_hkdf(ciphertext, aes_key(key_sym).as_ref())
}

/// Encrypt a share with a freshly drawn nonce
pub fn encrypt_secret_share(
    share: &Scalar,
    key_sym: &Point,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<EncSecretShare> {
    let mut nonce = [0u8; NONCE_SIZE];
    rng.try_fill_bytes(&mut nonce)?;
    let plaintext = Zeroizing::new(share.to_bytes());
    encrypt(plaintext.as_ref(), key_sym, &nonce)
}

/// Decrypt a share and parse it as a scalar
pub fn decrypt_secret_share(enc: &EncSecretShare, key_sym: &Point) -> Result<Scalar> {
    let plaintext = decrypt(&enc.to_bytes(), key_sym)?;
    Scalar::from_bytes(plaintext.as_ref())
}
