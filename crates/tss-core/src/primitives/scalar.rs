//! Scalars, private keys and key pairs

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

use elliptic_curve::PrimeField;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::Point;
use crate::{Error, Result};

/// Byte length of an encoded scalar
pub const SCALAR_SIZE: usize = 32;

/// An integer in `[0, group_order)`, 32-byte big-endian encoded
#[derive(Clone, Copy, PartialEq, Eq, Default, Zeroize)]
pub struct Scalar(pub(crate) k256::Scalar);

impl Scalar {
    pub const ZERO: Scalar = Scalar(k256::Scalar::ZERO);
    pub const ONE: Scalar = Scalar(k256::Scalar::ONE);

    /// Parse a canonical big-endian scalar
    ///
    /// Values at or above the group order are rejected, never reduced.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SCALAR_SIZE] = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: SCALAR_SIZE,
            actual: bytes.len(),
        })?;

        Option::<k256::Scalar>::from(k256::Scalar::from_repr(array.into()))
            .map(Scalar)
            .ok_or(Error::NotInOrder)
    }

    /// 32-byte big-endian encoding
    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        self.0.to_bytes().into()
    }

    pub fn from_u64(value: u64) -> Self {
        Scalar(k256::Scalar::from(value))
    }

    /// Uniformly random non-zero scalar
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Result<Self> {
        let mut buf = [0u8; SCALAR_SIZE];
        loop {
            rng.try_fill_bytes(&mut buf)?;
            let candidate = Self::from_bytes(&buf);
            if let Ok(scalar) = candidate {
                if !scalar.is_zero() {
                    buf.zeroize();
                    return Ok(scalar);
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        bool::from(self.0.is_zero())
    }

    /// Multiplicative inverse
    pub fn invert(&self) -> Result<Self> {
        Option::<k256::Scalar>::from(self.0.invert())
            .map(Scalar)
            .ok_or(Error::NotInOrder)
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", hex::encode(self.to_bytes()))
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar(-self.0)
    }
}

impl Sum for Scalar {
    fn sum<I: Iterator<Item = Scalar>>(iter: I) -> Scalar {
        iter.fold(Scalar::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Scalar> for Scalar {
    fn sum<I: Iterator<Item = &'a Scalar>>(iter: I) -> Scalar {
        iter.copied().sum()
    }
}

/// A non-zero secret scalar, wiped on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    /// Wrap a scalar, rejecting zero
    pub fn from_scalar(scalar: Scalar) -> Result<Self> {
        if scalar.is_zero() {
            return Err(Error::PrivateKeyZero);
        }
        Ok(Self(scalar))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_scalar(Scalar::from_bytes(bytes)?)
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        self.0.to_bytes()
    }

    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Result<Self> {
        Ok(Self(Scalar::random(rng)?))
    }

    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    /// `private_key * G`
    pub fn public_key(&self) -> Point {
        Point::mul_base(&self.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A private key together with its public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: Point,
}

impl KeyPair {
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// Generate a fresh random key pair
    pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> Result<Self> {
        let private_key = PrivateKey::random(rng)
            .map_err(|e| Error::GenerateKeyPairFailed(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }
}

/// Generate `n` independent key pairs
pub fn generate_key_pairs(n: usize, rng: &mut (impl RngCore + CryptoRng)) -> Result<Vec<KeyPair>> {
    (0..n).map(|_| KeyPair::generate(rng)).collect()
}
