//! secp256k1 group elements in compressed SEC1 form

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

use elliptic_curve::group::Group;
use elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, EncodedPoint, ProjectivePoint};
use sha3::{Digest, Keccak256};

use super::{GroupElement, Scalar};
use crate::{Error, Result};

/// Byte length of a compressed point
pub const POINT_SIZE: usize = 33;

/// Byte length of an Ethereum-style address
pub const ADDRESS_SIZE: usize = 20;

/// A curve point. Parsed points are never the identity, but arithmetic may
/// produce it, so protocol outputs check with [`Point::ensure_not_identity`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Point(pub(crate) ProjectivePoint);

/// Public keys, nonces and commitments all share the point encoding
pub type PublicKey = Point;

impl Point {
    pub const GENERATOR: Point = Point(ProjectivePoint::GENERATOR);
    pub const IDENTITY: Point = Point(ProjectivePoint::IDENTITY);

    /// Parse a 33-byte compressed point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != POINT_SIZE {
            return Err(Error::InvalidLength {
                expected: POINT_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(Error::InvalidPubkeyFormat(bytes[0]));
        }

        let encoded = EncodedPoint::from_bytes(bytes).map_err(|e| Error::Parse(e.to_string()))?;
        Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .map(|p| Point(p.into()))
            .ok_or(Error::NotOnCurve)
    }

    /// 33-byte compressed encoding; the identity encodes as all zeroes
    pub fn to_bytes(&self) -> [u8; POINT_SIZE] {
        let mut out = [0u8; POINT_SIZE];
        if !self.is_identity() {
            out.copy_from_slice(self.0.to_affine().to_encoded_point(true).as_bytes());
        }
        out
    }

    /// 64-byte `x || y` encoding without the SEC1 prefix
    pub fn to_uncompressed_xy(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        if !self.is_identity() {
            out.copy_from_slice(&self.0.to_affine().to_encoded_point(false).as_bytes()[1..]);
        }
        out
    }

    /// The x-coordinate, 32 bytes big-endian
    pub fn x_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.to_bytes()[1..]);
        out
    }

    /// `27` for an even y-coordinate and `28` for odd
    pub fn parity_byte(&self) -> u8 {
        self.to_bytes()[0] + 25
    }

    /// Last 20 bytes of `keccak256(x || y)`
    pub fn address(&self) -> [u8; ADDRESS_SIZE] {
        let digest = Keccak256::digest(self.to_uncompressed_xy());
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(&digest[12..]);
        out
    }

    /// `scalar * G`
    pub fn mul_base(scalar: &Scalar) -> Self {
        Point(ProjectivePoint::GENERATOR * scalar.0)
    }

    pub fn is_identity(&self) -> bool {
        bool::from(self.0.is_identity())
    }

    pub fn ensure_not_identity(self) -> Result<Self> {
        if self.is_identity() {
            return Err(Error::PointAtInfinity);
        }
        Ok(self)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", hex::encode(self.to_bytes()))
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point(self.0 + rhs.0)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point(self.0 - rhs.0)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point(-self.0)
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;
    fn mul(self, rhs: Scalar) -> Point {
        Point(self.0 * rhs.0)
    }
}

impl Sum for Point {
    fn sum<I: Iterator<Item = Point>>(iter: I) -> Point {
        iter.fold(Point::IDENTITY, Add::add)
    }
}

impl<'a> Sum<&'a Point> for Point {
    fn sum<I: Iterator<Item = &'a Point>>(iter: I) -> Point {
        iter.copied().sum()
    }
}

impl GroupElement for Point {
    type Scalar = Scalar;

    const ENCODED_LEN: usize = POINT_SIZE;

    fn identity() -> Self {
        Point::IDENTITY
    }

    fn generator() -> Self {
        Point::GENERATOR
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    fn scalar_mul(&self, scalar: &Scalar) -> Self {
        *self * *scalar
    }

    fn encode(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Point::from_bytes(bytes)
    }
}
