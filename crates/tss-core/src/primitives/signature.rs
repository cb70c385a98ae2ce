//! Fixed-width signature encodings

use std::fmt;

use super::{Point, Scalar, POINT_SIZE, SCALAR_SIZE};
use crate::{Error, Result};

/// Byte length of a Schnorr signature (`R || s`)
pub const SIGNATURE_SIZE: usize = POINT_SIZE + SCALAR_SIZE;

/// Byte length of a complaint signature (`A1 || A2 || z`)
pub const COMPLAINT_SIGNATURE_SIZE: usize = 2 * POINT_SIZE + SCALAR_SIZE;

fn check_len(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::InvalidLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Schnorr signature: nonce point `R` and response `s`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: Point,
    pub s: Scalar,
}

impl Signature {
    pub fn new(r: Point, s: Scalar) -> Self {
        Self { r, s }
    }

    /// Parse and validate a 65-byte signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, SIGNATURE_SIZE)?;
        let r = Point::from_bytes(&bytes[..POINT_SIZE])?;
        let s = Scalar::from_bytes(&bytes[POINT_SIZE..])?;
        Ok(Self { r, s })
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut out = [0u8; SIGNATURE_SIZE];
        out[..POINT_SIZE].copy_from_slice(&self.r.to_bytes());
        out[POINT_SIZE..].copy_from_slice(&self.s.to_bytes());
        out
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.to_bytes()))
    }
}

/// Complaint proof of a correctly derived symmetric key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ComplaintSignature {
    pub a1: Point,
    pub a2: Point,
    pub z: Scalar,
}

impl ComplaintSignature {
    pub fn new(a1: Point, a2: Point, z: Scalar) -> Self {
        Self { a1, a2, z }
    }

    /// Parse and validate a 98-byte complaint signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, COMPLAINT_SIGNATURE_SIZE)?;
        let a1 = Point::from_bytes(&bytes[..POINT_SIZE])?;
        let a2 = Point::from_bytes(&bytes[POINT_SIZE..2 * POINT_SIZE])?;
        let z = Scalar::from_bytes(&bytes[2 * POINT_SIZE..])?;
        Ok(Self { a1, a2, z })
    }

    pub fn to_bytes(&self) -> [u8; COMPLAINT_SIGNATURE_SIZE] {
        let mut out = [0u8; COMPLAINT_SIGNATURE_SIZE];
        out[..POINT_SIZE].copy_from_slice(&self.a1.to_bytes());
        out[POINT_SIZE..2 * POINT_SIZE].copy_from_slice(&self.a2.to_bytes());
        out[2 * POINT_SIZE..].copy_from_slice(&self.z.to_bytes());
        out
    }
}

impl fmt::Debug for ComplaintSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComplaintSignature({})", hex::encode(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIG_HEX: &str = "023d5cdddbdbe503590231e9a8096348cf27d93714021feaef91b3c09553723ba3c5d137db80b4642825e48c425450f14731e7cd3c2397abb4b2c70e65a70b062e";

    #[test]
    fn signature_layout() {
        let bytes = hex::decode(SIG_HEX).unwrap();
        let sig = Signature::from_bytes(&bytes).unwrap();
        assert_eq!(hex::encode(sig.r.to_bytes()), &SIG_HEX[..66]);
        assert_eq!(hex::encode(sig.s.to_bytes()), &SIG_HEX[66..]);
        assert_eq!(sig.to_bytes().to_vec(), bytes);
    }

    #[test]
    fn signature_rejects_bad_input() {
        let bytes = hex::decode(SIG_HEX).unwrap();
        assert_eq!(
            Signature::from_bytes(&bytes[..64]),
            Err(Error::InvalidLength { expected: 65, actual: 64 })
        );

        let mut bad_s = bytes.clone();
        bad_s[33..].copy_from_slice(&[0xff; 32]);
        assert_eq!(Signature::from_bytes(&bad_s), Err(Error::NotInOrder));
    }

    #[test]
    fn complaint_signature_length() {
        assert_eq!(
            ComplaintSignature::from_bytes(&[0u8; 97]),
            Err(Error::InvalidLength { expected: 98, actual: 97 })
        );
    }
}
