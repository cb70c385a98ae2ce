//! Curve primitives: scalars, points, keys and fixed-width encodings
//!
//! Everything crosses the wire as big-endian bytes: 32-byte scalars and
//! 33-byte compressed points. Serde uses lowercase hex strings.

mod point;
mod scalar;
mod share;
mod signature;

pub use point::{Point, PublicKey, ADDRESS_SIZE, POINT_SIZE};
pub use scalar::{generate_key_pairs, KeyPair, PrivateKey, Scalar, SCALAR_SIZE};
pub use share::{EncSecretShare, ENC_SECRET_SHARE_SIZE, NONCE_SIZE};
pub use signature::{
    ComplaintSignature, Signature, COMPLAINT_SIGNATURE_SIZE, SIGNATURE_SIZE,
};

use crate::Result;

/// Group operations the polynomial code is written against
pub trait GroupElement: Copy + Eq + Sized {
    type Scalar: Copy;

    /// Length of the canonical encoding
    const ENCODED_LEN: usize;

    fn identity() -> Self;
    fn generator() -> Self;
    fn add(&self, other: &Self) -> Self;
    fn scalar_mul(&self, scalar: &Self::Scalar) -> Self;
    fn encode(&self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> Result<Self>;
}

macro_rules! impl_hex_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.to_bytes()))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let bytes = hex::decode(s.trim_start_matches("0x"))
                    .map_err(serde::de::Error::custom)?;
                <$ty>::from_bytes(&bytes).map_err(serde::de::Error::custom)
            }
        }
    )+};
}

impl_hex_serde!(
    Scalar,
    Point,
    PrivateKey,
    Signature,
    ComplaintSignature,
    EncSecretShare,
);
