//! Threshold Schnorr signing
//!
//! Each signer `i` turns its nonce pair `(d_i, e_i)` into
//! `r_i = d_i + b_i * e_i` with binding factor `b_i`, signs with
//! `z_i = r_i + c * lambda_i * x_i`, and the group signature is
//! `(sum R_i, sum z_i)`.

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::PublicNoncePair;
use crate::hash::Suite;
use crate::primitives::{Point, PrivateKey, Scalar, Signature, POINT_SIZE};
use crate::schnorr;
use crate::{Error, MemberId, Result};

/// Secret nonce pair `(d, e)`, wiped on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct NoncePair {
    d: Scalar,
    e: Scalar,
}

impl NoncePair {
    pub fn new(d: Scalar, e: Scalar) -> Result<Self> {
        if d.is_zero() || e.is_zero() {
            return Err(Error::PrivateKeyZero);
        }
        Ok(Self { d, e })
    }

    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Result<Self> {
        Ok(Self {
            d: Scalar::random(rng)?,
            e: Scalar::random(rng)?,
        })
    }

    pub fn d(&self) -> &Scalar {
        &self.d
    }

    pub fn e(&self) -> &Scalar {
        &self.e
    }

    /// `(d*G, e*G)`
    pub fn public(&self) -> PublicNoncePair {
        PublicNoncePair {
            d: Point::mul_base(&self.d),
            e: Point::mul_base(&self.e),
        }
    }
}

impl fmt::Debug for NoncePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoncePair(..)")
    }
}

/// Draw `n` nonce pairs for the pre-published pool
pub fn generate_nonce_pairs(
    n: usize,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Vec<NoncePair>> {
    (0..n).map(|_| NoncePair::random(rng)).collect()
}

/// Canonical encoding `mid || D || E` of every assigned member, which must
/// be strictly ascending by ID
pub fn compute_commitment(
    members: &[MemberId],
    pub_ds: &[Point],
    pub_es: &[Point],
) -> Result<Vec<u8>> {
    for len in [pub_ds.len(), pub_es.len()] {
        if len != members.len() {
            return Err(Error::InvalidLength {
                expected: members.len(),
                actual: len,
            });
        }
    }

    let mut commitment = Vec::with_capacity(members.len() * (8 + 2 * POINT_SIZE));
    let mut prev: Option<MemberId> = None;
    for ((mid, d), e) in members.iter().zip(pub_ds).zip(pub_es) {
        if let Some(prev) = prev.filter(|prev| prev >= mid) {
            return Err(Error::InvalidOrder(format!("member {prev} before member {mid}")));
        }
        prev = Some(*mid);

        commitment.extend_from_slice(&mid.to_be_bytes());
        commitment.extend_from_slice(&d.to_bytes());
        commitment.extend_from_slice(&e.to_bytes());
    }
    Ok(commitment)
}

/// `b_i = H(mid, H(message), H(commitment))`
pub fn compute_own_binding_factor(
    suite: &Suite,
    mid: MemberId,
    data: &[u8],
    commitment: &[u8],
) -> Result<Scalar> {
    suite.hash_binding_factor(mid, data, commitment)
}

/// `R_i = D + b_i * E`
pub fn compute_own_pub_nonce(pub_d: &Point, pub_e: &Point, binding_factor: &Scalar) -> Result<Point> {
    (*pub_d + *pub_e * *binding_factor).ensure_not_identity()
}

/// `r_i = d + b_i * e`
pub fn compute_own_priv_nonce(nonce_pair: &NoncePair, binding_factor: &Scalar) -> Scalar {
    nonce_pair.d + *binding_factor * nonce_pair.e
}

/// `R = sum R_i`
pub fn compute_group_pub_nonce(own_pub_nonces: &[Point]) -> Result<Point> {
    own_pub_nonces.iter().sum::<Point>().ensure_not_identity()
}

/// Sum the nonce points and responses of partial signatures
pub fn combine_signatures(signatures: &[Signature]) -> Result<Signature> {
    let r: Point = signatures.iter().map(|sig| sig.r).sum();
    let s: Scalar = signatures.iter().map(|sig| sig.s).sum();
    Ok(Signature::new(r.ensure_not_identity()?, s))
}

/// Partial signature `z_i = r_i + c * lambda_i * x_i`
pub fn sign(
    suite: &Suite,
    data: &[u8],
    group_pub_nonce: &Point,
    group_pub_key: &Point,
    lagrange: &Scalar,
    own_priv_nonce: &Scalar,
    own_priv_key: &PrivateKey,
) -> Result<Signature> {
    let challenge = suite.hash_challenge(group_pub_nonce, group_pub_key, data)?;
    schnorr::sign(
        own_priv_key.as_scalar(),
        &challenge,
        own_priv_nonce,
        Some(lagrange),
    )
}

/// Standalone check `s*G == R + c*lambda*Y` with the challenge over
/// `(group_pub_nonce, group_pub_key, data)`
pub fn verify_signature(
    suite: &Suite,
    data: &[u8],
    group_pub_nonce: &Point,
    group_pub_key: &Point,
    lagrange: Option<&Scalar>,
    signature: &Signature,
    public_key: &Point,
) -> Result<()> {
    let challenge = suite.hash_challenge(group_pub_nonce, group_pub_key, data)?;
    schnorr::verify(
        &signature.r,
        &signature.s,
        &challenge,
        public_key,
        None,
        lagrange,
    )
}

/// Check one signer's contribution before combination
pub fn verify_partial_signature(
    suite: &Suite,
    data: &[u8],
    group_pub_nonce: &Point,
    group_pub_key: &Point,
    lagrange: &Scalar,
    signature: &Signature,
    own_pub_key: &Point,
) -> Result<()> {
    verify_signature(
        suite,
        data,
        group_pub_nonce,
        group_pub_key,
        Some(lagrange),
        signature,
        own_pub_key,
    )
}

/// Check a combined signature against the group public key
pub fn verify_group_signature(
    suite: &Suite,
    group_pub_key: &Point,
    data: &[u8],
    signature: &Signature,
) -> Result<()> {
    verify_signature(
        suite,
        data,
        &signature.r,
        group_pub_key,
        None,
        signature,
        group_pub_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid(id: u64) -> MemberId {
        MemberId::new(id).unwrap()
    }

    #[test]
    fn commitment_layout() {
        let g = Point::GENERATOR;
        let two_g = g + g;
        let commitment = compute_commitment(&[mid(1), mid(3)], &[g, two_g], &[two_g, g]).unwrap();
        assert_eq!(commitment.len(), 2 * (8 + 33 + 33));
        assert_eq!(&commitment[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(&commitment[8..41], &g.to_bytes());
        assert_eq!(&commitment[74..82], &[0, 0, 0, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn commitment_requires_ascending_ids() {
        let g = Point::GENERATOR;
        assert!(matches!(
            compute_commitment(&[mid(2), mid(1)], &[g, g], &[g, g]),
            Err(Error::InvalidOrder(_))
        ));
        assert!(matches!(
            compute_commitment(&[mid(2), mid(2)], &[g, g], &[g, g]),
            Err(Error::InvalidOrder(_))
        ));
        assert_eq!(
            compute_commitment(&[mid(1), mid(2)], &[g], &[g, g]),
            Err(Error::InvalidLength { expected: 2, actual: 1 })
        );
        assert_eq!(
            compute_commitment(&[mid(1)], &[g], &[g, g]),
            Err(Error::InvalidLength { expected: 1, actual: 2 })
        );
    }

    #[test]
    fn own_nonces_agree() {
        let pair = NoncePair::new(Scalar::from_u64(5), Scalar::from_u64(7)).unwrap();
        let public = pair.public();
        let bf = Scalar::from_u64(3);
        let priv_nonce = compute_own_priv_nonce(&pair, &bf);
        assert_eq!(priv_nonce, Scalar::from_u64(26));
        assert_eq!(
            compute_own_pub_nonce(&public.d, &public.e, &bf).unwrap(),
            Point::mul_base(&priv_nonce)
        );
    }

    #[test]
    fn combine_sums_components() {
        let a = Signature::new(Point::GENERATOR, Scalar::from_u64(1));
        let b = Signature::new(Point::GENERATOR, Scalar::from_u64(2));
        let combined = combine_signatures(&[a, b]).unwrap();
        assert_eq!(combined.r, Point::GENERATOR + Point::GENERATOR);
        assert_eq!(combined.s, Scalar::from_u64(3));

        let c = Signature::new(-Point::GENERATOR, Scalar::ONE);
        assert_eq!(
            combine_signatures(&[a, c]),
            Err(Error::PointAtInfinity)
        );
    }

    #[test]
    fn nonce_pair_debug_is_redacted() {
        let pair = NoncePair::new(Scalar::ONE, Scalar::ONE).unwrap();
        assert_eq!(format!("{pair:?}"), "NoncePair(..)");
        assert!(NoncePair::new(Scalar::ZERO, Scalar::ONE).is_err());
    }
}
