//! Round 1: polynomial, one-time key and self-signatures

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};
use zeroize::Zeroize;

use super::Round1Info;
use crate::hash::Suite;
use crate::primitives::{generate_key_pairs, Point, PrivateKey, Scalar, Signature};
use crate::schnorr;
use crate::{Error, MemberId, Result};

/// Output of round 1 for one member. Only [`Round1Data::info`] is published.
pub struct Round1Data {
    pub member_id: MemberId,
    pub one_time_priv_key: PrivateKey,
    pub one_time_pub_key: Point,
    pub one_time_signature: Signature,
    pub a0_priv_key: PrivateKey,
    pub a0_pub_key: Point,
    pub a0_signature: Signature,
    /// Polynomial coefficients, `a0` first
    pub coefficients: Vec<Scalar>,
    pub coefficient_commits: Vec<Point>,
}

impl Round1Data {
    /// The broadcast part of this round
    pub fn info(&self) -> Round1Info {
        Round1Info {
            member_id: self.member_id,
            coefficient_commits: self.coefficient_commits.clone(),
            one_time_pub_key: self.one_time_pub_key,
            a0_signature: self.a0_signature,
            one_time_signature: self.one_time_signature,
        }
    }
}

impl Drop for Round1Data {
    fn drop(&mut self) {
        self.coefficients.zeroize();
    }
}

impl fmt::Debug for Round1Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round1Data")
            .field("member_id", &self.member_id)
            .field("one_time_pub_key", &self.one_time_pub_key)
            .field("a0_pub_key", &self.a0_pub_key)
            .field("coefficient_commits", &self.coefficient_commits)
            .finish_non_exhaustive()
    }
}

/// Generate the round 1 data of member `mid`
///
/// Creates `threshold + 1` key pairs: the first is the one-time key, the
/// rest are the polynomial coefficients starting with `a0`.
#[instrument(skip(suite, dkg_context, rng))]
pub fn generate_round1(
    suite: &Suite,
    mid: MemberId,
    threshold: usize,
    dkg_context: &[u8],
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Round1Data> {
    if threshold == 0 {
        return Err(Error::InvalidThreshold { threshold, size: 0 });
    }

    let mut kps = generate_key_pairs(threshold + 1, rng)?;

    let coefficient_commits: Vec<Point> = kps[1..].iter().map(|kp| kp.public_key).collect();
    let coefficients: Vec<Scalar> = kps[1..]
        .iter()
        .map(|kp| *kp.private_key.as_scalar())
        .collect();

    let a0 = kps.swap_remove(1);
    let one_time = kps.swap_remove(0);

    let one_time_signature = sign_one_time(
        suite,
        mid,
        dkg_context,
        &one_time.public_key,
        &one_time.private_key,
        rng,
    )?;
    let a0_signature = sign_a0(suite, mid, dkg_context, &a0.public_key, &a0.private_key, rng)?;

    debug!(member_id = %mid, n_coefficients = coefficients.len(), "Round 1 generated");

    Ok(Round1Data {
        member_id: mid,
        one_time_priv_key: one_time.private_key,
        one_time_pub_key: one_time.public_key,
        one_time_signature,
        a0_priv_key: a0.private_key,
        a0_pub_key: a0.public_key,
        a0_signature,
        coefficients,
        coefficient_commits,
    })
}

/// Self-signature over the `a0` commitment
pub fn sign_a0(
    suite: &Suite,
    mid: MemberId,
    dkg_context: &[u8],
    a0_pub: &Point,
    a0_priv: &PrivateKey,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Signature> {
    schnorr::sign_with_challenge(suite, a0_priv, rng, |pub_nonce| {
        suite.hash_round1_a0(pub_nonce, mid, dkg_context, a0_pub)
    })
}

pub fn verify_a0_signature(
    suite: &Suite,
    mid: MemberId,
    dkg_context: &[u8],
    signature: &Signature,
    a0_pub: &Point,
) -> Result<()> {
    let challenge = suite.hash_round1_a0(&signature.r, mid, dkg_context, a0_pub)?;
    schnorr::verify(&signature.r, &signature.s, &challenge, a0_pub, None, None)
}

/// Self-signature over the one-time public key
pub fn sign_one_time(
    suite: &Suite,
    mid: MemberId,
    dkg_context: &[u8],
    one_time_pub: &Point,
    one_time_priv: &PrivateKey,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Signature> {
    schnorr::sign_with_challenge(suite, one_time_priv, rng, |pub_nonce| {
        suite.hash_round1_one_time(pub_nonce, mid, dkg_context, one_time_pub)
    })
}

pub fn verify_one_time_signature(
    suite: &Suite,
    mid: MemberId,
    dkg_context: &[u8],
    signature: &Signature,
    one_time_pub: &Point,
) -> Result<()> {
    let challenge = suite.hash_round1_one_time(&signature.r, mid, dkg_context, one_time_pub)?;
    schnorr::verify(&signature.r, &signature.s, &challenge, one_time_pub, None, None)
}

/// Check a peer's round 1 broadcast: commitment count and both signatures
pub fn verify_round1(
    suite: &Suite,
    threshold: usize,
    dkg_context: &[u8],
    info: &Round1Info,
) -> Result<()> {
    if info.coefficient_commits.len() != threshold {
        return Err(Error::InvalidLength {
            expected: threshold,
            actual: info.coefficient_commits.len(),
        });
    }

    let a0_pub = info.a0_pub_key().ok_or(Error::InvalidLength {
        expected: threshold,
        actual: 0,
    })?;

    verify_one_time_signature(
        suite,
        info.member_id,
        dkg_context,
        &info.one_time_signature,
        &info.one_time_pub_key,
    )?;
    verify_a0_signature(suite, info.member_id, dkg_context, &info.a0_signature, a0_pub)
}
