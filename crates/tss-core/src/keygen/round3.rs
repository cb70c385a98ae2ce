//! Round 3: share verification, key derivation and confirmation

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroize;

use super::complaint::sign_complaint;
use super::{Complaint, Round1Data, Round1Info};
use crate::channel::{decrypt_secret_share, derive_shared_key};
use crate::hash::Suite;
use crate::poly::{evaluate_point_polynomial, evaluate_scalar_polynomial, sum_points};
use crate::primitives::{EncSecretShare, Point, PrivateKey, Scalar, Signature};
use crate::schnorr;
use crate::{Error, MemberId, Result};

/// Keys of a member whose shares all verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round3Data {
    pub member_id: MemberId,
    pub own_private_key: PrivateKey,
    pub own_public_key: Point,
    pub group_public_key: Point,
    pub own_pub_key_sig: Signature,
}

/// Result of round 3: either confirm the derived key or accuse the senders
/// of bad shares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Round3Outcome {
    Confirmed(Round3Data),
    Complaints(Vec<Complaint>),
}

/// `f(mid) * G` from the sender's commitments
pub fn compute_secret_share_commit(commits: &[Point], mid: MemberId) -> Point {
    evaluate_point_polynomial(commits, &mid.to_scalar())
}

/// Check the share `sender` gave `recipient` against the sender's commitments
pub fn verify_secret_share(
    sender: MemberId,
    recipient: MemberId,
    share: &Scalar,
    sender_commits: &[Point],
) -> Result<()> {
    if Point::mul_base(share) != compute_secret_share_commit(sender_commits, recipient) {
        return Err(Error::InvalidSecretShare(sender));
    }
    Ok(())
}

/// Elementwise sum of every member's commitments
pub fn sum_commitments(all_commits: &[Vec<Point>]) -> Result<Vec<Point>> {
    let Some(first) = all_commits.first() else {
        return Ok(Vec::new());
    };

    let mut sums = vec![Point::IDENTITY; first.len()];
    for commits in all_commits {
        if commits.len() != sums.len() {
            return Err(Error::InvalidLength {
                expected: sums.len(),
                actual: commits.len(),
            });
        }
        for (sum, commit) in sums.iter_mut().zip(commits) {
            *sum = *sum + *commit;
        }
    }
    Ok(sums)
}

/// Sum of every member's `a0` commitment
pub fn compute_group_public_key(a0_commits: &[Point]) -> Result<Point> {
    sum_points(a0_commits).ensure_not_identity()
}

/// Evaluate the summed commitments at `mid`
pub fn compute_own_public_key(sum_commits: &[Point], mid: MemberId) -> Result<Point> {
    evaluate_point_polynomial(sum_commits, &mid.to_scalar()).ensure_not_identity()
}

/// Sum of the member's own share and every share it received
pub fn compute_own_private_key(secret_shares: &[Scalar]) -> Result<PrivateKey> {
    PrivateKey::from_scalar(secret_shares.iter().sum())
}

/// Self-signature over the member's own public key
pub fn sign_own_pub_key(
    suite: &Suite,
    mid: MemberId,
    dkg_context: &[u8],
    own_pub: &Point,
    own_priv: &PrivateKey,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Signature> {
    schnorr::sign_with_challenge(suite, own_priv, rng, |pub_nonce| {
        suite.hash_round3_own_pub_key(pub_nonce, mid, dkg_context, own_pub)
    })
}

pub fn verify_own_pub_key_signature(
    suite: &Suite,
    mid: MemberId,
    dkg_context: &[u8],
    signature: &Signature,
    own_pub: &Point,
) -> Result<()> {
    let challenge = suite.hash_round3_own_pub_key(&signature.r, mid, dkg_context, own_pub)?;
    schnorr::verify(&signature.r, &signature.s, &challenge, own_pub, None, None)
}

/// Check that round 1 broadcasts cover members `1..=n` in order with
/// equally long commitment lists
fn check_round1_infos(all_round1: &[Round1Info]) -> Result<usize> {
    let threshold = all_round1
        .first()
        .map(|info| info.coefficient_commits.len())
        .ok_or(Error::InvalidLength {
            expected: 1,
            actual: 0,
        })?;
    if threshold == 0 {
        return Err(Error::InvalidThreshold {
            threshold,
            size: all_round1.len(),
        });
    }

    for (expected, info) in MemberId::range(all_round1.len()).zip(all_round1) {
        if info.member_id != expected {
            return Err(Error::InvalidOrder(format!(
                "round 1 info of member {} at position {}",
                info.member_id, expected
            )));
        }
        if info.coefficient_commits.len() != threshold {
            return Err(Error::InvalidLength {
                expected: threshold,
                actual: info.coefficient_commits.len(),
            });
        }
    }
    Ok(threshold)
}

/// Run round 3 for `own.member_id`
///
/// `all_round1` holds every member's round 1 broadcast ordered by ID, and
/// `shares_to_self` the shares addressed to this member ordered by sender
/// ID, skipping this member.
#[instrument(skip_all, fields(member_id = %own.member_id))]
pub fn process_round3(
    suite: &Suite,
    dkg_context: &[u8],
    own: &Round1Data,
    all_round1: &[Round1Info],
    shares_to_self: &[EncSecretShare],
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Round3Outcome> {
    let mid = own.member_id;
    let threshold = check_round1_infos(all_round1)?;
    if own.coefficients.len() != threshold {
        return Err(Error::InvalidLength {
            expected: threshold,
            actual: own.coefficients.len(),
        });
    }
    let Some(own_broadcast) = all_round1.get(mid.index()) else {
        return Err(Error::MemberNotFound(mid));
    };
    if *own_broadcast != own.info() {
        return Err(Error::InconsistentRound1(mid));
    }
    if shares_to_self.len() + 1 != all_round1.len() {
        return Err(Error::InvalidLength {
            expected: all_round1.len() - 1,
            actual: shares_to_self.len(),
        });
    }

    let mut secret_shares = Vec::with_capacity(all_round1.len());
    secret_shares.push(evaluate_scalar_polynomial(&own.coefficients, &mid.to_scalar()));

    let mut complaints = Vec::new();
    let senders = all_round1.iter().filter(|info| info.member_id != mid);
    for (sender, enc_share) in senders.zip(shares_to_self) {
        let key_sym = derive_shared_key(&own.one_time_priv_key, &sender.one_time_pub_key)?;

        let verified = decrypt_secret_share(enc_share, &key_sym).and_then(|share| {
            verify_secret_share(sender.member_id, mid, &share, &sender.coefficient_commits)
                .map(|()| share)
        });

        match verified {
            Ok(share) => {
                debug!(sender = %sender.member_id, "Secret share verified");
                secret_shares.push(share);
            }
            Err(Error::InvalidSecretShare(_)) | Err(Error::NotInOrder) => {
                warn!(accused = %sender.member_id, "Invalid secret share, filing complaint");
                let (signature, key_sym) = sign_complaint(
                    suite,
                    &own.one_time_pub_key,
                    &sender.one_time_pub_key,
                    &own.one_time_priv_key,
                    rng,
                )?;
                complaints.push(Complaint {
                    complainant: mid,
                    accused: sender.member_id,
                    key_sym,
                    signature,
                });
            }
            Err(e) => {
                secret_shares.zeroize();
                return Err(e);
            }
        }
    }

    if !complaints.is_empty() {
        secret_shares.zeroize();
        info!(n_complaints = complaints.len(), "Round 3 produced complaints");
        return Ok(Round3Outcome::Complaints(complaints));
    }

    let own_private_key = compute_own_private_key(&secret_shares);
    secret_shares.zeroize();
    let own_private_key = own_private_key?;

    let all_commits: Vec<Vec<Point>> = all_round1
        .iter()
        .map(|info| info.coefficient_commits.clone())
        .collect();
    let own_public_key = compute_own_public_key(&sum_commitments(&all_commits)?, mid)?;
    if own_private_key.public_key() != own_public_key {
        return Err(Error::InvalidSecretShare(mid));
    }

    let a0_commits: Vec<Point> = all_commits.iter().map(|commits| commits[0]).collect();
    let group_public_key = compute_group_public_key(&a0_commits)?;

    let own_pub_key_sig =
        sign_own_pub_key(suite, mid, dkg_context, &own_public_key, &own_private_key, rng)?;

    info!(
        group_public_key = hex::encode(group_public_key.to_bytes()),
        "Round 3 completed"
    );

    Ok(Round3Outcome::Confirmed(Round3Data {
        member_id: mid,
        own_private_key,
        own_public_key,
        group_public_key,
        own_pub_key_sig,
    }))
}
