//! Complaints against members that sent bad shares
//!
//! The complainant `i` proves that `key_sym = x_i * Y_j` without revealing
//! `x_i`: with nonce `k`, `A1 = k*G`, `A2 = k*Y_j` and
//! `z = k + c*x_i`, a verifier checks `z*G == A1 + c*Y_i` and
//! `z*Y_j == A2 + c*key_sym`.

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use zeroize::Zeroize;

use super::round3::verify_secret_share;
use super::Complaint;
use crate::channel::{decrypt_secret_share, derive_shared_key};
use crate::hash::Suite;
use crate::primitives::{ComplaintSignature, EncSecretShare, Point, PrivateKey};
use crate::schnorr;
use crate::{Error, Result};

/// Who misbehaved according to a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintVerdict {
    /// The accused sent a share that fails its own commitments
    AccusedMisbehaved,
    /// The proof is invalid or the share was correct
    ComplainantMisbehaved,
}

/// Prove knowledge of the complainant's one-time key behind `key_sym`
///
/// Returns the proof together with `key_sym`.
pub fn sign_complaint(
    suite: &Suite,
    one_time_pub_i: &Point,
    one_time_pub_j: &Point,
    one_time_priv_i: &PrivateKey,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<(ComplaintSignature, Point)> {
    let key_sym = derive_shared_key(one_time_priv_i, one_time_pub_j)?;

    loop {
        let mut nonce = schnorr::generate_nonce(suite, one_time_priv_i.as_scalar(), rng)?;
        let a1 = Point::mul_base(&nonce);
        let a2 = (*one_time_pub_j * nonce).ensure_not_identity()?;

        let challenge = match suite.hash_round3_complain(
            &a1,
            &a2,
            one_time_pub_i,
            one_time_pub_j,
            &key_sym,
        ) {
            Ok(c) => c,
            Err(Error::NotInOrder) => {
                nonce.zeroize();
                continue;
            }
            Err(e) => return Err(e),
        };

        let z = nonce + challenge * *one_time_priv_i.as_scalar();
        nonce.zeroize();
        return Ok((ComplaintSignature::new(a1, a2, z), key_sym));
    }
}

/// Verify a complaint proof
pub fn verify_complaint_signature(
    suite: &Suite,
    one_time_pub_i: &Point,
    one_time_pub_j: &Point,
    key_sym: &Point,
    signature: &ComplaintSignature,
) -> Result<()> {
    let challenge = suite.hash_round3_complain(
        &signature.a1,
        &signature.a2,
        one_time_pub_i,
        one_time_pub_j,
        key_sym,
    )?;

    schnorr::verify(&signature.a1, &signature.z, &challenge, one_time_pub_i, None, None)
        .and_then(|()| {
            schnorr::verify(
                &signature.a2,
                &signature.z,
                &challenge,
                key_sym,
                Some(one_time_pub_j),
                None,
            )
        })
        .map_err(|_| Error::InvalidComplaintSignature)
}

/// Succeeds only if the proof holds and the accused share is really bad
///
/// A valid proof over a correct share fails with
/// [`Error::ValidSecretShare`].
pub fn verify_complaint(
    suite: &Suite,
    complaint: &Complaint,
    one_time_pub_i: &Point,
    one_time_pub_j: &Point,
    enc_share: &EncSecretShare,
    accused_commits: &[Point],
) -> Result<()> {
    verify_complaint_signature(
        suite,
        one_time_pub_i,
        one_time_pub_j,
        &complaint.key_sym,
        &complaint.signature,
    )?;

    let share = match decrypt_secret_share(enc_share, &complaint.key_sym) {
        Ok(share) => share,
        Err(Error::NotInOrder) => return Ok(()),
        Err(e) => return Err(e),
    };

    match verify_secret_share(
        complaint.accused,
        complaint.complainant,
        &share,
        accused_commits,
    ) {
        Ok(()) => Err(Error::ValidSecretShare(complaint.accused)),
        Err(Error::InvalidSecretShare(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Arbitrate a complaint for the orchestrator
#[instrument(skip_all, fields(complainant = %complaint.complainant, accused = %complaint.accused))]
pub fn judge_complaint(
    suite: &Suite,
    complaint: &Complaint,
    one_time_pub_i: &Point,
    one_time_pub_j: &Point,
    enc_share: &EncSecretShare,
    accused_commits: &[Point],
) -> Result<ComplaintVerdict> {
    let verdict = match verify_complaint(
        suite,
        complaint,
        one_time_pub_i,
        one_time_pub_j,
        enc_share,
        accused_commits,
    ) {
        Ok(()) => ComplaintVerdict::AccusedMisbehaved,
        Err(Error::ValidSecretShare(_)) | Err(Error::InvalidComplaintSignature) => {
            ComplaintVerdict::ComplainantMisbehaved
        }
        Err(e) => return Err(e),
    };

    info!(?verdict, "Complaint judged");
    Ok(verdict)
}
