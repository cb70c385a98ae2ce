//! Per-request signing state shared by every assigned member

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use super::dsg::{
    combine_signatures, compute_commitment, compute_group_pub_nonce, compute_own_binding_factor,
    compute_own_priv_nonce, compute_own_pub_nonce, sign, verify_group_signature,
    verify_partial_signature, NoncePair,
};
use super::{Assignment, PartialSignature};
use crate::hash::Suite;
use crate::poly::lagrange_coefficient;
use crate::primitives::{Point, PrivateKey, Scalar, Signature};
use crate::{Error, MemberId, Result};

/// Derived values for one assigned member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerInfo {
    pub assignment: Assignment,
    pub binding_factor: Scalar,
    /// `R_i = D_i + b_i * E_i`
    pub pub_nonce: Point,
    pub lagrange: Scalar,
}

/// Everything the assigned members must agree on before signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningSession {
    message: Vec<u8>,
    group_public_key: Point,
    commitment: Vec<u8>,
    group_pub_nonce: Point,
    signers: BTreeMap<MemberId, SignerInfo>,
}

impl SigningSession {
    /// Validate the assignments and derive every public session value
    #[instrument(skip_all, fields(n_signers = assignments.len()))]
    pub fn new(
        suite: &Suite,
        message: &[u8],
        group_public_key: Point,
        assignments: &[Assignment],
    ) -> Result<Self> {
        if assignments.is_empty() {
            return Err(Error::InvalidLength {
                expected: 1,
                actual: 0,
            });
        }

        let mut sorted: BTreeMap<MemberId, Assignment> = BTreeMap::new();
        for assignment in assignments {
            if sorted.insert(assignment.member_id, *assignment).is_some() {
                return Err(Error::DuplicateMember(assignment.member_id));
            }
        }

        let mids: Vec<MemberId> = sorted.keys().copied().collect();
        let pub_ds: Vec<Point> = sorted.values().map(|a| a.nonce_pair.d).collect();
        let pub_es: Vec<Point> = sorted.values().map(|a| a.nonce_pair.e).collect();
        let commitment = compute_commitment(&mids, &pub_ds, &pub_es)?;

        let mut signers = BTreeMap::new();
        for (mid, assignment) in sorted {
            let binding_factor = compute_own_binding_factor(suite, mid, message, &commitment)?;
            let pub_nonce = compute_own_pub_nonce(
                &assignment.nonce_pair.d,
                &assignment.nonce_pair.e,
                &binding_factor,
            )?;
            let lagrange = lagrange_coefficient(mid, &mids)?;
            signers.insert(
                mid,
                SignerInfo {
                    assignment,
                    binding_factor,
                    pub_nonce,
                    lagrange,
                },
            );
        }

        let pub_nonces: Vec<Point> = signers.values().map(|s| s.pub_nonce).collect();
        let group_pub_nonce = compute_group_pub_nonce(&pub_nonces)?;

        debug!(
            group_pub_nonce = hex::encode(group_pub_nonce.to_bytes()),
            "Signing session prepared"
        );

        Ok(Self {
            message: message.to_vec(),
            group_public_key,
            commitment,
            group_pub_nonce,
            signers,
        })
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn group_public_key(&self) -> &Point {
        &self.group_public_key
    }

    /// Canonical `mid || D || E` encoding of the assigned members
    pub fn commitment(&self) -> &[u8] {
        &self.commitment
    }

    pub fn group_pub_nonce(&self) -> &Point {
        &self.group_pub_nonce
    }

    /// Assigned members, ascending by ID
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.signers.keys().copied().collect()
    }

    pub fn signer(&self, mid: MemberId) -> Result<&SignerInfo> {
        self.signers.get(&mid).ok_or(Error::MemberNotFound(mid))
    }

    /// Produce member `mid`'s partial signature
    pub fn sign(
        &self,
        suite: &Suite,
        mid: MemberId,
        nonce_pair: &NoncePair,
        own_private_key: &PrivateKey,
    ) -> Result<PartialSignature> {
        let signer = self.signer(mid)?;
        let priv_nonce = compute_own_priv_nonce(nonce_pair, &signer.binding_factor);
        let signature = sign(
            suite,
            &self.message,
            &self.group_pub_nonce,
            &self.group_public_key,
            &signer.lagrange,
            &priv_nonce,
            own_private_key,
        )?;
        Ok(PartialSignature {
            member_id: mid,
            signature,
        })
    }

    /// Check a partial signature against the member's own public key and
    /// public nonce
    pub fn verify_partial(&self, suite: &Suite, partial: &PartialSignature) -> Result<()> {
        let signer = self.signer(partial.member_id)?;
        if partial.signature.r != signer.pub_nonce {
            return Err(Error::InvalidSignature);
        }
        verify_partial_signature(
            suite,
            &self.message,
            &self.group_pub_nonce,
            &self.group_public_key,
            &signer.lagrange,
            &partial.signature,
            &signer.assignment.public_key,
        )
    }

    /// Combine one verified partial signature per assigned member
    ///
    /// The first bad partial aborts the combination with
    /// [`Error::InvalidPartialSignature`] so the orchestrator can exclude
    /// that signer.
    #[instrument(skip_all)]
    pub fn combine(&self, suite: &Suite, partials: &[PartialSignature]) -> Result<Signature> {
        let mut by_member: BTreeMap<MemberId, Signature> = BTreeMap::new();
        for partial in partials {
            if by_member.insert(partial.member_id, partial.signature).is_some() {
                return Err(Error::DuplicateMember(partial.member_id));
            }
            match self.verify_partial(suite, partial) {
                Ok(()) => {}
                Err(Error::InvalidSignature) => {
                    warn!(member_id = %partial.member_id, "Partial signature rejected");
                    return Err(Error::InvalidPartialSignature(partial.member_id));
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(missing) = self.signers.keys().find(|mid| !by_member.contains_key(mid)) {
            return Err(Error::MemberNotFound(*missing));
        }

        let signatures: Vec<Signature> = by_member.into_values().collect();
        let signature = combine_signatures(&signatures)?;
        verify_group_signature(suite, &self.group_public_key, &self.message, &signature)?;
        Ok(signature)
    }
}
