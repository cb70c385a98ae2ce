//! DKG message types

use serde::{Deserialize, Serialize};

use crate::primitives::{ComplaintSignature, EncSecretShare, Point, Signature};
use crate::MemberId;

/// Round 1 broadcast: coefficient commitments and the one-time key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round1Info {
    /// Sender member ID
    pub member_id: MemberId,
    /// Commitments to polynomial coefficients, `a0` first
    pub coefficient_commits: Vec<Point>,
    /// Public key used for share encryption
    pub one_time_pub_key: Point,
    /// Self-signature over `a0 * G`
    pub a0_signature: Signature,
    /// Self-signature over the one-time public key
    pub one_time_signature: Signature,
}

impl Round1Info {
    /// Constant-term commitment `a0 * G`
    pub fn a0_pub_key(&self) -> Option<&Point> {
        self.coefficient_commits.first()
    }
}

/// Round 2 broadcast: one encrypted share per peer, ascending by
/// recipient ID, sender omitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round2Info {
    pub member_id: MemberId,
    pub encrypted_secret_shares: Vec<EncSecretShare>,
}

/// Round 3 confirmation: signature over the member's own public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirm {
    pub member_id: MemberId,
    pub own_pub_key_sig: Signature,
}

/// Verifiable accusation that `accused` sent `complainant` a bad share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub complainant: MemberId,
    pub accused: MemberId,
    /// Diffie-Hellman point between the two one-time keys
    pub key_sym: Point,
    pub signature: ComplaintSignature,
}
