//! Signing message types

use serde::{Deserialize, Serialize};

use crate::primitives::{Point, Signature};
use crate::MemberId;

/// Public half `(D, E)` of a pre-published nonce pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicNoncePair {
    pub d: Point,
    pub e: Point,
}

/// A member assigned to a signing session with its public material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub member_id: MemberId,
    /// The member's own public key from the DKG
    pub public_key: Point,
    pub nonce_pair: PublicNoncePair,
}

/// Partial signature submitted by one assigned member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSignature {
    pub member_id: MemberId,
    pub signature: Signature,
}
