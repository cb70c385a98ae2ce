//! Core types shared by the DKG and signing protocols

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitives::Scalar;
use crate::{Error, Result};

/// Largest group the engine is configured for
pub const MAX_GROUP_SIZE: usize = 20;

/// Opaque DKG session identifier mixed into every self-signed value
pub type DkgContext = Vec<u8>;

/// Position of a participant on the secret-sharing polynomial (1..=N, never 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct MemberId(u64);

impl MemberId {
    /// Create a member ID, rejecting zero
    pub fn new(id: u64) -> Result<Self> {
        if id == 0 {
            return Err(Error::InvalidMemberId(id));
        }
        Ok(Self(id))
    }

    /// Raw integer value
    pub fn get(self) -> u64 {
        self.0
    }

    /// 8-byte big-endian encoding used inside every hash
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// The member ID as an x-coordinate in the scalar field
    pub fn to_scalar(self) -> Scalar {
        Scalar::from_u64(self.0)
    }

    /// Zero-based index into per-member lists ordered by ID
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// All member IDs of a group of the given size, ascending
    pub fn range(size: usize) -> impl Iterator<Item = MemberId> {
        (1..=size as u64).map(MemberId)
    }
}

impl TryFrom<u64> for MemberId {
    type Error = Error;

    fn try_from(id: u64) -> Result<Self> {
        Self::new(id)
    }
}

impl From<MemberId> for u64 {
    fn from(id: MemberId) -> u64 {
        id.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group parameters for a DKG session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Number of members
    pub size: usize,

    /// Number of polynomial coefficients, i.e. the minimum number of signers
    pub threshold: usize,
}

impl GroupConfig {
    /// Create a new group configuration
    pub fn new(size: usize, threshold: usize) -> Result<Self> {
        if threshold == 0 || threshold > size || size > MAX_GROUP_SIZE {
            return Err(Error::InvalidThreshold { threshold, size });
        }

        Ok(Self { size, threshold })
    }

    /// Member IDs of the group, ascending
    pub fn members(&self) -> impl Iterator<Item = MemberId> {
        MemberId::range(self.size)
    }

    /// Valid submissions a DKG round needs before the group may move on:
    /// `threshold + 1`, capped at the group size
    pub fn quorum(&self) -> usize {
        (self.threshold + 1).min(self.size)
    }

    /// Check that `id` belongs to the group
    pub fn check_member(&self, id: MemberId) -> Result<()> {
        if id.get() as usize > self.size {
            return Err(Error::InvalidMemberId(id.get()));
        }
        Ok(())
    }
}
