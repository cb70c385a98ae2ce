//! Error types for TSS operations

use thiserror::Error;

use crate::MemberId;

/// Result type alias for TSS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the DKG or signing protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed byte encoding
    #[error("Parse error: {0}")]
    Parse(String),

    /// Wrong byte count for a fixed-width field, or mismatched list lengths
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A named input field has the wrong byte count
    #[error("{field} must be bytes{expected} but got bytes{actual}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Member IDs are not in strictly ascending order
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Scalar is not in `[0, group_order)`
    #[error("Scalar is not in the group order")]
    NotInOrder,

    /// Point fails curve membership
    #[error("Point is not on the curve")]
    NotOnCurve,

    /// Point encoding has an unknown prefix byte
    #[error("Invalid public key format: prefix {0:#04x}")]
    InvalidPubkeyFormat(u8),

    /// Arithmetic produced the identity where a group element is required
    #[error("Point at infinity")]
    PointAtInfinity,

    /// Key pair generation failed
    #[error("Failed to generate key pair: {0}")]
    GenerateKeyPairFailed(String),

    /// A private key must be non-zero
    #[error("Private key is zero")]
    PrivateKeyZero,

    /// Secret share does not match the sender's commitments
    #[error("Invalid secret share from member {0}")]
    InvalidSecretShare(MemberId),

    /// The accused share matches its commitments, so the complaint is baseless
    #[error("Secret share from member {0} is valid")]
    ValidSecretShare(MemberId),

    /// A member's own round 1 data differs from the broadcast recorded for it
    #[error("Round 1 data of member {0} does not match its broadcast")]
    InconsistentRound1(MemberId),

    /// Signature verification failed
    #[error("Invalid signature")]
    InvalidSignature,

    /// A signer's partial signature failed verification before combination
    #[error("Invalid partial signature from member {0}")]
    InvalidPartialSignature(MemberId),

    /// Complaint proof verification failed
    #[error("Invalid complaint signature")]
    InvalidComplaintSignature,

    /// Entropy source failure
    #[error("Random source error: {0}")]
    Random(String),

    /// Member ID is zero or outside the group
    #[error("Invalid member ID: {0}")]
    InvalidMemberId(u64),

    /// Member appears more than once in a member list
    #[error("Duplicate member: {0}")]
    DuplicateMember(MemberId),

    /// Member is missing from a member list
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Threshold or group size is out of range
    #[error("Invalid threshold: {threshold} of {size}")]
    InvalidThreshold { threshold: usize, size: usize },

    /// expand_message_xmd input outside its permissible limits
    #[error("Expand message error: {0}")]
    ExpandMessage(&'static str),

    /// The group could not complete the DKG
    #[error("DKG failed: {0}")]
    DkgFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<rand_core::Error> for Error {
    fn from(e: rand_core::Error) -> Self {
        Error::Random(e.to_string())
    }
}
