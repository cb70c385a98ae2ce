//! Threshold signing module
//!
//! Binding-factor nonce aggregation, Lagrange-weighted partial signatures
//! and their combination into one group signature.

mod dsg;
mod messages;
mod session;

pub use dsg::{
    combine_signatures, compute_commitment, compute_group_pub_nonce, compute_own_binding_factor,
    compute_own_priv_nonce, compute_own_pub_nonce, generate_nonce_pairs, sign,
    verify_group_signature, verify_partial_signature, verify_signature, NoncePair,
};
pub use messages::*;
pub use session::{SignerInfo, SigningSession};
