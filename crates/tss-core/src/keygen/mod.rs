//! Distributed Key Generation (DKG) module
//!
//! Three rounds per member: commit to a random polynomial, send encrypted
//! shares to every peer, then verify the received shares and either confirm
//! the derived key or file complaints.

mod complaint;
mod messages;
mod round1;
mod round2;
mod round3;
mod status;

pub use complaint::{
    judge_complaint, sign_complaint, verify_complaint, verify_complaint_signature,
    ComplaintVerdict,
};
pub use messages::*;
pub use round1::{
    generate_round1, sign_a0, sign_one_time, verify_a0_signature, verify_one_time_signature,
    verify_round1, Round1Data,
};
pub use round2::{compute_encrypted_shares, compute_secret_shares, share_for};
pub use round3::{
    compute_group_public_key, compute_own_private_key, compute_own_public_key,
    compute_secret_share_commit, process_round3, sign_own_pub_key, sum_commitments,
    verify_own_pub_key_signature, verify_secret_share, Round3Data, Round3Outcome,
};
pub use status::{DkgStatus, Round3Phase, RoundReport};
