//! Round 2: secret shares encrypted for each peer

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};
use zeroize::Zeroize;

use crate::channel::{derive_shared_key, encrypt_secret_share};
use crate::poly::evaluate_scalar_polynomial;
use crate::primitives::{EncSecretShare, Point, PrivateKey, Scalar};
use crate::{Error, GroupConfig, MemberId, Result};

/// `f(j)` for every peer `j` in `1..=size`, ascending, skipping `mid`
pub fn compute_secret_shares(coeffs: &[Scalar], mid: MemberId, size: usize) -> Result<Vec<Scalar>> {
    if mid.get() as usize > size {
        return Err(Error::InvalidMemberId(mid.get()));
    }

    Ok(MemberId::range(size)
        .filter(|j| *j != mid)
        .map(|j| evaluate_scalar_polynomial(coeffs, &j.to_scalar()))
        .collect())
}

/// Encrypt this member's shares for every peer
///
/// `peer_one_time_pubs` holds the one-time public keys of all other members,
/// ascending by ID.
#[instrument(skip_all, fields(member_id = %mid))]
pub fn compute_encrypted_shares(
    mid: MemberId,
    config: &GroupConfig,
    one_time_priv: &PrivateKey,
    coeffs: &[Scalar],
    peer_one_time_pubs: &[Point],
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Vec<EncSecretShare>> {
    config.check_member(mid)?;
    if peer_one_time_pubs.len() != config.size - 1 {
        return Err(Error::InvalidLength {
            expected: config.size - 1,
            actual: peer_one_time_pubs.len(),
        });
    }
    let mut shares = compute_secret_shares(coeffs, mid, config.size)?;

    let encrypted = shares
        .iter()
        .zip(peer_one_time_pubs)
        .map(|(share, peer_pub)| {
            let key_sym = derive_shared_key(one_time_priv, peer_pub)?;
            encrypt_secret_share(share, &key_sym, rng)
        })
        .collect::<Result<Vec<_>>>();
    shares.zeroize();

    debug!(n_shares = peer_one_time_pubs.len(), "Round 2 shares encrypted");
    encrypted
}

/// The share `sender` addressed to `recipient`, given the sender's list
/// which skips the sender itself
pub fn share_for(
    recipient: MemberId,
    sender: MemberId,
    sender_shares: &[EncSecretShare],
) -> Result<&EncSecretShare> {
    if recipient == sender {
        return Err(Error::InvalidMemberId(recipient.get()));
    }
    let index = if recipient < sender {
        recipient.index()
    } else {
        recipient.index() - 1
    };
    sender_shares.get(index).ok_or(Error::MemberNotFound(recipient))
}
