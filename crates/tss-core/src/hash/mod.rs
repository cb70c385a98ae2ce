//! Keccak-256 hashing with domain separation
//!
//! Every protocol hash is `H(context || label || fields...)`. The field order
//! is part of the wire contract and must not change.

pub mod xmd;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::primitives::{Point, Scalar};
use crate::{MemberId, Result};

/// Default domain-separation context
pub const CONTEXT_STRING: &str = "BAND-TSS-secp256k1-v0";

/// Byte length of a Keccak-256 digest
pub const HASH_SIZE: usize = 32;

const ROUND1_A0: &[u8] = b"round1A0";
const ROUND1_ONE_TIME: &[u8] = b"round1OneTime";
const ROUND3_COMPLAIN: &[u8] = b"round3Complain";
const ROUND3_OWN_PUB_KEY: &[u8] = b"round3OwnPubKey";
const SIGN_MSG: &[u8] = b"signMsg";
const SIGN_COMMITMENT: &[u8] = b"signCommitment";
const BINDING_FACTOR: &[u8] = b"bindingFactor";
const CHALLENGE: &[u8] = b"challenge";
const NONCE: &[u8] = b"nonce";

/// Keccak-256 over the concatenation of `data`
pub fn hash(data: &[&[u8]]) -> [u8; HASH_SIZE] {
    let mut hasher = Keccak256::new();
    for chunk in data {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

/// Hash configuration shared by every member of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    context: String,
}

impl Default for Suite {
    fn default() -> Self {
        Self::new(CONTEXT_STRING)
    }
}

impl Suite {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    fn digest(&self, label: &[u8], fields: &[&[u8]]) -> [u8; HASH_SIZE] {
        let mut hasher = Keccak256::new();
        hasher.update(self.context.as_bytes());
        hasher.update(label);
        for field in fields {
            hasher.update(field);
        }
        hasher.finalize().into()
    }

    /// Digest interpreted as a scalar; digests at or above the order fail
    fn digest_scalar(&self, label: &[u8], fields: &[&[u8]]) -> Result<Scalar> {
        Scalar::from_bytes(&self.digest(label, fields))
    }

    fn dkg_hash(
        &self,
        label: &[u8],
        pub_nonce: &Point,
        mid: MemberId,
        dkg_context: &[u8],
        target: &Point,
    ) -> Result<Scalar> {
        self.digest_scalar(
            label,
            &[
                &pub_nonce.to_bytes(),
                &mid.to_be_bytes(),
                dkg_context,
                &target.to_bytes(),
            ],
        )
    }

    /// Challenge of the round 1 `a0` self-signature
    pub fn hash_round1_a0(
        &self,
        pub_nonce: &Point,
        mid: MemberId,
        dkg_context: &[u8],
        a0_pub: &Point,
    ) -> Result<Scalar> {
        self.dkg_hash(ROUND1_A0, pub_nonce, mid, dkg_context, a0_pub)
    }

    /// Challenge of the round 1 one-time key self-signature
    pub fn hash_round1_one_time(
        &self,
        pub_nonce: &Point,
        mid: MemberId,
        dkg_context: &[u8],
        one_time_pub: &Point,
    ) -> Result<Scalar> {
        self.dkg_hash(ROUND1_ONE_TIME, pub_nonce, mid, dkg_context, one_time_pub)
    }

    /// Challenge of a complaint proof
    pub fn hash_round3_complain(
        &self,
        a1: &Point,
        a2: &Point,
        one_time_pub_i: &Point,
        one_time_pub_j: &Point,
        key_sym: &Point,
    ) -> Result<Scalar> {
        self.digest_scalar(
            ROUND3_COMPLAIN,
            &[
                &a1.to_bytes(),
                &a2.to_bytes(),
                &one_time_pub_i.to_bytes(),
                &one_time_pub_j.to_bytes(),
                &key_sym.to_bytes(),
            ],
        )
    }

    /// Challenge of the round 3 own public key self-signature
    pub fn hash_round3_own_pub_key(
        &self,
        pub_nonce: &Point,
        mid: MemberId,
        dkg_context: &[u8],
        own_pub: &Point,
    ) -> Result<Scalar> {
        self.dkg_hash(ROUND3_OWN_PUB_KEY, pub_nonce, mid, dkg_context, own_pub)
    }

    pub fn hash_sign_msg(&self, data: &[u8]) -> [u8; HASH_SIZE] {
        self.digest(SIGN_MSG, &[data])
    }

    pub fn hash_sign_commitment(&self, commitment: &[u8]) -> [u8; HASH_SIZE] {
        self.digest(SIGN_COMMITMENT, &[commitment])
    }

    /// Per-signer binding factor over the message and the session commitment
    pub fn hash_binding_factor(
        &self,
        mid: MemberId,
        data: &[u8],
        commitment: &[u8],
    ) -> Result<Scalar> {
        self.digest_scalar(
            BINDING_FACTOR,
            &[
                &mid.to_be_bytes(),
                &self.hash_sign_msg(data),
                &self.hash_sign_commitment(commitment),
            ],
        )
    }

    /// Signing challenge
    ///
    /// Layout: `ctx || 0x00 || "challenge" || 0x00 || address(R) ||
    /// (Y[0] + 25) || x(Y) || H(data)`, where `x(Y)` is the minimal
    /// big-endian encoding of the group key's x-coordinate.
    pub fn hash_challenge(
        &self,
        group_pub_nonce: &Point,
        group_pub_key: &Point,
        data: &[u8],
    ) -> Result<Scalar> {
        let group_pub_nonce = group_pub_nonce.ensure_not_identity()?;
        let group_pub_key = group_pub_key.ensure_not_identity()?;

        let x = group_pub_key.x_bytes();
        let first = x.iter().position(|b| *b != 0).unwrap_or(x.len());

        let mut hasher = Keccak256::new();
        hasher.update(self.context.as_bytes());
        hasher.update([0u8]);
        hasher.update(CHALLENGE);
        hasher.update([0u8]);
        hasher.update(group_pub_nonce.address());
        hasher.update([group_pub_key.parity_byte()]);
        hasher.update(&x[first..]);
        hasher.update(hash(&[data]));
        let digest: [u8; HASH_SIZE] = hasher.finalize().into();

        Scalar::from_bytes(&digest)
    }

    /// Nonce derived from fresh randomness and the signing secret
    pub fn hash_nonce(&self, random: &[u8], secret: &Scalar) -> Result<Scalar> {
        self.digest_scalar(NONCE, &[random, &secret.to_bytes()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_data() {
        assert_eq!(
            hex::encode(hash(&[b"data"])),
            "8f54f1c2d0eb5771cd5bf67a6689fcd6eed9444d91a39e5ef32a9b4ae5ca14ff"
        );
        assert_eq!(hash(&[b"da", b"ta"]), hash(&[b"data"]));
    }

    #[test]
    fn labels_separate_domains() {
        let suite = Suite::default();
        assert_ne!(suite.hash_sign_msg(b"x"), suite.hash_sign_commitment(b"x"));

        let other = Suite::new("another-context");
        assert_ne!(suite.hash_sign_msg(b"x"), other.hash_sign_msg(b"x"));
    }

    #[test]
    fn sign_msg_is_prefixed_keccak() {
        let suite = Suite::default();
        assert_eq!(
            suite.hash_sign_msg(b"data"),
            hash(&[CONTEXT_STRING.as_bytes(), b"signMsg", b"data"])
        );
    }

    #[test]
    fn challenge_rejects_identity() {
        let suite = Suite::default();
        assert!(suite
            .hash_challenge(&Point::IDENTITY, &Point::GENERATOR, b"data")
            .is_err());
        assert!(suite
            .hash_challenge(&Point::GENERATOR, &Point::IDENTITY, b"data")
            .is_err());
    }

    #[test]
    fn dkg_hashes_bind_member() {
        let suite = Suite::default();
        let g = Point::GENERATOR;
        let one = MemberId::new(1).unwrap();
        let two = MemberId::new(2).unwrap();
        let a = suite.hash_round1_a0(&g, one, b"ctx", &g);
        let b = suite.hash_round1_a0(&g, two, b"ctx", &g);
        let c = suite.hash_round1_one_time(&g, one, b"ctx", &g);
        if let (Ok(a), Ok(b), Ok(c)) = (a, b, c) {
            assert_ne!(a, b);
            assert_ne!(a, c);
        }
    }
}
