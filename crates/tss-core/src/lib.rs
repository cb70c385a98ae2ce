//! # TSS Core
//!
//! Protocol engine for threshold Schnorr signatures over secp256k1.
//!
//! This crate provides the building blocks for:
//! - Distributed Key Generation (three rounds plus complaints)
//! - Threshold signing with binding-factor nonces
//! - Share encryption between members
//!
//! The engine is pure: every operation takes explicit inputs and returns
//! explicit outputs. Message transport, persistence and round deadlines
//! belong to the orchestrator driving it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tss_core::{hash::Suite, local, GroupConfig};
//!
//! let suite = Suite::default();
//! let config = GroupConfig::new(3, 2)?;
//! let group = local::run_dkg(&suite, &config, b"context", &mut rng)?;
//!
//! let members = [MemberId::new(1)?, MemberId::new(3)?];
//! let signature = group.sign(b"data", &members, &mut rng)?;
//! ```

pub mod channel;
pub mod error;
pub mod hash;
pub mod keygen;
pub mod local;
pub mod poly;
pub mod primitives;
pub mod schnorr;
pub mod sign;
pub mod types;

pub use error::{Error, Result};
pub use primitives::{Point, PrivateKey, PublicKey, Scalar, Signature};
pub use types::{DkgContext, GroupConfig, MemberId, MAX_GROUP_SIZE};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
