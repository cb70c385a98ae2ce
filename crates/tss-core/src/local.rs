//! In-process simulation of a whole group
//!
//! Runs every member's DKG rounds and signing steps in one process,
//! wiring broadcasts between them the way an orchestrator would. Used by the
//! CLI and the integration tests.

use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

use crate::hash::Suite;
use crate::keygen::{
    compute_encrypted_shares, generate_round1, judge_complaint, process_round3, share_for,
    verify_own_pub_key_signature, verify_round1, Complaint, ComplaintVerdict, DkgStatus,
    Round1Data, Round1Info, Round3Data, Round3Outcome, Round3Phase, RoundReport,
};
use crate::primitives::{EncSecretShare, Point, PrivateKey, Signature};
use crate::sign::{generate_nonce_pairs, Assignment, SigningSession};
use crate::{Error, GroupConfig, MemberId, Result};

/// One member's key material after a successful DKG
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMember {
    pub member_id: MemberId,
    pub private_key: PrivateKey,
    pub public_key: Point,
    pub own_pub_key_sig: Signature,
}

/// A group whose DKG ran in this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalGroup {
    pub suite: Suite,
    pub config: GroupConfig,
    #[serde(with = "hex::serde")]
    pub dkg_context: Vec<u8>,
    pub group_public_key: Point,
    pub members: Vec<LocalMember>,
}

/// Independent RNG streams so members can run in parallel
fn member_rngs(n: usize, rng: &mut (impl RngCore + CryptoRng)) -> Result<Vec<ChaCha20Rng>> {
    (0..n)
        .map(|_| {
            let mut seed = [0u8; 32];
            rng.try_fill_bytes(&mut seed)?;
            Ok(ChaCha20Rng::from_seed(seed))
        })
        .collect()
}

#[cfg(feature = "multi-thread")]
fn for_each_member<T, R, F>(items: Vec<T>, f: F) -> Result<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync + Send,
{
    items.into_par_iter().map(f).collect()
}

#[cfg(not(feature = "multi-thread"))]
fn for_each_member<T, R, F>(items: Vec<T>, f: F) -> Result<Vec<R>>
where
    F: Fn(T) -> Result<R>,
{
    items.into_iter().map(f).collect()
}

/// Run rounds 1 to 3 for every member of `config`
#[instrument(skip(suite, dkg_context, rng))]
pub fn run_dkg(
    suite: &Suite,
    config: &GroupConfig,
    dkg_context: &[u8],
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<LocalGroup> {
    info!(size = config.size, threshold = config.threshold, "Starting DKG");
    let mut status = DkgStatus::Round1;

    // Round 1
    let items: Vec<_> = config.members().zip(member_rngs(config.size, rng)?).collect();
    let round1: Vec<Round1Data> = for_each_member(items, |(mid, mut rng)| {
        generate_round1(suite, mid, config.threshold, dkg_context, &mut rng)
    })?;
    let infos: Vec<Round1Info> = round1.iter().map(Round1Data::info).collect();
    let valid = infos
        .iter()
        .filter(|info| verify_round1(suite, config.threshold, dkg_context, info).is_ok())
        .count();
    status = status.advance(config, &report(valid, 0));
    info!(?status, valid, "Round 1 closed");
    ensure_running(status, "round 1")?;

    // Round 2
    let items: Vec<_> = round1.iter().zip(member_rngs(config.size, rng)?).collect();
    let round2: Vec<Vec<EncSecretShare>> = for_each_member(items, |(own, mut rng)| {
        let peers: Vec<Point> = infos
            .iter()
            .filter(|info| info.member_id != own.member_id)
            .map(|info| info.one_time_pub_key)
            .collect();
        compute_encrypted_shares(
            own.member_id,
            config,
            &own.one_time_priv_key,
            &own.coefficients,
            &peers,
            &mut rng,
        )
    })?;
    status = status.advance(config, &report(round2.len(), 0));
    info!(?status, "Round 2 closed");
    ensure_running(status, "round 2")?;

    // Round 3
    let items: Vec<_> = round1.iter().zip(member_rngs(config.size, rng)?).collect();
    let outcomes: Vec<Round3Outcome> = for_each_member(items, |(own, mut rng)| {
        let shares_to_self = config
            .members()
            .filter(|sender| *sender != own.member_id)
            .map(|sender| share_for(own.member_id, sender, &round2[sender.index()]).copied())
            .collect::<Result<Vec<_>>>()?;
        process_round3(suite, dkg_context, own, &infos, &shares_to_self, &mut rng)
    })?;

    let mut confirmed: Vec<Round3Data> = Vec::with_capacity(outcomes.len());
    let mut complaints = Vec::new();
    for outcome in outcomes {
        match outcome {
            Round3Outcome::Confirmed(data) => confirmed.push(data),
            Round3Outcome::Complaints(filed) => complaints.extend(filed),
        }
    }
    confirmed.retain(|data| {
        verify_own_pub_key_signature(
            suite,
            data.member_id,
            dkg_context,
            &data.own_pub_key_sig,
            &data.own_public_key,
        )
        .is_ok()
    });
    status = status.advance(config, &report(confirmed.len(), complaints.len()));
    info!(?status, n_complaints = complaints.len(), "Round 3 closed");

    if status == DkgStatus::Round3(Round3Phase::Complaining) {
        for complaint in &complaints {
            judge(suite, &infos, &round2, complaint)?;
        }
        // only baseless complaints remain; their filers hold no key
        status = status.advance(config, &report(confirmed.len(), 0));
        info!(?status, "Complaints resolved");
    }
    if status != DkgStatus::Active {
        return Err(Error::DkgFailed("round 3 confirmations missing".into()));
    }

    let group_public_key = confirmed
        .first()
        .map(|data| data.group_public_key)
        .ok_or_else(|| Error::DkgFailed("no member confirmed".into()))?;
    if confirmed.iter().any(|data| data.group_public_key != group_public_key) {
        return Err(Error::DkgFailed("members derived different group keys".into()));
    }

    info!(
        group_public_key = hex::encode(group_public_key.to_bytes()),
        "DKG completed successfully"
    );

    Ok(LocalGroup {
        suite: suite.clone(),
        config: *config,
        dkg_context: dkg_context.to_vec(),
        group_public_key,
        members: confirmed
            .into_iter()
            .map(|data| LocalMember {
                member_id: data.member_id,
                private_key: data.own_private_key,
                public_key: data.own_public_key,
                own_pub_key_sig: data.own_pub_key_sig,
            })
            .collect(),
    })
}

/// Arbitrate one complaint; a complaint that holds up fails the whole DKG
fn judge(
    suite: &Suite,
    infos: &[Round1Info],
    round2: &[Vec<EncSecretShare>],
    complaint: &Complaint,
) -> Result<()> {
    let complainant = infos
        .get(complaint.complainant.index())
        .ok_or(Error::MemberNotFound(complaint.complainant))?;
    let accused = infos
        .get(complaint.accused.index())
        .ok_or(Error::MemberNotFound(complaint.accused))?;
    let sent = round2
        .get(complaint.accused.index())
        .ok_or(Error::MemberNotFound(complaint.accused))?;
    let enc_share = share_for(complaint.complainant, complaint.accused, sent)?;

    let verdict = judge_complaint(
        suite,
        complaint,
        &complainant.one_time_pub_key,
        &accused.one_time_pub_key,
        enc_share,
        &accused.coefficient_commits,
    )?;
    warn!(
        complainant = %complaint.complainant,
        accused = %complaint.accused,
        ?verdict,
        "Complaint judged"
    );
    match verdict {
        ComplaintVerdict::AccusedMisbehaved => Err(Error::InvalidSecretShare(complaint.accused)),
        ComplaintVerdict::ComplainantMisbehaved => Ok(()),
    }
}

fn report(valid_submissions: usize, complaints: usize) -> RoundReport {
    RoundReport {
        valid_submissions,
        complaints,
    }
}

fn ensure_running(status: DkgStatus, round: &str) -> Result<()> {
    if status == DkgStatus::Failed {
        return Err(Error::DkgFailed(format!("{round} submissions missing or invalid")));
    }
    Ok(())
}

impl LocalGroup {
    pub fn member(&self, mid: MemberId) -> Result<&LocalMember> {
        self.members
            .iter()
            .find(|m| m.member_id == mid)
            .ok_or(Error::MemberNotFound(mid))
    }

    /// Sign `message` with the given members and return the verified
    /// group signature
    #[instrument(skip(self, message, rng))]
    pub fn sign(
        &self,
        message: &[u8],
        members: &[MemberId],
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Signature> {
        if members.len() < self.config.threshold {
            return Err(Error::InvalidLength {
                expected: self.config.threshold,
                actual: members.len(),
            });
        }

        let signers = members
            .iter()
            .map(|mid| self.member(*mid))
            .collect::<Result<Vec<_>>>()?;
        let nonce_pairs = generate_nonce_pairs(signers.len(), rng)?;

        let assignments: Vec<Assignment> = signers
            .iter()
            .zip(&nonce_pairs)
            .map(|(member, pair)| Assignment {
                member_id: member.member_id,
                public_key: member.public_key,
                nonce_pair: pair.public(),
            })
            .collect();
        let session = SigningSession::new(&self.suite, message, self.group_public_key, &assignments)?;

        let partials = signers
            .iter()
            .zip(&nonce_pairs)
            .map(|(member, pair)| {
                session.sign(&self.suite, member.member_id, pair, &member.private_key)
            })
            .collect::<Result<Vec<_>>>()?;

        let signature = session.combine(&self.suite, &partials)?;
        info!(signature = hex::encode(signature.to_bytes()), "Group signature produced");
        Ok(signature)
    }
}
