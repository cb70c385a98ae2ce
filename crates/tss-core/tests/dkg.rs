//! End-to-end DKG, complaint arbitration and signing

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use tss_core::channel::{derive_shared_key, encrypt_secret_share};
use tss_core::hash::Suite;
use tss_core::keygen::{
    compute_encrypted_shares, generate_round1, judge_complaint, process_round3, share_for,
    sign_complaint, verify_complaint, Complaint, ComplaintVerdict, Round1Data, Round1Info,
    Round3Outcome,
};
use tss_core::local::run_dkg;
use tss_core::primitives::EncSecretShare;
use tss_core::sign::verify_group_signature;
use tss_core::{Error, GroupConfig, MemberId, Point, Scalar};

const DKG_CONTEXT: &[u8] = b"dkg-context-for-tests";

fn mid(id: u64) -> MemberId {
    MemberId::new(id).unwrap()
}

/// Rounds 1 and 2 for every member, without any validation
fn rounds_1_and_2(
    suite: &Suite,
    config: &GroupConfig,
    rng: &mut ChaCha20Rng,
) -> (Vec<Round1Data>, Vec<Round1Info>, Vec<Vec<EncSecretShare>>) {
    let round1: Vec<Round1Data> = config
        .members()
        .map(|m| generate_round1(suite, m, config.threshold, DKG_CONTEXT, rng).unwrap())
        .collect();
    let infos: Vec<Round1Info> = round1.iter().map(Round1Data::info).collect();
    let round2 = round1
        .iter()
        .map(|own| {
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
                rng,
            )
            .unwrap()
        })
        .collect();
    (round1, infos, round2)
}

fn shares_to(
    recipient: MemberId,
    config: &GroupConfig,
    round2: &[Vec<EncSecretShare>],
) -> Vec<EncSecretShare> {
    config
        .members()
        .filter(|sender| *sender != recipient)
        .map(|sender| *share_for(recipient, sender, &round2[sender.index()]).unwrap())
        .collect()
}

#[test]
fn dkg_then_sign_with_every_subset() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let suite = Suite::default();
    let config = GroupConfig::new(4, 2).unwrap();
    let group = run_dkg(&suite, &config, DKG_CONTEXT, &mut rng).unwrap();

    assert_eq!(group.members.len(), 4);
    for member in &group.members {
        assert_eq!(member.private_key.public_key(), member.public_key);
    }

    for a in 1..=4 {
        for b in (a + 1)..=4 {
            let signers = [mid(a), mid(b)];
            let signature = group.sign(b"data", &signers, &mut rng).unwrap();
            verify_group_signature(&suite, &group.group_public_key, b"data", &signature).unwrap();
        }
    }

    let all: Vec<MemberId> = config.members().collect();
    let signature = group.sign(b"all members", &all, &mut rng).unwrap();
    verify_group_signature(&suite, &group.group_public_key, b"all members", &signature).unwrap();
}

#[test]
fn signature_rejects_mutations() {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let suite = Suite::default();
    let config = GroupConfig::new(3, 2).unwrap();
    let group = run_dkg(&suite, &config, DKG_CONTEXT, &mut rng).unwrap();

    let signature = group.sign(b"data", &[mid(1), mid(3)], &mut rng).unwrap();
    let key = group.group_public_key;

    assert_eq!(
        verify_group_signature(&suite, &key, b"Data", &signature),
        Err(Error::InvalidSignature)
    );

    let mut tweaked = signature;
    tweaked.s = tweaked.s + Scalar::ONE;
    assert_eq!(
        verify_group_signature(&suite, &key, b"data", &tweaked),
        Err(Error::InvalidSignature)
    );

    // parity byte flip gives -Y
    let mut bytes = key.to_bytes();
    bytes[0] ^= 1;
    let negated = Point::from_bytes(&bytes).unwrap();
    assert_eq!(negated, -key);
    assert_eq!(
        verify_group_signature(&suite, &negated, b"data", &signature),
        Err(Error::InvalidSignature)
    );

    // single-bit flips of x that still land on the curve
    let mut flipped = 0;
    for bit in 0..256 {
        let mut bytes = key.to_bytes();
        bytes[1 + bit / 8] ^= 1 << (bit % 8);
        let Ok(other) = Point::from_bytes(&bytes) else {
            continue;
        };
        assert_eq!(
            verify_group_signature(&suite, &other, b"data", &signature),
            Err(Error::InvalidSignature)
        );
        flipped += 1;
        if flipped == 4 {
            break;
        }
    }
    assert_eq!(flipped, 4);

    let other = run_dkg(&suite, &config, DKG_CONTEXT, &mut rng).unwrap();
    assert_eq!(
        verify_group_signature(&suite, &other.group_public_key, b"data", &signature),
        Err(Error::InvalidSignature)
    );

    let other_suite = Suite::new("another-context");
    assert!(verify_group_signature(&other_suite, &key, b"data", &signature).is_err());
}

#[test]
fn too_few_signers_are_rejected() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let suite = Suite::default();
    let config = GroupConfig::new(3, 3).unwrap();
    let group = run_dkg(&suite, &config, DKG_CONTEXT, &mut rng).unwrap();

    assert_eq!(
        group.sign(b"data", &[mid(1), mid(2)], &mut rng),
        Err(Error::InvalidLength { expected: 3, actual: 2 })
    );
    assert_eq!(
        group.sign(b"data", &[mid(1), mid(2), mid(2)], &mut rng),
        Err(Error::DuplicateMember(mid(2)))
    );
    assert_eq!(
        group.sign(b"data", &[mid(1), mid(2), mid(4)], &mut rng),
        Err(Error::MemberNotFound(mid(4)))
    );
}

#[test]
fn single_member_group() {
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let suite = Suite::default();
    let config = GroupConfig::new(1, 1).unwrap();
    let group = run_dkg(&suite, &config, DKG_CONTEXT, &mut rng).unwrap();

    assert_eq!(group.members[0].public_key, group.group_public_key);
    let signature = group.sign(b"data", &[mid(1)], &mut rng).unwrap();
    verify_group_signature(&suite, &group.group_public_key, b"data", &signature).unwrap();
}

#[test]
fn group_serde_round_trip() {
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let suite = Suite::default();
    let config = GroupConfig::new(2, 2).unwrap();
    let group = run_dkg(&suite, &config, DKG_CONTEXT, &mut rng).unwrap();

    let json = serde_json::to_string(&group).unwrap();
    assert!(json.contains(&hex::encode(group.group_public_key.to_bytes())));
    let restored: tss_core::local::LocalGroup = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, group);

    let signature = restored.sign(b"data", &[mid(1), mid(2)], &mut rng).unwrap();
    verify_group_signature(&suite, &group.group_public_key, b"data", &signature).unwrap();
}

#[test]
fn corrupted_share_is_caught_and_blamed_on_sender() {
    let mut rng = ChaCha20Rng::seed_from_u64(6);
    let suite = Suite::default();
    let config = GroupConfig::new(3, 2).unwrap();
    let (round1, infos, mut round2) = rounds_1_and_2(&suite, &config, &mut rng);

    // member 1 sends member 3 a share that does not match its commitments
    let key_sym =
        derive_shared_key(&round1[0].one_time_priv_key, &infos[2].one_time_pub_key).unwrap();
    let bad = encrypt_secret_share(&Scalar::from_u64(42), &key_sym, &mut rng).unwrap();
    round2[0][1] = bad;

    let victim = mid(3);
    let outcome = process_round3(
        &suite,
        DKG_CONTEXT,
        &round1[2],
        &infos,
        &shares_to(victim, &config, &round2),
        &mut rng,
    )
    .unwrap();
    let complaints = match outcome {
        Round3Outcome::Complaints(complaints) => complaints,
        Round3Outcome::Confirmed(_) => panic!("corrupted share was accepted"),
    };
    assert_eq!(complaints.len(), 1);
    let complaint = &complaints[0];
    assert_eq!(complaint.complainant, victim);
    assert_eq!(complaint.accused, mid(1));
    assert_eq!(complaint.key_sym, key_sym);

    let verdict = judge_complaint(
        &suite,
        complaint,
        &infos[2].one_time_pub_key,
        &infos[0].one_time_pub_key,
        &bad,
        &infos[0].coefficient_commits,
    )
    .unwrap();
    assert_eq!(verdict, ComplaintVerdict::AccusedMisbehaved);

    // the other honest member still confirms
    let outcome = process_round3(
        &suite,
        DKG_CONTEXT,
        &round1[1],
        &infos,
        &shares_to(mid(2), &config, &round2),
        &mut rng,
    )
    .unwrap();
    assert!(matches!(outcome, Round3Outcome::Confirmed(_)));
}

#[test]
fn false_complaint_is_blamed_on_complainant() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let suite = Suite::default();
    let config = GroupConfig::new(2, 2).unwrap();
    let (round1, infos, round2) = rounds_1_and_2(&suite, &config, &mut rng);

    // member 2 accuses member 1 over a correct share
    let (signature, key_sym) = sign_complaint(
        &suite,
        &infos[1].one_time_pub_key,
        &infos[0].one_time_pub_key,
        &round1[1].one_time_priv_key,
        &mut rng,
    )
    .unwrap();
    let complaint = Complaint {
        complainant: mid(2),
        accused: mid(1),
        key_sym,
        signature,
    };
    let honest_share = share_for(mid(2), mid(1), &round2[0]).unwrap();

    assert_eq!(
        verify_complaint(
            &suite,
            &complaint,
            &infos[1].one_time_pub_key,
            &infos[0].one_time_pub_key,
            honest_share,
            &infos[0].coefficient_commits,
        ),
        Err(Error::ValidSecretShare(mid(1)))
    );
    let verdict = judge_complaint(
        &suite,
        &complaint,
        &infos[1].one_time_pub_key,
        &infos[0].one_time_pub_key,
        honest_share,
        &infos[0].coefficient_commits,
    )
    .unwrap();
    assert_eq!(verdict, ComplaintVerdict::ComplainantMisbehaved);

    // a forged shared key breaks the proof
    let forged = Complaint {
        key_sym: Point::GENERATOR,
        ..complaint
    };
    assert_eq!(
        verify_complaint(
            &suite,
            &forged,
            &infos[1].one_time_pub_key,
            &infos[0].one_time_pub_key,
            honest_share,
            &infos[0].coefficient_commits,
        ),
        Err(Error::InvalidComplaintSignature)
    );
}

#[test]
fn round3_rejects_out_of_order_infos() {
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    let suite = Suite::default();
    let config = GroupConfig::new(2, 1).unwrap();
    let (round1, mut infos, round2) = rounds_1_and_2(&suite, &config, &mut rng);
    infos.swap(0, 1);

    let result = process_round3(
        &suite,
        DKG_CONTEXT,
        &round1[0],
        &infos,
        &shares_to(mid(1), &config, &round2),
        &mut rng,
    );
    assert!(matches!(result, Err(Error::InvalidOrder(_))));
}
