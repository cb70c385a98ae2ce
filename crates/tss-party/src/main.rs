//! TSS Party CLI
//!
//! Command-line interface for running a whole threshold group locally:
//! - Distributed Key Generation (DKG)
//! - Threshold signing with a chosen subset of members
//! - Group signature verification

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tss_core::hash::{Suite, CONTEXT_STRING};
use tss_core::local::{run_dkg, LocalGroup};
use tss_core::sign::verify_group_signature;
use tss_core::{GroupConfig, MemberId, Point, Signature};

const GROUP_FILE: &str = "group.json";

/// TSS Party - local threshold Schnorr group
#[derive(Parser)]
#[command(name = "tss-party")]
#[command(about = "Threshold Schnorr signatures over secp256k1, run in one process")]
#[command(version)]
struct Cli {
    /// Data directory for the group file
    #[arg(short, long, env = "TSS_DEST", default_value = "./data")]
    dest: PathBuf,

    /// Hash domain-separation context
    #[arg(long, env = "TSS_CONTEXT", default_value = CONTEXT_STRING)]
    context: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run distributed key generation
    Keygen {
        /// Number of members
        #[arg(short, long)]
        size: usize,

        /// Minimum number of signers
        #[arg(short, long)]
        threshold: usize,

        /// DKG context (hex encoded); random when omitted
        #[arg(long)]
        dkg_context: Option<String>,
    },

    /// Sign a message with a subset of members
    Sign {
        /// Message to sign
        #[arg(short, long)]
        message: String,

        /// Signing member IDs (comma-separated)
        #[arg(long)]
        members: String,
    },

    /// Verify a group signature
    Verify {
        /// Group public key (hex encoded)
        #[arg(short, long)]
        public_key: String,

        /// Signed message
        #[arg(short, long)]
        message: String,

        /// Signature (hex encoded, 65 bytes)
        #[arg(long)]
        signature: String,
    },

    /// Show group info
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let suite = Suite::new(cli.context.clone());

    match cli.command {
        Commands::Keygen {
            size,
            threshold,
            ref dkg_context,
        } => {
            std::fs::create_dir_all(&cli.dest)?;
            run_keygen(&cli.dest, &suite, size, threshold, dkg_context.as_deref())?;
        }
        Commands::Sign {
            ref message,
            ref members,
        } => {
            run_sign(&cli.dest, message, members)?;
        }
        Commands::Verify {
            ref public_key,
            ref message,
            ref signature,
        } => {
            run_verify(&suite, public_key, message, signature)?;
        }
        Commands::Info => {
            show_info(&cli.dest)?;
        }
    }

    Ok(())
}

fn run_keygen(
    dest: &Path,
    suite: &Suite,
    size: usize,
    threshold: usize,
    dkg_context: Option<&str>,
) -> Result<()> {
    let config = GroupConfig::new(size, threshold)?;
    let dkg_context = match dkg_context {
        Some(ctx) => hex::decode(ctx).context("DKG context must be hex")?,
        None => rand::random::<[u8; 32]>().to_vec(),
    };

    info!(
        size,
        threshold,
        dkg_context = hex::encode(&dkg_context),
        "Starting DKG"
    );

    let group = run_dkg(suite, &config, &dkg_context, &mut OsRng)?;

    let group_path = dest.join(GROUP_FILE);
    let json = serde_json::to_string_pretty(&group)?;
    std::fs::write(&group_path, json)?;

    info!(path = ?group_path, "DKG completed, group saved");

    println!(
        "Group Public Key: {}",
        hex::encode(group.group_public_key.to_bytes())
    );

    Ok(())
}

fn run_sign(dest: &Path, message: &str, members_str: &str) -> Result<()> {
    let group = load_group(dest)?;

    let members: Vec<MemberId> = members_str
        .split(',')
        .map(|s| -> Result<MemberId> { Ok(MemberId::new(s.trim().parse()?)?) })
        .collect::<Result<Vec<_>>>()?;

    info!(participants = ?members, msg = message, "Starting signing");

    let signature = group.sign(message.as_bytes(), &members, &mut OsRng)?;

    println!("Signature: {}", hex::encode(signature.to_bytes()));

    Ok(())
}

fn run_verify(suite: &Suite, public_key: &str, message: &str, signature: &str) -> Result<()> {
    let public_key = Point::from_bytes(&hex::decode(public_key).context("public key must be hex")?)?;
    let signature = Signature::from_bytes(&hex::decode(signature).context("signature must be hex")?)?;

    if verify_group_signature(suite, &public_key, message.as_bytes(), &signature).is_err() {
        bail!("signature is not valid for this key and message");
    }

    println!("Signature OK");
    Ok(())
}

fn show_info(dest: &Path) -> Result<()> {
    let group = load_group(dest)?;

    println!("Group Info:");
    println!("  Context: {}", group.suite.context());
    println!("  DKG Context: {}", hex::encode(&group.dkg_context));
    println!("  Size: {}", group.config.size);
    println!("  Threshold: {}", group.config.threshold);
    println!(
        "  Public Key: {}",
        hex::encode(group.group_public_key.to_bytes())
    );
    for member in &group.members {
        println!(
            "  Member {}: {}",
            member.member_id,
            hex::encode(member.public_key.to_bytes())
        );
    }

    Ok(())
}

fn load_group(dest: &Path) -> Result<LocalGroup> {
    let group_path = dest.join(GROUP_FILE);
    let json = std::fs::read_to_string(&group_path)
        .with_context(|| format!("reading {}", group_path.display()))?;
    let group: LocalGroup = serde_json::from_str(&json)?;
    Ok(group)
}
