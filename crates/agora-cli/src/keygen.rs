//! # Keygen Subcommand
//!
//! Generates an agent secret. With `--did`, also prints the agent
//! commitment peers will see in the node's card.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use zeroize::Zeroizing;

use agora_core::Did;
use agora_crypto::SecretKey;

use crate::attestation::identity_hash;

/// Arguments for `agora keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// DID the secret will serve; prints the resulting agentDidHash.
    #[arg(long, value_name = "DID")]
    pub did: Option<Did>,

    /// Write the hex secret to this file instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Execute `agora keygen`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let secret = SecretKey::generate().context("failed to generate agent secret")?;

    match &args.out {
        Some(path) => {
            write_secret(path, &secret)?;
            println!("OK: agent secret written to {}", path.display());
        }
        None => println!("secret: {}", Zeroizing::new(secret.to_hex()).as_str()),
    }

    if let Some(did) = &args.did {
        let commitment = agora_zkp::agent_did_hash(&secret, &identity_hash(did))
            .context("failed to derive agent commitment")?;
        println!("agentDidHash: {}", hex::encode(commitment));
    }
    Ok(0)
}

fn write_secret(path: &Path, secret: &SecretKey) -> Result<()> {
    let hex = Zeroizing::new(secret.to_hex());
    std::fs::write(path, hex.as_bytes())
        .with_context(|| format!("failed to write secret: {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_secret_round_trips_through_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.key");
        let args = KeygenArgs {
            did: Some(Did::new("did:key:z6MkKeygen").unwrap()),
            out: Some(path.clone()),
        };
        assert_eq!(run_keygen(&args).unwrap(), 0);

        let mut config = crate::config::NodeConfig::default();
        config.agent_secret_path = Some(path);
        let secret = config.agent_secret().unwrap().unwrap();
        assert_eq!(secret.to_hex().len(), 64);
    }

    #[cfg(unix)]
    #[test]
    fn secret_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.key");
        write_secret(&path, &SecretKey::from_bytes([1u8; 32])).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
