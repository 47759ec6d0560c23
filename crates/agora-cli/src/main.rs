//! # agora CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agora_cli::attest::{run_attest, AttestArgs};
use agora_cli::call::{run_call, CallArgs};
use agora_cli::config::NodeConfig;
use agora_cli::keygen::{run_keygen, KeygenArgs};
use agora_cli::serve::{run_serve, ServeArgs};

/// Agora: authenticated agent-to-agent requests with attested responses.
#[derive(Parser, Debug)]
#[command(name = "agora", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the node configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a node that serves the agent protocol over TCP.
    Serve(ServeArgs),

    /// Send one request to a node and print the response.
    Call(CallArgs),

    /// Generate an agent secret.
    Keygen(KeygenArgs),

    /// Attestation utilities.
    Attest(AttestArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins when set; otherwise -v picks the level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Serve(args) => match NodeConfig::load(cli.config.as_deref()) {
            Ok(config) => run_serve(&args, config).await,
            Err(e) => Err(e.into()),
        },
        Commands::Call(args) => run_call(&args).await,
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Attest(args) => run_attest(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_serve_with_peers() {
        let cli = Cli::try_parse_from([
            "agora",
            "serve",
            "--peer",
            "did:key:a",
            "--peer",
            "did:key:b",
            "--listen",
            "127.0.0.1:0",
        ])
        .unwrap();
        if let Commands::Serve(args) = cli.command {
            assert_eq!(args.peers.len(), 2);
            assert_eq!(args.peers[1].as_str(), "did:key:b");
            assert_eq!(args.listen.as_deref(), Some("127.0.0.1:0"));
        } else {
            panic!("expected serve");
        }
    }

    #[test]
    fn cli_rejects_invalid_peer_did() {
        assert!(Cli::try_parse_from(["agora", "serve", "--peer", "alice"]).is_err());
    }

    #[test]
    fn cli_parse_call() {
        let cli = Cli::try_parse_from([
            "agora",
            "-vv",
            "call",
            "127.0.0.1:7400",
            "--token",
            "abc",
            "tool_invoke",
            "--tool",
            "echo",
            "--params",
            r#"{"q":1}"#,
            "--verify",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        if let Commands::Call(args) = cli.command {
            assert_eq!(args.addr, "127.0.0.1:7400");
            assert_eq!(args.token, "abc");
            assert_eq!(args.request_type, "tool_invoke");
            assert_eq!(args.tool.as_deref(), Some("echo"));
            assert!(args.verify);
        } else {
            panic!("expected call");
        }
    }

    #[test]
    fn cli_call_requires_token() {
        assert!(Cli::try_parse_from(["agora", "call", "127.0.0.1:7400", "agent_card"]).is_err());
    }

    #[test]
    fn cli_parse_keygen_and_attest() {
        let cli = Cli::try_parse_from(["agora", "keygen", "--did", "did:key:x", "-o", "k.hex"]).unwrap();
        assert!(matches!(cli.command, Commands::Keygen(_)));

        let cli = Cli::try_parse_from([
            "agora",
            "--config",
            "node.yaml",
            "attest",
            "verify",
            "--card",
            "card.json",
            "resp.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("node.yaml")));
        assert!(matches!(cli.command, Commands::Attest(_)));
    }
}
