//! # Serve Subcommand
//!
//! Runs a node: one TCP connection is one protocol stream, handled on its
//! own task by a shared [`ProtocolHandler`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use agora_core::Did;
use agora_firewall::{Firewall, PolicyGate};
use agora_protocol::{AgentCard, ProtocolHandler, ToolExecutor};
use agora_session::{spawn_cleanup_task, SessionStore};
use agora_zkp::ResponseAttester;

use crate::attestation::card_attestation;
use crate::config::NodeConfig;
use crate::tools::BuiltinTools;

/// Arguments for `agora serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Issue a session for this peer at startup and print its token.
    /// Repeatable.
    #[arg(long = "peer", value_name = "DID")]
    pub peers: Vec<Did>,

    /// Listen address, overriding the configuration.
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,
}

/// Everything a running node shares across connections.
pub struct Node {
    pub handler: ProtocolHandler,
    pub sessions: Arc<SessionStore>,
    pub firewall: Arc<Firewall>,
    pub card: AgentCard,
}

impl Node {
    /// Assemble the node from configuration. `attester` is `None` when no
    /// agent secret is configured.
    pub fn build(config: &NodeConfig, attester: Option<Arc<ResponseAttester>>) -> Result<Self> {
        let local_did = config.require_local_did()?;
        let sessions = Arc::new(
            SessionStore::new(Duration::from_secs(config.session.ttl_secs))
                .context("invalid session TTL")?,
        );

        let mut card = AgentCard::new(config.card.name.clone(), local_did.clone());
        card.description = config.card.description.clone();
        card.version = config.card.version.clone();
        let mut card = BuiltinTools::describe(card);

        let mut firewall = Firewall::new(config.firewall.clone());
        if let Some(attester) = attester {
            card = card.with_attestation(card_attestation(&attester, &local_did)?);
            firewall = firewall.with_attester(attester);
        }

        let firewall = Arc::new(firewall);
        let gate: Arc<dyn PolicyGate> = Arc::clone(&firewall) as Arc<dyn PolicyGate>;
        let executor: Arc<dyn ToolExecutor> = Arc::new(BuiltinTools);
        let handler = ProtocolHandler::new(local_did, Arc::clone(&sessions), gate, executor)
            .with_card_provider(Arc::new(card.clone()))
            .with_max_message_bytes(config.max_message_bytes);

        Ok(Self {
            handler,
            sessions,
            firewall,
            card,
        })
    }
}

/// Execute `agora serve`. Runs until interrupted.
pub async fn run_serve(args: &ServeArgs, mut config: NodeConfig) -> Result<u8> {
    if let Some(listen) = &args.listen {
        config.listen_addr = listen.clone();
    }

    let attester = match config.agent_secret()? {
        Some(secret) => {
            tracing::info!("generating attestation keys");
            let attester = tokio::task::spawn_blocking(move || ResponseAttester::setup(secret))
                .await
                .context("attestation setup task panicked")?
                .context("attestation setup failed")?;
            Some(Arc::new(attester))
        }
        None => {
            tracing::warn!("no agent secret configured; responses will not be attested");
            None
        }
    };

    let node = Node::build(&config, attester)?;

    for peer in &args.peers {
        let session = node
            .sessions
            .create(peer, false)
            .with_context(|| format!("failed to issue session for {peer}"))?;
        println!("session {peer} {}", session.token);
    }

    let cleanup_interval = Duration::from_secs(config.session.cleanup_interval_secs);
    let sweeper = spawn_cleanup_task(Arc::clone(&node.sessions), cleanup_interval)?;
    let limiter_sweeper = spawn_rate_limit_sweeper(Arc::clone(&node.firewall), cleanup_interval);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        did = %node.handler.local_did(),
        attested = node.card.attestation.is_some(),
        "agora node listening"
    );

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    tracing::debug!(remote = %remote, "connection accepted");
                    let handler = node.handler.clone();
                    tokio::spawn(async move { handler.handle_stream(stream).await });
                }
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    sweeper.abort();
    limiter_sweeper.abort();
    Ok(0)
}

/// Prune idle peers from the firewall's rate limiter every `interval`.
/// `interval` must be non-zero.
fn spawn_rate_limit_sweeper(firewall: Arc<Firewall>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let tracked = firewall.retain_recent_rate_limits();
            tracing::debug!(tracked, "rate limiter state pruned");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_firewall::AclRule;
    use agora_protocol::{send_request, RequestType, ResponseStatus};
    use serde_json::json;

    fn config() -> NodeConfig {
        let mut config = NodeConfig::from_yaml("local_did: did:key:z6MkServe").unwrap();
        config.firewall.rules.push(AclRule::allow("*", &["echo"]));
        config
    }

    #[test]
    fn node_without_secret_publishes_no_attestation() {
        let node = Node::build(&config(), None).unwrap();
        assert!(node.card.attestation.is_none());
        assert_eq!(node.card.did.as_str(), "did:key:z6MkServe");
        assert_eq!(node.card.capabilities, vec!["echo".to_string()]);
    }

    #[test]
    fn node_requires_local_did() {
        assert!(Node::build(&NodeConfig::default(), None).is_err());
    }

    #[tokio::test]
    async fn rules_added_to_node_firewall_reach_the_handler() {
        let config = NodeConfig::from_yaml("local_did: did:key:z6MkServe").unwrap();
        let node = Node::build(&config, None).unwrap();
        let token = node
            .sessions
            .create(&Did::new("did:key:caller").unwrap(), false)
            .unwrap()
            .token;

        let invoke = |handler: ProtocolHandler, token: String| async move {
            let (mut client, server) = tokio::io::duplex(64 * 1024);
            let served = tokio::spawn(async move { handler.handle_stream(server).await });
            let payload = json!({"toolName": "echo"}).as_object().cloned().unwrap();
            let resp = send_request(&mut client, RequestType::ToolInvoke, &token, payload)
                .await
                .unwrap();
            served.await.unwrap();
            resp
        };

        let denied = invoke(node.handler.clone(), token.clone()).await;
        assert_eq!(denied.status, ResponseStatus::Denied);

        node.firewall.add_rule(AclRule::allow("did:key:caller", &["echo"]));
        let allowed = invoke(node.handler.clone(), token).await;
        assert_eq!(allowed.status, ResponseStatus::Ok);
    }

    #[tokio::test]
    async fn node_serves_echo_over_tcp() {
        let node = Node::build(&config(), None).unwrap();
        let peer = Did::new("did:key:caller").unwrap();
        let token = node.sessions.create(&peer, false).unwrap().token;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handler = node.handler.clone();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            handler.handle_stream(stream).await;
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let payload = json!({"toolName": "echo", "params": {"msg": "hi"}})
            .as_object()
            .cloned()
            .unwrap();
        let resp = send_request(&mut stream, RequestType::ToolInvoke, &token, payload)
            .await
            .unwrap();
        assert_eq!(resp.status, ResponseStatus::Ok);
        assert_eq!(resp.result, Some(json!({"msg": "hi"})));
    }
}
