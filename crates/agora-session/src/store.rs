//! # Session Store
//!
//! In-memory map of peer DID to [`Session`] with a secondary index from
//! token to peer DID so inbound requests that carry only a token resolve in
//! O(1).
//!
//! ## Security Invariant
//!
//! Tokens are `hex(HMAC-SHA256(instance_key, nonce || peer_did))` with a
//! fresh 32-byte nonce per session. The instance key is drawn at
//! construction, never persisted, and zeroized on drop; restarting the
//! process invalidates every outstanding token. Supplied tokens are compared
//! to stored tokens in constant time.
//!
//! ## Locking
//!
//! Reads take the read lock. A read that discovers an expired entry drops
//! the read lock and takes the write lock to evict it, re-checking under the
//! write lock that the entry is still the same expired session so a
//! concurrent `create` for that peer is never undone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use agora_core::Did;
use agora_crypto::{constant_time_eq, random_bytes, SecretKey};

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;
use crate::session::Session;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Default)]
struct Sessions {
    by_peer: HashMap<Did, Session>,
    by_token: HashMap<String, Did>,
}

impl Sessions {
    fn remove_peer(&mut self, peer: &Did) -> Option<Session> {
        let removed = self.by_peer.remove(peer)?;
        self.by_token.remove(&removed.token);
        Some(removed)
    }
}

/// Thread-safe, TTL-bounded session store.
pub struct SessionStore {
    inner: RwLock<Sessions>,
    key: SecretKey,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.inner.read().by_peer.len())
            .field("ttl", &self.ttl)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SessionStore {
    /// Create a store with a fresh random key and the system clock.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidTtl`] for a zero or unrepresentable TTL;
    /// [`SessionError::TokenDerivation`] if the key cannot be generated.
    pub fn new(ttl: Duration) -> Result<Self, SessionError> {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a store driven by `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, SessionError> {
        if ttl.is_zero() {
            return Err(SessionError::InvalidTtl("ttl must be greater than zero".into()));
        }
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| SessionError::InvalidTtl(e.to_string()))?;
        Ok(Self {
            inner: RwLock::new(Sessions::default()),
            key: SecretKey::generate()?,
            ttl,
            clock,
        })
    }

    /// Issue a session for `peer_did`, replacing any existing one.
    pub fn create(&self, peer_did: &Did, zk_verified: bool) -> Result<Session, SessionError> {
        let nonce = random_bytes::<32>()?;
        let tag = self.key.mac(&[nonce.as_slice(), peer_did.as_str().as_bytes()])?;
        let now = self.clock.now();
        let session = Session {
            peer_did: peer_did.clone(),
            token: hex::encode(tag),
            created_at: now,
            expires_at: now + self.ttl,
            zk_verified,
        };

        let mut guard = self.inner.write();
        guard.remove_peer(peer_did);
        guard
            .by_token
            .insert(session.token.clone(), peer_did.clone());
        guard.by_peer.insert(peer_did.clone(), session.clone());
        drop(guard);

        tracing::debug!(peer = %peer_did, zk_verified, expires_at = %session.expires_at, "session created");
        Ok(session)
    }

    /// True iff a live session exists for `peer_did` with exactly `token`.
    pub fn validate(&self, peer_did: &Did, token: &str) -> bool {
        let now = self.clock.now();
        let expired_token = {
            let guard = self.inner.read();
            match guard.by_peer.get(peer_did) {
                None => return false,
                Some(s) if !s.is_expired_at(now) => {
                    return constant_time_eq(token.as_bytes(), s.token.as_bytes());
                }
                Some(s) => s.token.clone(),
            }
        };
        self.evict_expired(peer_did, &expired_token);
        false
    }

    /// Resolve a bearer token to its live session.
    ///
    /// Equivalent to scanning [`active_sessions`](Self::active_sessions)
    /// for the first session that validates against `token`.
    pub fn authenticate(&self, token: &str) -> Option<Session> {
        let now = self.clock.now();
        let (peer, expired_token) = {
            let guard = self.inner.read();
            let peer = guard.by_token.get(token)?;
            let session = guard.by_peer.get(peer)?;
            if !constant_time_eq(token.as_bytes(), session.token.as_bytes()) {
                return None;
            }
            if !session.is_expired_at(now) {
                return Some(session.clone());
            }
            (peer.clone(), session.token.clone())
        };
        self.evict_expired(&peer, &expired_token);
        None
    }

    /// The live session for `peer_did`, if any.
    pub fn get(&self, peer_did: &Did) -> Option<Session> {
        let now = self.clock.now();
        let expired_token = {
            let guard = self.inner.read();
            let session = guard.by_peer.get(peer_did)?;
            if !session.is_expired_at(now) {
                return Some(session.clone());
            }
            session.token.clone()
        };
        self.evict_expired(peer_did, &expired_token);
        None
    }

    /// Delete the session for `peer_did`. Idempotent.
    pub fn remove(&self, peer_did: &Did) {
        if self.inner.write().remove_peer(peer_did).is_some() {
            tracing::debug!(peer = %peer_did, "session removed");
        }
    }

    /// Snapshot of all non-expired sessions. Does not evict.
    pub fn active_sessions(&self) -> Vec<Session> {
        let now = self.clock.now();
        self.inner
            .read()
            .by_peer
            .values()
            .filter(|s| !s.is_expired_at(now))
            .cloned()
            .collect()
    }

    /// Remove every expired session and return how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut guard = self.inner.write();
        let expired: Vec<Did> = guard
            .by_peer
            .values()
            .filter(|s| s.is_expired_at(now))
            .map(|s| s.peer_did.clone())
            .collect();
        for peer in &expired {
            guard.remove_peer(peer);
        }
        expired.len()
    }

    /// Resident entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.inner.read().by_peer.len()
    }

    /// True when no entries are resident, expired or not.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_expired(&self, peer_did: &Did, expired_token: &str) {
        let now = self.clock.now();
        let mut guard = self.inner.write();
        let still_same = guard
            .by_peer
            .get(peer_did)
            .is_some_and(|s| s.token == expired_token && s.is_expired_at(now));
        if still_same {
            guard.remove_peer(peer_did);
            tracing::debug!(peer = %peer_did, "expired session evicted");
        }
    }
}
