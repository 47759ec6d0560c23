//! The session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_core::Did;

/// An authenticated peer session.
///
/// Owned by the [`SessionStore`](crate::SessionStore); callers always
/// receive clones. `Debug` redacts the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub peer_did: Did,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Whether the handshake that created this session included a ZK
    /// identity proof.
    pub zk_verified: bool,
}

impl Session {
    /// Expired iff `now` is strictly after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer_did", &self.peer_did)
            .field("token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("zk_verified", &self.zk_verified)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            peer_did: Did::new("did:key:peer").unwrap(),
            token: "deadbeef".into(),
            created_at: expires_at - Duration::hours(1),
            expires_at,
            zk_verified: false,
        }
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let at = Utc::now();
        let s = session(at);
        assert!(!s.is_expired_at(at));
        assert!(s.is_expired_at(at + Duration::milliseconds(1)));
    }

    #[test]
    fn debug_hides_token() {
        let s = session(Utc::now());
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("deadbeef"));
        assert!(dbg.contains("did:key:peer"));
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let v = serde_json::to_value(session(Utc::now())).unwrap();
        for key in ["peerDid", "token", "createdAt", "expiresAt", "zkVerified"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }
}
