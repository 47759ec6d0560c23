//! # agora-session — Peer Session Store
//!
//! Turns a one-time handshake into a reusable bearer credential. After a
//! peer authenticates out of band, [`SessionStore::create`] issues an
//! HMAC-derived token bound to that peer's DID. Every subsequent request
//! presents the token, and the store answers "is this still a live session,
//! and for whom?" in constant time with respect to the token bytes.
//!
//! ## Invariants
//!
//! - At most one live session per peer DID. Re-creating replaces the old
//!   session and invalidates its token immediately.
//! - A session is expired iff `now > expiresAt`. Expired sessions are
//!   never returned by any read.
//! - The store never schedules itself. Expired entries are evicted lazily on
//!   read, by [`SessionStore::cleanup`], or by the optional
//!   [`spawn_cleanup_task`] sweeper.

pub mod clock;
pub mod error;
pub mod session;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use session::Session;
pub use store::{SessionStore, DEFAULT_SESSION_TTL};
pub use sweeper::{spawn_cleanup_task, DEFAULT_CLEANUP_INTERVAL};
