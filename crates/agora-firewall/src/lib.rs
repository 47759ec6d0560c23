//! # agora-firewall — Policy Gate for Remote Tool Calls
//!
//! The protocol handler consults a [`PolicyGate`] at three points of every
//! `tool_invoke`:
//!
//! 1. **Before execution**: [`PolicyGate::filter_query`] decides whether the
//!    peer may call the tool at all.
//! 2. **After execution**: [`PolicyGate::sanitize_response`] strips
//!    sensitive fields from the result before it is hashed or sent.
//! 3. **Attestation**: [`PolicyGate::attest_response`] produces an opaque
//!    zero-knowledge proof binding the result hash to the local agent.
//!
//! [`Firewall`] is the production implementation: ordered ACL rules with
//! deny-overrides and default deny, an optional per-peer rate limit, a
//! key-fragment [`Redactor`], and an optional [`ResponseAttester`].
//!
//! [`ResponseAttester`]: agora_zkp::ResponseAttester

pub mod acl;
pub mod firewall;
pub mod gate;
pub mod redact;

pub use acl::{AclRule, RuleAction};
pub use firewall::{Firewall, FirewallConfig};
pub use gate::{AttestationError, PolicyDenied, PolicyGate};
pub use redact::{Redactor, DEFAULT_REDACT_KEYS};
