//! keyferry-vault: vault node client over OpenDAL
//!
//! The vault service itself (credential handling, secret sharing, quorum) is
//! an external concern; this crate is the thin adapter the rest of the
//! workspace talks to. Records replicate to every configured node on write,
//! and reads take the first node that has the requested id.

pub mod client;
pub mod health;
pub mod operator;

pub use client::{VaultClient, VaultNode};
pub use health::check_health;
pub use operator::{build_operator, NodeConfig};
