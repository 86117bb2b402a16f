//! Pre-flight checks run before a deployment set is planned.
//!
//! The name-collision check rejects sets that assign one contract to several
//! accounts. The standard-contract check offers to reuse well-known contracts
//! already present on the canonical network instead of deploying a copy.

pub mod conflict;
pub mod standard;

pub use conflict::check_conflicts;
pub use standard::{
    AcceptAll, CANONICAL_NETWORK, DeclineAll, StandardContract, StandardContractPrompt,
    StandardContractRegistry, apply_standard_contracts,
};
