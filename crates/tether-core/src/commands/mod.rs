//! High-level commands for tether operations.
//!
//! These are the entry points frontends call: they resolve paths, load the
//! project configuration and wire the core services together.

pub mod context;
pub mod deploy;
pub mod init;
pub mod plan;

pub use context::ProjectContext;
pub use deploy::{DeployCommand, DeployOptions};
pub use init::{InitCommand, InitOptions, InitReport};
pub use plan::{PlanCommand, PlanEntry, PlanOptions, PlanReport};
