//! Convoy Cloud
//!
//! Provider-independent half of reconciliation: the [`Platform`] trait the
//! CLI drives, the decision log every run produces, and the equivalence
//! rule platforms use to decide whether a remote resource still matches.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   convoy CLI                     │
//! │        (provision / destroy / validate)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 convoy-cloud                     │
//! │  trait Platform { ... }   ApplyResult / Action   │
//! │  equivalence::compare                            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              convoy-cloud-vultr                  │
//! │   resolvers, reconcilers, REST client            │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod equivalence;
pub mod error;
pub mod provider;

// Re-exports
pub use action::{Action, ActionType, ApplyResult, Summary};
pub use equivalence::{Equivalence, FLOAT_TOLERANCE, FieldCheck, FieldValue, compare};
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, Platform, registry_for};
