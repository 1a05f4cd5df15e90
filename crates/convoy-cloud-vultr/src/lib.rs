//! Convoy Vultr Platform
//!
//! Reconciles scripts, firewall groups and servers against the Vultr v2 API.
//!
//! ## Requirements
//!
//! - `VULTR_API_KEY` set to a personal access token
//! - `VULTR_API_URL` optionally pointing at another endpoint
//!
//! ## Layout
//!
//! - [`client`]: HTTP client implementing [`ResourceDirectory`]
//! - [`resolver`]: human-readable names → provider ids
//! - [`reconcile`]: per-entity create / update / replace / delete decisions
//! - [`provider`]: the [`convoy_cloud::Platform`] implementation

pub mod client;
pub mod directory;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod fake;

pub use client::{VultrClient, VultrConfig};
pub use directory::ResourceDirectory;
pub use error::{Result, VultrError};
pub use provider::VultrPlatform;
pub use reconcile::Reconciler;
pub use resolver::{OsAttachment, OsResolution, Pending, Resolver};
