//! Entity model
//!
//! Entities are validated on construction; fields are only reachable through
//! accessors so an entity that exists is always well formed.

mod firewall;
mod infrastructure;
mod script;
mod server;

pub use firewall::{Firewall, FirewallRule, IpVersion, PortSpec, Protocol, RuleSource};
pub use infrastructure::{Entity, EntityKind, Infrastructure};
pub use script::{Script, ScriptType};
pub use server::{OsParts, OsReference, Plan, Server};
