//! # convoy-core
//!
//! Configuration side of convoy: the YAML document tree, typed accessors,
//! entities, their parsers and the loader that fills an [`Infrastructure`]
//! container from a document.
//!
//! ```no_run
//! use convoy_core::{Registry, load_str};
//!
//! let infra = load_str("servers: []\n", &Registry::with_defaults()).unwrap();
//! assert!(infra.is_empty());
//! ```

pub mod accessor;
pub mod document;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;

pub use document::{Node, NodeKind, parse_yaml};
pub use error::{ConfigError, Result, Violation};
pub use loader::{
    EntityParser, Registry, TagAction, load_file, load_infrastructure, load_str, platform_name,
    read_document,
};
pub use model::*;
pub use parser::{parse_firewall, parse_firewall_rule, parse_script, parse_server};
