//! Entity parsers
//!
//! One function per entity type, each turning a mapping node into a
//! validated entity. Parsers are pure: they read only the node they are given.

mod firewall;
mod script;
mod server;

pub use firewall::{parse_firewall, parse_firewall_rule};
pub use script::parse_script;
pub use server::parse_server;

use crate::accessor::line_of;
use crate::document::Node;
use crate::error::{ConfigError, Result, Violation};

/// Fails unless `node` is a mapping; `what` names the record in the error.
fn expect_mapping(node: &Node, what: &str) -> Result<()> {
    if node.is_mapping() {
        Ok(())
    } else {
        Err(ConfigError::TypeMismatch {
            key: what.to_string(),
            line: node.line,
            expected: "a mapping",
        })
    }
}

/// Attaches the line of the violated field to a constructor failure.
fn located(node: &Node, violation: Violation) -> ConfigError {
    let line = line_of(node, violation.field());
    violation.at(line)
}

/// Returns whichever spelling of a key the node uses, preferring snake_case.
fn spelled<'a>(node: &Node, snake: &'a str, kebab: &'a str) -> &'a str {
    if node.entry(snake).is_none() && node.entry(kebab).is_some() {
        kebab
    } else {
        snake
    }
}
