//! Platform loader
//!
//! Walks the top-level keys of a document and hands each one to the parser
//! registered for it. Unknown keys fail the load.

use crate::accessor::{entry_sequence, get_scalar};
use crate::document::{Node, parse_yaml};
use crate::error::{ConfigError, Result};
use crate::model::{Entity, EntityKind, Infrastructure};
use crate::parser::{parse_firewall, parse_script, parse_server};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Parses one sequence item into an entity.
pub type EntityParser = fn(&Node) -> Result<Entity>;

/// What the loader does with a top-level key.
#[derive(Clone, Copy)]
pub enum TagAction {
    /// Accepted and skipped (e.g. `platform`, provider options).
    Ignore,
    /// A sequence whose items are parsed as `kind`.
    Sequence { kind: EntityKind, parse: EntityParser },
}

/// Tag → action map.
///
/// Platforms extend the defaults through their own `register_tags` hook
/// rather than touching the loader.
#[derive(Clone, Default)]
pub struct Registry {
    actions: HashMap<String, TagAction>,
}

impl Registry {
    /// An empty registry; every tag is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// `platform`, `scripts`, `firewalls` and `servers`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("platform", TagAction::Ignore);
        registry.register(
            EntityKind::Script.tag(),
            TagAction::Sequence {
                kind: EntityKind::Script,
                parse: |node| parse_script(node).map(Entity::Script),
            },
        );
        registry.register(
            EntityKind::Firewall.tag(),
            TagAction::Sequence {
                kind: EntityKind::Firewall,
                parse: |node| parse_firewall(node).map(Entity::Firewall),
            },
        );
        registry.register(
            EntityKind::Server.tag(),
            TagAction::Sequence {
                kind: EntityKind::Server,
                parse: |node| parse_server(node).map(Entity::Server),
            },
        );
        registry
    }

    /// Adds or replaces the action for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, action: TagAction) {
        self.actions.insert(tag.into(), action);
    }

    pub fn get(&self, tag: &str) -> Option<TagAction> {
        self.actions.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.actions.contains_key(tag)
    }
}

/// Value of the top-level `platform` key, if set.
pub fn platform_name(doc: &Node) -> Result<Option<String>> {
    let name = get_scalar(doc, "platform", "", false)?;
    Ok(if name.trim().is_empty() {
        None
    } else {
        Some(name.trim().to_string())
    })
}

/// Builds the infrastructure container from a parsed document.
///
/// Fails on the first error; no partial container is returned. Two entities
/// of one kind may not share a natural key: a script or firewall name, or a
/// server's region and label.
#[instrument(skip_all)]
pub fn load_infrastructure(doc: &Node, registry: &Registry) -> Result<Infrastructure> {
    if !doc.is_mapping() {
        return Err(ConfigError::TypeMismatch {
            key: "<root>".to_string(),
            line: doc.line,
            expected: "a mapping",
        });
    }

    let mut infra = Infrastructure::new();
    let mut seen: HashMap<(EntityKind, String), usize> = HashMap::new();
    for entry in doc.entries() {
        let action = registry.get(&entry.key).ok_or_else(|| ConfigError::UnknownTag {
            tag: entry.key.clone(),
            line: entry.line,
        })?;

        match action {
            TagAction::Ignore => debug!(tag = %entry.key, "Ignoring tag"),
            TagAction::Sequence { kind, parse } => {
                infra.declare(kind);
                let items = entry_sequence(entry)?.unwrap_or_default();
                debug!(tag = %entry.key, count = items.len(), "Parsing entities");
                for item in items {
                    let entity = parse(item)?;
                    if let Some(first) = seen.insert((entity.kind(), entity.name()), item.line) {
                        return Err(ConfigError::ConfigurationConflict {
                            key: entity.key_field().to_string(),
                            line: item.line,
                            message: format!(
                                "duplicate {} '{}', first declared on line {}",
                                entity.kind(),
                                entity.name(),
                                first
                            ),
                        });
                    }
                    infra.push(entity);
                }
            }
        }
    }

    info!(entities = infra.len(), "Infrastructure loaded");
    Ok(infra)
}

/// Parses YAML text and loads it.
pub fn load_str(content: &str, registry: &Registry) -> Result<Infrastructure> {
    let doc = parse_yaml(content)?;
    load_infrastructure(&doc, registry)
}

/// Reads a file into a document tree.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn read_document(path: &Path) -> Result<Node> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(bytes = content.len(), "Read configuration");
    parse_yaml(&content)
}

/// Reads, parses and loads a file.
pub fn load_file(path: &Path, registry: &Registry) -> Result<Infrastructure> {
    let doc = read_document(path)?;
    load_infrastructure(&doc, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Script;
    use std::io::Write;

    const DOCUMENT: &str = r#"
platform: vultr
servers:
  - region: Atlanta
    label: b
    os: { name: Debian }
    plan: { cpu: 1, memory: 1024, type: SSD }
  - region: Atlanta
    label: a
    os: { name: Debian }
    plan: { cpu: 1, memory: 1024, type: SSD }
scripts:
  - { name: boot, type: boot, content: echo }
"#;

    #[test]
    fn test_load_keeps_document_order() {
        let infra = load_str(DOCUMENT, &Registry::with_defaults()).unwrap();
        let kinds: Vec<_> = infra.types().collect();
        assert_eq!(kinds, vec![EntityKind::Server, EntityKind::Script]);
        let labels: Vec<_> = infra.servers().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["b", "a"]);
        assert_eq!(infra.scripts().map(Script::name).collect::<Vec<_>>(), vec!["boot"]);
    }

    #[test]
    fn test_unknown_tag_names_tag_and_line() {
        let err = load_str("platform: vultr\nbogus: 1\n", &Registry::with_defaults()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownTag {
                tag: "bogus".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_registry_extension() {
        let mut registry = Registry::with_defaults();
        assert!(load_str("vultr: { hint: 1 }\n", &registry).is_err());
        registry.register("vultr", TagAction::Ignore);
        let infra = load_str("vultr: { hint: 1 }\n", &registry).unwrap();
        assert!(infra.is_empty());
    }

    #[test]
    fn test_empty_registry_rejects_everything() {
        let err = load_str("platform: vultr\n", &Registry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTag { .. }));
    }

    #[test]
    fn test_parse_failure_is_whole_document() {
        let yaml = "scripts:\n  - { name: ok, type: boot }\n  - { name: bad, type: nope }\n";
        let err = load_str(yaml, &Registry::with_defaults()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnumValue { line: 3, .. }));
    }

    fn conflict(yaml: &str) -> (String, usize, String) {
        match load_str(yaml, &Registry::with_defaults()).unwrap_err() {
            ConfigError::ConfigurationConflict { key, line, message } => (key, line, message),
            other => panic!("expected a conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_script_name_is_rejected() {
        let (key, line, message) = conflict(
            "scripts:\n  - { name: boot, type: boot, content: a }\n  - { name: boot, type: boot, content: b }\n",
        );
        assert_eq!(key, "name");
        assert_eq!(line, 3);
        assert_eq!(message, "duplicate script 'boot', first declared on line 2");
    }

    #[test]
    fn test_duplicate_firewall_name_is_rejected() {
        let yaml = r#"
firewalls:
  - name: ssh
    rules: [{ protocol: tcp, port: 22, source: 0.0.0.0/0 }]
  - name: ssh
    rules: [{ protocol: tcp, port: 2222, source: 0.0.0.0/0 }]
"#;
        let (key, line, message) = conflict(yaml);
        assert_eq!(key, "name");
        assert_eq!(line, 5);
        assert!(message.contains("firewall 'ssh'"));
    }

    #[test]
    fn test_duplicate_server_label_in_region_is_rejected() {
        let yaml = r#"
servers:
  - region: Atlanta
    label: web
    os: { name: Debian }
    plan: { cpu: 1, memory: 1024, type: SSD }
  - region: Amsterdam
    label: web
    os: { name: Debian }
    plan: { cpu: 1, memory: 1024, type: SSD }
  - region: Atlanta
    label: web
    os: { name: Debian }
    plan: { cpu: 2, memory: 4096, type: SSD }
"#;
        let (key, line, message) = conflict(yaml);
        assert_eq!(key, "label");
        assert_eq!(line, 11);
        assert!(message.contains("server 'Atlanta/web'"));
    }

    #[test]
    fn test_two_unlabeled_servers_in_one_region_conflict() {
        let yaml = r#"
servers:
  - region: Atlanta
    os: { name: Debian }
    plan: { cpu: 1, memory: 1024, type: SSD }
  - region: Atlanta
    os: { name: Debian }
    plan: { cpu: 1, memory: 1024, type: SSD }
"#;
        let (key, line, _) = conflict(yaml);
        assert_eq!(key, "label");
        assert_eq!(line, 6);
    }

    #[test]
    fn test_names_may_repeat_across_kinds() {
        let yaml = "scripts:\n  - { name: web, type: boot }\nfirewalls:\n  - name: web\n    rules: [{ protocol: icmp, source: 0.0.0.0/0 }]\n";
        let infra = load_str(yaml, &Registry::with_defaults()).unwrap();
        assert_eq!(infra.len(), 2);
    }

    #[test]
    fn test_repeated_section_is_rejected() {
        let yaml = "scripts:\n  - { name: a, type: boot }\nscripts:\n  - { name: b, type: boot }\n";
        let err = load_str(yaml, &Registry::with_defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConfigurationConflict { ref key, line: 3, .. } if key == "scripts"
        ));
    }

    #[test]
    fn test_empty_sections() {
        let infra = load_str("servers:\nfirewalls: ''\n", &Registry::with_defaults()).unwrap();
        assert!(infra.is_empty());
        assert_eq!(infra.types().count(), 2);
    }

    #[test]
    fn test_non_mapping_root() {
        let err = load_str("- a\n", &Registry::with_defaults()).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { ref key, .. } if key == "<root>"));
    }

    #[test]
    fn test_platform_name() {
        assert_eq!(
            platform_name(&parse_yaml("platform: vultr\n").unwrap()).unwrap(),
            Some("vultr".to_string())
        );
        assert_eq!(platform_name(&parse_yaml("servers: []\n").unwrap()).unwrap(), None);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();
        let infra = load_file(file.path(), &Registry::with_defaults()).unwrap();
        assert_eq!(infra.len(), 3);

        let err = load_file(Path::new("/nonexistent/convoy.yml"), &Registry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
