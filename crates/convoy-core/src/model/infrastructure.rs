use super::{Firewall, Script, Server};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity a document can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Script,
    Firewall,
    Server,
}

impl EntityKind {
    /// Top-level document tag that declares this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Script => "scripts",
            EntityKind::Firewall => "firewalls",
            EntityKind::Server => "servers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Script => "script",
            EntityKind::Firewall => "firewall",
            EntityKind::Server => "server",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Script(Script),
    Firewall(Firewall),
    Server(Server),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Script(_) => EntityKind::Script,
            Entity::Firewall(_) => EntityKind::Firewall,
            Entity::Server(_) => EntityKind::Server,
        }
    }

    /// Natural key; unique per kind within a document.
    pub fn name(&self) -> String {
        match self {
            Entity::Script(s) => s.name().to_string(),
            Entity::Firewall(f) => f.name().to_string(),
            Entity::Server(s) => s.display_name(),
        }
    }

    /// Document key that distinguishes two entities of the same kind.
    pub fn key_field(&self) -> &'static str {
        match self {
            Entity::Script(_) | Entity::Firewall(_) => "name",
            Entity::Server(_) => "label",
        }
    }
}

/// Entities grouped by kind, in the order kinds first appeared in the
/// document and, within a kind, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Infrastructure {
    entities: IndexMap<EntityKind, Vec<Entity>>,
}

impl Infrastructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.entry(entity.kind()).or_default().push(entity);
    }

    /// Declares a kind without adding entities to it.
    pub fn declare(&mut self, kind: EntityKind) {
        self.entities.entry(kind).or_default();
    }

    pub fn types(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.entities.keys().copied()
    }

    pub fn entities(&self, kind: EntityKind) -> &[Entity] {
        self.entities.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.entities(EntityKind::Server).iter().filter_map(|e| match e {
            Entity::Server(s) => Some(s),
            _ => None,
        })
    }

    pub fn firewalls(&self) -> impl Iterator<Item = &Firewall> {
        self.entities(EntityKind::Firewall)
            .iter()
            .filter_map(|e| match e {
                Entity::Firewall(f) => Some(f),
                _ => None,
            })
    }

    pub fn scripts(&self) -> impl Iterator<Item = &Script> {
        self.entities(EntityKind::Script).iter().filter_map(|e| match e {
            Entity::Script(s) => Some(s),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptType;

    #[test]
    fn test_infrastructure_keeps_order() {
        let mut infra = Infrastructure::new();
        infra.declare(EntityKind::Server);
        infra.push(Entity::Script(
            Script::new("b", ScriptType::Boot, "").unwrap(),
        ));
        infra.push(Entity::Script(
            Script::new("a", ScriptType::Boot, "").unwrap(),
        ));

        let kinds: Vec<_> = infra.types().collect();
        assert_eq!(kinds, vec![EntityKind::Server, EntityKind::Script]);
        let names: Vec<_> = infra.scripts().map(Script::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(infra.len(), 2);
        assert_eq!(infra.servers().count(), 0);
    }

    #[test]
    fn test_entity_kind_tags() {
        assert_eq!(EntityKind::Script.tag(), "scripts");
        assert_eq!(EntityKind::Firewall.tag(), "firewalls");
        assert_eq!(EntityKind::Server.tag(), "servers");
        assert_eq!(EntityKind::Firewall.to_string(), "firewall");
    }
}
