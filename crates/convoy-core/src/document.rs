//! Generic document tree
//!
//! Configuration documents are read into a small mapping/sequence/scalar tree
//! that remembers the 1-based source line of every node and mapping key, so
//! that parse errors can point at the offending line.

use crate::error::{ConfigError, Result};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// 1-based line where the node starts.
    pub line: usize,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `~`, `null` or an empty plain scalar.
    Null,
    /// `plain` is false for quoted and block scalars, which are always
    /// strings.
    Scalar { value: String, plain: bool },
    Sequence(Vec<Node>),
    /// Entries in document order.
    Mapping(Vec<Entry>),
}

/// One `key: value` pair of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    /// Line of the key itself.
    pub line: usize,
    pub value: Node,
}

impl Node {
    pub fn null(line: usize) -> Self {
        Self {
            line,
            kind: NodeKind::Null,
        }
    }

    pub fn scalar(line: usize, value: impl Into<String>) -> Self {
        Self {
            line,
            kind: NodeKind::Scalar {
                value: value.into(),
                plain: true,
            },
        }
    }

    pub fn quoted(line: usize, value: impl Into<String>) -> Self {
        Self {
            line,
            kind: NodeKind::Scalar {
                value: value.into(),
                plain: false,
            },
        }
    }

    pub fn sequence(line: usize, items: Vec<Node>) -> Self {
        Self {
            line,
            kind: NodeKind::Sequence(items),
        }
    }

    pub fn mapping(line: usize, entries: Vec<Entry>) -> Self {
        Self {
            line,
            kind: NodeKind::Mapping(entries),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Mapping entries, or an empty slice for any other kind.
    pub fn entries(&self) -> &[Entry] {
        match &self.kind {
            NodeKind::Mapping(entries) => entries,
            _ => &[],
        }
    }

    /// Looks up a mapping entry by key.
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries().iter().find(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entry(key).map(|e| &e.value)
    }

    /// Converts the subtree to JSON.
    ///
    /// Plain scalars that read back identically as integers, floats or
    /// booleans are typed; everything else, quoted scalars included, stays a
    /// string. Object keys come out sorted.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.kind {
            NodeKind::Null => serde_json::Value::Null,
            NodeKind::Scalar { value, plain: true } => scalar_to_json(value),
            NodeKind::Scalar { value, plain: false } => {
                serde_json::Value::String(value.clone())
            }
            NodeKind::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Node::to_json).collect())
            }
            NodeKind::Mapping(entries) => {
                let mut pairs: Vec<(String, serde_json::Value)> = entries
                    .iter()
                    .map(|e| (e.key.clone(), e.value.to_json()))
                    .collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                serde_json::Value::Object(pairs.into_iter().collect())
            }
        }
    }
}

fn scalar_to_json(value: &str) -> serde_json::Value {
    if let Ok(int) = value.parse::<i64>()
        && int.to_string() == value
    {
        return serde_json::Value::from(int);
    }
    if let Ok(float) = value.parse::<f64>()
        && float.is_finite()
        && float.to_string() == value
    {
        return serde_json::Value::from(float);
    }
    match value {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => serde_json::Value::String(value.to_string()),
    }
}

/// Parses the first YAML document in `content` into a [`Node`] tree.
///
/// An empty input yields an empty mapping.
pub fn parse_yaml(content: &str) -> Result<Node> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new(content.chars());
    parser
        .load(&mut builder, false)
        .map_err(|e| ConfigError::Yaml {
            line: e.marker().line(),
            message: e.info().to_string(),
        })?;

    if let Some(error) = builder.error {
        return Err(error);
    }
    Ok(builder.root.unwrap_or_else(|| Node::mapping(1, Vec::new())))
}

enum Frame {
    Sequence {
        line: usize,
        anchor: usize,
        items: Vec<Node>,
    },
    Mapping {
        line: usize,
        anchor: usize,
        entries: Vec<Entry>,
        pending_key: Option<(String, usize)>,
    },
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Node>,
    root: Option<Node>,
    error: Option<ConfigError>,
}

impl TreeBuilder {
    fn fail(&mut self, error: ConfigError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn remember(&mut self, anchor: usize, node: &Node) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
    }

    fn push(&mut self, node: Node) {
        let error = match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
                None
            }
            Some(Frame::Sequence { items, .. }) => {
                items.push(node);
                None
            }
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some((key, line)) => {
                    entries.push(Entry {
                        key,
                        line,
                        value: node,
                    });
                    None
                }
                None => {
                    let line = node.line;
                    let key = match node.kind {
                        NodeKind::Scalar { value, .. } => value,
                        NodeKind::Null => String::new(),
                        _ => {
                            return self.fail(ConfigError::TypeMismatch {
                                key: "<key>".to_string(),
                                line,
                                expected: "a scalar",
                            });
                        }
                    };
                    match entries.iter().find(|e| e.key == key) {
                        Some(first) => Some(ConfigError::ConfigurationConflict {
                            message: format!("duplicate key, first set on line {}", first.line),
                            key,
                            line,
                        }),
                        None => {
                            *pending_key = Some((key, line));
                            None
                        }
                    }
                }
            },
        };
        if let Some(error) = error {
            self.fail(error);
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        let line = mark.line();

        match event {
            Event::Scalar(value, style, anchor, ..) => {
                let is_null = style == TScalarStyle::Plain
                    && matches!(value.as_str(), "" | "~" | "null" | "Null" | "NULL");
                let node = if is_null {
                    Node::null(line)
                } else if style == TScalarStyle::Plain {
                    Node::scalar(line, value)
                } else {
                    Node::quoted(line, value)
                };
                self.remember(anchor, &node);
                self.push(node);
            }
            Event::Alias(anchor) => match self.anchors.get(&anchor).cloned() {
                Some(mut node) => {
                    node.line = line;
                    self.push(node);
                }
                None => self.fail(ConfigError::Yaml {
                    line,
                    message: "alias refers to an unknown anchor".to_string(),
                }),
            },
            Event::SequenceStart(anchor, ..) => self.stack.push(Frame::Sequence {
                line,
                anchor,
                items: Vec::new(),
            }),
            Event::MappingStart(anchor, ..) => self.stack.push(Frame::Mapping {
                line,
                anchor,
                entries: Vec::new(),
                pending_key: None,
            }),
            Event::SequenceEnd | Event::MappingEnd => {
                let node = match self.stack.pop() {
                    Some(Frame::Sequence {
                        line,
                        anchor,
                        items,
                    }) => {
                        let node = Node::sequence(line, items);
                        self.remember(anchor, &node);
                        node
                    }
                    Some(Frame::Mapping {
                        line,
                        anchor,
                        entries,
                        ..
                    }) => {
                        let node = Node::mapping(line, entries);
                        self.remember(anchor, &node);
                        node
                    }
                    None => return,
                };
                self.push(node);
            }
            _ => {}
        }
    }
}
