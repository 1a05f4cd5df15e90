//! Typed, validating reads over the document tree
//!
//! All accessors take the parent mapping and a key. An absent key and a key
//! whose value is null are treated alike. Errors carry the key and the line
//! of the entry (or of the parent when the key is missing).

use crate::document::{Entry, Node, NodeKind};
use crate::error::{ConfigError, Result};

const BOOL_EXPECTED: &str = "a boolean (yes/no, true/false, on/off, y/n)";

/// Line of `key` within `node`, falling back to the node's own line.
pub fn line_of(node: &Node, key: &str) -> usize {
    node.entry(key).map(|e| e.line).unwrap_or(node.line)
}

/// Returns true if `key` is present with a non-null value.
pub fn is_set(node: &Node, key: &str) -> bool {
    present(node, key).is_some()
}

fn present<'a>(node: &'a Node, key: &str) -> Option<(&'a Node, usize)> {
    let entry = node.entry(key)?;
    if entry.value.is_null() {
        None
    } else {
        Some((&entry.value, entry.line))
    }
}

fn missing(node: &Node, key: &str) -> ConfigError {
    ConfigError::MissingKey {
        key: key.to_string(),
        line: node.line,
    }
}

/// Reads a scalar.
///
/// Absent and optional returns `default`; absent and required is
/// `MissingKey`; a non-scalar value is `TypeMismatch`.
pub fn get_scalar(node: &Node, key: &str, default: &str, required: bool) -> Result<String> {
    match present(node, key) {
        None if required => Err(missing(node, key)),
        None => Ok(default.to_string()),
        Some((value, line)) => value
            .as_scalar()
            .map(str::to_string)
            .ok_or_else(|| ConfigError::TypeMismatch {
                key: key.to_string(),
                line,
                expected: "a scalar",
            }),
    }
}

/// Reads an integer scalar.
pub fn get_int(node: &Node, key: &str, default: i64, required: bool) -> Result<i64> {
    if !is_set(node, key) {
        return if required {
            Err(missing(node, key))
        } else {
            Ok(default)
        };
    }
    let raw = get_scalar(node, key, "", true)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::ValueFormat {
            key: key.to_string(),
            line: line_of(node, key),
            message: format!("'{}' is not an integer", raw),
        })
}

/// Reads a boolean scalar using the YAML 1.1 word forms.
pub fn get_bool(node: &Node, key: &str, default: bool, required: bool) -> Result<bool> {
    if !is_set(node, key) {
        return if required {
            Err(missing(node, key))
        } else {
            Ok(default)
        };
    }
    let raw = get_scalar(node, key, "", true)?;
    parse_bool(&raw).ok_or_else(|| ConfigError::TypeMismatch {
        key: key.to_string(),
        line: line_of(node, key),
        expected: BOOL_EXPECTED,
    })
}

/// Boolean grammar shared by [`get_bool`].
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "y" | "yes" => Some(true),
        "off" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Reads a nested mapping.
pub fn get_mapping<'a>(node: &'a Node, key: &str, required: bool) -> Result<Option<&'a Node>> {
    match present(node, key) {
        None if required => Err(missing(node, key)),
        None => Ok(None),
        Some((value, _)) if value.is_mapping() => Ok(Some(value)),
        Some((_, line)) => Err(ConfigError::TypeMismatch {
            key: key.to_string(),
            line,
            expected: "a mapping",
        }),
    }
}

/// Reads a required nested mapping.
pub fn require_mapping<'a>(node: &'a Node, key: &str) -> Result<&'a Node> {
    get_mapping(node, key, true)?.ok_or_else(|| missing(node, key))
}

/// Reads a nested sequence.
///
/// When optional, an empty scalar (`key: ''`) reads as absent.
pub fn get_sequence<'a>(node: &'a Node, key: &str, required: bool) -> Result<Option<&'a [Node]>> {
    match present(node, key) {
        None if required => Err(missing(node, key)),
        None => Ok(None),
        Some((value, line)) => sequence_items(value, key, line, required),
    }
}

/// Reads the value of an entry already in hand as an optional sequence.
pub fn entry_sequence(entry: &Entry) -> Result<Option<&[Node]>> {
    if entry.value.is_null() {
        return Ok(None);
    }
    sequence_items(&entry.value, &entry.key, entry.line, false)
}

fn sequence_items<'a>(
    value: &'a Node,
    key: &str,
    line: usize,
    required: bool,
) -> Result<Option<&'a [Node]>> {
    match &value.kind {
        NodeKind::Sequence(items) => Ok(Some(items)),
        NodeKind::Scalar { value: text, .. } if text.is_empty() && !required => Ok(None),
        _ => Err(ConfigError::TypeMismatch {
            key: key.to_string(),
            line,
            expected: "a sequence",
        }),
    }
}

/// Reads a required nested sequence.
pub fn require_sequence<'a>(node: &'a Node, key: &str) -> Result<&'a [Node]> {
    get_sequence(node, key, true)?.ok_or_else(|| missing(node, key))
}

/// Best-effort list of strings; absent, null or non-sequence values give an
/// empty list and non-scalar items are skipped.
pub fn get_list(node: &Node, key: &str) -> Vec<String> {
    node.get(key)
        .and_then(Node::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(Node::as_scalar)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Reads a value that may be either a plain string or structured data.
///
/// A scalar is returned verbatim; anything else is flattened to compact JSON.
pub fn get_json(node: &Node, key: &str, required: bool) -> Result<Option<String>> {
    match present(node, key) {
        None if required => Err(missing(node, key)),
        None => Ok(None),
        Some((value, _)) => match value.as_scalar() {
            Some(text) => Ok(Some(text.to_string())),
            None => Ok(Some(value.to_json().to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_yaml;

    fn doc(yaml: &str) -> Node {
        parse_yaml(yaml).unwrap()
    }

    #[test]
    fn test_get_scalar_default_and_required() {
        let node = doc("name: web\nempty:\n");
        assert_eq!(get_scalar(&node, "name", "", true).unwrap(), "web");
        assert_eq!(get_scalar(&node, "label", "dflt", false).unwrap(), "dflt");
        assert_eq!(get_scalar(&node, "empty", "dflt", false).unwrap(), "dflt");

        let err = get_scalar(&node, "label", "", true).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKey {
                key: "label".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_get_scalar_type_mismatch_names_line() {
        let node = doc("name: web\nregion:\n  city: Atlanta\n");
        let err = get_scalar(&node, "region", "", true).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { ref key, line: 2, .. } if key == "region"));
    }

    #[test]
    fn test_get_int() {
        let node = doc("cpu: 2\nmemory: lots\n");
        assert_eq!(get_int(&node, "cpu", 0, true).unwrap(), 2);
        assert_eq!(get_int(&node, "disk", 25, false).unwrap(), 25);

        let err = get_int(&node, "memory", 0, true).unwrap_err();
        assert!(matches!(err, ConfigError::ValueFormat { line: 2, .. }));
    }

    #[test]
    fn test_get_bool_grammar() {
        let node = doc("a: yes\nb: Off\nc: y\nd: FALSE\ne: maybe\n");
        assert!(get_bool(&node, "a", false, true).unwrap());
        assert!(!get_bool(&node, "b", true, true).unwrap());
        assert!(get_bool(&node, "c", false, true).unwrap());
        assert!(!get_bool(&node, "d", true, true).unwrap());
        assert!(get_bool(&node, "missing", true, false).unwrap());

        let err = get_bool(&node, "e", false, true).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { line: 5, .. }));
    }

    #[test]
    fn test_get_mapping() {
        let node = doc("os:\n  name: Debian\nplan: small\n");
        let os = get_mapping(&node, "os", true).unwrap().unwrap();
        assert_eq!(os.get("name").unwrap().as_scalar(), Some("Debian"));
        assert!(get_mapping(&node, "absent", false).unwrap().is_none());
        assert!(matches!(
            get_mapping(&node, "plan", true).unwrap_err(),
            ConfigError::TypeMismatch { line: 3, .. }
        ));
    }

    #[test]
    fn test_get_sequence_empty_scalar_is_absent() {
        let node = doc("rules: ''\nitems: [a, b]\n");
        assert!(get_sequence(&node, "rules", false).unwrap().is_none());
        assert!(matches!(
            get_sequence(&node, "rules", true).unwrap_err(),
            ConfigError::TypeMismatch { .. }
        ));
        assert_eq!(get_sequence(&node, "items", true).unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_get_list_is_best_effort() {
        let node = doc("keys: [a, {x: 1}, b]\nscalar: nope\n");
        assert_eq!(get_list(&node, "keys"), vec!["a", "b"]);
        assert!(get_list(&node, "scalar").is_empty());
        assert!(get_list(&node, "absent").is_empty());
    }

    #[test]
    fn test_get_json() {
        let node = doc("plain: '#!/bin/sh'\nnested:\n  b: 1\n  a: [x]\n");
        assert_eq!(
            get_json(&node, "plain", false).unwrap().as_deref(),
            Some("#!/bin/sh")
        );
        assert_eq!(
            get_json(&node, "nested", false).unwrap().as_deref(),
            Some(r#"{"a":["x"],"b":1}"#)
        );
        assert_eq!(get_json(&node, "absent", false).unwrap(), None);
    }
}
