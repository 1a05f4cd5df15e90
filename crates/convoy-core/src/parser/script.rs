use super::{expect_mapping, located};
use crate::accessor::{get_scalar, line_of};
use crate::document::Node;
use crate::error::{ConfigError, Result};
use crate::model::{Script, ScriptType};

/// Parses one `scripts` item.
pub fn parse_script(node: &Node) -> Result<Script> {
    expect_mapping(node, "script")?;

    let name = get_scalar(node, "name", "", true)?;
    let raw_type = get_scalar(node, "type", "", true)?;
    let script_type = ScriptType::parse(&raw_type).ok_or_else(|| ConfigError::UnknownEnumValue {
        key: "type".to_string(),
        line: line_of(node, "type"),
        value: raw_type.clone(),
    })?;
    let content = get_scalar(node, "content", "", false)?;

    Script::new(name, script_type, content).map_err(|v| located(node, v))
}
