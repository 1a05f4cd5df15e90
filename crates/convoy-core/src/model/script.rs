use crate::error::Violation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    Boot,
    Pxe,
}

impl ScriptType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "boot" => Some(ScriptType::Boot),
            "pxe" => Some(ScriptType::Pxe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::Boot => "boot",
            ScriptType::Pxe => "pxe",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A startup script, matched remotely by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    name: String,
    script_type: ScriptType,
    content: String,
}

impl Script {
    pub fn new(
        name: impl Into<String>,
        script_type: ScriptType,
        content: impl Into<String>,
    ) -> Result<Self, Violation> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Violation::invalid("name", "must not be empty"));
        }
        Ok(Self {
            name,
            script_type,
            content: content.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    /// Plain text; encoding for transport is the platform's job.
    pub fn content(&self) -> &str {
        &self.content
    }
}
