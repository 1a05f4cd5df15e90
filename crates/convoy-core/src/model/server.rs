//! Server entity and its OS / plan references

use crate::error::Violation;
use serde::{Deserialize, Serialize};

/// How the server's operating system is chosen.
///
/// Exactly one source is selected; [`OsReference::select`] is the only way to
/// build one from raw configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsReference {
    /// One-click application, by name.
    App(String),
    /// Uploaded ISO, by filename.
    Iso(String),
    /// Snapshot, by description.
    Snapshot(String),
    /// Operating system, by name.
    Named(String),
    /// Operating system plus a startup script (e.g. PXE), both by name.
    NamedWithScript { name: String, script: String },
}

/// Raw `os` block values; empty strings mean "not set".
#[derive(Debug, Clone, Default)]
pub struct OsParts {
    pub name: String,
    pub app: String,
    pub iso: String,
    pub snapshot: String,
    pub startup_script: String,
}

impl OsReference {
    pub fn select(parts: OsParts) -> Result<Self, Violation> {
        let OsParts {
            name,
            app,
            iso,
            snapshot,
            startup_script,
        } = parts;

        if !app.is_empty() {
            let others = [
                ("name", &name),
                ("iso", &iso),
                ("snapshot", &snapshot),
                ("startup_script", &startup_script),
            ];
            reject_set("app", &others)?;
            return Ok(OsReference::App(app));
        }
        if !iso.is_empty() {
            let others = [
                ("name", &name),
                ("snapshot", &snapshot),
                ("startup_script", &startup_script),
            ];
            reject_set("iso", &others)?;
            return Ok(OsReference::Iso(iso));
        }
        if !snapshot.is_empty() {
            reject_set(
                "snapshot",
                &[("name", &name), ("startup_script", &startup_script)],
            )?;
            return Ok(OsReference::Snapshot(snapshot));
        }
        match (name.is_empty(), startup_script.is_empty()) {
            (false, false) => Ok(OsReference::NamedWithScript {
                name,
                script: startup_script,
            }),
            (false, true) => Ok(OsReference::Named(name)),
            (true, false) => Err(Violation::conflict(
                "os",
                "startup_script requires an OS name",
            )),
            (true, true) => Err(Violation::conflict(
                "os",
                "one of app, iso, snapshot or name must be set",
            )),
        }
    }

    /// Startup script attached through the OS block, if any.
    pub fn script(&self) -> Option<&str> {
        match self {
            OsReference::NamedWithScript { script, .. } => Some(script),
            _ => None,
        }
    }
}

fn reject_set(chosen: &'static str, others: &[(&str, &String)]) -> Result<(), Violation> {
    match others.iter().find(|(_, value)| !value.is_empty()) {
        Some((key, _)) => Err(Violation::conflict(
            "os",
            format!("'{}' cannot be combined with '{}'", chosen, key),
        )),
        None => Ok(()),
    }
}

/// Instance size, matched against the provider's plan catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    cpu: u32,
    memory: u32,
    plan_type: String,
}

impl Plan {
    pub fn new(cpu: i64, memory: i64, plan_type: impl Into<String>) -> Result<Self, Violation> {
        let plan_type = plan_type.into();
        let cpu = u32::try_from(cpu)
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| Violation::invalid("cpu", "must be a positive integer"))?;
        let memory = u32::try_from(memory)
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| Violation::invalid("memory", "must be a positive integer"))?;
        if plan_type.trim().is_empty() {
            return Err(Violation::invalid("type", "must not be empty"));
        }
        Ok(Self {
            cpu,
            memory,
            plan_type,
        })
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }

    /// Memory in MB.
    pub fn memory(&self) -> u32 {
        self.memory
    }

    pub fn plan_type(&self) -> &str {
        &self.plan_type
    }
}

/// A virtual server.
///
/// Remote instances are matched by (region, label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    os: OsReference,
    plan: Plan,
    region: String,
    label: Option<String>,
    tag: Option<String>,
    firewall: Option<String>,
    startup_script: Option<String>,
    user_data: Option<String>,
    ssh_keys: Vec<String>,
    private_networking: bool,
}

impl Server {
    pub fn new(os: OsReference, plan: Plan, region: impl Into<String>) -> Result<Self, Violation> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(Violation::invalid("region", "must not be empty"));
        }
        Ok(Self {
            os,
            plan,
            region,
            label: None,
            tag: None,
            firewall: None,
            startup_script: None,
            user_data: None,
            ssh_keys: Vec::new(),
            private_networking: false,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = non_empty(label.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = non_empty(tag.into());
        self
    }

    pub fn with_firewall(mut self, firewall: impl Into<String>) -> Self {
        self.firewall = non_empty(firewall.into());
        self
    }

    /// Attaches a startup script by name.
    ///
    /// Fails if the OS block already names a different script.
    pub fn with_startup_script(mut self, script: impl Into<String>) -> Result<Self, Violation> {
        let script = non_empty(script.into());
        if let (Some(top), Some(os_script)) = (&script, self.os.script())
            && top != os_script
        {
            return Err(Violation::conflict(
                "startup_script",
                format!(
                    "'{}' conflicts with os.startup_script '{}'",
                    top, os_script
                ),
            ));
        }
        self.startup_script = script;
        Ok(self)
    }

    pub fn with_user_data(mut self, user_data: Option<String>) -> Self {
        self.user_data = user_data.filter(|d| !d.is_empty());
        self
    }

    pub fn with_ssh_keys(mut self, ssh_keys: Vec<String>) -> Self {
        self.ssh_keys = ssh_keys;
        self
    }

    pub fn with_private_networking(mut self, enabled: bool) -> Self {
        self.private_networking = enabled;
        self
    }

    pub fn os(&self) -> &OsReference {
        &self.os
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Label, or empty when unset.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn firewall(&self) -> Option<&str> {
        self.firewall.as_deref()
    }

    /// Script named at the top level or through the OS block.
    pub fn startup_script(&self) -> Option<&str> {
        self.startup_script.as_deref().or_else(|| self.os.script())
    }

    pub fn user_data(&self) -> Option<&str> {
        self.user_data.as_deref()
    }

    pub fn ssh_keys(&self) -> &[String] {
        &self.ssh_keys
    }

    pub fn private_networking(&self) -> bool {
        self.private_networking
    }

    /// Name used in logs and decisions.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{}/{}", self.region, label),
            None => format!("{}/(unlabeled)", self.region),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
