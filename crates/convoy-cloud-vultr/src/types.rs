//! Vultr catalog and resource types
//!
//! Field names follow the v2 REST API. Text that travels base64-encoded on
//! the wire (script bodies, user data) is held decoded here; the client does
//! the encoding.

use convoy_core::{FirewallRule, IpVersion, Protocol, ScriptType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub continent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInfo {
    pub id: String,
    pub vcpu_count: i64,
    /// MB
    pub ram: i64,
    #[serde(default)]
    pub disk: i64,
    #[serde(default)]
    pub monthly_cost: f64,
    #[serde(rename = "type")]
    pub plan_type: String,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingSystem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub family: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub deploy_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoImage {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub os_id: i64,
    #[serde(default)]
    pub app_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupScript {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub script_type: String,
    /// Decoded body
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub tag: String,
    pub region: String,
    pub plan: String,
    #[serde(default)]
    pub os_id: i64,
    #[serde(default)]
    pub app_id: i64,
    #[serde(default)]
    pub firewall_group_id: String,
    #[serde(default)]
    pub main_ip: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallGroup {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rule_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallRuleInfo {
    pub id: u64,
    pub ip_type: String,
    #[serde(default)]
    pub action: String,
    pub protocol: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub subnet: String,
    #[serde(default)]
    pub subnet_size: u8,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub notes: String,
}

/// Rule traffic direction. The API only manages inbound rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
        }
    }
}

/// Body for creating or updating a startup script.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScript {
    pub name: String,
    pub script_type: ScriptType,
    /// Plain text
    pub content: String,
}

/// Body for creating an instance; every id is already resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewInstance {
    pub region: String,
    pub plan: String,
    pub os_id: i64,
    pub label: Option<String>,
    pub tag: Option<String>,
    pub app_id: Option<i64>,
    pub iso_id: Option<String>,
    pub snapshot_id: Option<String>,
    pub script_id: Option<String>,
    pub firewall_group_id: Option<String>,
    pub sshkey_id: Vec<String>,
    pub enable_private_network: bool,
    /// Plain text
    pub user_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFirewallRule {
    pub ip_type: IpVersion,
    pub protocol: Protocol,
    pub subnet: String,
    pub subnet_size: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl From<&FirewallRule> for NewFirewallRule {
    fn from(rule: &FirewallRule) -> Self {
        let source = rule.source();
        Self {
            ip_type: rule.ip_version(),
            protocol: rule.protocol(),
            subnet: source.subnet_address(),
            subnet_size: source.subnet_size(),
            port: rule.ports().to_string(),
            source: source.source().to_string(),
            notes: rule.notes().to_string(),
        }
    }
}
