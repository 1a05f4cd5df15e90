//! Firewall groups and their inbound rules

use crate::error::Violation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "v4" | "ipv4" => Some(IpVersion::V4),
            "v6" | "ipv6" => Some(IpVersion::V6),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::V4 => "v4",
            IpVersion::V6 => "v6",
        }
    }

    pub fn of(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Icmp,
    Tcp,
    Udp,
    Gre,
}

impl Protocol {
    /// Case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "icmp" => Some(Protocol::Icmp),
            "tcp" => Some(Protocol::Tcp),
            "udp" => Some(Protocol::Udp),
            "gre" => Some(Protocol::Gre),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Icmp => "icmp",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Gre => "gre",
        }
    }

    /// Whether rules for this protocol address ports.
    pub fn uses_ports(&self) -> bool {
        matches!(self, Protocol::Tcp | Protocol::Udp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where inbound traffic may come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// Provider-maintained address list (e.g. `cloudflare`).
    Alias(String),
    Subnet { address: IpAddr, size: u8 },
}

impl RuleSource {
    pub fn subnet(address: IpAddr, size: u8) -> Result<Self, Violation> {
        let max = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if size > max {
            return Err(Violation::invalid(
                "source",
                format!("prefix length {} exceeds {} for {}", size, max, address),
            ));
        }
        Ok(RuleSource::Subnet { address, size })
    }

    /// Alias name, or empty for a subnet.
    pub fn source(&self) -> &str {
        match self {
            RuleSource::Alias(name) => name,
            RuleSource::Subnet { .. } => "",
        }
    }

    /// Subnet address as text, or empty for an alias.
    pub fn subnet_address(&self) -> String {
        match self {
            RuleSource::Alias(_) => String::new(),
            RuleSource::Subnet { address, .. } => address.to_string(),
        }
    }

    /// Prefix length, or 0 for an alias.
    pub fn subnet_size(&self) -> u8 {
        match self {
            RuleSource::Alias(_) => 0,
            RuleSource::Subnet { size, .. } => *size,
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Alias(name) => f.write_str(name),
            RuleSource::Subnet { address, size } => write!(f, "{}/{}", address, size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSpec {
    None,
    Single(u16),
    /// Inclusive, start < end.
    Range(u16, u16),
}

impl PortSpec {
    pub fn range(start: u16, end: u16) -> Result<Self, Violation> {
        if start == 0 {
            return Err(Violation::invalid("ports", "port 0 is not valid"));
        }
        if start >= end {
            return Err(Violation::invalid(
                "ports",
                format!("range start {} must be below end {}", start, end),
            ));
        }
        Ok(PortSpec::Range(start, end))
    }

    pub fn single(port: i64) -> Result<Self, Violation> {
        match u16::try_from(port) {
            Ok(p) if p > 0 => Ok(PortSpec::Single(p)),
            _ => Err(Violation::invalid(
                "port",
                format!("{} is outside 1-65535", port),
            )),
        }
    }
}

/// Renders in the provider's wire form: `""`, `"22"` or `"8000:8100"`.
impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::None => Ok(()),
            PortSpec::Single(port) => write!(f, "{}", port),
            PortSpec::Range(start, end) => write!(f, "{}:{}", start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirewallRule {
    ip_version: IpVersion,
    protocol: Protocol,
    ports: PortSpec,
    source: RuleSource,
    notes: String,
}

impl FirewallRule {
    pub fn new(
        ip_version: IpVersion,
        protocol: Protocol,
        ports: PortSpec,
        source: RuleSource,
        notes: impl Into<String>,
    ) -> Result<Self, Violation> {
        match (protocol.uses_ports(), ports) {
            (true, PortSpec::None) => {
                return Err(Violation::conflict(
                    "ports",
                    format!("{} rules require a port or port range", protocol),
                ));
            }
            (false, PortSpec::Single(_) | PortSpec::Range(..)) => {
                return Err(Violation::conflict(
                    "ports",
                    format!("{} rules do not take ports", protocol),
                ));
            }
            _ => {}
        }
        if let RuleSource::Subnet { address, .. } = &source
            && IpVersion::of(address) != ip_version
        {
            return Err(Violation::conflict(
                "ip",
                format!("source {} is not an {} address", source, ip_version),
            ));
        }
        Ok(Self {
            ip_version,
            protocol,
            ports,
            source,
            notes: notes.into(),
        })
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn ports(&self) -> PortSpec {
        self.ports
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Rules are the same rule if everything but the notes matches.
    pub fn same_rule(&self, other: &FirewallRule) -> bool {
        self.ip_version == other.ip_version
            && self.protocol == other.protocol
            && self.ports == other.ports
            && self.source == other.source
    }
}

impl fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ip_version, self.protocol)?;
        if self.ports != PortSpec::None {
            write!(f, " port {}", self.ports)?;
        }
        write!(f, " from {}", self.source)
    }
}

/// A firewall group; remote groups are matched by name (description).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firewall {
    name: String,
    rules: Vec<FirewallRule>,
}

impl Firewall {
    pub fn new(name: impl Into<String>, rules: Vec<FirewallRule>) -> Result<Self, Violation> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Violation::invalid("name", "must not be empty"));
        }
        if rules.is_empty() {
            return Err(Violation::invalid("rules", "at least one rule is required"));
        }
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|earlier| earlier.same_rule(rule)) {
                return Err(Violation::conflict(
                    "rules",
                    format!("duplicate rule '{}'", rule),
                ));
            }
        }
        Ok(Self { name, rules })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[FirewallRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssh(address: &str, size: u8) -> FirewallRule {
        let address: IpAddr = address.parse().unwrap();
        FirewallRule::new(
            IpVersion::of(&address),
            Protocol::Tcp,
            PortSpec::Single(22),
            RuleSource::subnet(address, size).unwrap(),
            "",
        )
        .unwrap()
    }

    #[test]
    fn test_protocol_parse_is_case_insensitive() {
        assert_eq!(Protocol::parse("TCP"), Some(Protocol::Tcp));
        assert_eq!(Protocol::parse("Icmp"), Some(Protocol::Icmp));
        assert_eq!(Protocol::parse("sctp"), None);
    }

    #[test]
    fn test_port_spec_display() {
        assert_eq!(PortSpec::None.to_string(), "");
        assert_eq!(PortSpec::Single(443).to_string(), "443");
        assert_eq!(PortSpec::range(8000, 8100).unwrap().to_string(), "8000:8100");
        assert!(PortSpec::range(9000, 9000).is_err());
        assert!(PortSpec::single(0).is_err());
        assert!(PortSpec::single(70000).is_err());
    }

    #[test]
    fn test_subnet_prefix_bounds() {
        let v4: IpAddr = "10.0.0.0".parse().unwrap();
        assert!(RuleSource::subnet(v4, 32).is_ok());
        assert!(RuleSource::subnet(v4, 33).is_err());
        let v6: IpAddr = "::".parse().unwrap();
        assert!(RuleSource::subnet(v6, 128).is_ok());
    }

    #[test]
    fn test_rule_port_requirements() {
        let any: IpAddr = "0.0.0.0".parse().unwrap();
        let source = RuleSource::subnet(any, 0).unwrap();
        assert!(
            FirewallRule::new(IpVersion::V4, Protocol::Tcp, PortSpec::None, source.clone(), "")
                .is_err()
        );
        assert!(
            FirewallRule::new(
                IpVersion::V4,
                Protocol::Icmp,
                PortSpec::Single(1),
                source.clone(),
                ""
            )
            .is_err()
        );
        assert!(
            FirewallRule::new(IpVersion::V4, Protocol::Icmp, PortSpec::None, source, "").is_ok()
        );
    }

    #[test]
    fn test_rule_ip_version_must_match_subnet() {
        let v6: IpAddr = "::".parse().unwrap();
        let err = FirewallRule::new(
            IpVersion::V4,
            Protocol::Tcp,
            PortSpec::Single(22),
            RuleSource::subnet(v6, 0).unwrap(),
            "",
        )
        .unwrap_err();
        assert_eq!(err.field(), "ip");
    }

    #[test]
    fn test_firewall_rejects_duplicates_and_empty() {
        assert!(Firewall::new("ssh", vec![]).is_err());
        assert!(Firewall::new("", vec![ssh("0.0.0.0", 0)]).is_err());

        let err = Firewall::new("ssh", vec![ssh("0.0.0.0", 0), ssh("0.0.0.0", 0)]).unwrap_err();
        assert!(matches!(err, Violation::Conflict { field: "rules", .. }));

        let fw = Firewall::new("ssh", vec![ssh("0.0.0.0", 0), ssh("::", 0)]).unwrap();
        assert_eq!(fw.rules().len(), 2);
    }
}
