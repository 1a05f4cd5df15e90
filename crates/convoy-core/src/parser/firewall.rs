use super::{expect_mapping, located};
use crate::accessor::{get_scalar, is_set, line_of, require_sequence};
use crate::document::Node;
use crate::error::{ConfigError, Result};
use crate::model::{Firewall, FirewallRule, IpVersion, PortSpec, Protocol, RuleSource};
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Alias the provider maintains for Cloudflare's edge ranges.
const CLOUDFLARE: &str = "cloudflare";

/// `start:end`, `start-end` and doubled separators like `start::end`.
const PORT_RANGE: &str = r"^(\d+)[:-]{1,2}(\d+)$";

/// Parses one `firewalls` item.
pub fn parse_firewall(node: &Node) -> Result<Firewall> {
    expect_mapping(node, "firewall")?;

    let name = get_scalar(node, "name", "", true)?;
    let rules = require_sequence(node, "rules")?
        .iter()
        .map(parse_firewall_rule)
        .collect::<Result<Vec<_>>>()?;

    Firewall::new(name, rules).map_err(|v| located(node, v))
}

/// Parses one inbound rule.
///
/// Protocol, source and ports are resolved independently; their combination
/// is then checked by [`FirewallRule::new`].
pub fn parse_firewall_rule(node: &Node) -> Result<FirewallRule> {
    expect_mapping(node, "rule")?;

    let protocol = parse_protocol(node)?;
    let source = parse_source(node)?;
    let ip_version = parse_ip_version(node, &source)?;
    let ports = parse_ports(node, protocol)?;
    let notes = get_scalar(node, "notes", "", false)?;

    FirewallRule::new(ip_version, protocol, ports, source, notes).map_err(|v| located(node, v))
}

fn parse_protocol(node: &Node) -> Result<Protocol> {
    let raw = get_scalar(node, "protocol", "", true)?;
    Protocol::parse(&raw).ok_or_else(|| ConfigError::UnknownEnumValue {
        key: "protocol".to_string(),
        line: line_of(node, "protocol"),
        value: raw,
    })
}

fn parse_source(node: &Node) -> Result<RuleSource> {
    let raw = get_scalar(node, "source", "", true)?;
    let line = line_of(node, "source");
    let value_format = |message: String| ConfigError::ValueFormat {
        key: "source".to_string(),
        line,
        message,
    };

    let Some((address, size)) = raw.trim().split_once('/') else {
        if raw.trim().eq_ignore_ascii_case(CLOUDFLARE) {
            return Ok(RuleSource::Alias(CLOUDFLARE.to_string()));
        }
        return Err(ConfigError::UnknownEnumValue {
            key: "source".to_string(),
            line,
            value: raw.clone(),
        });
    };

    let address = address
        .parse::<Ipv4Addr>()
        .map(IpAddr::V4)
        .or_else(|_| address.parse::<Ipv6Addr>().map(IpAddr::V6))
        .map_err(|_| value_format(format!("'{}' is not an IPv4 or IPv6 address", address)))?;
    let size = size
        .parse::<u8>()
        .map_err(|_| value_format(format!("'{}' is not a prefix length", size)))?;

    RuleSource::subnet(address, size).map_err(|v| v.at(line))
}

/// Explicit `ip`, else the subnet's family, else v4.
fn parse_ip_version(node: &Node, source: &RuleSource) -> Result<IpVersion> {
    if is_set(node, "ip") {
        let raw = get_scalar(node, "ip", "", true)?;
        return IpVersion::parse(&raw).ok_or_else(|| ConfigError::UnknownEnumValue {
            key: "ip".to_string(),
            line: line_of(node, "ip"),
            value: raw,
        });
    }
    Ok(match source {
        RuleSource::Subnet { address, .. } => IpVersion::of(address),
        RuleSource::Alias(_) => IpVersion::V4,
    })
}

fn parse_ports(node: &Node, protocol: Protocol) -> Result<PortSpec> {
    let has_port = is_set(node, "port");
    let has_ports = is_set(node, "ports");

    if has_port && has_ports {
        return Err(ConfigError::ConfigurationConflict {
            key: "ports".to_string(),
            line: line_of(node, "ports"),
            message: "'port' and 'ports' are mutually exclusive".to_string(),
        });
    }

    let key = match (has_port, has_ports) {
        (true, _) => "port",
        (_, true) => "ports",
        _ if protocol.uses_ports() => {
            return Err(ConfigError::ConfigurationConflict {
                key: "port".to_string(),
                line: node.line,
                message: format!("{} rules require one of 'port' or 'ports'", protocol),
            });
        }
        _ => return Ok(PortSpec::None),
    };
    let line = line_of(node, key);

    if !protocol.uses_ports() {
        return Err(ConfigError::ConfigurationConflict {
            key: key.to_string(),
            line,
            message: format!("{} rules do not take ports", protocol),
        });
    }

    let raw = get_scalar(node, key, "", true)?;
    let raw = raw.trim();
    let value_format = |message: String| ConfigError::ValueFormat {
        key: key.to_string(),
        line,
        message,
    };

    if let Ok(port) = raw.parse::<i64>() {
        return PortSpec::single(port).map_err(|v| v.at(line));
    }

    let pattern = Regex::new(PORT_RANGE)
        .map_err(|e| value_format(format!("port range pattern failed to compile: {}", e)))?;
    let captures = pattern
        .captures(raw)
        .ok_or_else(|| value_format(format!("'{}' is not a port or port range", raw)))?;
    let bound = |index: usize| {
        captures[index]
            .parse::<u16>()
            .map_err(|_| value_format(format!("'{}' is outside 1-65535", &captures[index])))
    };
    let (start, end) = (bound(1)?, bound(2)?);

    PortSpec::range(start, end).map_err(|v| v.at(line))
}
