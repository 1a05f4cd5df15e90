use super::Reconciler;
use crate::types::{Direction, FirewallRuleInfo, NewFirewallRule};
use convoy_cloud::{Action, ActionType, Result};
use convoy_core::{Firewall, FirewallRule, IpVersion, RuleSource};
use std::collections::BTreeMap;
use std::net::IpAddr;

const GROUP: &str = "firewall";
const RULE: &str = "firewall-rule";

/// Structural match between a desired rule and a listed one. Notes are
/// ignored.
fn rule_matches(desired: &FirewallRule, remote: &FirewallRuleInfo) -> bool {
    let wire = NewFirewallRule::from(desired);
    let port = match remote.port.trim() {
        "0" => "",
        other => other,
    };
    let source_matches = match desired.source() {
        RuleSource::Alias(alias) => remote.source.eq_ignore_ascii_case(alias),
        RuleSource::Subnet { address, size } => {
            remote.subnet.parse::<IpAddr>().ok() == Some(*address) && remote.subnet_size == *size
        }
    };

    remote.ip_type.eq_ignore_ascii_case(wire.ip_type.as_str())
        && remote.protocol.eq_ignore_ascii_case(wire.protocol.as_str())
        && port == wire.port
        && source_matches
}

fn describe_remote(rule: &FirewallRuleInfo) -> String {
    let source = if rule.source.is_empty() {
        format!("{}/{}", rule.subnet, rule.subnet_size)
    } else {
        rule.source.clone()
    };
    if rule.port.is_empty() || rule.port == "0" {
        format!("#{} {} {} from {}", rule.id, rule.ip_type, rule.protocol, source)
    } else {
        format!(
            "#{} {} {} port {} from {}",
            rule.id, rule.ip_type, rule.protocol, rule.port, source
        )
    }
}

impl Reconciler<'_> {
    /// Rules of a group across both address families, keyed by rule number.
    async fn existing_rules(&self, group_id: &str) -> Result<BTreeMap<u64, FirewallRuleInfo>> {
        let mut rules = BTreeMap::new();
        for ip_version in [IpVersion::V4, IpVersion::V6] {
            for rule in self
                .directory
                .list_firewall_rules(group_id, Direction::In, ip_version)
                .await?
            {
                rules.insert(rule.id, rule);
            }
        }
        Ok(rules)
    }

    async fn create_rule(&mut self, firewall: &str, group_id: &str, rule: &FirewallRule) -> Result<()> {
        // group_id is empty only when the group itself was not created (dry run)
        if self.live() && !group_id.is_empty() {
            self.directory
                .create_firewall_rule(group_id, &NewFirewallRule::from(rule))
                .await?;
        }
        self.record(Action::new(
            ActionType::Create,
            RULE,
            format!("{}: {}", firewall, rule),
            "add rule",
        ));
        Ok(())
    }

    /// Creates the group if absent, then brings its rules in line with the
    /// desired set: missing rules are added and surplus rules removed.
    pub async fn apply_firewall(&mut self, firewall: &Firewall) -> Result<()> {
        let name = firewall.name();
        let groups = self.directory.list_firewall_groups().await?;

        let Some(group) = groups.into_iter().find(|g| g.description == name) else {
            let group_id = if self.live() {
                self.directory.create_firewall_group(name).await?.id
            } else {
                String::new()
            };
            self.record(Action::new(
                ActionType::Create,
                GROUP,
                name,
                format!("create group with {} rules", firewall.rules().len()),
            ));
            for rule in firewall.rules() {
                self.create_rule(name, &group_id, rule).await?;
            }
            return Ok(());
        };

        let existing = self.existing_rules(&group.id).await?;
        self.record(Action::new(
            ActionType::NoOp,
            GROUP,
            name,
            format!("group exists with {} rules", existing.len()),
        ));

        for rule in firewall.rules() {
            if existing.values().any(|remote| rule_matches(rule, remote)) {
                self.record(Action::new(
                    ActionType::NoOp,
                    RULE,
                    format!("{}: {}", name, rule),
                    "rule present",
                ));
            } else {
                self.create_rule(name, &group.id, rule).await?;
            }
        }

        for (rule_id, remote) in &existing {
            if firewall.rules().iter().any(|rule| rule_matches(rule, remote)) {
                continue;
            }
            if self.live() {
                self.directory
                    .delete_firewall_rule(&group.id, *rule_id)
                    .await?;
            }
            self.record(Action::new(
                ActionType::Delete,
                RULE,
                format!("{}: {}", name, describe_remote(remote)),
                "rule not declared",
            ));
        }
        Ok(())
    }

    /// Deletes every rule of the group, then the group.
    pub async fn destroy_firewall(&mut self, firewall: &Firewall) -> Result<()> {
        let name = firewall.name();
        let groups = self.directory.list_firewall_groups().await?;

        let Some(group) = groups.into_iter().find(|g| g.description == name) else {
            self.record_missing(GROUP, name, format!("no firewall group named {}", name));
            return Ok(());
        };

        for (rule_id, remote) in self.existing_rules(&group.id).await? {
            if self.live() {
                self.directory.delete_firewall_rule(&group.id, rule_id).await?;
            }
            self.record(Action::new(
                ActionType::Delete,
                RULE,
                format!("{}: {}", name, describe_remote(&remote)),
                "delete rule",
            ));
        }

        if self.live() {
            self.directory.delete_firewall_group(&group.id).await?;
        }
        self.record(Action::new(ActionType::Delete, GROUP, name, "delete group"));
        Ok(())
    }
}
