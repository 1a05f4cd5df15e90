//! Resource directory: the remote catalogs and mutations reconciliation
//! needs, behind one trait so the engine can run against any backend.

use crate::types::{
    Account, Application, Direction, FirewallGroup, FirewallRuleInfo, Instance, IsoImage,
    NewFirewallRule, NewInstance, NewScript, OperatingSystem, PlanInfo, Region, Snapshot,
    StartupScript,
};
use async_trait::async_trait;
use convoy_cloud::Result;
use convoy_core::IpVersion;

#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    async fn account(&self) -> Result<Account>;

    async fn list_regions(&self) -> Result<Vec<Region>>;
    async fn list_plans(&self) -> Result<Vec<PlanInfo>>;
    async fn list_operating_systems(&self) -> Result<Vec<OperatingSystem>>;
    async fn list_applications(&self) -> Result<Vec<Application>>;
    async fn list_iso_images(&self) -> Result<Vec<IsoImage>>;
    async fn list_snapshots(&self) -> Result<Vec<Snapshot>>;
    /// Scripts with their decoded bodies.
    async fn list_scripts(&self) -> Result<Vec<StartupScript>>;
    async fn list_servers(&self) -> Result<Vec<Instance>>;
    async fn list_firewall_groups(&self) -> Result<Vec<FirewallGroup>>;
    async fn list_firewall_rules(
        &self,
        group_id: &str,
        direction: Direction,
        ip_version: IpVersion,
    ) -> Result<Vec<FirewallRuleInfo>>;

    async fn create_script(&self, script: &NewScript) -> Result<StartupScript>;
    async fn update_script(&self, id: &str, script: &NewScript) -> Result<()>;
    async fn delete_script(&self, id: &str) -> Result<()>;

    async fn create_server(&self, server: &NewInstance) -> Result<Instance>;
    async fn destroy_server(&self, id: &str) -> Result<()>;

    async fn create_firewall_group(&self, description: &str) -> Result<FirewallGroup>;
    async fn delete_firewall_group(&self, id: &str) -> Result<()>;
    async fn create_firewall_rule(
        &self,
        group_id: &str,
        rule: &NewFirewallRule,
    ) -> Result<FirewallRuleInfo>;
    async fn delete_firewall_rule(&self, group_id: &str, rule_id: u64) -> Result<()>;
}
