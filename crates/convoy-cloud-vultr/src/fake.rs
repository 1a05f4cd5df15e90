//! In-memory resource directory for tests

use crate::directory::ResourceDirectory;
use crate::types::{
    Account, Application, Direction, FirewallGroup, FirewallRuleInfo, Instance, IsoImage,
    NewFirewallRule, NewInstance, NewScript, OperatingSystem, PlanInfo, Region, Snapshot,
    StartupScript,
};
use async_trait::async_trait;
use convoy_cloud::{CloudError, Result};
use convoy_core::{IpVersion, ScriptType};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    account_error: Option<String>,
    regions: Vec<Region>,
    plans: Vec<PlanInfo>,
    systems: Vec<OperatingSystem>,
    apps: Vec<Application>,
    isos: Vec<IsoImage>,
    snapshots: Vec<Snapshot>,
    scripts: Vec<StartupScript>,
    instances: Vec<Instance>,
    requests: Vec<NewInstance>,
    groups: Vec<FirewallGroup>,
    rules: Vec<(String, FirewallRuleInfo)>,
    next_id: u64,
    calls: Vec<String>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    state: Mutex<State>,
}

fn plan(id: &str, vcpu_count: i64, ram: i64) -> PlanInfo {
    PlanInfo {
        id: id.into(),
        vcpu_count,
        ram,
        disk: 25,
        monthly_cost: 5.0,
        plan_type: "SSD".into(),
        locations: vec!["atl".into()],
    }
}

fn os(id: i64, name: &str) -> OperatingSystem {
    OperatingSystem {
        id,
        name: name.into(),
        arch: "x64".into(),
        family: String::new(),
    }
}

impl FakeDirectory {
    /// Atlanta, two plans, a handful of OS entries, one application, ISO
    /// and snapshot.
    pub fn with_catalogs() -> Self {
        let directory = Self::default();
        {
            let mut state = directory.state.lock().unwrap();
            state.regions = vec![
                Region {
                    id: "atl".into(),
                    city: "Atlanta".into(),
                    country: "US".into(),
                    continent: "North America".into(),
                },
                Region {
                    id: "ams".into(),
                    city: "Amsterdam".into(),
                    country: "NL".into(),
                    continent: "Europe".into(),
                },
            ];
            state.plans = vec![
                plan("vc2-1c-1gb", 1, 1024),
                plan("vc2-2c-4gb", 2, 4096),
            ];
            state.systems = vec![
                os(389, "Fedora 32 x64"),
                os(477, "Debian 12 x64"),
                os(186, "Application"),
                os(159, "Custom"),
                os(164, "Snapshot"),
            ];
            state.apps = vec![Application {
                id: 2,
                name: "WordPress".into(),
                short_name: "wordpress".into(),
                deploy_name: "wordpress".into(),
            }];
            state.isos = vec![IsoImage {
                id: "iso-1".into(),
                filename: "alpine.iso".into(),
                status: "complete".into(),
            }];
            state.snapshots = vec![Snapshot {
                id: "snap-1".into(),
                description: "golden".into(),
                os_id: 477,
                app_id: 0,
            }];
        }
        directory
    }

    pub fn add_plan(&self, plan: PlanInfo) {
        self.state.lock().unwrap().plans.push(plan);
    }

    pub fn fail_account(&self, message: &str) {
        self.state.lock().unwrap().account_error = Some(message.into());
    }

    pub fn add_script(&self, name: &str, script_type: ScriptType, script: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.id("script");
        state.scripts.push(StartupScript {
            id: id.clone(),
            name: name.into(),
            script_type: script_type.as_str().into(),
            script: script.into(),
        });
        id
    }

    pub fn add_instance(&self, instance: Instance) {
        self.state.lock().unwrap().instances.push(instance);
    }

    pub fn add_group(&self, description: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.id("fw");
        state.groups.push(FirewallGroup {
            id: id.clone(),
            description: description.into(),
            rule_count: 0,
        });
        id
    }

    pub fn add_rule(&self, group_id: &str, rule: &NewFirewallRule) -> u64 {
        let mut state = self.state.lock().unwrap();
        insert_rule(&mut state, group_id, rule)
    }

    /// Mutating calls in the order they were made.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn scripts(&self) -> Vec<StartupScript> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn instances(&self) -> Vec<Instance> {
        self.state.lock().unwrap().instances.clone()
    }

    /// Create-server requests as they were received.
    pub fn requests(&self) -> Vec<NewInstance> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn groups(&self) -> Vec<FirewallGroup> {
        self.state.lock().unwrap().groups.clone()
    }

    pub fn rules(&self, group_id: &str) -> Vec<FirewallRuleInfo> {
        let state = self.state.lock().unwrap();
        state
            .rules
            .iter()
            .filter(|(group, _)| group == group_id)
            .map(|(_, rule)| rule.clone())
            .collect()
    }
}

fn insert_rule(state: &mut State, group_id: &str, rule: &NewFirewallRule) -> u64 {
    let id = state
        .rules
        .iter()
        .filter(|(group, _)| group == group_id)
        .map(|(_, r)| r.id)
        .max()
        .unwrap_or(0)
        + 1;
    state.rules.push((
        group_id.to_string(),
        FirewallRuleInfo {
            id,
            ip_type: rule.ip_type.as_str().into(),
            action: "accept".into(),
            protocol: rule.protocol.as_str().into(),
            port: rule.port.clone(),
            subnet: rule.subnet.clone(),
            subnet_size: rule.subnet_size,
            source: rule.source.clone(),
            notes: rule.notes.clone(),
        },
    ));
    id
}

#[async_trait]
impl ResourceDirectory for FakeDirectory {
    async fn account(&self) -> Result<Account> {
        let state = self.state.lock().unwrap();
        match &state.account_error {
            Some(message) => Err(CloudError::RemoteCallFailure(message.clone())),
            None => Ok(Account {
                name: "Tester".into(),
                email: "tester@example.com".into(),
                balance: 0.0,
            }),
        }
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        Ok(self.state.lock().unwrap().regions.clone())
    }

    async fn list_plans(&self) -> Result<Vec<PlanInfo>> {
        Ok(self.state.lock().unwrap().plans.clone())
    }

    async fn list_operating_systems(&self) -> Result<Vec<OperatingSystem>> {
        Ok(self.state.lock().unwrap().systems.clone())
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        Ok(self.state.lock().unwrap().apps.clone())
    }

    async fn list_iso_images(&self) -> Result<Vec<IsoImage>> {
        Ok(self.state.lock().unwrap().isos.clone())
    }

    async fn list_snapshots(&self) -> Result<Vec<Snapshot>> {
        Ok(self.state.lock().unwrap().snapshots.clone())
    }

    async fn list_scripts(&self) -> Result<Vec<StartupScript>> {
        Ok(self.scripts())
    }

    async fn list_servers(&self) -> Result<Vec<Instance>> {
        Ok(self.instances())
    }

    async fn list_firewall_groups(&self) -> Result<Vec<FirewallGroup>> {
        Ok(self.groups())
    }

    async fn list_firewall_rules(
        &self,
        group_id: &str,
        _direction: Direction,
        ip_version: IpVersion,
    ) -> Result<Vec<FirewallRuleInfo>> {
        Ok(self
            .rules(group_id)
            .into_iter()
            .filter(|r| r.ip_type == ip_version.as_str())
            .collect())
    }

    async fn create_script(&self, script: &NewScript) -> Result<StartupScript> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_script {}", script.name));
        let created = StartupScript {
            id: state.id("script"),
            name: script.name.clone(),
            script_type: script.script_type.as_str().into(),
            script: script.content.clone(),
        };
        state.scripts.push(created.clone());
        Ok(created)
    }

    async fn update_script(&self, id: &str, script: &NewScript) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update_script {}", id));
        let existing = state
            .scripts
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CloudError::RemoteCallFailure(format!("no script {}", id)))?;
        existing.script = script.content.clone();
        Ok(())
    }

    async fn delete_script(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_script {}", id));
        state.scripts.retain(|s| s.id != id);
        Ok(())
    }

    async fn create_server(&self, server: &NewInstance) -> Result<Instance> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_server {}", server.region));
        let created = Instance {
            id: state.id("instance"),
            label: server.label.clone().unwrap_or_default(),
            tag: server.tag.clone().unwrap_or_default(),
            region: server.region.clone(),
            plan: server.plan.clone(),
            os_id: server.os_id,
            app_id: server.app_id.unwrap_or_default(),
            firewall_group_id: server.firewall_group_id.clone().unwrap_or_default(),
            main_ip: "192.0.2.10".into(),
            status: "pending".into(),
        };
        state.instances.push(created.clone());
        state.requests.push(server.clone());
        Ok(created)
    }

    async fn destroy_server(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("destroy_server {}", id));
        state.instances.retain(|i| i.id != id);
        Ok(())
    }

    async fn create_firewall_group(&self, description: &str) -> Result<FirewallGroup> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_firewall_group {}", description));
        let group = FirewallGroup {
            id: state.id("fw"),
            description: description.into(),
            rule_count: 0,
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn delete_firewall_group(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_firewall_group {}", id));
        state.groups.retain(|g| g.id != id);
        state.rules.retain(|(group, _)| group != id);
        Ok(())
    }

    async fn create_firewall_rule(
        &self,
        group_id: &str,
        rule: &NewFirewallRule,
    ) -> Result<FirewallRuleInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_firewall_rule {}", group_id));
        let id = insert_rule(&mut state, group_id, rule);
        let created = state
            .rules
            .iter()
            .find(|(group, r)| group == group_id && r.id == id)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| CloudError::RemoteCallFailure("rule vanished".into()))?;
        Ok(created)
    }

    async fn delete_firewall_rule(&self, group_id: &str, rule_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("delete_firewall_rule {}#{}", group_id, rule_id));
        state
            .rules
            .retain(|(group, r)| !(group == group_id && r.id == rule_id));
        Ok(())
    }
}
