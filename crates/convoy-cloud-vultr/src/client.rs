//! Vultr v2 REST client
//!
//! Bearer-token authentication, cursor pagination on list endpoints, and
//! base64 for script bodies and user data.

use crate::directory::ResourceDirectory;
use crate::error::{Result, VultrError};
use crate::types::{
    Account, Application, Direction, FirewallGroup, FirewallRuleInfo, Instance, IsoImage,
    NewFirewallRule, NewInstance, NewScript, OperatingSystem, PlanInfo, Region, Snapshot,
    StartupScript,
};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use convoy_core::{IpVersion, ScriptType};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const VULTR_API_BASE: &str = "https://api.vultr.com/v2";
const PAGE_SIZE: &str = "500";

/// Client configuration
#[derive(Debug, Clone)]
pub struct VultrConfig {
    pub api_key: String,
    pub base_url: String,
}

impl VultrConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: VULTR_API_BASE.to_string(),
        }
    }

    /// Reads `VULTR_API_KEY` and the optional `VULTR_API_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("VULTR_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(VultrError::MissingApiKey)?;
        let base_url = std::env::var("VULTR_API_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| VULTR_API_BASE.to_string());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Clone)]
pub struct VultrClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ScriptBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    script_type: ScriptType,
    script: String,
}

#[derive(Serialize)]
struct InstanceBody<'a> {
    region: &'a str,
    plan: &'a str,
    os_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iso_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    firewall_group_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sshkey_id: Vec<String>,
    enable_private_network: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<String>,
}

impl<'a> InstanceBody<'a> {
    fn from_request(req: &'a NewInstance) -> Self {
        Self {
            region: &req.region,
            plan: &req.plan,
            os_id: req.os_id,
            label: req.label.as_deref(),
            tag: req.tag.as_deref(),
            app_id: req.app_id,
            iso_id: req.iso_id.as_deref(),
            snapshot_id: req.snapshot_id.as_deref(),
            script_id: req.script_id.as_deref(),
            firewall_group_id: req.firewall_group_id.as_deref(),
            sshkey_id: req.sshkey_id.clone(),
            enable_private_network: req.enable_private_network,
            user_data: req.user_data.as_deref().map(|d| STANDARD.encode(d)),
        }
    }
}

impl VultrClient {
    pub fn new(config: VultrConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key,
            base_url: config.base_url,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(VultrConfig::from_env()?))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VultrError::Api {
                endpoint,
                status,
                body,
            });
        }
        Ok(resp)
    }

    /// Like `check` but also treats 404 as success (delete idempotency).
    async fn check_allow_404(
        resp: reqwest::Response,
        endpoint: &'static str,
    ) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return Err(VultrError::Api {
                endpoint,
                status,
                body,
            });
        }
        Ok(resp)
    }

    /// Collects every page of a list endpoint. `key` is the array field of
    /// the response object.
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        endpoint: &'static str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url(path))
                .bearer_auth(&self.api_key)
                .query(&[("per_page", PAGE_SIZE)]);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }

            let resp = Self::check(request.send().await?, endpoint).await?;
            let mut page: Value = resp.json().await?;
            let batch = page
                .get_mut(key)
                .map(Value::take)
                .unwrap_or_else(|| Value::Array(Vec::new()));
            items.extend(serde_json::from_value::<Vec<T>>(batch)?);

            let next = page
                .pointer("/meta/links/next")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if next.is_empty() {
                break;
            }
            cursor = Some(next.to_string());
        }

        debug!(endpoint, count = items.len(), "Listed catalog");
        Ok(items)
    }

    /// Fetches `path` and deserializes the object under `key`.
    async fn get_one<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        endpoint: &'static str,
    ) -> Result<T> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let mut body: Value = Self::check(resp, endpoint).await?.json().await?;
        let item = body.get_mut(key).map(Value::take).unwrap_or_default();
        Ok(serde_json::from_value(item)?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        key: &str,
        endpoint: &'static str,
    ) -> Result<T> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let mut body: Value = Self::check(resp, endpoint).await?.json().await?;
        let item = body.get_mut(key).map(Value::take).unwrap_or_default();
        Ok(serde_json::from_value(item)?)
    }

    async fn delete(&self, path: &str, endpoint: &'static str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::check_allow_404(resp, endpoint).await?;
        Ok(())
    }

    fn script_body(script: &NewScript) -> ScriptBody<'_> {
        ScriptBody {
            name: &script.name,
            script_type: script.script_type,
            script: STANDARD.encode(&script.content),
        }
    }

    /// Decodes a script body; scripts without a body come back empty.
    fn decode_script(mut script: StartupScript) -> Result<StartupScript> {
        if !script.script.is_empty() {
            let bytes = STANDARD.decode(script.script.trim())?;
            script.script = String::from_utf8_lossy(&bytes).into_owned();
        }
        Ok(script)
    }
}

#[async_trait]
impl ResourceDirectory for VultrClient {
    async fn account(&self) -> convoy_cloud::Result<Account> {
        Ok(self.get_one("/account", "account", "get account").await?)
    }

    async fn list_regions(&self) -> convoy_cloud::Result<Vec<Region>> {
        Ok(self.list("/regions", "regions", "list regions").await?)
    }

    async fn list_plans(&self) -> convoy_cloud::Result<Vec<PlanInfo>> {
        Ok(self.list("/plans", "plans", "list plans").await?)
    }

    async fn list_operating_systems(&self) -> convoy_cloud::Result<Vec<OperatingSystem>> {
        Ok(self.list("/os", "os", "list os").await?)
    }

    async fn list_applications(&self) -> convoy_cloud::Result<Vec<Application>> {
        Ok(self
            .list("/applications", "applications", "list applications")
            .await?)
    }

    async fn list_iso_images(&self) -> convoy_cloud::Result<Vec<IsoImage>> {
        Ok(self.list("/iso", "isos", "list iso").await?)
    }

    async fn list_snapshots(&self) -> convoy_cloud::Result<Vec<Snapshot>> {
        Ok(self.list("/snapshots", "snapshots", "list snapshots").await?)
    }

    /// The list endpoint omits bodies, so each script is fetched by id.
    async fn list_scripts(&self) -> convoy_cloud::Result<Vec<StartupScript>> {
        let listed: Vec<StartupScript> = self
            .list("/startup-scripts", "startup_scripts", "list startup scripts")
            .await?;
        let mut scripts = Vec::with_capacity(listed.len());
        for entry in listed {
            let full: StartupScript = self
                .get_one(
                    &format!("/startup-scripts/{}", entry.id),
                    "startup_script",
                    "get startup script",
                )
                .await?;
            scripts.push(Self::decode_script(full)?);
        }
        Ok(scripts)
    }

    async fn list_servers(&self) -> convoy_cloud::Result<Vec<Instance>> {
        Ok(self.list("/instances", "instances", "list instances").await?)
    }

    async fn list_firewall_groups(&self) -> convoy_cloud::Result<Vec<FirewallGroup>> {
        Ok(self
            .list("/firewalls", "firewall_groups", "list firewall groups")
            .await?)
    }

    /// The API returns both address families together; filter client-side.
    async fn list_firewall_rules(
        &self,
        group_id: &str,
        direction: Direction,
        ip_version: IpVersion,
    ) -> convoy_cloud::Result<Vec<FirewallRuleInfo>> {
        debug!(group_id, direction = direction.as_str(), ip = %ip_version, "Listing firewall rules");
        let rules: Vec<FirewallRuleInfo> = self
            .list(
                &format!("/firewalls/{}/rules", group_id),
                "firewall_rules",
                "list firewall rules",
            )
            .await?;
        Ok(rules
            .into_iter()
            .filter(|r| r.ip_type.eq_ignore_ascii_case(ip_version.as_str()))
            .collect())
    }

    async fn create_script(&self, script: &NewScript) -> convoy_cloud::Result<StartupScript> {
        let created: StartupScript = self
            .post(
                "/startup-scripts",
                &Self::script_body(script),
                "startup_script",
                "create startup script",
            )
            .await?;
        Ok(Self::decode_script(created)?)
    }

    async fn update_script(&self, id: &str, script: &NewScript) -> convoy_cloud::Result<()> {
        let resp = self
            .http
            .patch(self.url(&format!("/startup-scripts/{}", id)))
            .bearer_auth(&self.api_key)
            .json(&Self::script_body(script))
            .send()
            .await
            .map_err(VultrError::from)?;
        Self::check(resp, "update startup script").await?;
        Ok(())
    }

    async fn delete_script(&self, id: &str) -> convoy_cloud::Result<()> {
        Ok(self
            .delete(&format!("/startup-scripts/{}", id), "delete startup script")
            .await?)
    }

    async fn create_server(&self, server: &NewInstance) -> convoy_cloud::Result<Instance> {
        Ok(self
            .post(
                "/instances",
                &InstanceBody::from_request(server),
                "instance",
                "create instance",
            )
            .await?)
    }

    async fn destroy_server(&self, id: &str) -> convoy_cloud::Result<()> {
        Ok(self
            .delete(&format!("/instances/{}", id), "delete instance")
            .await?)
    }

    async fn create_firewall_group(&self, description: &str) -> convoy_cloud::Result<FirewallGroup> {
        Ok(self
            .post(
                "/firewalls",
                &serde_json::json!({ "description": description }),
                "firewall_group",
                "create firewall group",
            )
            .await?)
    }

    async fn delete_firewall_group(&self, id: &str) -> convoy_cloud::Result<()> {
        Ok(self
            .delete(&format!("/firewalls/{}", id), "delete firewall group")
            .await?)
    }

    async fn create_firewall_rule(
        &self,
        group_id: &str,
        rule: &NewFirewallRule,
    ) -> convoy_cloud::Result<FirewallRuleInfo> {
        Ok(self
            .post(
                &format!("/firewalls/{}/rules", group_id),
                rule,
                "firewall_rule",
                "create firewall rule",
            )
            .await?)
    }

    async fn delete_firewall_rule(&self, group_id: &str, rule_id: u64) -> convoy_cloud::Result<()> {
        Ok(self
            .delete(
                &format!("/firewalls/{}/rules/{}", group_id, rule_id),
                "delete firewall rule",
            )
            .await?)
    }
}
