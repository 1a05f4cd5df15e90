//! Name → id resolution against the remote catalogs
//!
//! Every lookup lists its catalog afresh; nothing is cached between calls.

use crate::directory::ResourceDirectory;
use convoy_cloud::{CloudError, Result};
use convoy_core::{Infrastructure, OsReference, Plan};
use std::collections::HashSet;
use tracing::debug;

/// Base OS the API expects alongside an application.
pub const APPLICATION_OS: &str = "Application";
/// Base OS the API expects alongside an ISO.
pub const CUSTOM_OS: &str = "Custom";
/// Base OS the API expects alongside a snapshot.
pub const SNAPSHOT_OS: &str = "Snapshot";

/// Scripts and firewalls the document declares.
///
/// During a dry run or validation these may not exist remotely yet; a
/// reference to one resolves to an empty placeholder id instead of failing.
#[derive(Debug, Clone, Default)]
pub struct Pending {
    scripts: HashSet<String>,
    firewalls: HashSet<String>,
}

impl Pending {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_infrastructure(infra: &Infrastructure) -> Self {
        Self {
            scripts: infra.scripts().map(|s| s.name().to_string()).collect(),
            firewalls: infra.firewalls().map(|f| f.name().to_string()).collect(),
        }
    }
}

/// Extra image attached to a server besides its base OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsAttachment {
    App(i64),
    Iso(String),
    Snapshot(String),
    Script(String),
}

/// Ids an [`OsReference`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsResolution {
    pub os_id: i64,
    pub attachment: Option<OsAttachment>,
}

impl OsResolution {
    pub fn app_id(&self) -> Option<i64> {
        match self.attachment {
            Some(OsAttachment::App(id)) => Some(id),
            _ => None,
        }
    }
}

pub struct Resolver<'a> {
    directory: &'a dyn ResourceDirectory,
    pending: Pending,
}

impl<'a> Resolver<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory, pending: Pending) -> Self {
        Self { directory, pending }
    }

    /// Region id for a city name.
    pub async fn region_id(&self, city: &str) -> Result<String> {
        let regions = self.directory.list_regions().await?;
        let region = regions
            .into_iter()
            .find(|r| r.city == city)
            .ok_or_else(|| CloudError::not_found("region", city))?;
        debug!(city, id = %region.id, "Resolved region");
        Ok(region.id)
    }

    /// First plan in listing order matching cpu, memory and (case-insensitive)
    /// type.
    pub async fn plan_id(&self, plan: &Plan) -> Result<String> {
        let plans = self.directory.list_plans().await?;
        plans
            .into_iter()
            .find(|p| {
                p.vcpu_count == i64::from(plan.cpu())
                    && p.ram == i64::from(plan.memory())
                    && p.plan_type.eq_ignore_ascii_case(plan.plan_type())
            })
            .map(|p| p.id)
            .ok_or_else(|| {
                CloudError::not_found(
                    "plan",
                    format!(
                        "{} vCPU / {} MB / {}",
                        plan.cpu(),
                        plan.memory(),
                        plan.plan_type()
                    ),
                )
            })
    }

    pub async fn os_id(&self, name: &str) -> Result<i64> {
        let systems = self.directory.list_operating_systems().await?;
        systems
            .into_iter()
            .find(|os| os.name == name)
            .map(|os| os.id)
            .ok_or_else(|| CloudError::not_found("operating system", name))
    }

    /// Matches the application's name or deploy name.
    pub async fn app_id(&self, name: &str) -> Result<i64> {
        let apps = self.directory.list_applications().await?;
        apps.into_iter()
            .find(|a| a.name == name || a.deploy_name == name)
            .map(|a| a.id)
            .ok_or_else(|| CloudError::not_found("application", name))
    }

    pub async fn iso_id(&self, filename: &str) -> Result<String> {
        let isos = self.directory.list_iso_images().await?;
        isos.into_iter()
            .find(|i| i.filename == filename)
            .map(|i| i.id)
            .ok_or_else(|| CloudError::not_found("iso", filename))
    }

    pub async fn snapshot_id(&self, description: &str) -> Result<String> {
        let snapshots = self.directory.list_snapshots().await?;
        snapshots
            .into_iter()
            .find(|s| s.description == description)
            .map(|s| s.id)
            .ok_or_else(|| CloudError::not_found("snapshot", description))
    }

    pub async fn script_id(&self, name: &str) -> Result<String> {
        let scripts = self.directory.list_scripts().await?;
        match scripts.into_iter().find(|s| s.name == name) {
            Some(script) => Ok(script.id),
            None if self.pending.scripts.contains(name) => {
                debug!(name, "Script not created yet, using placeholder id");
                Ok(String::new())
            }
            None => Err(CloudError::not_found("script", name)),
        }
    }

    pub async fn firewall_group_id(&self, name: &str) -> Result<String> {
        let groups = self.directory.list_firewall_groups().await?;
        match groups.into_iter().find(|g| g.description == name) {
            Some(group) => Ok(group.id),
            None if self.pending.firewalls.contains(name) => {
                debug!(name, "Firewall not created yet, using placeholder id");
                Ok(String::new())
            }
            None => Err(CloudError::not_found("firewall", name)),
        }
    }

    pub async fn resolve_os(&self, os: &OsReference) -> Result<OsResolution> {
        let resolution = match os {
            OsReference::App(name) => OsResolution {
                attachment: Some(OsAttachment::App(self.app_id(name).await?)),
                os_id: self.os_id(APPLICATION_OS).await?,
            },
            OsReference::Iso(filename) => OsResolution {
                attachment: Some(OsAttachment::Iso(self.iso_id(filename).await?)),
                os_id: self.os_id(CUSTOM_OS).await?,
            },
            OsReference::Snapshot(description) => OsResolution {
                attachment: Some(OsAttachment::Snapshot(
                    self.snapshot_id(description).await?,
                )),
                os_id: self.os_id(SNAPSHOT_OS).await?,
            },
            OsReference::NamedWithScript { name, script } => OsResolution {
                os_id: self.os_id(name).await?,
                attachment: Some(OsAttachment::Script(self.script_id(script).await?)),
            },
            OsReference::Named(name) => OsResolution {
                os_id: self.os_id(name).await?,
                attachment: None,
            },
        };
        debug!(?os, ?resolution, "Resolved operating system");
        Ok(resolution)
    }
}
