//! Vultr platform implementation

use crate::client::VultrClient;
use crate::directory::ResourceDirectory;
use crate::error::VultrError;
use crate::reconcile::Reconciler;
use crate::resolver::Pending;
use async_trait::async_trait;
use convoy_cloud::{ApplyResult, AuthStatus, CloudError, Platform, Result};
use convoy_core::{Infrastructure, Registry, TagAction};
use std::sync::Arc;
use tracing::{info, instrument};

/// Vultr platform
pub struct VultrPlatform {
    directory: Arc<dyn ResourceDirectory>,
}

impl VultrPlatform {
    pub fn new(directory: Arc<dyn ResourceDirectory>) -> Self {
        Self { directory }
    }

    /// Platform backed by the REST client configured from the environment.
    pub fn from_env() -> std::result::Result<Self, VultrError> {
        Ok(Self::new(Arc::new(VultrClient::from_env()?)))
    }

    /// Pending names are only honored when nothing is being created.
    fn pending(infra: &Infrastructure, dry_run: bool) -> Pending {
        if dry_run {
            Pending::from_infrastructure(infra)
        } else {
            Pending::none()
        }
    }
}

#[async_trait]
impl Platform for VultrPlatform {
    fn name(&self) -> &str {
        "vultr"
    }

    fn display_name(&self) -> &str {
        "Vultr"
    }

    fn register_tags(&self, registry: &mut Registry) {
        registry.register("vultr", TagAction::Ignore);
    }

    async fn test_connection(&self) -> Result<AuthStatus> {
        match self.directory.account().await {
            Ok(account) => Ok(AuthStatus::ok(format!(
                "{} <{}>",
                account.name, account.email
            ))),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    #[instrument(skip_all)]
    async fn validate(&self, infra: &Infrastructure) -> Result<()> {
        let auth = self.test_connection().await?;
        if !auth.authenticated {
            return Err(CloudError::AuthenticationFailed(
                auth.error.unwrap_or_default(),
            ));
        }

        let reconciler = Reconciler::new(
            self.directory.as_ref(),
            Pending::from_infrastructure(infra),
            true,
        );
        for server in infra.servers() {
            reconciler.desired_instance(server).await?;
            info!(server = %server.display_name(), "References resolved");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(dry_run = dry_run))]
    async fn provision(&self, infra: &Infrastructure, dry_run: bool) -> Result<ApplyResult> {
        let mut reconciler = Reconciler::new(
            self.directory.as_ref(),
            Self::pending(infra, dry_run),
            dry_run,
        );

        for script in infra.scripts() {
            reconciler.apply_script(script).await?;
        }
        for firewall in infra.firewalls() {
            reconciler.apply_firewall(firewall).await?;
        }
        for server in infra.servers() {
            reconciler.apply_server(server).await?;
        }

        let result = reconciler.finish();
        info!(summary = %result.summary(), "Provision finished");
        Ok(result)
    }

    /// Reverse dependency order: servers reference firewalls and scripts.
    #[instrument(skip_all, fields(dry_run = dry_run))]
    async fn destroy(&self, infra: &Infrastructure, dry_run: bool) -> Result<ApplyResult> {
        let mut reconciler = Reconciler::new(
            self.directory.as_ref(),
            Self::pending(infra, dry_run),
            dry_run,
        );

        for server in infra.servers() {
            reconciler.destroy_server(server).await?;
        }
        for firewall in infra.firewalls() {
            reconciler.destroy_firewall(firewall).await?;
        }
        for script in infra.scripts() {
            reconciler.destroy_script(script).await?;
        }

        let result = reconciler.finish();
        info!(summary = %result.summary(), "Destroy finished");
        Ok(result)
    }
}
