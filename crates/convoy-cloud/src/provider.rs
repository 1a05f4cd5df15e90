//! Platform trait definition

use crate::action::ApplyResult;
use crate::error::Result;
use async_trait::async_trait;
use convoy_core::{Infrastructure, Registry};
use serde::{Deserialize, Serialize};

/// Platform abstraction trait
///
/// A platform turns a loaded [`Infrastructure`] into calls against one
/// provider. Provision and destroy return the full decision log; with
/// `dry_run` set the decisions are the same and no mutating call is made.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Name used in the document's `platform` key (e.g. "vultr")
    fn name(&self) -> &str;

    /// Display name for UI
    fn display_name(&self) -> &str;

    /// Adds platform-specific top-level tags to the loader registry.
    fn register_tags(&self, _registry: &mut Registry) {}

    /// Check that the platform is reachable and the credentials work
    async fn test_connection(&self) -> Result<AuthStatus>;

    /// Resolve every reference in `infra` without mutating anything
    async fn validate(&self, infra: &Infrastructure) -> Result<()>;

    async fn provision(&self, infra: &Infrastructure, dry_run: bool) -> Result<ApplyResult>;

    async fn destroy(&self, infra: &Infrastructure, dry_run: bool) -> Result<ApplyResult>;
}

/// Default registry extended with the platform's own tags.
pub fn registry_for(platform: &dyn Platform) -> Registry {
    let mut registry = Registry::with_defaults();
    platform.register_tags(&mut registry);
    registry
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionType};
    use convoy_core::{TagAction, load_str};

    struct Recording;

    #[async_trait]
    impl Platform for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn display_name(&self) -> &str {
            "Recording"
        }

        fn register_tags(&self, registry: &mut Registry) {
            registry.register("recording", TagAction::Ignore);
        }

        async fn test_connection(&self) -> Result<AuthStatus> {
            Ok(AuthStatus::ok("tester"))
        }

        async fn validate(&self, _infra: &Infrastructure) -> Result<()> {
            Ok(())
        }

        async fn provision(&self, infra: &Infrastructure, dry_run: bool) -> Result<ApplyResult> {
            let mut result = ApplyResult::new(dry_run);
            for script in infra.scripts() {
                result.record(
                    Action::new(ActionType::Create, "script", script.name(), "new")
                        .issued(!dry_run),
                );
            }
            Ok(result)
        }

        async fn destroy(&self, _infra: &Infrastructure, dry_run: bool) -> Result<ApplyResult> {
            Ok(ApplyResult::new(dry_run))
        }
    }

    #[test]
    fn test_registry_for_adds_platform_tags() {
        let registry = registry_for(&Recording);
        assert!(registry.contains("recording"));
        assert!(registry.contains("servers"));
    }

    #[test]
    fn test_platform_through_trait_object() {
        let platform: Box<dyn Platform> = Box::new(Recording);
        let registry = registry_for(platform.as_ref());
        let infra = load_str(
            "recording: {}\nscripts:\n  - { name: boot, type: boot }\n",
            &registry,
        )
        .unwrap();

        let auth = tokio_test::block_on(platform.test_connection()).unwrap();
        assert!(auth.authenticated);

        let dry = tokio_test::block_on(platform.provision(&infra, true)).unwrap();
        let real = tokio_test::block_on(platform.provision(&infra, false)).unwrap();
        assert_eq!(dry.decisions(), real.decisions());
        assert_eq!(dry.mutation_count(), 0);
        assert_eq!(real.mutation_count(), 1);
    }

    #[test]
    fn test_auth_status() {
        let failed = AuthStatus::failed("bad key");
        assert!(!failed.authenticated);
        assert_eq!(failed.error.as_deref(), Some("bad key"));
    }
}
