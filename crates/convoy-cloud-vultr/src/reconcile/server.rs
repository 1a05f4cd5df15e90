use super::Reconciler;
use crate::resolver::OsAttachment;
use crate::types::{Instance, NewInstance};
use convoy_cloud::{Action, ActionType, Equivalence, FieldCheck, Result, compare};
use convoy_core::{OsReference, Server};
use tracing::debug;

const RESOURCE: &str = "server";

/// Desired projection against the remote instance, in comparison order.
///
/// A snapshot-based instance reports the snapshot's own OS rather than the
/// "Snapshot" placeholder, so its OS id is left out.
fn equivalence_checks(desired: &NewInstance, os: &OsReference, remote: &Instance) -> Vec<FieldCheck> {
    let os_id = match os {
        OsReference::Snapshot(_) => 0,
        _ => desired.os_id,
    };
    vec![
        FieldCheck::integer("os_id", os_id, remote.os_id),
        FieldCheck::text(
            "tag",
            desired.tag.as_deref().unwrap_or_default(),
            remote.tag.as_str(),
        ),
        FieldCheck::text(
            "label",
            desired.label.as_deref().unwrap_or_default(),
            remote.label.as_str(),
        ),
        FieldCheck::text("plan", desired.plan.as_str(), remote.plan.as_str()),
        FieldCheck::integer("app_id", desired.app_id.unwrap_or_default(), remote.app_id),
        FieldCheck::text("region", desired.region.as_str(), remote.region.as_str()),
    ]
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Reconciler<'_> {
    /// Resolves every reference of `server` into a create request.
    pub(crate) async fn desired_instance(&self, server: &Server) -> Result<NewInstance> {
        let region = self.resolver.region_id(server.region()).await?;
        let plan = self.resolver.plan_id(server.plan()).await?;
        let os = self.resolver.resolve_os(server.os()).await?;

        let firewall_group_id = match server.firewall() {
            Some(name) => non_empty(&self.resolver.firewall_group_id(name).await?),
            None => None,
        };
        let script_id = match (&os.attachment, server.startup_script()) {
            (Some(OsAttachment::Script(id)), _) => non_empty(id),
            (_, Some(name)) => non_empty(&self.resolver.script_id(name).await?),
            _ => None,
        };

        Ok(NewInstance {
            region,
            plan,
            os_id: os.os_id,
            label: non_empty(server.label()),
            tag: server.tag().map(str::to_string),
            app_id: os.app_id(),
            iso_id: match &os.attachment {
                Some(OsAttachment::Iso(id)) => Some(id.clone()),
                _ => None,
            },
            snapshot_id: match &os.attachment {
                Some(OsAttachment::Snapshot(id)) => Some(id.clone()),
                _ => None,
            },
            script_id,
            firewall_group_id,
            sshkey_id: server.ssh_keys().to_vec(),
            enable_private_network: server.private_networking(),
            user_data: server.user_data().map(str::to_string),
        })
    }

    /// Creates the server, or replaces it when the remote one no longer
    /// matches. Servers are matched by (region, label).
    pub async fn apply_server(&mut self, server: &Server) -> Result<()> {
        let desired = self.desired_instance(server).await?;
        let id = server.display_name();

        let existing = self.directory.list_servers().await?;
        let Some(remote) = existing
            .into_iter()
            .find(|i| i.region == desired.region && i.label == server.label())
        else {
            if self.live() {
                let created = self.directory.create_server(&desired).await?;
                debug!(id = %created.id, "Server created");
            }
            self.record(Action::new(
                ActionType::Create,
                RESOURCE,
                id,
                format!(
                    "create {} in {} (os {})",
                    desired.plan, desired.region, desired.os_id
                ),
            ));
            return Ok(());
        };

        match compare(&equivalence_checks(&desired, server.os(), &remote)) {
            Equivalence::Equivalent => {
                self.record(Action::new(ActionType::NoOp, RESOURCE, id, "up to date"));
            }
            differs => {
                if self.live() {
                    self.directory.destroy_server(&remote.id).await?;
                }
                self.record(Action::new(
                    ActionType::Delete,
                    RESOURCE,
                    id.clone(),
                    format!("replace: {}", differs),
                ));
                if self.live() {
                    self.directory.create_server(&desired).await?;
                }
                self.record(Action::new(
                    ActionType::Create,
                    RESOURCE,
                    id,
                    format!(
                        "recreate {} in {} (os {})",
                        desired.plan, desired.region, desired.os_id
                    ),
                ));
            }
        }
        Ok(())
    }

    pub async fn destroy_server(&mut self, server: &Server) -> Result<()> {
        let region = self.resolver.region_id(server.region()).await?;
        let id = server.display_name();

        let existing = self.directory.list_servers().await?;
        match existing
            .into_iter()
            .find(|i| i.region == region && i.label == server.label())
        {
            Some(remote) => {
                if self.live() {
                    self.directory.destroy_server(&remote.id).await?;
                }
                self.record(Action::new(
                    ActionType::Delete,
                    RESOURCE,
                    id,
                    "delete server",
                ));
            }
            None => self.record_missing(RESOURCE, &id, format!("no server {}", id)),
        }
        Ok(())
    }
}
