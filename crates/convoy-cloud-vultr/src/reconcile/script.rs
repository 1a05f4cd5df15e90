use super::Reconciler;
use crate::types::NewScript;
use convoy_cloud::{Action, ActionType, Result};
use convoy_core::{Script, ScriptType};
use tracing::debug;

const RESOURCE: &str = "script";

fn request(script: &Script) -> NewScript {
    NewScript {
        name: script.name().to_string(),
        script_type: script.script_type(),
        content: script.content().to_string(),
    }
}

impl Reconciler<'_> {
    /// Creates, updates or replaces a script matched by name.
    pub async fn apply_script(&mut self, script: &Script) -> Result<()> {
        let existing = self.directory.list_scripts().await?;
        let name = script.name();

        let Some(remote) = existing.into_iter().find(|s| s.name == name) else {
            if self.live() {
                self.directory.create_script(&request(script)).await?;
            }
            self.record(Action::new(
                ActionType::Create,
                RESOURCE,
                name,
                format!("create {} script", script.script_type()),
            ));
            return Ok(());
        };

        let remote_type = ScriptType::parse(&remote.script_type);
        debug!(name, remote_id = %remote.id, remote_type = %remote.script_type, "Matched script");

        if remote_type != Some(script.script_type()) {
            if self.live() {
                self.directory.delete_script(&remote.id).await?;
            }
            self.record(Action::new(
                ActionType::Delete,
                RESOURCE,
                name,
                format!(
                    "type changed from {} to {}",
                    remote.script_type,
                    script.script_type()
                ),
            ));
            if self.live() {
                self.directory.create_script(&request(script)).await?;
            }
            self.record(Action::new(
                ActionType::Create,
                RESOURCE,
                name,
                format!("recreate as {} script", script.script_type()),
            ));
        } else if remote.script != script.content() {
            if self.live() {
                self.directory
                    .update_script(&remote.id, &request(script))
                    .await?;
            }
            self.record(Action::new(
                ActionType::Update,
                RESOURCE,
                name,
                "content changed",
            ));
        } else {
            self.record(Action::new(ActionType::NoOp, RESOURCE, name, "up to date"));
        }
        Ok(())
    }

    /// Deletes the script if one with the same name and type exists.
    pub async fn destroy_script(&mut self, script: &Script) -> Result<()> {
        let existing = self.directory.list_scripts().await?;
        let found = existing.into_iter().find(|s| {
            s.name == script.name()
                && ScriptType::parse(&s.script_type) == Some(script.script_type())
        });

        match found {
            Some(remote) => {
                if self.live() {
                    self.directory.delete_script(&remote.id).await?;
                }
                self.record(Action::new(
                    ActionType::Delete,
                    RESOURCE,
                    script.name(),
                    "delete script",
                ));
            }
            None => self.record_missing(
                RESOURCE,
                script.name(),
                format!("no {} script named {}", script.script_type(), script.name()),
            ),
        }
        Ok(())
    }
}
