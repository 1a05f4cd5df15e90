//! Reconciliation engine
//!
//! One [`Reconciler`] runs per provision or destroy. Each entity is matched
//! against the remote listing by its natural key, a decision is made, and the
//! decision is recorded whether or not the mutating call is issued. A dry run
//! walks exactly the same branches and only skips the calls.

mod firewall;
mod script;
mod server;

use crate::directory::ResourceDirectory;
use crate::resolver::{Pending, Resolver};
use convoy_cloud::{Action, ActionType, ApplyResult};
use std::time::Instant;
use tracing::{info, warn};

pub struct Reconciler<'a> {
    directory: &'a dyn ResourceDirectory,
    resolver: Resolver<'a>,
    dry_run: bool,
    result: ApplyResult,
    started: Instant,
}

impl<'a> Reconciler<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory, pending: Pending, dry_run: bool) -> Self {
        Self {
            directory,
            resolver: Resolver::new(directory, pending),
            dry_run,
            result: ApplyResult::new(dry_run),
            started: Instant::now(),
        }
    }

    /// Whether mutating calls go out.
    fn live(&self) -> bool {
        !self.dry_run
    }

    fn record(&mut self, action: Action) {
        let action = action.issued(self.live());
        match action.action_type {
            ActionType::NoOp => info!(
                resource = %action.resource_type,
                id = %action.resource_id,
                "{}",
                action.description
            ),
            _ if self.dry_run => info!(dry_run = true, "Would {}", action),
            _ => info!("{}", action),
        }
        self.result.record(action);
    }

    /// Records a no-op for something that was expected but is absent.
    fn record_missing(&mut self, resource_type: &str, resource_id: &str, description: String) {
        warn!(resource = resource_type, id = resource_id, "{}", description);
        self.result.record(Action::new(
            ActionType::NoOp,
            resource_type,
            resource_id,
            description,
        ));
    }

    pub fn finish(mut self) -> ApplyResult {
        self.result.duration_ms = self.started.elapsed().as_millis() as u64;
        self.result
    }
}
