//! Decision log for reconciliation runs

use serde::{Deserialize, Serialize};
use std::fmt;

/// One reconciliation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,

    /// Resource type (e.g. "server", "firewall-rule", "script")
    pub resource_type: String,

    /// Natural key of the resource (name, or region/label for servers)
    pub resource_id: String,

    pub description: String,

    /// Whether the mutating call was actually made. Always false for no-ops
    /// and for every action of a dry run.
    pub issued: bool,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            description: description.into(),
            issued: false,
        }
    }

    pub fn issued(mut self, issued: bool) -> Self {
        self.issued = issued && self.action_type != ActionType::NoOp;
        self
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.action_type, self.resource_type, self.resource_id, self.description
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    NoOp,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Everything a provision or destroy run decided, in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub actions: Vec<Action>,

    pub dry_run: bool,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new(dry_run: bool) -> Self {
        Self {
            actions: Vec::new(),
            dry_run,
            duration_ms: 0,
        }
    }

    pub fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// The decision sequence with issuance stripped; equal between a dry
    /// run and a real run over the same remote state.
    pub fn decisions(&self) -> Vec<Action> {
        self.actions
            .iter()
            .cloned()
            .map(|a| a.issued(false))
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.actions
            .iter()
            .any(|a| a.action_type != ActionType::NoOp)
    }

    /// Number of mutating calls actually made.
    pub fn mutation_count(&self) -> usize {
        self.actions.iter().filter(|a| a.issued).count()
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_and_counts() {
        let mut result = ApplyResult::new(false);
        result.record(Action::new(ActionType::Create, "script", "boot", "create").issued(true));
        result.record(Action::new(ActionType::NoOp, "server", "Atlanta/web", "same").issued(true));
        result.record(Action::new(ActionType::Delete, "firewall", "old", "gone").issued(true));

        assert!(result.has_changes());
        assert_eq!(result.mutation_count(), 2);
        assert_eq!(
            result.summary().to_string(),
            "1 to create, 0 to update, 1 to delete, 1 unchanged"
        );
    }

    #[test]
    fn test_decisions_ignore_issuance() {
        let mut real = ApplyResult::new(false);
        let mut dry = ApplyResult::new(true);
        let action = Action::new(ActionType::Update, "script", "boot", "content changed");
        real.record(action.clone().issued(true));
        dry.record(action.issued(false));

        assert_ne!(real.actions, dry.actions);
        assert_eq!(real.decisions(), dry.decisions());
        assert_eq!(dry.mutation_count(), 0);
    }

    #[test]
    fn test_noop_is_never_issued() {
        let action = Action::new(ActionType::NoOp, "script", "boot", "identical").issued(true);
        assert!(!action.issued);
        assert_eq!(action.to_string(), "no-op script boot: identical");
    }
}
