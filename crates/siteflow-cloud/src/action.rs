//! Action types recorded by a run or proposed by a plan

use crate::state::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single step taken (or proposed) against one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier of the action kind (`<type>-<resource>`); repeats when a kind
    /// is acted on more than once in a plan
    pub id: String,

    /// Type of action
    pub action_type: ActionType,

    /// Kind of resource acted on
    pub resource: ResourceKind,

    /// Provider identifier or name of the resource
    pub resource_id: String,

    /// Human-readable description
    pub description: String,

    /// Additional details (ARNs, name servers, record values)
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        resource: ResourceKind,
        resource_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{action_type}-{resource}"),
            action_type,
            resource,
            resource_id: resource_id.into(),
            description: description.into(),
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Whether the action changed (or would change) remote state
    pub fn is_mutation(&self) -> bool {
        matches!(self.action_type, ActionType::Create | ActionType::Update)
    }
}

/// Type of action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Overwrite an existing resource
    Update,
    /// Resource already in the desired state
    NoOp,
    /// Blocked on an external event (DNS propagation, validation)
    Wait,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::NoOp => write!(f, "no-op"),
            ActionType::Wait => write!(f, "wait"),
        }
    }
}

/// Read-only projection of what the next run would do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Proposed actions in dependency order
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(Action::is_mutation);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn action_for(&self, resource: ResourceKind) -> Option<&Action> {
        self.actions.iter().find(|a| a.resource == resource)
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            wait: self.actions_by_type(ActionType::Wait).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub wait: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} waiting, {} unchanged",
            self.create, self.update, self.wait, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_id_and_details() {
        let action = Action::new(
            ActionType::Create,
            ResourceKind::Bucket,
            "example.com",
            "create bucket",
        )
        .with_detail("acl", serde_json::json!("public-read"));
        assert_eq!(action.id, "create-bucket");
        assert!(action.is_mutation());
        assert_eq!(action.details["acl"], serde_json::json!("public-read"));
    }

    #[test]
    fn test_action_id_names_the_kind() {
        let index = Action::new(ActionType::Create, ResourceKind::Object, "index.html", "");
        let not_found = Action::new(ActionType::Create, ResourceKind::Object, "404.html", "");
        assert_eq!(index.id, "create-object");
        assert_eq!(index.id, not_found.id);
        assert_ne!(index.resource_id, not_found.resource_id);
    }

    #[test]
    fn test_plan_summary() {
        let plan = Plan::new(vec![
            Action::new(ActionType::NoOp, ResourceKind::HostedZone, "Z1", ""),
            Action::new(ActionType::Create, ResourceKind::Bucket, "example.com", ""),
            Action::new(ActionType::Wait, ResourceKind::Certificate, "arn", ""),
        ]);
        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to create, 0 to update, 1 waiting, 1 unchanged"
        );
        assert_eq!(
            plan.action_for(ResourceKind::Certificate).map(|a| a.action_type),
            Some(ActionType::Wait)
        );
    }

    #[test]
    fn test_empty_plan_has_no_changes() {
        let plan = Plan::new(vec![Action::new(
            ActionType::Wait,
            ResourceKind::HostedZone,
            "Z1",
            "",
        )]);
        assert!(!plan.has_changes);
        assert!(!Plan::empty().has_changes);
    }
}
