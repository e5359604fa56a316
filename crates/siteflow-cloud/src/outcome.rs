//! Typed result of a convergence run

use crate::action::{Action, ActionType};
use crate::error::CloudError;
use crate::state::{RecordSet, ResourceKind, ValidationRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EXIT_COMPLETED: i32 = 0;
pub const EXIT_PENDING: i32 = 10;
pub const EXIT_PROBE_FAILURE: i32 = 20;
pub const EXIT_CREATE_FAILURE: i32 = 21;
pub const EXIT_TERMINAL_FAILURE: i32 = 22;

/// Where a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Every resource exists and the site is served through the distribution
    Completed(SiteEndpoint),
    /// Waiting on something only the outside world can do
    PendingExternal(PendingReason),
    /// The run hit an error and stopped without cleanup
    Failed(Failure),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Completed(_) => EXIT_COMPLETED,
            Outcome::PendingExternal(_) => EXIT_PENDING,
            Outcome::Failed(failure) => failure.kind.exit_code(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::PendingExternal(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingReason> {
        match self {
            Outcome::PendingExternal(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteEndpoint {
    pub distribution_id: String,
    pub distribution_domain: String,
    /// Whether this run wrote the alias record
    pub alias_written: bool,
    /// With external DNS, the record the operator points at the distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_record: Option<RecordSet>,
}

/// Recognised "not yet" conditions; each carries what the operator needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PendingReason {
    /// A hosted zone was just created. Its id must be saved to configuration
    /// and the name servers installed at the registrar.
    ZoneCreated {
        zone_id: String,
        name_servers: Vec<String>,
    },
    /// Public DNS has no NS records for the domain yet
    NameServersNotPublished { expected: Vec<String> },
    /// Public DNS delegates to different name servers than the zone's
    NameServersMismatch {
        expected: Vec<String>,
        published: Vec<String>,
    },
    /// Certificate was requested but the CA has not produced a validation record yet
    ValidationRecordNotReady { certificate_arn: String },
    /// Validation record is in place; the CA validates asynchronously
    CertificateValidation {
        certificate_arn: String,
        record: ValidationRecord,
    },
    /// External DNS: the operator must add the validation record by hand
    ManualValidation {
        certificate_arn: String,
        record: ValidationRecord,
    },
}

impl PendingReason {
    pub fn resource(&self) -> ResourceKind {
        match self {
            PendingReason::ZoneCreated { .. }
            | PendingReason::NameServersNotPublished { .. }
            | PendingReason::NameServersMismatch { .. } => ResourceKind::HostedZone,
            PendingReason::ValidationRecordNotReady { .. }
            | PendingReason::CertificateValidation { .. }
            | PendingReason::ManualValidation { .. } => ResourceKind::Certificate,
        }
    }
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::ZoneCreated { zone_id, .. } => {
                write!(f, "hosted zone {zone_id} created; delegation required")
            }
            PendingReason::NameServersNotPublished { .. } => {
                write!(f, "no NS records published for the domain")
            }
            PendingReason::NameServersMismatch { .. } => {
                write!(f, "published NS records do not match the hosted zone")
            }
            PendingReason::ValidationRecordNotReady { certificate_arn } => {
                write!(f, "validation record for {certificate_arn} not issued yet")
            }
            PendingReason::CertificateValidation {
                certificate_arn, ..
            } => write!(f, "certificate {certificate_arn} is pending validation"),
            PendingReason::ManualValidation { record, .. } => {
                write!(f, "add validation record {record} at the DNS provider")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A read/list call failed
    Probe,
    /// A create/upload/request call failed
    Create,
    /// The remote resource reached a state it cannot recover from
    TerminalExternal,
}

impl FailureKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            FailureKind::Probe => EXIT_PROBE_FAILURE,
            FailureKind::Create => EXIT_CREATE_FAILURE,
            FailureKind::TerminalExternal => EXIT_TERMINAL_FAILURE,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Probe => write!(f, "probe failure"),
            FailureKind::Create => write!(f, "create failure"),
            FailureKind::TerminalExternal => write!(f, "terminal external failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub resource: ResourceKind,
    /// Raw provider diagnostic
    pub detail: String,
}

impl Failure {
    pub fn probe(resource: ResourceKind, err: CloudError) -> Self {
        Self {
            kind: FailureKind::Probe,
            resource,
            detail: err.to_string(),
        }
    }

    pub fn create(resource: ResourceKind, err: CloudError) -> Self {
        Self {
            kind: FailureKind::Create,
            resource,
            detail: err.to_string(),
        }
    }

    pub fn terminal(resource: ResourceKind, detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::TerminalExternal,
            resource,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.resource, self.detail)
    }
}

/// Everything one run did, in order, and where it stopped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub domain: String,
    pub started_at: DateTime<Utc>,
    pub actions: Vec<Action>,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

impl RunReport {
    /// Actions that created or overwrote remote resources
    pub fn mutations(&self) -> Vec<&Action> {
        self.actions.iter().filter(|a| a.is_mutation()).collect()
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }
}
