//! SiteFlow Cloud
//!
//! Idempotent convergence of a static website stack: hosted zone, bucket,
//! TLS certificate, CDN distribution and the alias record tying the domain
//! to the distribution.
//!
//! A run probes each resource in dependency order, creates what is missing
//! and stops at the first step that needs the outside world (registrar
//! delegation, certificate validation). The caller re-runs later; nothing is
//! persisted between runs.
//!
//! With external DNS the zone gate and alias step are skipped and the run
//! hands the validation and CNAME records to the operator instead.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    site CLI                      │
//! │                 (site up/plan)                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                siteflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Converger ─▶ sequencer ─▶ steps          │   │
//! │  │  zone ▶ storage ▶ certificate ▶ cdn ▶ alias│  │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Probe     │  │  Blueprint   │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │  trait ObjectStorage / CertificateAuthority / Cdn / Dns
//! ┌───────▼────────────┐
//! │ siteflow-cloud-aws │
//! └────────────────────┘
//! ```

pub mod action;
pub mod blueprint;
pub mod config;
pub mod driver;
pub mod error;
pub mod outcome;
pub mod planner;
pub mod probe;
pub mod provider;
pub mod sequencer;
pub mod state;
pub mod steps;
pub mod token;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary};
pub use blueprint::DistributionBlueprint;
pub use config::{ConvergeConfig, DnsMode};
pub use driver::Converger;
pub use error::{CloudError, Result};
pub use outcome::{Failure, FailureKind, Outcome, PendingReason, RunReport, SiteEndpoint};
pub use provider::{
    AssetSource, Backends, Cdn, CertificateAuthority, Dns, NameServerLookup, ObjectStorage,
};
pub use state::{
    Acl, CertificateDetail, CertificateRequest, CertificateStatus, CertificateSummary,
    ChangeAction, Distribution, DistributionSummary, HostedZone, RecordSet, RecordTarget,
    ResourceKind, ValidationRecord,
};
pub use token::{TokenPurpose, derive_token};
