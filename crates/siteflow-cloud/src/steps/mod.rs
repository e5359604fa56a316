//! Step executors, one per resource kind
//!
//! Each step probes its resource, creates it when absent and hands the
//! values later steps depend on forward. A step stops the run by returning
//! [`Halt`].

pub mod alias;
pub mod certificate;
pub mod distribution;
pub mod storage;
pub mod zone;

use crate::action::Action;
use crate::config::ConvergeConfig;
use crate::outcome::{Failure, Outcome, PendingReason, SiteEndpoint};
use crate::probe::ResourceProbe;
use crate::provider::Backends;

/// Why a run stopped before completing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Pending(PendingReason),
    Failed(Failure),
}

impl From<Failure> for Halt {
    fn from(failure: Failure) -> Self {
        Halt::Failed(failure)
    }
}

impl From<PendingReason> for Halt {
    fn from(reason: PendingReason) -> Self {
        Halt::Pending(reason)
    }
}

pub type StepResult<T> = std::result::Result<T, Halt>;

pub(crate) fn into_outcome(result: StepResult<SiteEndpoint>) -> Outcome {
    match result {
        Ok(endpoint) => Outcome::Completed(endpoint),
        Err(Halt::Pending(reason)) => Outcome::PendingExternal(reason),
        Err(Halt::Failed(failure)) => Outcome::Failed(failure),
    }
}

/// Shared state threaded through the steps of one run
pub struct StepContext<'a> {
    pub config: &'a ConvergeConfig,
    pub backends: &'a Backends,
    actions: Vec<Action>,
}

impl<'a> StepContext<'a> {
    pub fn new(config: &'a ConvergeConfig, backends: &'a Backends) -> Self {
        Self {
            config,
            backends,
            actions: Vec::new(),
        }
    }

    pub fn probe(&self) -> ResourceProbe<'a> {
        ResourceProbe::new(self.backends)
    }

    pub fn domain(&self) -> &'a str {
        &self.config.domain
    }

    pub fn record(&mut self, action: Action) {
        tracing::debug!(id = %action.id, resource_id = %action.resource_id, "{}", action.description);
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}
