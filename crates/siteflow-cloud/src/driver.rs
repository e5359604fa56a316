//! Convergence driver

use crate::action::Plan;
use crate::config::ConvergeConfig;
use crate::outcome::{Failure, Outcome, RunReport};
use crate::planner;
use crate::provider::Backends;
use crate::sequencer;
use crate::steps::{StepContext, into_outcome};
use chrono::Utc;
use std::time::Instant;

/// Entry point for one convergence run against a set of backends
pub struct Converger {
    config: ConvergeConfig,
    backends: Backends,
}

impl Converger {
    pub fn new(config: ConvergeConfig, backends: Backends) -> Self {
        Self { config, backends }
    }

    pub fn config(&self) -> &ConvergeConfig {
        &self.config
    }

    /// Run once, from the first step, and report where the run stopped.
    ///
    /// Never retries and never rolls back. Running again after an external
    /// event (delegation, validation) picks up where this run stopped.
    pub async fn converge(&self) -> RunReport {
        let started_at = Utc::now();
        let timer = Instant::now();
        tracing::info!(domain = %self.config.domain, "starting convergence");

        let mut cx = StepContext::new(&self.config, &self.backends);
        let result = sequencer::run(&mut cx).await;
        let outcome = into_outcome(result);

        match &outcome {
            Outcome::Completed(endpoint) => tracing::info!(
                domain = %self.config.domain,
                distribution = %endpoint.distribution_id,
                "site converged"
            ),
            Outcome::PendingExternal(reason) => {
                tracing::warn!(domain = %self.config.domain, %reason, "convergence pending")
            }
            Outcome::Failed(failure) => {
                tracing::warn!(domain = %self.config.domain, %failure, "convergence failed")
            }
        }

        RunReport {
            domain: self.config.domain.clone(),
            started_at,
            actions: cx.into_actions(),
            outcome,
            duration_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Read-only projection of what `converge` would do next
    pub async fn plan(&self) -> Result<Plan, Failure> {
        planner::plan(&self.config, &self.backends).await
    }
}
