//! The single-resource check workflow.

use haproxy_stats::StatsSource;
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics::{self, MetricSpec};
use crate::report::{self, Evaluation, Report};
use crate::thresholds::Thresholds;
use crate::types::{Overrides, ResourceHandle, ResourceMode};

/// Operator input for one check run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    pub mode: ResourceMode,
    pub resource: String,
    pub metric: String,
    pub warning: String,
    pub critical: String,
    pub overrides: Overrides,
    /// Reset HAProxy counters after reading them
    pub zero_counters: bool,
}

/// A validated check, ready to run against a stats source.
pub struct Check {
    mode: ResourceMode,
    resource: String,
    spec: &'static MetricSpec,
    thresholds: Thresholds,
    overrides: Overrides,
    zero_counters: bool,
}

impl Check {
    /// Validate ranges and the metric before any stats are read.
    pub fn new(config: CheckConfig) -> Result<Self> {
        let thresholds = Thresholds::parse(&config.warning, &config.critical)?;
        let spec = metrics::lookup(&config.metric)?;
        spec.check_mode(config.mode)?;

        Ok(Self {
            mode: config.mode,
            resource: config.resource,
            spec,
            thresholds,
            overrides: config.overrides,
            zero_counters: config.zero_counters,
        })
    }

    pub fn mode(&self) -> ResourceMode {
        self.mode
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn metric(&self) -> &'static MetricSpec {
        self.spec
    }

    /// Read counters, derive the metric, reset counters, classify.
    ///
    /// Counters are reset only after the metric was computed, and never when
    /// the computation failed.
    pub async fn run<S>(&self, source: &S) -> Result<Report>
    where
        S: StatsSource + ?Sized,
    {
        let snapshot = source.snapshot().await?;
        let handle = ResourceHandle::resolve(&snapshot, self.mode, &self.resource)?;
        let result = self.spec.compute(&snapshot, &handle, self.overrides)?;

        if self.zero_counters {
            source.clear_counters().await?;
        } else {
            debug!("Leaving counters untouched");
        }

        let evaluation = Evaluation::new(result, self.thresholds);
        info!(
            metric = self.spec.name,
            resource = %self.resource,
            verdict = %evaluation.verdict,
            "Check complete"
        );

        Ok(report::summarize(self.mode, &self.resource, &[evaluation]))
    }
}
