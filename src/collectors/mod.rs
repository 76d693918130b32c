pub mod errors;
pub mod latency;
pub mod local_identity;
pub mod platform;
pub mod public_identity;
pub mod throughput;
pub mod usage;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::ProbeConfig;
use crate::models::{LatencyResult, LocalInfo, ProbeOutcome, PublicInfo, SpeedResult, UsageCounters};

pub use errors::{ProbeError, ProbeResult};
pub use usage::UsageCollector;

/// The five probes a report is built from
///
/// The report driver calls these one at a time, in declaration order.
#[async_trait]
pub trait ProbeSuite: Send + Sync {
    /// Hostname, local IP and platform; failure aborts the report
    async fn local_identity(&self) -> Result<LocalInfo>;
    async fn public_identity(&self) -> ProbeOutcome<PublicInfo>;
    async fn latency(&self) -> ProbeOutcome<LatencyResult>;
    async fn throughput(&self) -> ProbeOutcome<SpeedResult>;
    async fn usage_counters(&self) -> UsageCounters;
}

/// Probes backed by the real OS and network
#[derive(Debug, Clone, Default)]
pub struct SystemProbes {
    config: ProbeConfig,
}

impl SystemProbes {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

#[async_trait]
impl ProbeSuite for SystemProbes {
    async fn local_identity(&self) -> Result<LocalInfo> {
        let info = tokio::task::spawn_blocking(local_identity::read_local_info)
            .await?
            .context("Failed to determine local identity")?;
        Ok(info)
    }

    async fn public_identity(&self) -> ProbeOutcome<PublicInfo> {
        public_identity::fetch_public_info(
            &self.config.geolocation_url,
            self.config.geolocation_timeout,
        )
        .await
    }

    async fn latency(&self) -> ProbeOutcome<LatencyResult> {
        latency::check_latency(&self.config.ping_target, self.config.ping_timeout).await
    }

    async fn throughput(&self) -> ProbeOutcome<SpeedResult> {
        throughput::measure_throughput(&self.config.speed_test).await
    }

    async fn usage_counters(&self) -> UsageCounters {
        usage::read_usage_counters()
    }
}
