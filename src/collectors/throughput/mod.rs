//! Bandwidth throughput test
//!
//! ## Module Organization
//!
//! - `servers`: server list parsing, distance ordering and latency-based selection
//! - `speedtest`: HTTP client that runs latency, download and upload phases
//!
//! The test runs server selection, download and upload in that order. A failure
//! in any phase discards the whole result; partial measurements are never
//! reported.

pub mod servers;
pub mod speedtest;

use async_trait::async_trait;
use log::info;

use crate::collectors::errors::ProbeResult;
use crate::config::SpeedTestConfig;
use crate::models::{ProbeOutcome, SpeedResult};
use crate::report::formatting::bps_to_mbps;

pub use servers::{SelectedServer, SpeedTestServer};
pub use speedtest::SpeedTestClient;

/// A speed-test provider: picks a server and measures raw throughput
#[async_trait]
pub trait ThroughputProvider: Send + Sync {
    /// Discovers candidate servers and picks the best one
    async fn select_server(&self) -> ProbeResult<SelectedServer>;
    /// Download throughput to the chosen server in bits per second
    async fn download_bps(&self, server: &SelectedServer) -> ProbeResult<f64>;
    /// Upload throughput to the chosen server in bits per second
    async fn upload_bps(&self, server: &SelectedServer) -> ProbeResult<f64>;
}

/// Runs a full test against `provider`, returning the first error encountered
pub async fn try_run_speed_test(provider: &dyn ThroughputProvider) -> ProbeResult<SpeedResult> {
    let selected = provider.select_server().await?;
    let download = bps_to_mbps(provider.download_bps(&selected).await?);
    let upload = bps_to_mbps(provider.upload_bps(&selected).await?);

    info!(
        "Speed test against {}: download={} Mbps, upload={} Mbps, ping={} ms",
        selected.server.describe(),
        download,
        upload,
        selected.latency_ms
    );

    Ok(SpeedResult {
        download_mbps: download,
        upload_mbps: upload,
        ping_ms: selected.latency_ms,
        server: selected.server.describe(),
    })
}

/// Runs a full test against `provider`, collapsing any failure into `Unavailable`
pub async fn run_speed_test(provider: &dyn ThroughputProvider) -> ProbeOutcome<SpeedResult> {
    ProbeOutcome::from_result("throughput", try_run_speed_test(provider).await)
}

/// Runs the test against the public speed-test network
pub async fn measure_throughput(config: &SpeedTestConfig) -> ProbeOutcome<SpeedResult> {
    match SpeedTestClient::new(config.clone()) {
        Ok(client) => run_speed_test(&client).await,
        Err(e) => ProbeOutcome::from_result("throughput", Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::errors::ProbeError;

    #[derive(Default)]
    struct FakeProvider {
        fail_selection: bool,
        fail_download: bool,
        fail_upload: bool,
    }

    fn fake_server() -> SelectedServer {
        SelectedServer {
            server: SpeedTestServer {
                url: "http://fake.example/speedtest/upload.php".to_string(),
                name: "Auckland".to_string(),
                sponsor: "Fake Net".to_string(),
                country: "New Zealand".to_string(),
                host: "fake.example:8080".to_string(),
                distance: Some(3.0),
            },
            latency_ms: 14.207,
        }
    }

    #[async_trait]
    impl ThroughputProvider for FakeProvider {
        async fn select_server(&self) -> ProbeResult<SelectedServer> {
            if self.fail_selection {
                return Err(ProbeError::ServerDiscovery("fake".to_string()));
            }
            Ok(fake_server())
        }

        async fn download_bps(&self, _server: &SelectedServer) -> ProbeResult<f64> {
            if self.fail_download {
                return Err(ProbeError::EmptyTransfer { phase: "download" });
            }
            Ok(55_123_400.0)
        }

        async fn upload_bps(&self, _server: &SelectedServer) -> ProbeResult<f64> {
            if self.fail_upload {
                return Err(ProbeError::EmptyTransfer { phase: "upload" });
            }
            Ok(9_876_543.0)
        }
    }

    #[tokio::test]
    async fn test_successful_speed_test_converts_units() {
        let ProbeOutcome::Available(result) = run_speed_test(&FakeProvider::default()).await else {
            panic!("speed test should succeed");
        };

        assert_eq!(result.download_mbps, 55.12);
        assert_eq!(result.upload_mbps, 9.88);
        assert_eq!(result.ping_ms, 14.207);
        assert_eq!(result.server, "Fake Net (Auckland, New Zealand)");
    }

    #[tokio::test]
    async fn test_any_phase_failure_discards_everything() {
        let providers = [
            FakeProvider { fail_selection: true, ..Default::default() },
            FakeProvider { fail_download: true, ..Default::default() },
            FakeProvider { fail_upload: true, ..Default::default() },
        ];

        for provider in &providers {
            assert_eq!(run_speed_test(provider).await, ProbeOutcome::Unavailable);
        }
    }
}
