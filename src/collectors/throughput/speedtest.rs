//! HTTP speed-test client
//!
//! Talks to speedtest.net-style servers: latency is measured by fetching
//! `latency.txt`, download by streaming `random{n}x{n}.jpg` images and upload
//! by posting generated form payloads to `upload.php`. Each phase runs its
//! requests one after another until the size list or the time budget runs out.
//! Individual transfers rejected by the server are skipped; a phase fails only
//! when nothing at all was transferred.

use async_trait::async_trait;
use log::{debug, info};
use std::time::{Duration, Instant};

use super::ThroughputProvider;
use super::servers::{SelectedServer, SpeedTestServer, lowest_latency, nearest, parse_server_list};
use crate::collectors::errors::{ProbeError, ProbeResult};
use crate::config::SpeedTestConfig;
use crate::report::formatting::round_to;

/// Latency charged to a failed sample, in seconds
const UNREACHABLE_PENALTY_SECS: f64 = 3600.0;
const UPLOAD_FILL: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const UPLOAD_PREFIX: &[u8] = b"content1=";
const USER_AGENT: &str = concat!("network-hub/", env!("CARGO_PKG_VERSION"));

pub struct SpeedTestClient {
    http: reqwest::Client,
    config: SpeedTestConfig,
}

impl SpeedTestClient {
    pub fn new(config: SpeedTestConfig) -> ProbeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Downloads and parses the provider's server list
    pub async fn fetch_servers(&self) -> ProbeResult<Vec<SpeedTestServer>> {
        let url = &self.config.servers_url;
        debug!("Fetching speed-test server list from {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::BadStatus {
                status: status.as_u16(),
                url: url.clone(),
            });
        }

        let servers = parse_server_list(&response.text().await?)?;
        debug!("Server list contains {} entries", servers.len());
        Ok(servers)
    }

    /// Average latency to a server in milliseconds, rounded to 3 decimals
    ///
    /// Failed samples count as a one-hour round trip so that unreachable
    /// servers sort last without aborting the selection.
    pub async fn measure_latency(&self, server: &SpeedTestServer) -> f64 {
        let samples = self.config.latency_samples.max(1);
        let mut total_secs = 0.0;

        for sample in 0..samples {
            let cache_buster = format!("{}.{}", chrono::Utc::now().timestamp_millis(), sample);
            let url = server.latency_url(&cache_buster);
            let started = Instant::now();

            let ok = match self.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => response
                    .text()
                    .await
                    .map(|body| body.trim().starts_with("test=test"))
                    .unwrap_or(false),
                Ok(response) => {
                    debug!("Latency sample to {} returned {}", server.host, response.status());
                    false
                }
                Err(e) => {
                    debug!("Latency sample to {} failed: {}", server.host, e);
                    false
                }
            };

            total_secs += if ok {
                started.elapsed().as_secs_f64()
            } else {
                UNREACHABLE_PENALTY_SECS
            };
        }

        round_to(total_secs / samples as f64 * 1000.0, 3)
    }

    fn budget_exhausted(&self, started: Instant) -> bool {
        started.elapsed() >= self.config.phase_budget
    }
}

#[async_trait]
impl ThroughputProvider for SpeedTestClient {
    async fn select_server(&self) -> ProbeResult<SelectedServer> {
        let candidates = nearest(self.fetch_servers().await?, self.config.candidate_servers);

        let mut measured = Vec::with_capacity(candidates.len());
        for server in candidates {
            let latency_ms = self.measure_latency(&server).await;
            debug!("Candidate {} latency: {} ms", server.describe(), latency_ms);
            measured.push((server, latency_ms));
        }

        let selected = lowest_latency(measured, UNREACHABLE_PENALTY_SECS * 1000.0)?;
        info!(
            "Selected speed-test server {} at {} ({} ms)",
            selected.server.describe(),
            selected.server.host,
            selected.latency_ms
        );
        Ok(selected)
    }

    async fn download_bps(&self, server: &SelectedServer) -> ProbeResult<f64> {
        let started = Instant::now();
        let mut total_bytes: u64 = 0;

        'sizes: for &size in &self.config.download_sizes {
            if self.budget_exhausted(started) {
                break;
            }

            let url = server.server.download_url(size);
            let mut response = self.http.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                // Servers do not host every image size
                debug!("Skipping download of {}: {}", url, status);
                continue;
            }

            while let Some(chunk) = response.chunk().await? {
                total_bytes += chunk.len() as u64;
                if self.budget_exhausted(started) {
                    break 'sizes;
                }
            }
        }

        bits_per_second(total_bytes, started.elapsed(), "download")
    }

    async fn upload_bps(&self, server: &SelectedServer) -> ProbeResult<f64> {
        let started = Instant::now();
        let mut total_bytes: u64 = 0;

        for &size in &self.config.upload_sizes {
            if self.budget_exhausted(started) {
                break;
            }

            let payload = upload_payload(size);
            let sent = payload.len() as u64;
            let response = self
                .http
                .post(server.server.upload_url())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(payload)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                debug!("Upload of {} bytes rejected: {}", sent, status);
                continue;
            }
            total_bytes += sent;
        }

        bits_per_second(total_bytes, started.elapsed(), "upload")
    }
}

/// Builds a form payload of exactly `size` bytes (at least the form prefix)
pub fn upload_payload(size: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(size.max(UPLOAD_PREFIX.len()));
    payload.extend_from_slice(UPLOAD_PREFIX);
    let fill = size.saturating_sub(UPLOAD_PREFIX.len());
    payload.extend(UPLOAD_FILL.iter().copied().cycle().take(fill));
    payload
}

fn bits_per_second(bytes: u64, elapsed: Duration, phase: &'static str) -> ProbeResult<f64> {
    let secs = elapsed.as_secs_f64();
    if bytes == 0 || secs <= 0.0 {
        return Err(ProbeError::EmptyTransfer { phase });
    }
    let bps = bytes as f64 * 8.0 / secs;
    debug!("{} transferred {} bytes in {:.2}s ({:.0} bit/s)", phase, bytes, secs, bps);
    Ok(bps)
}
