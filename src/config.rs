//! Fixed probe parameters
//!
//! The report always runs with [`ProbeConfig::default`]. Other values are only
//! constructed by tests that point probes at local or unreachable endpoints.

use std::time::Duration;

/// Host probed by the latency check
pub const DEFAULT_PING_TARGET: &str = "8.8.8.8";
/// How long to wait for an ICMP echo reply
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);
/// Geolocation endpoint returning `query`, `isp`, `city`, `country`, `timezone`
pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";
/// Timeout for the whole geolocation request
pub const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Speed-test server list, sorted by the provider by distance from the caller
pub const DEFAULT_SPEEDTEST_SERVERS_URL: &str =
    "https://www.speedtest.net/api/js/servers?engine=js&https_functional=true";

/// Parameters for the throughput test
#[derive(Debug, Clone)]
pub struct SpeedTestConfig {
    /// Server list endpoint
    pub servers_url: String,
    /// How many of the nearest servers are latency-tested
    pub candidate_servers: usize,
    /// Latency requests per candidate server
    pub latency_samples: u32,
    /// Timeout for a single HTTP request during the test
    pub request_timeout: Duration,
    /// Wall-clock budget for each of the download and upload phases
    pub phase_budget: Duration,
    /// Edge lengths of the `random{n}x{n}.jpg` images fetched during download
    pub download_sizes: Vec<u32>,
    /// Payload sizes in bytes posted during upload
    pub upload_sizes: Vec<usize>,
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            servers_url: DEFAULT_SPEEDTEST_SERVERS_URL.to_string(),
            candidate_servers: 5,
            latency_samples: 3,
            request_timeout: Duration::from_secs(10),
            phase_budget: Duration::from_secs(10),
            download_sizes: vec![350, 500, 750, 1000, 1500, 2000, 2500, 3000, 3500, 4000],
            upload_sizes: vec![250_000, 500_000, 1_000_000, 2_000_000, 4_000_000],
        }
    }
}

/// All parameters a report run needs
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub ping_target: String,
    pub ping_timeout: Duration,
    pub geolocation_url: String,
    pub geolocation_timeout: Duration,
    pub speed_test: SpeedTestConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ping_target: DEFAULT_PING_TARGET.to_string(),
            ping_timeout: DEFAULT_PING_TIMEOUT,
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
            speed_test: SpeedTestConfig::default(),
        }
    }
}
