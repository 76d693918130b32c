//! Value groups produced by the probes
//!
//! Each probe produces its value once per run; the report consumes it once.
//! Optional groups are wrapped in [`ProbeOutcome`] so a failed probe is either
//! fully populated or fully absent.

use log::warn;
use std::fmt::Display;

/// Result of a probe that may fail without aborting the run
///
/// Failures carry no cause: every error collapses into `Unavailable`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<T> {
    /// The probe completed and produced a value
    Available(T),
    /// The probe failed for any reason
    Unavailable,
}

impl<T> ProbeOutcome<T> {
    /// Collapses a probe result into an outcome, logging the discarded cause
    pub fn from_result<E: Display>(probe: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ProbeOutcome::Available(value),
            Err(e) => {
                warn!("{} probe unavailable: {}", probe, e);
                ProbeOutcome::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ProbeOutcome::Available(_))
    }
}

/// Identity of the machine running the report
#[derive(Debug, Clone, PartialEq)]
pub struct LocalInfo {
    /// Hostname as reported by the OS
    pub hostname: String,
    /// Primary local address, resolved from the hostname
    pub local_ip: String,
    /// OS/platform descriptor, e.g. "Linux-6.1.0-x86_64"
    pub platform: String,
}

/// Public-facing identity as seen by the geolocation service
///
/// Fields missing from the service response stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicInfo {
    pub ip: Option<String>,
    pub isp: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

/// Round-trip latency to the ping target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyResult {
    /// Round-trip time in milliseconds, rounded to 2 decimals
    pub milliseconds: f64,
}

/// Throughput measured against the chosen speed-test server
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedResult {
    /// Download throughput in megabits per second, rounded to 2 decimals
    pub download_mbps: f64,
    /// Upload throughput in megabits per second, rounded to 2 decimals
    pub upload_mbps: f64,
    /// Provider-reported latency to the chosen server in milliseconds
    pub ping_ms: f64,
    /// Human-readable description of the chosen server
    pub server: String,
}

/// Cumulative byte totals across all interfaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageCounters {
    /// Megabytes sent since counters started, rounded to 2 decimals
    pub sent_mb: f64,
    /// Megabytes received since counters started, rounded to 2 decimals
    pub recv_mb: f64,
}
