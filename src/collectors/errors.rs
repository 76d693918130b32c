//! Error types for the probe collectors
//!
//! Causes are kept for logging only. The report never shows them; a failed
//! probe is rendered as a single warning line.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Could not read the system hostname")]
    HostnameUnavailable,

    #[error("Failed to resolve '{host}': {source}")]
    Resolution {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No IPv4 address found for '{host}'")]
    NoIpv4Address { host: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    BadStatus { status: u16, url: String },

    #[error("Malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ICMP socket error: {0}")]
    IcmpSocket(#[source] std::io::Error),

    #[error("No echo reply from {target} within {timeout:?}")]
    IcmpTimeout { target: String, timeout: Duration },

    #[error("Invalid ICMP packet buffer")]
    IcmpPacket,

    #[error("Speed-test server discovery failed: {0}")]
    ServerDiscovery(String),

    #[error("Speed-test {phase} phase transferred no data")]
    EmptyTransfer { phase: &'static str },

    #[error("Blocking probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type ProbeResult<T> = Result<T, ProbeError>;
