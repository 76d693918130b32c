//! Network Information Hub
//!
//! Gathers local identity, public IP/ISP/geolocation, ICMP latency, speed-test
//! throughput and cumulative interface byte counters, then prints a one-shot
//! report.
//!
//! ## Module Organization
//!
//! - `cli`: command-line definition
//! - `collectors`: the five probes and the `ProbeSuite` seam the report runs against
//! - `config`: fixed probe parameters
//! - `models`: value groups produced by the probes
//! - `report`: unit conversion, section rendering and orchestration

pub mod cli;
pub mod collectors;
pub mod config;
pub mod models;
pub mod report;
