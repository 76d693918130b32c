//! Report orchestration
//!
//! Runs the probes strictly one after another and writes each section as soon
//! as its probe returns. Probe failures never abort the report; only a failure
//! to determine local identity or to write output does.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::info;
use std::io::Write;
use std::time::Instant;

use super::writer::ReportWriter;
use crate::collectors::ProbeSuite;

/// Runs every probe and writes the report, stamped with the current local time
pub async fn run_report<W: Write>(suite: &dyn ProbeSuite, ping_target: &str, out: W) -> Result<()> {
    run_report_at(suite, ping_target, out, Local::now()).await
}

/// Runs every probe and writes the report with a fixed run time
pub async fn run_report_at<W: Write>(
    suite: &dyn ProbeSuite,
    ping_target: &str,
    out: W,
    run_time: DateTime<Local>,
) -> Result<()> {
    let started = Instant::now();
    let mut report = ReportWriter::new(out);

    report.header(&run_time).context("Failed to write report header")?;

    let local = suite.local_identity().await?;
    report.local_info(&local).context("Failed to write local identity")?;

    let public = suite.public_identity().await;
    report.public_info(&public).context("Failed to write public identity")?;

    let latency = suite.latency().await;
    report
        .latency(ping_target, &latency)
        .context("Failed to write latency")?;

    report
        .speed_test_notice()
        .context("Failed to write speed test notice")?;
    let speed = suite.throughput().await;
    report.speed_test(&speed).context("Failed to write speed test")?;

    let usage = suite.usage_counters().await;
    report.usage(&usage).context("Failed to write usage counters")?;

    info!(
        "Report completed in {:.1}s (public={}, ping={}, speed={})",
        started.elapsed().as_secs_f64(),
        public.is_available(),
        latency.is_available(),
        speed.is_available()
    );
    Ok(())
}
