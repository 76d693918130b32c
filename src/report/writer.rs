//! Section-by-section report rendering
//!
//! Each method writes one block of the report and flushes, so the user sees a
//! section as soon as its probe finishes.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::io::{self, Write};

use super::formatting::{format_decimal, format_field};
use crate::models::{LatencyResult, LocalInfo, ProbeOutcome, PublicInfo, SpeedResult, UsageCounters};

pub const TITLE: &str = "Network Information Hub";
pub const SEPARATOR: &str = "────────────────────────────";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LEADING_BLANK_LINES: usize = 5;

pub const PUBLIC_INFO_WARNING: &str = "⚠️ Could not fetch public IP/ISP info";
pub const PING_WARNING: &str = "⚠️ Ping failed";
pub const SPEED_TEST_WARNING: &str = "⚠️ Speed test failed";
pub const SPEED_TEST_NOTICE: &str = "⏳ Running speed test (may take ~30s)...";

pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Blank-line padding, title, separator and run time
    pub fn header<Tz>(&mut self, run_time: &DateTime<Tz>) -> io::Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        for _ in 0..LEADING_BLANK_LINES {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", TITLE)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, "Run time: {}", run_time.format(TIMESTAMP_FORMAT))?;
        self.end_section()
    }

    pub fn local_info(&mut self, info: &LocalInfo) -> io::Result<()> {
        writeln!(self.out, "💻 Hostname: {}", info.hostname)?;
        writeln!(self.out, "🏠 Local IP: {}", info.local_ip)?;
        writeln!(self.out, "🖥️ System: {}", info.platform)?;
        self.end_section()
    }

    pub fn public_info(&mut self, outcome: &ProbeOutcome<PublicInfo>) -> io::Result<()> {
        match outcome {
            ProbeOutcome::Available(info) => {
                writeln!(self.out, "🌐 Public IP: {}", format_field(info.ip.as_deref()))?;
                writeln!(self.out, "🏢 ISP: {}", format_field(info.isp.as_deref()))?;
                writeln!(
                    self.out,
                    "📍 Location: {}, {}",
                    format_field(info.city.as_deref()),
                    format_field(info.country.as_deref())
                )?;
                writeln!(self.out, "🕒 Timezone: {}", format_field(info.timezone.as_deref()))?;
            }
            ProbeOutcome::Unavailable => writeln!(self.out, "{}", PUBLIC_INFO_WARNING)?,
        }
        self.end_section()
    }

    pub fn latency(&mut self, target: &str, outcome: &ProbeOutcome<LatencyResult>) -> io::Result<()> {
        match outcome {
            ProbeOutcome::Available(result) => writeln!(
                self.out,
                "📶 Ping to {}: {} ms",
                target,
                format_decimal(result.milliseconds)
            )?,
            ProbeOutcome::Unavailable => writeln!(self.out, "{}", PING_WARNING)?,
        }
        self.end_section()
    }

    /// Announces the long-running throughput phase before it starts
    pub fn speed_test_notice(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", SPEED_TEST_NOTICE)?;
        self.out.flush()
    }

    pub fn speed_test(&mut self, outcome: &ProbeOutcome<SpeedResult>) -> io::Result<()> {
        match outcome {
            ProbeOutcome::Available(result) => {
                writeln!(self.out, "⬇️ Download: {} Mbps", format_decimal(result.download_mbps))?;
                writeln!(self.out, "⬆️ Upload: {} Mbps", format_decimal(result.upload_mbps))?;
                writeln!(self.out, "📶 Speedtest Ping: {} ms", format_decimal(result.ping_ms))?;
            }
            ProbeOutcome::Unavailable => writeln!(self.out, "{}", SPEED_TEST_WARNING)?,
        }
        self.end_section()
    }

    /// Final block; no trailing blank line
    pub fn usage(&mut self, counters: &UsageCounters) -> io::Result<()> {
        writeln!(self.out, "📤 Data Sent: {} MB", format_decimal(counters.sent_mb))?;
        writeln!(self.out, "📥 Data Received: {} MB", format_decimal(counters.recv_mb))?;
        self.out.flush()
    }

    fn end_section(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut ReportWriter<Vec<u8>>) -> io::Result<()>,
    {
        let mut writer = ReportWriter::new(Vec::new());
        f(&mut writer).expect("writing to a Vec cannot fail");
        String::from_utf8(writer.into_inner()).expect("report is valid UTF-8")
    }

    #[test]
    fn test_header_layout() {
        let run_time = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let text = render(|w| w.header(&run_time));

        assert_eq!(
            text,
            "\n\n\n\n\nNetwork Information Hub\n────────────────────────────\nRun time: 2026-03-04 05:06:07\n\n"
        );
    }

    #[test]
    fn test_local_info_block() {
        let info = LocalInfo {
            hostname: "kaipo-laptop".to_string(),
            local_ip: "192.168.1.20".to_string(),
            platform: "Linux-6.1.0-x86_64".to_string(),
        };
        let text = render(|w| w.local_info(&info));

        assert_eq!(
            text,
            "💻 Hostname: kaipo-laptop\n🏠 Local IP: 192.168.1.20\n🖥️ System: Linux-6.1.0-x86_64\n\n"
        );
    }

    #[test]
    fn test_public_info_passes_fields_through() {
        let info = PublicInfo {
            ip: Some("203.0.113.42".to_string()),
            isp: Some("Spark New Zealand".to_string()),
            city: Some("Auckland".to_string()),
            country: Some("New Zealand".to_string()),
            timezone: Some("Pacific/Auckland".to_string()),
        };
        let text = render(|w| w.public_info(&ProbeOutcome::Available(info)));

        assert!(text.contains("🌐 Public IP: 203.0.113.42\n"));
        assert!(text.contains("🏢 ISP: Spark New Zealand\n"));
        assert!(text.contains("📍 Location: Auckland, New Zealand\n"));
        assert!(text.contains("🕒 Timezone: Pacific/Auckland\n"));
        assert!(!text.contains(PUBLIC_INFO_WARNING));
    }

    #[test]
    fn test_public_info_missing_fields() {
        let info = PublicInfo {
            ip: Some("203.0.113.42".to_string()),
            ..PublicInfo::default()
        };
        let text = render(|w| w.public_info(&ProbeOutcome::Available(info)));

        assert!(text.contains("🏢 ISP: None\n"));
        assert!(text.contains("📍 Location: None, None\n"));
    }

    #[test]
    fn test_unavailable_sections_print_single_warning() {
        let public = render(|w| w.public_info(&ProbeOutcome::Unavailable));
        assert_eq!(public, format!("{}\n\n", PUBLIC_INFO_WARNING));

        let ping = render(|w| w.latency("8.8.8.8", &ProbeOutcome::Unavailable));
        assert_eq!(ping, format!("{}\n\n", PING_WARNING));
        assert!(!ping.contains("Ping to"));

        let speed = render(|w| w.speed_test(&ProbeOutcome::Unavailable));
        assert_eq!(speed, format!("{}\n\n", SPEED_TEST_WARNING));
    }

    #[test]
    fn test_numeric_lines() {
        let ping = render(|w| {
            w.latency("8.8.8.8", &ProbeOutcome::Available(LatencyResult { milliseconds: 12.35 }))
        });
        assert_eq!(ping, "📶 Ping to 8.8.8.8: 12.35 ms\n\n");

        let speed = render(|w| {
            w.speed_test(&ProbeOutcome::Available(SpeedResult {
                download_mbps: 55.12,
                upload_mbps: 10.0,
                ping_ms: 14.207,
                server: "Fake Net (Auckland, New Zealand)".to_string(),
            }))
        });
        assert_eq!(
            speed,
            "⬇️ Download: 55.12 Mbps\n⬆️ Upload: 10.0 Mbps\n📶 Speedtest Ping: 14.207 ms\n\n"
        );

        let usage = render(|w| {
            w.usage(&UsageCounters {
                sent_mb: 123.45,
                recv_mb: 6789.0,
            })
        });
        assert_eq!(usage, "📤 Data Sent: 123.45 MB\n📥 Data Received: 6789.0 MB\n");
    }
}
