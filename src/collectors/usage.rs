//! Cumulative interface byte counters
//!
//! Sums the OS-maintained sent/received totals across every interface,
//! loopback included. The totals count from when the OS started tracking the
//! interfaces, not from when this program started.

use log::debug;
use sysinfo::Networks;

use crate::models::UsageCounters;
use crate::report::formatting::bytes_to_mb;

/// Raw byte totals summed across interfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteTotals {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl ByteTotals {
    pub fn to_counters(self) -> UsageCounters {
        UsageCounters {
            sent_mb: bytes_to_mb(self.bytes_sent),
            recv_mb: bytes_to_mb(self.bytes_received),
        }
    }
}

/// Reads cumulative byte counters from the system network interfaces
#[derive(Debug)]
pub struct UsageCollector {
    /// System network interfaces manager from sysinfo crate
    networks: Networks,
}

impl Default for UsageCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageCollector {
    /// Creates a collector with a fresh interface list
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }

    /// Refreshes the interface data and sums the totals
    pub fn read_totals(&mut self) -> ByteTotals {
        self.networks.refresh(true);

        let totals = self
            .networks
            .iter()
            .fold(ByteTotals::default(), |acc, (_, data)| ByteTotals {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_received: acc.bytes_received.saturating_add(data.total_received()),
            });

        debug!(
            "Usage totals across {} interfaces: sent={} bytes, received={} bytes",
            self.networks.len(),
            totals.bytes_sent,
            totals.bytes_received
        );
        totals
    }

    /// Reads the totals converted to megabytes
    pub fn collect(&mut self) -> UsageCounters {
        self.read_totals().to_counters()
    }
}

/// One-shot read of the usage counters
pub fn read_usage_counters() -> UsageCounters {
    UsageCollector::new().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_convert_to_megabytes() {
        let totals = ByteTotals {
            bytes_sent: 12_345_678,
            bytes_received: 987_654_321,
        };
        let counters = totals.to_counters();
        assert_eq!(counters.sent_mb, 12.35);
        assert_eq!(counters.recv_mb, 987.65);
    }

    #[test]
    fn test_successive_reads_do_not_decrease() {
        let mut collector = UsageCollector::new();
        let first = collector.read_totals();
        let second = collector.read_totals();

        assert!(second.bytes_sent >= first.bytes_sent);
        assert!(second.bytes_received >= first.bytes_received);
    }

    #[test]
    fn test_counters_are_non_negative() {
        let counters = read_usage_counters();
        assert!(counters.sent_mb >= 0.0);
        assert!(counters.recv_mb >= 0.0);
    }
}
