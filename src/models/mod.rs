pub mod probe;

pub use probe::{
    LatencyResult, LocalInfo, ProbeOutcome, PublicInfo, SpeedResult, UsageCounters,
};
