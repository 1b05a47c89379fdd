//! Measurements and trigger events moved between roles
//!
//! Every value here is `Copy` and travels by value through exactly one
//! channel, so a sample is only ever owned by the role currently holding it.

/// One synthetic sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    /// Monotonic milliseconds at which the value was synthesized
    pub timestamp_ms: u64,
    /// Reading in `0..=100`
    pub value: u8,
}

impl SensorSample {
    pub const MIN_VALUE: u8 = 0;
    pub const MAX_VALUE: u8 = 100;

    pub const fn new(timestamp_ms: u64, value: u8) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// Whole seconds elapsed since the pipeline started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeSample {
    pub timestamp_ms: u64,
    pub uptime_secs: u32,
}

impl UptimeSample {
    /// Uptime as seen at `now_ms` for a pipeline started at `start_ms`
    pub const fn at(now_ms: u64, start_ms: u64) -> Self {
        Self {
            timestamp_ms: now_ms,
            uptime_secs: uptime_secs(now_ms, start_ms),
        }
    }
}

/// Whole seconds between `start_ms` and `now_ms`
#[inline]
pub const fn uptime_secs(now_ms: u64, start_ms: u64) -> u32 {
    (now_ms.saturating_sub(start_ms) / 1000) as u32
}

/// Tag telling the producer which kind of sample a timer asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    SensorTick,
    UptimeTick,
}

impl TriggerKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SensorTick => "Sensor",
            Self::UptimeTick => "Uptime",
        }
    }
}
