//! Lock-free pipeline counters for the status monitor
//!
//! Each counter has exactly one writing role. Readers only ever take
//! snapshots, so relaxed ordering is enough.

use core::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    frames: AtomicU32,
    degraded_frames: AtomicU32,
    deadline_misses: AtomicU32,
    dropped_triggers: AtomicU32,
    dropped_sensor_samples: AtomicU32,
    dropped_uptime_samples: AtomicU32,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames: u32,
    pub degraded_frames: u32,
    pub deadline_misses: u32,
    pub dropped_triggers: u32,
    pub dropped_sensor_samples: u32,
    pub dropped_uptime_samples: u32,
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            frames: AtomicU32::new(0),
            degraded_frames: AtomicU32::new(0),
            deadline_misses: AtomicU32::new(0),
            dropped_triggers: AtomicU32::new(0),
            dropped_sensor_samples: AtomicU32::new(0),
            dropped_uptime_samples: AtomicU32::new(0),
        }
    }

    /// Aggregator only
    pub fn record_frame(&self, degraded: bool, deadline_met: bool) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        if degraded {
            self.degraded_frames.fetch_add(1, Ordering::Relaxed);
        }
        if !deadline_met {
            self.deadline_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Trigger relay only
    pub fn record_dropped_trigger(&self) {
        self.dropped_triggers.fetch_add(1, Ordering::Relaxed);
    }

    /// Producer only
    pub fn record_dropped_sensor_sample(&self) {
        self.dropped_sensor_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Producer only
    pub fn record_dropped_uptime_sample(&self) {
        self.dropped_uptime_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            degraded_frames: self.degraded_frames.load(Ordering::Relaxed),
            deadline_misses: self.deadline_misses.load(Ordering::Relaxed),
            dropped_triggers: self.dropped_triggers.load(Ordering::Relaxed),
            dropped_sensor_samples: self.dropped_sensor_samples.load(Ordering::Relaxed),
            dropped_uptime_samples: self.dropped_uptime_samples.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_frame_counts_degradation_and_misses() {
        let stats = PipelineStats::new();

        stats.record_frame(false, true);
        stats.record_frame(true, true);
        stats.record_frame(true, false);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames, 3);
        assert_eq!(snapshot.degraded_frames, 2);
        assert_eq!(snapshot.deadline_misses, 1);
    }

    #[test]
    fn test_drop_counters_are_independent() {
        let stats = PipelineStats::new();

        stats.record_dropped_trigger();
        stats.record_dropped_sensor_sample();
        stats.record_dropped_sensor_sample();

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                dropped_triggers: 1,
                dropped_sensor_samples: 2,
                ..StatsSnapshot::default()
            }
        );
    }
}
