//! Telemetry frames emitted once per aggregation period

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// Console rendering of an invalid sensor value
pub const INVALID_SENSOR_VALUE: i16 = -1;

/// Capacity of a rendered frame line; the longest possible line is well below it
pub const FRAME_LINE_CAPACITY: usize = 128;

/// Fixed-capacity rendering of a frame
pub type FrameLine = heapless::String<FRAME_LINE_CAPACITY>;

/// Point-in-time snapshot produced by the aggregator.
///
/// Immutable once emitted; a new frame is built every cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Strictly increasing by one per aggregation cycle, starting at 1
    pub frame_id: u32,
    /// Monotonic milliseconds at which the frame was built
    pub timestamp_ms: u64,
    /// Uptime from the latest fresh uptime sample, or derived from the clock
    pub uptime_secs: u32,
    /// Latest sensor value if one fresh sample arrived this cycle
    pub latest_sensor_value: Option<u8>,
    /// Mean of buffered sensor values over the averaging window, 0 if none
    pub sensor_avg: u32,
    /// Set when any input was stale or absent, or the frame deadline was missed
    pub degraded: bool,
}

impl TelemetryFrame {
    /// Sensor value as printed, with the invalid marker for stale data
    pub fn sensor_display_value(&self) -> i16 {
        self.latest_sensor_value
            .map_or(INVALID_SENSOR_VALUE, i16::from)
    }

    /// Render the frame into a stack buffer
    pub fn to_line(&self) -> FrameLine {
        let mut line = FrameLine::new();
        // Cannot overflow: every field has a bounded width.
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FRAME {} | ts={} | up={} | sensor={} | avg={} | degraded={}",
            self.frame_id,
            self.timestamp_ms,
            self.uptime_secs,
            self.sensor_display_value(),
            self.sensor_avg,
            u8::from(self.degraded),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_line_format() {
        let frame = TelemetryFrame {
            frame_id: 7,
            timestamp_ms: 1405,
            uptime_secs: 1,
            latest_sensor_value: Some(44),
            sensor_avg: 42,
            degraded: false,
        };

        assert_eq!(
            frame.to_line().as_str(),
            "FRAME 7 | ts=1405 | up=1 | sensor=44 | avg=42 | degraded=0"
        );
    }

    #[test]
    fn test_invalid_sensor_renders_marker() {
        let frame = TelemetryFrame {
            frame_id: 8,
            timestamp_ms: 1605,
            uptime_secs: 1,
            latest_sensor_value: None,
            sensor_avg: 0,
            degraded: true,
        };

        assert_eq!(frame.sensor_display_value(), INVALID_SENSOR_VALUE);
        assert!(frame.to_line().ends_with("sensor=-1 | avg=0 | degraded=1"));
    }

    #[test]
    fn test_widest_frame_fits_line() {
        let frame = TelemetryFrame {
            frame_id: u32::MAX,
            timestamp_ms: u64::MAX,
            uptime_secs: u32::MAX,
            latest_sensor_value: Some(100),
            sensor_avg: u32::MAX,
            degraded: true,
        };

        let line = frame.to_line();
        assert!(line.starts_with("FRAME 4294967295 |"));
        assert!(line.ends_with("degraded=1"));
    }
}
