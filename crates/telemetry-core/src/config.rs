//! Build-time tunables for the telemetry pipeline
//!
//! Rates, queue capacities and tolerances are fixed for the device. Only the
//! load-spike bounds are configurable, and they are validated before the load
//! generator may use them.

use core::str::FromStr;

use thiserror_no_std::Error;

/// Synthetic sensor sample period (20 Hz)
pub const SENSOR_PERIOD_MS: u64 = 50;

/// Uptime sample period (1 Hz)
pub const UPTIME_PERIOD_MS: u64 = 1000;

/// Telemetry frame period (5 Hz)
pub const FRAME_PERIOD_MS: u64 = 200;

/// Slack allowed on the frame period and on every freshness window
pub const DEADLINE_TOLERANCE_MS: u64 = 10;

/// Maximum age of the latest sensor sample at frame time
pub const SENSOR_FRESHNESS_MS: u64 = SENSOR_PERIOD_MS + DEADLINE_TOLERANCE_MS;

/// Maximum age of the latest uptime sample at frame time.
/// Two periods, so one late or dropped uptime sample does not degrade frames.
pub const UPTIME_FRESHNESS_MS: u64 = 2 * UPTIME_PERIOD_MS + DEADLINE_TOLERANCE_MS;

/// Trailing window for the sensor average reported in each frame
pub const AVERAGE_WINDOW_MS: u64 = 200;

/// Rolling average ring size; always covers the averaging window at the
/// sensor rate, including catch-up bursts after a stall
pub const AVERAGE_BUFFER_CAPACITY: usize = 20;

/// Sensor channel capacity (half a second of samples)
pub const SENSOR_QUEUE_CAPACITY: usize = 10;

/// Uptime channel capacity
pub const UPTIME_QUEUE_CAPACITY: usize = 2;

/// Trigger channel capacity, sized for the sum of both trigger rates
pub const TRIGGER_QUEUE_CAPACITY: usize = SENSOR_QUEUE_CAPACITY + UPTIME_QUEUE_CAPACITY;

/// Default idle time bounds between load spikes
pub const DEFAULT_LOAD_SPIKE_MIN_INTERVAL_MS: u32 = 1000;
pub const DEFAULT_LOAD_SPIKE_MAX_INTERVAL_MS: u32 = 5000;

/// Default busy time bounds of a single load spike
pub const DEFAULT_LOAD_SPIKE_MIN_DURATION_MS: u32 = 50;
pub const DEFAULT_LOAD_SPIKE_MAX_DURATION_MS: u32 = 300;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {field}: expected a non-negative integer number of milliseconds")]
    InvalidValue { field: &'static str },
    #[error("Empty {range} range: min {min} ms must be below max {max} ms")]
    EmptyRange {
        range: &'static str,
        min: u32,
        max: u32,
    },
}

/// Bounds for the load-spike generator.
///
/// Both ranges are half-open (`[min, max)`), so `min` must be strictly below
/// `max` for a draw to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSpikeConfig {
    min_interval_ms: u32,
    max_interval_ms: u32,
    min_duration_ms: u32,
    max_duration_ms: u32,
}

impl Default for LoadSpikeConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_LOAD_SPIKE_MIN_INTERVAL_MS,
            max_interval_ms: DEFAULT_LOAD_SPIKE_MAX_INTERVAL_MS,
            min_duration_ms: DEFAULT_LOAD_SPIKE_MIN_DURATION_MS,
            max_duration_ms: DEFAULT_LOAD_SPIKE_MAX_DURATION_MS,
        }
    }
}

impl LoadSpikeConfig {
    /// Create a validated configuration
    pub fn new(
        min_interval_ms: u32,
        max_interval_ms: u32,
        min_duration_ms: u32,
        max_duration_ms: u32,
    ) -> Result<Self, ConfigError> {
        if min_interval_ms >= max_interval_ms {
            return Err(ConfigError::EmptyRange {
                range: "load spike interval",
                min: min_interval_ms,
                max: max_interval_ms,
            });
        }
        if min_duration_ms >= max_duration_ms {
            return Err(ConfigError::EmptyRange {
                range: "load spike duration",
                min: min_duration_ms,
                max: max_duration_ms,
            });
        }

        Ok(Self {
            min_interval_ms,
            max_interval_ms,
            min_duration_ms,
            max_duration_ms,
        })
    }

    /// Parse and validate raw values, e.g. forwarded from build-time env vars.
    pub fn from_strs(
        min_interval: &str,
        max_interval: &str,
        min_duration: &str,
        max_duration: &str,
    ) -> Result<Self, ConfigError> {
        Self::new(
            parse_ms("min interval", min_interval)?,
            parse_ms("max interval", max_interval)?,
            parse_ms("min duration", min_duration)?,
            parse_ms("max duration", max_duration)?,
        )
    }

    pub const fn min_interval_ms(&self) -> u32 {
        self.min_interval_ms
    }

    pub const fn max_interval_ms(&self) -> u32 {
        self.max_interval_ms
    }

    pub const fn min_duration_ms(&self) -> u32 {
        self.min_duration_ms
    }

    pub const fn max_duration_ms(&self) -> u32 {
        self.max_duration_ms
    }
}

fn parse_ms(field: &'static str, raw: &str) -> Result<u32, ConfigError> {
    u32::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let defaults = LoadSpikeConfig::default();
        let validated = LoadSpikeConfig::new(
            defaults.min_interval_ms(),
            defaults.max_interval_ms(),
            defaults.min_duration_ms(),
            defaults.max_duration_ms(),
        );

        assert_eq!(validated, Ok(defaults));
    }

    #[test]
    fn test_rejects_empty_interval_range() {
        let err = LoadSpikeConfig::new(500, 500, 10, 20).unwrap_err();

        assert_eq!(
            err,
            ConfigError::EmptyRange {
                range: "load spike interval",
                min: 500,
                max: 500,
            }
        );
    }

    #[test]
    fn test_rejects_inverted_duration_range() {
        let err = LoadSpikeConfig::new(100, 200, 30, 20).unwrap_err();

        assert!(matches!(err, ConfigError::EmptyRange { min: 30, max: 20, .. }));
    }

    #[test]
    fn test_from_strs_trims_and_parses() {
        let config = LoadSpikeConfig::from_strs(" 100", "200 ", "5", "15").unwrap();

        assert_eq!(config.min_interval_ms(), 100);
        assert_eq!(config.max_interval_ms(), 200);
        assert_eq!(config.min_duration_ms(), 5);
        assert_eq!(config.max_duration_ms(), 15);
    }

    #[test]
    fn test_from_strs_reports_bad_field() {
        let err = LoadSpikeConfig::from_strs("100", "2s", "5", "15").unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue {
                field: "max interval"
            }
        );
    }
}
