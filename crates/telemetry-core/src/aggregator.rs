//! Periodic telemetry frame aggregation
//!
//! The aggregator wakes on a strict 200 ms ticker, drains whatever the
//! producer managed to publish since the previous wake, and always emits
//! exactly one frame. Stale or missing inputs and late wakes never stop the
//! cycle; they only mark the frame as degraded.
//!
//! ## Cycle
//!
//! 1. Deadline check against the previous wake
//! 2. Coalescing drain of the uptime channel (most recent wins)
//! 3. Full drain of the sensor channel into the rolling buffer
//! 4. Freshness checks, windowed average, frame emission

use embassy_time::{Duration, Ticker};
use log::{info, warn};

use crate::channels::{Pipeline, SensorReceiver, UptimeReceiver};
use crate::clock::{Clock, is_fresh};
use crate::config::{
    AVERAGE_BUFFER_CAPACITY, AVERAGE_WINDOW_MS, DEADLINE_TOLERANCE_MS, FRAME_PERIOD_MS,
    SENSOR_FRESHNESS_MS, UPTIME_FRESHNESS_MS,
};
use crate::frame::TelemetryFrame;
use crate::rolling::RollingAverageBuffer;
use crate::samples::{SensorSample, UptimeSample, uptime_secs};
use crate::sink::FrameSink;
use crate::stats::PipelineStats;

/// Outcome of the three checks that decide whether a frame is degraded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHealth {
    pub uptime_fresh: bool,
    pub sensor_fresh: bool,
    pub deadline_met: bool,
}

impl FrameHealth {
    pub const fn degraded(self) -> bool {
        !self.uptime_fresh || !self.sensor_fresh || !self.deadline_met
    }
}

pub struct Aggregator<'a, C> {
    uptime: UptimeReceiver<'a>,
    sensor: SensorReceiver<'a>,
    stats: &'a PipelineStats,
    clock: C,
    start_ms: u64,
    frame_counter: u32,
    last_wake_ms: u64,
    /// Most recent uptime sample ever drained; uptime arrives at 1 Hz, so most
    /// cycles find the channel empty and reuse this while it is still fresh.
    latest_uptime: Option<UptimeSample>,
    avg_buffer: RollingAverageBuffer<AVERAGE_BUFFER_CAPACITY>,
}

impl<'a, C: Clock> Aggregator<'a, C> {
    /// The first deadline check is measured from construction time.
    pub fn new(pipeline: &'a Pipeline, clock: C, start_ms: u64) -> Self {
        let last_wake_ms = clock.now_ms();
        Self {
            uptime: pipeline.uptime.receiver(),
            sensor: pipeline.sensor.receiver(),
            stats: &pipeline.stats,
            clock,
            start_ms,
            frame_counter: 0,
            last_wake_ms,
            latest_uptime: None,
            avg_buffer: RollingAverageBuffer::new(),
        }
    }

    /// Number of frames built so far
    pub const fn frames_built(&self) -> u32 {
        self.frame_counter
    }

    /// Run one aggregation cycle for a wake that has just happened
    pub fn cycle(&mut self) -> TelemetryFrame {
        let wake_ms = self.clock.now_ms();
        let deadline_met = self.check_deadline(wake_ms);

        self.drain_uptime();
        let latest_sensor = self.drain_sensor();

        self.frame_counter = self.frame_counter.wrapping_add(1);
        let now_ms = self.clock.now_ms();

        let fresh_uptime = self
            .latest_uptime
            .filter(|sample| is_fresh(sample.timestamp_ms, now_ms, UPTIME_FRESHNESS_MS));
        let uptime_secs = match fresh_uptime {
            Some(sample) => sample.uptime_secs,
            None => uptime_secs(now_ms, self.start_ms),
        };

        let fresh_sensor = latest_sensor
            .filter(|sample| is_fresh(sample.timestamp_ms, now_ms, SENSOR_FRESHNESS_MS));

        let health = FrameHealth {
            uptime_fresh: fresh_uptime.is_some(),
            sensor_fresh: fresh_sensor.is_some(),
            deadline_met,
        };

        let frame = TelemetryFrame {
            frame_id: self.frame_counter,
            timestamp_ms: now_ms,
            uptime_secs,
            latest_sensor_value: fresh_sensor.map(|sample| sample.value),
            sensor_avg: self.avg_buffer.windowed_average(now_ms, AVERAGE_WINDOW_MS),
            degraded: health.degraded(),
        };

        self.stats.record_frame(frame.degraded, deadline_met);
        self.last_wake_ms = wake_ms;

        frame
    }

    /// Emit one frame per period forever
    pub async fn run<S: FrameSink>(mut self, mut sink: S) -> ! {
        info!("Aggregator started");

        let mut ticker = Ticker::every(Duration::from_millis(FRAME_PERIOD_MS));
        loop {
            ticker.next().await;
            let frame = self.cycle();
            sink.emit(frame);
        }
    }

    fn check_deadline(&self, wake_ms: u64) -> bool {
        let elapsed = wake_ms.saturating_sub(self.last_wake_ms);
        if elapsed > FRAME_PERIOD_MS + DEADLINE_TOLERANCE_MS {
            warn!("Frame deadline missed by {} ms", elapsed - FRAME_PERIOD_MS);
            false
        } else {
            true
        }
    }

    fn drain_uptime(&mut self) {
        while let Ok(sample) = self.uptime.try_receive() {
            self.latest_uptime = Some(sample);
        }
    }

    /// Every sample goes into the average; only the last one is returned.
    fn drain_sensor(&mut self) -> Option<SensorSample> {
        let mut latest = None;
        while let Ok(sample) = self.sensor.try_receive() {
            self.avg_buffer.insert(sample);
            latest = Some(sample);
        }
        latest
    }
}
