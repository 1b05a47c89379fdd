//! Trigger-driven sample producer
//!
//! The producer is purely reactive: it sleeps on the trigger channel and, for
//! each trigger, builds one sample and offers it to the matching output
//! channel. Full output channels lose the new sample; nothing is retried and
//! nothing is reported back upstream.

use core::f64::consts::PI;

use log::{info, warn};
use rand_core::RngCore;

use crate::channels::{Pipeline, SensorSender, TriggerReceiver, UptimeSender, try_publish};
use crate::clock::Clock;
use crate::samples::{SensorSample, TriggerKind, UptimeSample};
use crate::stats::PipelineStats;

/// Samples per sine period; a full cycle every 5 s at 20 Hz
pub const SINE_PERIOD_SAMPLES: u32 = 100;

/// Amplitude and offset of the sine base, mapping it onto `0..=100`
const SINE_AMPLITUDE: f64 = 50.0;
const SINE_OFFSET: i32 = 50;

/// Noise is drawn from `-NOISE_SPAN..=NOISE_SPAN`
pub const NOISE_SPAN: i32 = 10;

/// Map a raw random draw onto the symmetric noise range
#[inline]
pub fn noise_from(raw: u32) -> i32 {
    (raw % (2 * NOISE_SPAN as u32 + 1)) as i32 - NOISE_SPAN
}

/// Sensor value for sine step `step` with `noise` added, clamped to `0..=100`
pub fn sensor_value(step: u32, noise: i32) -> u8 {
    let angle =
        f64::from(step % SINE_PERIOD_SAMPLES) * 2.0 * PI / f64::from(SINE_PERIOD_SAMPLES);
    let base = libm::round(SINE_AMPLITUDE * libm::sin(angle)) as i32 + SINE_OFFSET;

    (base + noise).clamp(
        i32::from(SensorSample::MIN_VALUE),
        i32::from(SensorSample::MAX_VALUE),
    ) as u8
}

/// Synthetic sensor: deterministic sine base plus uniform noise
pub struct SensorSynth<R> {
    rng: R,
    step: u32,
}

impl<R: RngCore> SensorSynth<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, step: 0 }
    }

    pub fn next_sample(&mut self, now_ms: u64) -> SensorSample {
        let noise = noise_from(self.rng.next_u32());
        let value = sensor_value(self.step, noise);
        self.step = (self.step + 1) % SINE_PERIOD_SAMPLES;

        SensorSample::new(now_ms, value)
    }
}

pub struct Producer<'a, C, R> {
    triggers: TriggerReceiver<'a>,
    sensor: SensorSender<'a>,
    uptime: UptimeSender<'a>,
    stats: &'a PipelineStats,
    clock: C,
    start_ms: u64,
    synth: SensorSynth<R>,
}

impl<'a, C: Clock, R: RngCore> Producer<'a, C, R> {
    /// `start_ms` is the pipeline start time that uptime is measured from.
    pub fn new(pipeline: &'a Pipeline, clock: C, start_ms: u64, rng: R) -> Self {
        Self {
            triggers: pipeline.triggers.receiver(),
            sensor: pipeline.sensor.sender(),
            uptime: pipeline.uptime.sender(),
            stats: &pipeline.stats,
            clock,
            start_ms,
            synth: SensorSynth::new(rng),
        }
    }

    /// Build and publish the sample requested by one trigger
    pub fn handle(&mut self, kind: TriggerKind) {
        let now_ms = self.clock.now_ms();

        match kind {
            TriggerKind::SensorTick => {
                let sample = self.synth.next_sample(now_ms);
                if let Err(e) = try_publish(&self.sensor, sample, "Sensor") {
                    warn!("{}", e);
                    self.stats.record_dropped_sensor_sample();
                }
            }
            TriggerKind::UptimeTick => {
                let sample = UptimeSample::at(now_ms, self.start_ms);
                if let Err(e) = try_publish(&self.uptime, sample, "Uptime") {
                    warn!("{}", e);
                    self.stats.record_dropped_uptime_sample();
                }
            }
        }
    }

    /// Wait for triggers forever.
    ///
    /// The trigger channel is the only wait without a deadline in the
    /// pipeline; the producer has no timing obligation of its own.
    pub async fn run(mut self) -> ! {
        info!("Producer started");

        loop {
            let kind = self.triggers.receive().await;
            self.handle(kind);
        }
    }
}
