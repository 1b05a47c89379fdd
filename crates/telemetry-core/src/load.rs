//! CPU load-spike generator
//!
//! Sleeps for a random interval, then burns CPU for a random duration. It
//! produces nothing; it only competes for the processor so the other roles'
//! deadline handling can be observed under pressure. Runs at the lowest
//! priority and yields regularly while busy.

use core::hint::black_box;

use embassy_futures::yield_now;
use embassy_time::Timer;
use log::{debug, info};
use rand_core::RngCore;

use crate::clock::Clock;
use crate::config::LoadSpikeConfig;

/// Arithmetic operations per busy batch
pub const OPS_PER_BATCH: u32 = 1000;

/// Busy batches between two yields to the scheduler
pub const YIELD_EVERY_BATCHES: u32 = 10;

/// Uniform draw from `[min, max)`; `min < max` is guaranteed by
/// [`LoadSpikeConfig`].
fn uniform_in<R: RngCore>(rng: &mut R, min: u32, max: u32) -> u32 {
    min + rng.next_u32() % (max - min)
}

/// Meaningless arithmetic with an explicit yield schedule
#[derive(Debug, Default)]
pub struct BusyWork {
    accumulator: u32,
    batches_since_yield: u32,
}

impl BusyWork {
    pub const fn new() -> Self {
        Self {
            accumulator: 0,
            batches_since_yield: 0,
        }
    }

    /// Run one batch; returns `true` when the caller should yield.
    pub fn batch<R: RngCore>(&mut self, rng: &mut R) -> bool {
        for _ in 0..OPS_PER_BATCH {
            self.accumulator = black_box(self.accumulator.wrapping_add(rng.next_u32()));
        }

        self.batches_since_yield += 1;
        if self.batches_since_yield >= YIELD_EVERY_BATCHES {
            self.batches_since_yield = 0;
            true
        } else {
            false
        }
    }
}

pub struct LoadSpikeGenerator<C, R> {
    config: LoadSpikeConfig,
    clock: C,
    rng: R,
}

impl<C: Clock, R: RngCore> LoadSpikeGenerator<C, R> {
    pub fn new(config: LoadSpikeConfig, clock: C, rng: R) -> Self {
        Self { config, clock, rng }
    }

    /// Idle time before the next spike
    pub fn next_interval_ms(&mut self) -> u32 {
        uniform_in(
            &mut self.rng,
            self.config.min_interval_ms(),
            self.config.max_interval_ms(),
        )
    }

    /// Busy time of the next spike
    pub fn next_duration_ms(&mut self) -> u32 {
        uniform_in(
            &mut self.rng,
            self.config.min_duration_ms(),
            self.config.max_duration_ms(),
        )
    }

    pub async fn run(mut self) -> ! {
        info!("Load spike generator started");

        loop {
            let interval_ms = self.next_interval_ms();
            Timer::after_millis(u64::from(interval_ms)).await;

            let duration_ms = self.next_duration_ms();
            debug!(
                "After interval of {} ms, executing load spike for {} ms",
                interval_ms, duration_ms
            );

            let spike_start = self.clock.now_ms();
            let mut work = BusyWork::new();
            while self.clock.now_ms().saturating_sub(spike_start) < u64::from(duration_ms) {
                if work.batch(&mut self.rng) {
                    yield_now().await;
                }
            }

            debug!("Load spike completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManualClock;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_draws_stay_in_half_open_bounds() {
        let config = LoadSpikeConfig::new(100, 110, 20, 23).unwrap();
        let mut generator =
            LoadSpikeGenerator::new(config, ManualClock::at(0), SmallRng::seed_from_u64(7));

        for _ in 0..1000 {
            assert!((100..110).contains(&generator.next_interval_ms()));
            assert!((20..23).contains(&generator.next_duration_ms()));
        }
    }

    #[test]
    fn test_draw_wraps_raw_value() {
        let config = LoadSpikeConfig::new(1000, 5000, 50, 300).unwrap();
        // 4005 % 4000 = 5 and 4005 % 250 = 5
        let mut generator =
            LoadSpikeGenerator::new(config, ManualClock::at(0), StepRng::new(4005, 0));

        assert_eq!(generator.next_interval_ms(), 1005);
        assert_eq!(generator.next_duration_ms(), 55);
    }

    #[test]
    fn test_busy_work_yields_on_fixed_schedule() {
        let mut rng = StepRng::new(1, 1);
        let mut work = BusyWork::new();

        let yields: Vec<bool> = (0..3 * YIELD_EVERY_BATCHES)
            .map(|_| work.batch(&mut rng))
            .collect();

        assert_eq!(yields.iter().filter(|&&y| y).count(), 3);
        for (i, yielded) in yields.iter().enumerate() {
            assert_eq!(*yielded, (i as u32 + 1) % YIELD_EVERY_BATCHES == 0);
        }
    }
}
