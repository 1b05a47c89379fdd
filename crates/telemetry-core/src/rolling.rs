//! Fixed-capacity ring of recent sensor readings for windowed averages

use crate::clock::is_fresh;
use crate::samples::SensorSample;

/// Returned by [`RollingAverageBuffer::windowed_average`] when no entry falls
/// inside the window
pub const NO_AVERAGE: u32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Entry {
    value: u8,
    timestamp_ms: u64,
}

/// Ring buffer of `(value, timestamp)` pairs.
///
/// Once full, each insert overwrites the oldest entry. Owned and mutated by
/// the aggregator alone, so it needs no synchronization.
#[derive(Debug, Clone)]
pub struct RollingAverageBuffer<const N: usize> {
    entries: [Entry; N],
    /// Slot written by the next insert
    cursor: usize,
    /// Occupied slots, saturating at `N`
    count: usize,
}

impl<const N: usize> Default for RollingAverageBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RollingAverageBuffer<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "rolling buffer needs at least one slot");
        Self {
            entries: [Entry {
                value: 0,
                timestamp_ms: 0,
            }; N],
            cursor: 0,
            count: 0,
        }
    }

    pub fn insert(&mut self, sample: SensorSample) {
        self.entries[self.cursor] = Entry {
            value: sample.value,
            timestamp_ms: sample.timestamp_ms,
        };
        self.cursor = (self.cursor + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Integer mean of the entries no older than `window_ms` at `now_ms`,
    /// or [`NO_AVERAGE`] when none qualifies.
    pub fn windowed_average(&self, now_ms: u64, window_ms: u64) -> u32 {
        let (sum, count) = self
            .iter()
            .filter(|sample| is_fresh(sample.timestamp_ms, now_ms, window_ms))
            .fold((0u32, 0u32), |(sum, count), sample| {
                (sum + u32::from(sample.value), count + 1)
            });

        if count > 0 { sum / count } else { NO_AVERAGE }
    }

    /// Occupied entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = SensorSample> + '_ {
        // Until the ring wraps, the oldest entry sits at index 0.
        let start = if self.count < N { 0 } else { self.cursor };
        (0..self.count).map(move |offset| {
            let entry = self.entries[(start + offset) % N];
            SensorSample::new(entry.timestamp_ms, entry.value)
        })
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_no_average() {
        let buffer = RollingAverageBuffer::<4>::new();

        assert!(buffer.is_empty());
        assert_eq!(buffer.windowed_average(1000, 200), NO_AVERAGE);
    }

    #[test]
    fn test_average_of_entries_in_window() {
        let mut buffer = RollingAverageBuffer::<20>::new();
        buffer.insert(SensorSample::new(100, 40));
        buffer.insert(SensorSample::new(150, 42));
        buffer.insert(SensorSample::new(200, 44));

        assert_eq!(buffer.windowed_average(205, 200), 42);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let mut buffer = RollingAverageBuffer::<20>::new();
        buffer.insert(SensorSample::new(0, 10));
        buffer.insert(SensorSample::new(1, 30));

        // Age of the first entry is exactly the window
        assert_eq!(buffer.windowed_average(200, 200), 20);
        // One millisecond later it drops out
        assert_eq!(buffer.windowed_average(201, 200), 30);
    }

    #[test]
    fn test_stale_entries_are_excluded() {
        let mut buffer = RollingAverageBuffer::<20>::new();
        buffer.insert(SensorSample::new(0, 100));
        buffer.insert(SensorSample::new(500, 20));
        buffer.insert(SensorSample::new(550, 30));

        assert_eq!(buffer.windowed_average(600, 200), 25);
        assert_eq!(buffer.windowed_average(2000, 200), NO_AVERAGE);
    }

    #[test]
    fn test_average_truncates() {
        let mut buffer = RollingAverageBuffer::<20>::new();
        buffer.insert(SensorSample::new(10, 1));
        buffer.insert(SensorSample::new(20, 2));

        assert_eq!(buffer.windowed_average(20, 200), 1);
    }

    #[test]
    fn test_overwrites_oldest_when_full() {
        let mut buffer = RollingAverageBuffer::<3>::new();
        for (i, value) in [10u8, 20, 30, 40].into_iter().enumerate() {
            buffer.insert(SensorSample::new(i as u64, value));
        }

        assert_eq!(buffer.len(), 3);
        let values: Vec<u8> = buffer.iter().map(|s| s.value).collect();
        assert_eq!(values, [20, 30, 40]);
        // The first value can no longer influence the average
        assert_eq!(buffer.windowed_average(3, 200), 30);
    }

    #[test]
    fn test_capacity_plus_one_loses_first_entry() {
        let mut buffer = RollingAverageBuffer::<20>::new();
        for i in 0..=20u64 {
            buffer.insert(SensorSample::new(i, i as u8));
        }

        assert_eq!(buffer.len(), buffer.capacity());
        assert!(buffer.iter().all(|s| s.timestamp_ms != 0));
        assert_eq!(buffer.iter().next(), Some(SensorSample::new(1, 1)));
    }

    #[test]
    fn test_future_timestamps_count_as_fresh() {
        let mut buffer = RollingAverageBuffer::<4>::new();
        buffer.insert(SensorSample::new(210, 50));

        assert_eq!(buffer.windowed_average(205, 200), 50);
    }
}
