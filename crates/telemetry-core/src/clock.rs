//! Monotonic millisecond clock used by every role

/// Source of monotonic milliseconds since boot.
///
/// The pipeline only ever compares timestamps taken from the same clock, so the
/// epoch is irrelevant as long as it never goes backwards.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}

/// Age of a sample taken at `timestamp_ms`, as seen at `now_ms`.
///
/// Samples stamped after `now_ms` (possible when a producer preempts the reader
/// between its clock read and its drain) have age zero.
#[inline]
pub const fn age_ms(timestamp_ms: u64, now_ms: u64) -> u64 {
    now_ms.saturating_sub(timestamp_ms)
}

/// Whether a sample is still within its freshness window
#[inline]
pub const fn is_fresh(timestamp_ms: u64, now_ms: u64, window_ms: u64) -> bool {
    age_ms(timestamp_ms, now_ms) <= window_ms
}
