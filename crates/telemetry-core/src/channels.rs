//! Bounded channels connecting the pipeline roles
//!
//! Each channel has a single producing role and a single consuming role.
//! Producers only ever use [`try_publish`]: when a channel is full the new
//! item is dropped and the caller is told, the producer is never blocked.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender, TrySendError};
use thiserror_no_std::Error;

use crate::config::{SENSOR_QUEUE_CAPACITY, TRIGGER_QUEUE_CAPACITY, UPTIME_QUEUE_CAPACITY};
use crate::samples::{SensorSample, TriggerKind, UptimeSample};
use crate::stats::PipelineStats;

/// Roles run on different executors, so channel access must be interrupt and
/// thread safe.
pub type PipelineMutex = CriticalSectionRawMutex;

pub type TriggerChannel = Channel<PipelineMutex, TriggerKind, TRIGGER_QUEUE_CAPACITY>;
pub type TriggerSender<'a> = Sender<'a, PipelineMutex, TriggerKind, TRIGGER_QUEUE_CAPACITY>;
pub type TriggerReceiver<'a> = Receiver<'a, PipelineMutex, TriggerKind, TRIGGER_QUEUE_CAPACITY>;

pub type SensorChannel = Channel<PipelineMutex, SensorSample, SENSOR_QUEUE_CAPACITY>;
pub type SensorSender<'a> = Sender<'a, PipelineMutex, SensorSample, SENSOR_QUEUE_CAPACITY>;
pub type SensorReceiver<'a> = Receiver<'a, PipelineMutex, SensorSample, SENSOR_QUEUE_CAPACITY>;

pub type UptimeChannel = Channel<PipelineMutex, UptimeSample, UPTIME_QUEUE_CAPACITY>;
pub type UptimeSender<'a> = Sender<'a, PipelineMutex, UptimeSample, UPTIME_QUEUE_CAPACITY>;
pub type UptimeReceiver<'a> = Receiver<'a, PipelineMutex, UptimeSample, UPTIME_QUEUE_CAPACITY>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    #[error("{queue} queue full, dropping data")]
    Full { queue: &'static str },
}

/// Non-blocking enqueue; drops `item` if the channel is full
pub fn try_publish<T, const N: usize>(
    sender: &Sender<'_, PipelineMutex, T, N>,
    item: T,
    queue: &'static str,
) -> Result<(), PublishError> {
    sender
        .try_send(item)
        .map_err(|_: TrySendError<T>| PublishError::Full { queue })
}

/// All shared state of one pipeline instance.
///
/// Lives in a `static` on the device; tests build their own.
pub struct Pipeline {
    pub triggers: TriggerChannel,
    pub sensor: SensorChannel,
    pub uptime: UptimeChannel,
    pub stats: PipelineStats,
}

impl Pipeline {
    pub const fn new() -> Self {
        Self {
            triggers: Channel::new(),
            sensor: Channel::new(),
            uptime: Channel::new(),
            stats: PipelineStats::new(),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_channel_drops_newest() {
        let channel = SensorChannel::new();
        let sender = channel.sender();

        for i in 0..SENSOR_QUEUE_CAPACITY {
            try_publish(&sender, SensorSample::new(i as u64, i as u8), "Sensor").unwrap();
        }

        let err = try_publish(&sender, SensorSample::new(99, 99), "Sensor").unwrap_err();
        assert_eq!(err, PublishError::Full { queue: "Sensor" });
        assert_eq!(channel.len(), SENSOR_QUEUE_CAPACITY);

        // Existing entries are untouched and still in FIFO order
        let receiver = channel.receiver();
        for i in 0..SENSOR_QUEUE_CAPACITY {
            assert_eq!(
                receiver.try_receive().ok(),
                Some(SensorSample::new(i as u64, i as u8))
            );
        }
        assert!(receiver.try_receive().is_err());
    }

    #[test]
    fn test_uptime_channel_holds_two() {
        let channel = UptimeChannel::new();
        let sender = channel.sender();

        assert!(try_publish(&sender, UptimeSample::at(1000, 0), "Uptime").is_ok());
        assert!(try_publish(&sender, UptimeSample::at(2000, 0), "Uptime").is_ok());
        assert!(try_publish(&sender, UptimeSample::at(3000, 0), "Uptime").is_err());
        assert_eq!(channel.len(), UPTIME_QUEUE_CAPACITY);
    }

    #[test]
    fn test_publish_error_message() {
        assert_eq!(
            PublishError::Full { queue: "Uptime" }.to_string(),
            "Uptime queue full, dropping data"
        );
    }
}
