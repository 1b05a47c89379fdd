//! Timer expiry to trigger-event relay
//!
//! Timer expiries must not do real work. The relay turns each expiry into a
//! payload-free [`TriggerKind`] and hands it to the producer through the
//! trigger channel with a single non-blocking enqueue.

use embassy_time::{Duration, Ticker};
use log::{info, warn};

use crate::channels::{TriggerSender, try_publish};
use crate::samples::TriggerKind;
use crate::stats::PipelineStats;

pub struct TriggerRelay<'a> {
    sender: TriggerSender<'a>,
    stats: &'a PipelineStats,
}

impl<'a> TriggerRelay<'a> {
    pub fn new(sender: TriggerSender<'a>, stats: &'a PipelineStats) -> Self {
        Self { sender, stats }
    }

    /// Enqueue one trigger; returns `false` if it was dropped.
    ///
    /// O(1) and never blocks. A full channel means the producer has fallen
    /// behind; the trigger is lost and not retried.
    pub fn fire(&self, kind: TriggerKind) -> bool {
        match try_publish(&self.sender, kind, queue_label(kind)) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                self.stats.record_dropped_trigger();
                false
            }
        }
    }
}

const fn queue_label(kind: TriggerKind) -> &'static str {
    match kind {
        TriggerKind::SensorTick => "Sensor Trigger",
        TriggerKind::UptimeTick => "Uptime Trigger",
    }
}

/// Auto-rearming periodic timer firing `kind` every `period`.
///
/// This is the timer expiry context: it does nothing but [`TriggerRelay::fire`].
pub async fn trigger_timer(relay: &TriggerRelay<'_>, kind: TriggerKind, period: Duration) -> ! {
    info!(
        "{} trigger timer started ({} ms)",
        kind.label(),
        period.as_millis()
    );

    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        relay.fire(kind);
    }
}
