//! Desktop simulator for the telemetry pipeline.
//!
//! Runs every pipeline role on its own named OS thread with its own embassy
//! executor, so the load-spike generator's busy work competes for CPU the way
//! it would on the device but can never hold another role's executor.
//!
//! Thread priorities follow the device order Aggregator > Producer > Load
//! Generator. The host cannot raise a thread above the process without
//! privileges, so on Linux each role lowers its own niceness relative to the
//! process instead:
//!
//! | Thread       | Role                             | Niceness offset |
//! |--------------|----------------------------------|-----------------|
//! | `timers`     | Sensor and uptime trigger timers | +0              |
//! | `aggregator` | Frame aggregation                | +0              |
//! | `producer`   | Sample production                | +5              |
//! | `load`       | Load-spike generator             | +10             |
//!
//! The main thread prints a status line every 10 seconds.
//!
//! Build-time tunables (environment or `.env`):
//! `TELEMETRY_LOAD_SPIKE_{MIN,MAX}_{INTERVAL,DURATION}_MS` and
//! `TELEMETRY_SINK` (`console` or `wire`).

mod sinks;

use std::io;
use std::thread;
use std::time::Duration as StdDuration;

use embassy_executor::{Executor, Spawner};
use embassy_time::Duration;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use static_cell::StaticCell;

use telemetry_core::aggregator::Aggregator;
use telemetry_core::channels::Pipeline;
use telemetry_core::clock::{Clock, EmbassyClock};
use telemetry_core::config::{LoadSpikeConfig, SENSOR_PERIOD_MS, UPTIME_PERIOD_MS};
use telemetry_core::load::LoadSpikeGenerator;
use telemetry_core::producer::Producer;
use telemetry_core::samples::{TriggerKind, uptime_secs};
use telemetry_core::trigger::{TriggerRelay, trigger_timer};

use sinks::{ConsoleSink, SimulatorSink};

// ---------------------------------------------------------------------------
// Shared pipeline state
// ---------------------------------------------------------------------------

static PIPELINE: Pipeline = Pipeline::new();

static AGGREGATOR_EXECUTOR: StaticCell<Executor> = StaticCell::new();
static PRODUCER_EXECUTOR: StaticCell<Executor> = StaticCell::new();
static TIMER_EXECUTOR: StaticCell<Executor> = StaticCell::new();
static LOAD_EXECUTOR: StaticCell<Executor> = StaticCell::new();

/// How often the main thread wakes up to check whether a status line is due.
const STATUS_POLL_INTERVAL: StdDuration = StdDuration::from_secs(5);

/// Minimum time between two status lines.
const STATUS_INTERVAL_MS: u64 = 10_000;

const TIMER_NICE_OFFSET: i32 = 0;
const AGGREGATOR_NICE_OFFSET: i32 = 0;
const PRODUCER_NICE_OFFSET: i32 = 5;
const LOAD_NICE_OFFSET: i32 = 10;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn aggregator_task(aggregator: Aggregator<'static, EmbassyClock>, sink: SimulatorSink) {
    aggregator.run(sink).await
}

#[embassy_executor::task]
async fn producer_task(producer: Producer<'static, EmbassyClock, SmallRng>) {
    producer.run().await
}

#[embassy_executor::task(pool_size = 2)]
async fn trigger_timer_task(kind: TriggerKind, period: Duration) {
    let relay = TriggerRelay::new(PIPELINE.triggers.sender(), &PIPELINE.stats);
    trigger_timer(&relay, kind, period).await
}

#[embassy_executor::task]
async fn load_spike_task(generator: LoadSpikeGenerator<EmbassyClock, SmallRng>) {
    generator.run().await
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn load_spike_config() -> LoadSpikeConfig {
    match LoadSpikeConfig::from_strs(
        env!("TELEMETRY_LOAD_SPIKE_MIN_INTERVAL_MS"),
        env!("TELEMETRY_LOAD_SPIKE_MAX_INTERVAL_MS"),
        env!("TELEMETRY_LOAD_SPIKE_MIN_DURATION_MS"),
        env!("TELEMETRY_LOAD_SPIKE_MAX_DURATION_MS"),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid load spike configuration ({}), using defaults", e);
            LoadSpikeConfig::default()
        }
    }
}

fn frame_sink() -> SimulatorSink {
    let name = env!("TELEMETRY_SINK");
    SimulatorSink::from_name(name).unwrap_or_else(|| {
        error!("Unknown TELEMETRY_SINK '{}', using console", name);
        SimulatorSink::Console(ConsoleSink)
    })
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

fn run_executor(cell: &'static StaticCell<Executor>, init: impl FnOnce(Spawner)) {
    let executor = cell.init(Executor::new());
    executor.run(init)
}

/// Lower the calling thread's priority by `offset` niceness steps.
///
/// Returns the thread's niceness afterwards. The kernel clamps the result to
/// its maximum niceness.
#[cfg(target_os = "linux")]
fn lower_current_thread_priority(offset: i32) -> io::Result<i32> {
    // SAFETY: these calls only read and change the scheduling priority of the
    // calling thread, identified by its kernel thread id.
    unsafe {
        let tid = libc::gettid() as libc::id_t;
        let current = libc::getpriority(libc::PRIO_PROCESS, tid);
        if offset != 0 && libc::setpriority(libc::PRIO_PROCESS, tid, current + offset) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(libc::getpriority(libc::PRIO_PROCESS, tid))
    }
}

#[cfg(not(target_os = "linux"))]
fn lower_current_thread_priority(offset: i32) -> io::Result<i32> {
    debug!("Thread priorities not supported on this host, ignoring offset {}", offset);
    Ok(0)
}

fn spawn_role(
    name: &'static str,
    nice_offset: i32,
    cell: &'static StaticCell<Executor>,
    init: impl FnOnce(Spawner) + Send + 'static,
) {
    let spawned = thread::Builder::new().name(name.into()).spawn(move || {
        match lower_current_thread_priority(nice_offset) {
            Ok(nice) => debug!("{} thread running at niceness {}", name, nice),
            Err(e) => warn!("Failed to lower {} thread priority: {}", name, e),
        }
        run_executor(cell, init)
    });

    if let Err(e) = spawned {
        error!("Failed to start {} thread: {}", name, e);
    }
}

/// Start every pipeline role on its own thread.
///
/// Each executor cell is single-use, so this may run once per process.
fn start_pipeline(start_ms: u64, load_config: LoadSpikeConfig, sink: SimulatorSink) {
    spawn_role("timers", TIMER_NICE_OFFSET, &TIMER_EXECUTOR, |spawner| {
        spawner
            .spawn(trigger_timer_task(
                TriggerKind::UptimeTick,
                Duration::from_millis(UPTIME_PERIOD_MS),
            ))
            .expect("uptime timer already spawned");
        spawner
            .spawn(trigger_timer_task(
                TriggerKind::SensorTick,
                Duration::from_millis(SENSOR_PERIOD_MS),
            ))
            .expect("sensor timer already spawned");
    });

    spawn_role("aggregator", AGGREGATOR_NICE_OFFSET, &AGGREGATOR_EXECUTOR, move |spawner| {
        let aggregator = Aggregator::new(&PIPELINE, EmbassyClock, start_ms);
        spawner
            .spawn(aggregator_task(aggregator, sink))
            .expect("aggregator task already spawned");
    });

    spawn_role("producer", PRODUCER_NICE_OFFSET, &PRODUCER_EXECUTOR, move |spawner| {
        let producer = Producer::new(&PIPELINE, EmbassyClock, start_ms, SmallRng::from_entropy());
        spawner
            .spawn(producer_task(producer))
            .expect("producer task already spawned");
    });

    spawn_role("load", LOAD_NICE_OFFSET, &LOAD_EXECUTOR, move |spawner| {
        let generator =
            LoadSpikeGenerator::new(load_config, EmbassyClock, SmallRng::from_entropy());
        spawner
            .spawn(load_spike_task(generator))
            .expect("load task already spawned");
    });
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Telemetry Aggregator Starting...");

    let clock = EmbassyClock;
    let start_ms = clock.now_ms();
    let load_config = load_spike_config();
    info!("Load spike configuration: {:?}", load_config);

    start_pipeline(start_ms, load_config, frame_sink());

    println!("Aggregating telemetry data...");

    // The main thread becomes the status monitor
    let mut last_status_ms = clock.now_ms();
    loop {
        thread::sleep(STATUS_POLL_INTERVAL);

        let now_ms = clock.now_ms();
        if now_ms.saturating_sub(last_status_ms) >= STATUS_INTERVAL_MS {
            let stats = PIPELINE.stats.snapshot();
            println!(
                "--- STATUS: Total frames generated {}, system uptime {} s ---",
                stats.frames,
                uptime_secs(now_ms, start_ms)
            );
            info!(
                "degraded={} deadline_misses={} dropped triggers={} sensor={} uptime={}",
                stats.degraded_frames,
                stats.deadline_misses,
                stats.dropped_triggers,
                stats.dropped_sensor_samples,
                stats.dropped_uptime_samples
            );
            last_status_ms = now_ms;
        }
    }
}
