//! Hardware-independent core of the telemetry device simulator
//!
//! This crate contains the real-time data path: trigger relay, producer,
//! rolling average buffer, aggregator and load-spike generator, plus the
//! bounded channels that connect them. Roles only ever talk to each other
//! through those channels.
//!
//! It is `#![no_std]` so it compiles on both embedded targets and desktop
//! hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod aggregator;
pub mod channels;
pub mod clock;
pub mod config;
pub mod frame;
pub mod load;
pub mod producer;
pub mod rolling;
pub mod samples;
pub mod sink;
pub mod stats;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_support;
