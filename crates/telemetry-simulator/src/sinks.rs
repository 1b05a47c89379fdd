//! Frame sinks for the host simulator

use std::fmt::Write;

use log::error;
use telemetry_core::frame::TelemetryFrame;
use telemetry_core::sink::{FrameSink, MAX_ENCODED_FRAME_LEN, encode_frame};

/// Prints one human-readable line per frame
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl FrameSink for ConsoleSink {
    fn emit(&mut self, frame: TelemetryFrame) {
        println!("{}", frame.to_line());
    }
}

/// Prints each frame as hex-encoded postcard bytes, as a serial link would
/// carry them
#[derive(Debug, Default)]
pub struct WireSink {
    hex: String,
}

impl FrameSink for WireSink {
    fn emit(&mut self, frame: TelemetryFrame) {
        let mut buf = [0u8; MAX_ENCODED_FRAME_LEN];
        match encode_frame(&frame, &mut buf) {
            Ok(bytes) => {
                self.hex.clear();
                for byte in bytes.iter() {
                    let _ = write!(self.hex, "{byte:02x}");
                }
                println!("WIRE {} {}", frame.frame_id, self.hex);
            }
            Err(e) => error!("Failed to encode frame {}: {}", frame.frame_id, e),
        }
    }
}

/// Sink selected at build time through `TELEMETRY_SINK`
#[derive(Debug)]
pub enum SimulatorSink {
    Console(ConsoleSink),
    Wire(WireSink),
}

impl SimulatorSink {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "console" => Some(Self::Console(ConsoleSink)),
            "wire" => Some(Self::Wire(WireSink::default())),
            _ => None,
        }
    }
}

impl FrameSink for SimulatorSink {
    fn emit(&mut self, frame: TelemetryFrame) {
        match self {
            Self::Console(sink) => sink.emit(frame),
            Self::Wire(sink) => sink.emit(frame),
        }
    }
}
