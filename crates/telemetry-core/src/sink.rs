//! Output side of the aggregator: where finished frames go

use thiserror_no_std::Error;

use crate::frame::TelemetryFrame;

/// Upper bound of a postcard-encoded frame (varint fields at their widest)
pub const MAX_ENCODED_FRAME_LEN: usize = 32;

/// Receiver of completed frames.
///
/// `emit` is called synchronously from the aggregator once per period, so it
/// must return well within the frame period. A slow sink delays the next
/// cycle and shows up as missed deadlines.
pub trait FrameSink {
    fn emit(&mut self, frame: TelemetryFrame);
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn emit(&mut self, frame: TelemetryFrame) {
        (**self).emit(frame)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEncodeError {
    #[error("Output buffer too small for frame")]
    BufferTooSmall,
    #[error("Malformed frame bytes")]
    Malformed,
}

/// Serialize a frame for binary transports.
///
/// Returns the used prefix of `buf`.
pub fn encode_frame<'b>(
    frame: &TelemetryFrame,
    buf: &'b mut [u8],
) -> Result<&'b mut [u8], FrameEncodeError> {
    postcard::to_slice(frame, buf).map_err(|e| match e {
        postcard::Error::SerializeBufferFull => FrameEncodeError::BufferTooSmall,
        _ => FrameEncodeError::Malformed,
    })
}

/// Inverse of [`encode_frame`]
pub fn decode_frame(bytes: &[u8]) -> Result<TelemetryFrame, FrameEncodeError> {
    postcard::from_bytes(bytes).map_err(|_| FrameEncodeError::Malformed)
}
