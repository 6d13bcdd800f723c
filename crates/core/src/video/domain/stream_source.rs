use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    #[error("stream address is empty")]
    EmptyAddress,
    #[error("cannot open {address}: {reason}")]
    Open { address: String, reason: String },
    #[error("stream is not opened")]
    NotOpened,
    #[error("end of stream")]
    EndOfStream,
    #[error("frame read failed: {0}")]
    Read(String),
}

/// Properties of an opened stream.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate, or 0.0 when the container does not report one.
    pub fps: f64,
    pub address: String,
}

/// A pull-based frame source identified by an opaque address string.
///
/// Implementations own their connection exclusively. Frames are produced
/// one at a time on demand; there is no internal buffering beyond what the
/// underlying decoder needs.
pub trait StreamSource: Send {
    /// Connects to `address`, closing any previously opened stream first.
    fn open(&mut self, address: &str) -> Result<StreamInfo, StreamError>;

    /// Reads and decodes the next available frame.
    fn read_next(&mut self) -> Result<Frame, StreamError>;

    /// Releases the connection. Safe to call repeatedly.
    fn close(&mut self);

    fn is_opened(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(StreamError::EmptyAddress.to_string(), "stream address is empty");
        let err = StreamError::Open {
            address: "http://cam/stream".to_string(),
            reason: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "cannot open http://cam/stream: timed out");
        assert_eq!(
            StreamError::Read("corrupt packet".to_string()).to_string(),
            "frame read failed: corrupt packet"
        );
    }
}
