//! Error types shared across the crate.
//!
//! Row errors are returned to producers synchronously. Device errors never
//! leave the render loop except through `PixelSink` itself and device probes.

use std::path::PathBuf;

/// Misuse of the row producer API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// The row index is outside `0..row_count`.
    #[error("row index out of range, got {index} but should be in range(0, {row_count})")]
    RowIndexOutOfRange {
        /// Index supplied by the caller.
        index: usize,
        /// Number of rows on the display.
        row_count: usize,
    },
    /// The clear range is empty, reversed, or exceeds the row set.
    #[error("invalid row range {start}..{end} for {row_count} rows")]
    RangeInvalid {
        /// First row of the range.
        start: usize,
        /// End of the range (exclusive), after sentinel resolution.
        end: usize,
        /// Number of rows on the display.
        row_count: usize,
    },
}

/// Failure to reach or drive the physical display.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// No device is attached (probe failed or device was never opened).
    #[error("display not connected")]
    NotConnected,
    /// The bus reported an error while talking to the controller.
    #[error("display bus error: {0}")]
    Bus(String),
    /// The device cannot handle the requested geometry or operation.
    #[error("unsupported display configuration: {0}")]
    Unsupported(String),
    /// I/O error from a stream-backed sink.
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to load or validate a display configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has wrong types.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to change the render loop state.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// `start` was called while the loop is already running.
    #[error("render loop is already running")]
    AlreadyRunning,
    /// The OS refused to spawn the render thread.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_messages() {
        let err = RowError::RowIndexOutOfRange { index: 4, row_count: 4 };
        assert_eq!(
            err.to_string(),
            "row index out of range, got 4 but should be in range(0, 4)"
        );

        let err = RowError::RangeInvalid { start: 3, end: 1, row_count: 4 };
        assert_eq!(err.to_string(), "invalid row range 3..1 for 4 rows");
    }

    #[test]
    fn test_device_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err = DeviceError::from(io);
        assert!(matches!(err, DeviceError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
