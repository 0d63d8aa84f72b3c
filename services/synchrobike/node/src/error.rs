//! Node error types.

use synchro_transport::TransportError;
use thiserror::Error;

/// Node runtime errors
#[derive(Error, Debug)]
pub enum NodeError {
    /// Mesh transport failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// LED output failure
    #[error("LED output error: {0}")]
    Led(#[from] std::io::Error),

    /// Status pixel index outside the strip
    #[error("status pixel {pixel} is outside a strip of {len} LEDs")]
    StatusPixelOutOfRange {
        /// Configured pixel index
        pixel: usize,
        /// Strip length
        len: usize,
    },
}

/// Result type for node operations
pub type Result<T> = std::result::Result<T, NodeError>;
