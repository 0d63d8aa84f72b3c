//! Transport error types.

use crate::NodeId;
use thiserror::Error;

/// Mesh transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Socket failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Received text is not valid base64
    #[error("text decoding failed: {0}")]
    Text(#[from] base64::DecodeError),

    /// Datagram could not be serialized or parsed
    #[error("datagram invalid: {0}")]
    Datagram(#[from] serde_json::Error),

    /// The node is no longer attached to the mesh
    #[error("node {0} is not attached to the mesh")]
    Disconnected(NodeId),
}
