//! Mesh transport adapters for synchrobike.
//!
//! The node core only ever sees the narrow [`MeshTransport`] surface: broadcast
//! some text, poll for events, ask how many peers are reachable. Topology,
//! discovery and delivery are the adapter's business.
//!
//! ## Adapters
//!
//! - [`LoopbackMesh`]: in-process hub for tests and simulation
//! - [`UdpMesh`]: UDP broadcast on a local network segment
//!
//! ## Example
//!
//! ```rust
//! use std::time::Instant;
//! use synchro_transport::{encode_text, LoopbackHub, MeshEvent, MeshTransport};
//!
//! let hub = LoopbackHub::new();
//! let mut master = hub.join(1);
//! let mut receiver = hub.join(2);
//!
//! master.broadcast(&encode_text(b"rgam")).unwrap();
//!
//! receiver.update(Instant::now());
//! while let Some(event) = receiver.poll_event() {
//!     if let MeshEvent::Message { from, text } = event {
//!         assert_eq!(from, 1);
//!         assert_eq!(text, "cmdhbQ==");
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod loopback;
pub mod text;
pub mod udp;

use std::time::Instant;

// Re-export main types
pub use error::TransportError;
pub use loopback::{LoopbackHub, LoopbackMesh};
pub use text::{decode_text, encode_text};
pub use udp::{UdpMesh, UdpMeshConfig};

/// Mesh node identifier
pub type NodeId = u32;

/// Events surfaced by a mesh transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    /// A broadcast from another node
    Message {
        /// Originating node
        from: NodeId,
        /// Text-encoded payload
        text: String,
    },
    /// A node became reachable
    NewConnection(NodeId),
    /// The set of reachable nodes changed
    ChangedConnections {
        /// Reachable peers after the change
        peers: usize,
    },
}

/// Narrow transport surface used by the node core
pub trait MeshTransport {
    /// Identifier of the local node
    fn node_id(&self) -> NodeId;

    /// Housekeeping: beacons, socket draining, peer expiry.
    ///
    /// Must not block.
    fn update(&mut self, now: Instant);

    /// Fire-and-forget broadcast to every reachable peer
    fn broadcast(&mut self, text: &str) -> Result<(), TransportError>;

    /// Next pending event, if any
    fn poll_event(&mut self) -> Option<MeshEvent>;

    /// Number of currently reachable peers
    fn peer_count(&self) -> usize;
}
