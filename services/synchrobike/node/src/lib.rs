//! Node runtime for synchrobike.
//!
//! A node owns its palette state and decides what to do with palette
//! messages arriving over the mesh. One statically configured master cycles
//! through the built-in catalog and broadcasts each selection; every other
//! node adopts what it receives and animates confetti from it.
//!
//! ## Control loop
//!
//! ```text
//! Node::step(now)
//!   ├─ transport.update(now)
//!   ├─ drain MeshEvents ──► receive() ──► DistributionPolicy::apply
//!   ├─ broadcast timer (master) ──► next_broadcast ──► transport.broadcast
//!   ├─ frame timer ──► Confetti::render (only once a palette is acquired)
//!   ├─ status timer ──► StatusIndicator::refresh(peer_count)
//!   └─ strip.show() if anything changed
//! ```
//!
//! Nothing in the loop blocks; timers are fire-or-skip comparisons against
//! the caller's clock, so the same code drives real hardware, a terminal and
//! a virtual-time simulation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod animation;
pub mod catalog;
pub mod error;
pub mod node;
pub mod policy;
pub mod state;
pub mod status;
pub mod timer;

// Re-export main types
pub use animation::{Confetti, FrameBuffer, LedStrip};
pub use catalog::{Catalog, CatalogEntry};
pub use error::{NodeError, Result};
pub use node::{Node, NodeSettings, Outcome, FRAMES_PER_SECOND};
pub use policy::{DistributionPolicy, Role};
pub use state::{NodeState, ReceiveStats};
pub use status::StatusIndicator;
pub use timer::Every;
