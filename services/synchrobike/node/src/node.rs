//! The node control loop.

use crate::animation::{Confetti, LedStrip, DEFAULT_FADE};
use crate::catalog::Catalog;
use crate::error::{NodeError, Result};
use crate::policy::{DistributionPolicy, Role};
use crate::state::NodeState;
use crate::status::StatusIndicator;
use crate::timer::Every;
use std::time::{Duration, Instant};
use synchro_transport::{decode_text, encode_text, MeshEvent, MeshTransport, NodeId};
use synchro_wire::{decode_message, Message, WireError, WireFormat};
use tracing::{debug, info, trace, warn};

/// Frames per second of the confetti animation
pub const FRAMES_PER_SECOND: u64 = 65;

/// Node tuning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSettings {
    /// Static role
    pub role: Role,
    /// Format for outgoing broadcasts (master only)
    pub format: WireFormat,
    /// Interval between animation frames
    pub frame_interval: Duration,
    /// Interval between confetti sparkles
    pub confetti_interval: Duration,
    /// Interval between palette broadcasts (master only)
    pub broadcast_interval: Duration,
    /// Interval between status pixel refreshes
    pub status_interval: Duration,
    /// Pixel used as connectivity indicator, if any
    pub status_pixel: Option<usize>,
    /// Fade per frame (out of 255)
    pub fade: u8,
    /// Seed for the sparkle sequence
    pub seed: u64,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            role: Role::Receiver,
            format: WireFormat::Envelope,
            frame_interval: Duration::from_millis(1000 / FRAMES_PER_SECOND),
            confetti_interval: Duration::from_millis(200),
            broadcast_interval: Duration::from_secs(5),
            status_interval: Duration::from_millis(500),
            status_pixel: Some(0),
            fade: DEFAULT_FADE,
            seed: 0,
        }
    }
}

/// What happened to a received message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Decoded and made the active palette
    Adopted,
    /// Not meant for this application; dropped silently
    Foreign,
    /// Recognized but unusable; previous palette kept
    Rejected,
    /// Valid palette from another node, ignored by the master
    Ignored,
}

/// One mesh node: palette state, distribution policy and animation
pub struct Node {
    id: NodeId,
    state: NodeState,
    policy: DistributionPolicy,
    confetti: Confetti,
    status: Option<StatusIndicator>,
    peers: usize,
    frame_timer: Every,
    broadcast_timer: Every,
    status_timer: Every,
}

impl Node {
    /// Create a node; all timers start at `now`
    pub fn new(id: NodeId, settings: &NodeSettings, catalog: Catalog, now: Instant) -> Self {
        let policy = DistributionPolicy::new(settings.role, catalog, settings.format);
        let state = policy.initial_state();

        info!(
            "Node {} starting as {} ({} palettes, {:?} format)",
            id,
            settings.role,
            policy.catalog().len(),
            settings.format
        );

        Self {
            id,
            state,
            policy,
            confetti: Confetti::new(settings.confetti_interval, settings.fade, settings.seed, now),
            status: settings.status_pixel.map(StatusIndicator::new),
            peers: 0,
            frame_timer: Every::new(settings.frame_interval, now),
            broadcast_timer: Every::new(settings.broadcast_interval, now),
            status_timer: Every::new(settings.status_interval, now),
        }
    }

    /// Node identifier
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Configured role
    pub fn role(&self) -> Role {
        self.policy.role()
    }

    /// Palette state
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Distribution policy
    pub fn policy(&self) -> &DistributionPolicy {
        &self.policy
    }

    /// Last known peer count
    pub fn peers(&self) -> usize {
        self.peers
    }

    /// Check that the configured status pixel fits a strip of `len` LEDs
    pub fn check_strip(&self, len: usize) -> Result<()> {
        match self.status {
            Some(status) if status.pixel() >= len => Err(NodeError::StatusPixelOutOfRange {
                pixel: status.pixel(),
                len,
            }),
            _ => Ok(()),
        }
    }

    /// Run one pass of the control loop.
    ///
    /// Transport housekeeping, event handling, the master broadcast, the
    /// animation frame and the status refresh happen in that order. The strip
    /// is shown once at the end if any pixel was written.
    pub fn step<T, S>(&mut self, transport: &mut T, strip: &mut S, now: Instant) -> Result<()>
    where
        T: MeshTransport + ?Sized,
        S: LedStrip + ?Sized,
    {
        transport.update(now);
        while let Some(event) = transport.poll_event() {
            self.handle_event(event);
        }

        if self.role() == Role::Master && self.broadcast_timer.ready(now) {
            self.broadcast(transport);
        }

        let mut dirty = false;

        if self.frame_timer.ready(now) && self.state.is_acquired() {
            self.confetti
                .render(self.state.palette(), strip.pixels_mut(), now);
            if let Some(status) = self.status {
                status.refresh(self.peers, strip.pixels_mut());
            }
            dirty = true;
        }

        if self.status_timer.ready(now) {
            self.peers = transport.peer_count();
            if let Some(status) = self.status {
                dirty |= status.refresh(self.peers, strip.pixels_mut());
            }
        }

        if dirty {
            strip.show().map_err(NodeError::Led)?;
        }
        Ok(())
    }

    /// React to one transport event
    pub fn handle_event(&mut self, event: MeshEvent) {
        match event {
            MeshEvent::Message { from, text } => {
                self.receive(from, &text);
            }
            MeshEvent::NewConnection(peer) => {
                info!("New connection, node {}", peer);
            }
            MeshEvent::ChangedConnections { peers } => {
                debug!("Changed connections, {} peers", peers);
                self.peers = peers;
            }
        }
    }

    /// Handle a text message from the mesh.
    ///
    /// Errors never propagate: the node keeps its previous palette and the
    /// outcome is reported in the receive statistics.
    pub fn receive(&mut self, from: NodeId, text: &str) -> Outcome {
        self.state.stats_mut().received += 1;

        let raw = match decode_text(text) {
            Ok(raw) => raw,
            Err(e) => {
                trace!("Dropping non-text message from node {}: {}", from, e);
                self.state.stats_mut().foreign += 1;
                return Outcome::Foreign;
            }
        };

        if self.role() == Role::Master && from != self.id {
            return match decode_message(&raw) {
                Ok(_) => {
                    warn!(
                        "Ignoring palette from node {}; only one master should broadcast",
                        from
                    );
                    self.state.stats_mut().ignored += 1;
                    Outcome::Ignored
                }
                Err(e) => self.reject(from, e),
            };
        }

        match self.policy.apply(&mut self.state, from, &raw) {
            Ok(message) => {
                let name = self
                    .policy
                    .catalog()
                    .identify(&message.palette())
                    .unwrap_or("custom");
                let format = match message {
                    Message::Gradient(_) => "envelope",
                    Message::Palette(_) => "flat",
                };
                info!("Adopted palette '{}' from node {} ({})", name, from, format);
                Outcome::Adopted
            }
            Err(e) => self.reject(from, e),
        }
    }

    fn reject(&mut self, from: NodeId, error: WireError) -> Outcome {
        if error.is_foreign() {
            trace!("Dropping foreign message from node {}", from);
            self.state.stats_mut().foreign += 1;
            return Outcome::Foreign;
        }

        match error {
            WireError::UnknownPacketType(code) => {
                warn!("Unknown packet type {} from node {}", code, from)
            }
            _ => warn!("Rejected message from node {}: {}", from, error),
        }
        self.state.stats_mut().rejected += 1;
        Outcome::Rejected
    }

    fn broadcast<T: MeshTransport + ?Sized>(&mut self, transport: &mut T) {
        let Some(bytes) = self.policy.next_broadcast() else {
            return;
        };

        let text = encode_text(&bytes);
        match transport.broadcast(&text) {
            Ok(()) => debug!("Broadcast {} byte palette message", bytes.len()),
            Err(e) => warn!("Palette broadcast failed: {}", e),
        }

        // The mesh does not echo broadcasts back to the sender
        self.receive(self.id, &text);
    }
}
