//! Per-node palette state.

use synchro_transport::NodeId;
use synchro_wire::Palette16;

/// Counters for the receive path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// Messages delivered by the transport
    pub received: u64,
    /// Palettes adopted
    pub adopted: u64,
    /// Foreign traffic dropped silently
    pub foreign: u64,
    /// Recognized but unusable messages
    pub rejected: u64,
    /// Palettes from other nodes ignored by the master
    pub ignored: u64,
}

/// Active palette and whether one has ever been acquired.
///
/// The palette is only ever replaced as a whole.
#[derive(Debug, Clone)]
pub struct NodeState {
    palette: Palette16,
    acquired: bool,
    source: Option<NodeId>,
    stats: ReceiveStats,
}

impl NodeState {
    /// State with a palette that has already been acquired
    pub fn acquired(palette: Palette16) -> Self {
        Self {
            palette,
            acquired: true,
            source: None,
            stats: ReceiveStats::default(),
        }
    }

    /// State waiting for its first palette
    pub fn idle() -> Self {
        Self {
            palette: Palette16::default(),
            acquired: false,
            source: None,
            stats: ReceiveStats::default(),
        }
    }

    /// Active palette
    pub fn palette(&self) -> &Palette16 {
        &self.palette
    }

    /// Whether a palette has been acquired
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Node the active palette came from
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// Receive counters
    pub fn stats(&self) -> &ReceiveStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ReceiveStats {
        &mut self.stats
    }

    pub(crate) fn adopt(&mut self, palette: Palette16, from: NodeId) {
        self.palette = palette;
        self.acquired = true;
        self.source = Some(from);
        self.stats.adopted += 1;
    }
}
