//! Palette distribution policy.
//!
//! Exactly one node is configured as [`Role::Master`]. It walks the catalog
//! on a fixed interval, wrapping around at the end, and broadcasts each
//! selection. Every other node is a [`Role::Receiver`]: it validates incoming
//! buffers and swaps its active palette wholesale when one decodes.

use crate::catalog::Catalog;
use crate::state::NodeState;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use synchro_transport::NodeId;
use synchro_wire::{decode_message, encode_gradient, Message, WireError, WireFormat};
use tracing::debug;

/// Static role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Originates palette updates
    Master,
    /// Adopts palette updates
    #[default]
    Receiver,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "master" => Ok(Role::Master),
            "receiver" => Ok(Role::Receiver),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Master => write!(f, "master"),
            Role::Receiver => write!(f, "receiver"),
        }
    }
}

/// Who sends palettes, and how received ones are applied
#[derive(Debug, Clone)]
pub struct DistributionPolicy {
    role: Role,
    catalog: Catalog,
    format: WireFormat,
    cursor: usize,
}

impl DistributionPolicy {
    /// Create a policy for the given role
    pub fn new(role: Role, catalog: Catalog, format: WireFormat) -> Self {
        Self {
            role,
            catalog,
            format,
            cursor: 0,
        }
    }

    /// Configured role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Palette catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Format used for outgoing broadcasts
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Index of the catalog entry last selected
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Starting state for this role.
    ///
    /// The master begins on the first catalog entry and always counts as
    /// having a palette; receivers stay idle until their first update.
    pub fn initial_state(&self) -> NodeState {
        match self.role {
            Role::Master => NodeState::acquired(
                self.catalog
                    .get(0)
                    .map(|entry| entry.gradient.to_palette16())
                    .unwrap_or_default(),
            ),
            Role::Receiver => NodeState::idle(),
        }
    }

    /// Advance to the next catalog entry and encode it.
    ///
    /// Returns `None` for receivers and for an empty catalog.
    pub fn next_broadcast(&mut self) -> Option<Bytes> {
        if self.role != Role::Master || self.catalog.is_empty() {
            return None;
        }

        self.cursor = (self.cursor + 1) % self.catalog.len();
        let entry = self.catalog.get(self.cursor)?;
        debug!(
            "Selected palette '{}' ({}/{})",
            entry.name,
            self.cursor + 1,
            self.catalog.len()
        );
        Some(encode_gradient(&entry.gradient, self.format))
    }

    /// Decode a raw buffer and, if valid, make it the active palette.
    ///
    /// On any error the state keeps its previous palette.
    pub fn apply(
        &self,
        state: &mut NodeState,
        from: NodeId,
        raw: &[u8],
    ) -> Result<Message, WireError> {
        let message = decode_message(raw)?;
        state.adopt(message.palette(), from);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synchro_wire::{Palette16, PACKET_SIZE, PALETTE_MESSAGE_SIZE};

    #[test]
    fn test_role_parse() {
        assert_eq!("master".parse::<Role>().unwrap(), Role::Master);
        assert_eq!("Receiver".parse::<Role>().unwrap(), Role::Receiver);
        assert!("leader".parse::<Role>().is_err());
        assert_eq!(Role::Master.to_string(), "master");
    }

    #[test]
    fn test_initial_state() {
        let master = DistributionPolicy::new(Role::Master, Catalog::builtin(), WireFormat::Envelope);
        let state = master.initial_state();
        assert!(state.is_acquired());
        assert_eq!(
            *state.palette(),
            Catalog::builtin().get(0).unwrap().gradient.to_palette16()
        );

        let receiver =
            DistributionPolicy::new(Role::Receiver, Catalog::builtin(), WireFormat::Envelope);
        assert!(!receiver.initial_state().is_acquired());
    }

    #[test]
    fn test_master_wraps_around_catalog() {
        let catalog = Catalog::builtin();
        let n = catalog.len();
        let first = encode_gradient(&catalog.get(0).unwrap().gradient, WireFormat::Envelope);

        let mut policy = DistributionPolicy::new(Role::Master, catalog.clone(), WireFormat::Envelope);
        let sent: Vec<Bytes> = (0..n).map(|_| policy.next_broadcast().unwrap()).collect();

        assert_eq!(policy.cursor(), 0);
        assert_eq!(sent[n - 1], first);
        assert_eq!(
            sent[0],
            encode_gradient(&catalog.get(1).unwrap().gradient, WireFormat::Envelope)
        );
        assert!(sent.iter().all(|bytes| bytes.len() == PACKET_SIZE));
    }

    #[test]
    fn test_flat_broadcasts() {
        let mut policy = DistributionPolicy::new(Role::Master, Catalog::builtin(), WireFormat::Flat);
        let bytes = policy.next_broadcast().unwrap();
        assert_eq!(bytes.len(), PALETTE_MESSAGE_SIZE);
        assert_eq!(
            Palette16::decode(&bytes).unwrap(),
            Catalog::builtin().get(1).unwrap().gradient.to_palette16()
        );
    }

    #[test]
    fn test_receiver_never_broadcasts() {
        let mut policy =
            DistributionPolicy::new(Role::Receiver, Catalog::builtin(), WireFormat::Envelope);
        assert!(policy.next_broadcast().is_none());
    }

    #[test]
    fn test_empty_catalog() {
        let mut policy =
            DistributionPolicy::new(Role::Master, Catalog::new(Vec::new()), WireFormat::Envelope);
        assert!(policy.next_broadcast().is_none());
        assert!(policy.initial_state().is_acquired());
    }

    #[test]
    fn test_apply_keeps_previous_palette_on_error() {
        let catalog = Catalog::builtin();
        let policy = DistributionPolicy::new(Role::Receiver, catalog.clone(), WireFormat::Envelope);
        let mut state = policy.initial_state();

        let good = encode_gradient(&catalog.get(2).unwrap().gradient, WireFormat::Envelope);
        policy.apply(&mut state, 7, &good).unwrap();
        let adopted = *state.palette();

        let mut bad = good.to_vec();
        bad[5] = 9;
        assert_eq!(
            policy.apply(&mut state, 7, &bad),
            Err(WireError::PaletteTooManyColors(9))
        );
        assert_eq!(policy.apply(&mut state, 7, b"junk"), Err(WireError::NotAPaletteMessage));

        assert_eq!(*state.palette(), adopted);
        assert_eq!(state.stats().adopted, 1);
    }
}
