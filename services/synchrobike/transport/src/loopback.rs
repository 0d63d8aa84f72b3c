//! In-process mesh for tests and simulation.
//!
//! Every endpoint owns an unbounded channel; the hub fans broadcasts out to
//! all other linked endpoints. Endpoints can be unlinked to simulate a node
//! drifting out of radio range.

use crate::{MeshEvent, MeshTransport, NodeId, TransportError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, trace};

struct Endpoint {
    tx: mpsc::UnboundedSender<MeshEvent>,
    linked: bool,
}

#[derive(Default)]
struct HubInner {
    endpoints: HashMap<NodeId, Endpoint>,
}

impl HubInner {
    fn linked_peers(&self, id: NodeId) -> usize {
        match self.endpoints.get(&id) {
            Some(endpoint) if endpoint.linked => self
                .endpoints
                .iter()
                .filter(|(other, e)| **other != id && e.linked)
                .count(),
            _ => 0,
        }
    }

    fn notify_changed(&self) {
        for (id, endpoint) in &self.endpoints {
            let peers = self.linked_peers(*id);
            let _ = endpoint.tx.send(MeshEvent::ChangedConnections { peers });
        }
    }
}

/// Shared in-process mesh
#[derive(Clone, Default)]
pub struct LoopbackHub {
    inner: Arc<Mutex<HubInner>>,
}

impl LoopbackHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Attach a node to the hub
    pub fn join(&self, id: NodeId) -> LoopbackMesh {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();

        for (other, endpoint) in &inner.endpoints {
            if endpoint.linked {
                let _ = endpoint.tx.send(MeshEvent::NewConnection(id));
                let _ = tx.send(MeshEvent::NewConnection(*other));
            }
        }
        inner.endpoints.insert(id, Endpoint { tx, linked: true });
        inner.notify_changed();

        debug!("Node {} joined loopback mesh ({} members)", id, inner.endpoints.len());

        LoopbackMesh {
            id,
            hub: self.clone(),
            rx,
        }
    }

    /// Link or unlink a node; unlinked nodes neither send nor receive
    pub fn set_linked(&self, id: NodeId, linked: bool) {
        let mut inner = self.lock();
        let changed = match inner.endpoints.get_mut(&id) {
            Some(endpoint) if endpoint.linked != linked => {
                endpoint.linked = linked;
                true
            }
            _ => false,
        };

        if changed {
            debug!("Node {} {} loopback mesh", id, if linked { "linked to" } else { "unlinked from" });
            inner.notify_changed();
        }
    }

    /// Number of attached nodes
    pub fn len(&self) -> usize {
        self.lock().endpoints.len()
    }

    /// True when no node is attached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn leave(&self, id: NodeId) {
        let mut inner = self.lock();
        if inner.endpoints.remove(&id).is_some() {
            inner.notify_changed();
        }
    }
}

/// One node's attachment to a [`LoopbackHub`]
pub struct LoopbackMesh {
    id: NodeId,
    hub: LoopbackHub,
    rx: mpsc::UnboundedReceiver<MeshEvent>,
}

impl MeshTransport for LoopbackMesh {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn update(&mut self, _now: Instant) {
        // Delivery happens at broadcast time
    }

    fn broadcast(&mut self, text: &str) -> Result<(), TransportError> {
        let inner = self.hub.lock();
        let sender = inner
            .endpoints
            .get(&self.id)
            .ok_or(TransportError::Disconnected(self.id))?;
        if !sender.linked {
            trace!("Node {} is unlinked, broadcast dropped", self.id);
            return Ok(());
        }

        let mut delivered = 0;
        for (id, endpoint) in &inner.endpoints {
            if *id == self.id || !endpoint.linked {
                continue;
            }
            let event = MeshEvent::Message {
                from: self.id,
                text: text.to_string(),
            };
            if endpoint.tx.send(event).is_ok() {
                delivered += 1;
            }
        }

        trace!("Node {} broadcast delivered to {} peers", self.id, delivered);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<MeshEvent> {
        self.rx.try_recv().ok()
    }

    fn peer_count(&self) -> usize {
        self.hub.lock().linked_peers(self.id)
    }
}

impl Drop for LoopbackMesh {
    fn drop(&mut self) {
        self.hub.leave(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mesh: &mut LoopbackMesh) -> Vec<MeshEvent> {
        std::iter::from_fn(|| mesh.poll_event()).collect()
    }

    fn messages(mesh: &mut LoopbackMesh) -> Vec<(NodeId, String)> {
        drain(mesh)
            .into_iter()
            .filter_map(|event| match event {
                MeshEvent::Message { from, text } => Some((from, text)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_join_events() {
        let hub = LoopbackHub::new();
        let mut a = hub.join(1);
        assert_eq!(drain(&mut a), vec![MeshEvent::ChangedConnections { peers: 0 }]);

        let mut b = hub.join(2);
        assert_eq!(
            drain(&mut a),
            vec![
                MeshEvent::NewConnection(2),
                MeshEvent::ChangedConnections { peers: 1 }
            ]
        );
        assert_eq!(
            drain(&mut b),
            vec![
                MeshEvent::NewConnection(1),
                MeshEvent::ChangedConnections { peers: 1 }
            ]
        );
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn test_broadcast_reaches_others_only() {
        let hub = LoopbackHub::new();
        let mut a = hub.join(1);
        let mut b = hub.join(2);
        let mut c = hub.join(3);

        a.broadcast("hello").unwrap();

        assert!(messages(&mut a).is_empty());
        assert_eq!(messages(&mut b), vec![(1, "hello".to_string())]);
        assert_eq!(messages(&mut c), vec![(1, "hello".to_string())]);
    }

    #[test]
    fn test_unlinked_node_is_isolated() {
        let hub = LoopbackHub::new();
        let mut a = hub.join(1);
        let mut b = hub.join(2);
        assert_eq!(a.peer_count(), 1);

        hub.set_linked(2, false);
        assert_eq!(a.peer_count(), 0);
        assert_eq!(b.peer_count(), 0);

        a.broadcast("lost").unwrap();
        b.broadcast("also lost").unwrap();
        assert!(messages(&mut a).is_empty());
        assert!(messages(&mut b).is_empty());

        hub.set_linked(2, true);
        a.broadcast("found").unwrap();
        assert_eq!(messages(&mut b), vec![(1, "found".to_string())]);
    }

    #[test]
    fn test_drop_leaves_hub() {
        let hub = LoopbackHub::new();
        let a = hub.join(1);
        {
            let _b = hub.join(2);
            assert_eq!(a.peer_count(), 1);
        }
        assert_eq!(a.peer_count(), 0);
        assert!(!hub.is_empty());
    }
}
