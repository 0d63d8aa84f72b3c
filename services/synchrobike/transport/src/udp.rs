//! UDP broadcast mesh.
//!
//! Nodes on one network segment share a UDP port. Each datagram is a small
//! JSON object tagged with the mesh prefix and the sender's node id:
//!
//! ```text
//! {"kind":"hello","mesh":"synchrobike","from":17}
//! {"kind":"broadcast","mesh":"synchrobike","from":17,"msg":"cmdhbQ..."}
//! ```
//!
//! Peers are whatever nodes have been heard from within the peer timeout;
//! periodic hello beacons keep idle nodes visible. Datagrams from other mesh
//! prefixes and the node's own looped-back broadcasts are dropped.

use crate::{MeshEvent, MeshTransport, NodeId, TransportError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

const MAX_DATAGRAM_SIZE: usize = 2048;

/// UDP mesh configuration
#[derive(Debug, Clone)]
pub struct UdpMeshConfig {
    /// Identifier of the local node
    pub node_id: NodeId,
    /// Mesh name; datagrams with another prefix are ignored
    pub mesh_prefix: String,
    /// Local bind address
    pub bind: SocketAddr,
    /// Destination for broadcasts (usually the segment broadcast address)
    pub broadcast: SocketAddr,
    /// Interval between hello beacons
    pub hello_interval: Duration,
    /// Silence after which a peer is considered gone
    pub peer_timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Datagram {
    Hello {
        mesh: String,
        from: NodeId,
    },
    Broadcast {
        mesh: String,
        from: NodeId,
        msg: String,
    },
}

impl Datagram {
    fn origin(&self) -> (&str, NodeId) {
        match self {
            Datagram::Hello { mesh, from } => (mesh, *from),
            Datagram::Broadcast { mesh, from, .. } => (mesh, *from),
        }
    }
}

/// Mesh transport over UDP broadcast
pub struct UdpMesh {
    config: UdpMeshConfig,
    socket: UdpSocket,
    peers: HashMap<NodeId, Instant>,
    events: VecDeque<MeshEvent>,
    last_hello: Option<Instant>,
    buf: Vec<u8>,
}

impl UdpMesh {
    /// Bind the mesh socket and enable broadcast
    pub async fn bind(config: UdpMeshConfig) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(config.bind).await?;
        socket.set_broadcast(true)?;

        info!(
            "UDP mesh '{}' bound to {} (node {}, broadcast {})",
            config.mesh_prefix,
            socket.local_addr()?,
            config.node_id,
            config.broadcast
        );

        Ok(Self {
            config,
            socket,
            peers: HashMap::new(),
            events: VecDeque::new(),
            last_hello: None,
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    /// Local socket address
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait until a datagram can be read
    pub async fn readable(&self) -> Result<(), TransportError> {
        Ok(self.socket.readable().await?)
    }

    /// Wait until a datagram can be sent
    pub async fn writable(&self) -> Result<(), TransportError> {
        Ok(self.socket.writable().await?)
    }

    fn send(&self, datagram: &Datagram) -> Result<(), TransportError> {
        let bytes = serde_json::to_vec(datagram)?;
        self.socket.try_send_to(&bytes, self.config.broadcast)?;
        Ok(())
    }

    fn send_hello(&mut self, now: Instant) {
        let due = self
            .last_hello
            .map_or(true, |last| now.duration_since(last) >= self.config.hello_interval);
        if !due {
            return;
        }

        self.last_hello = Some(now);
        let hello = Datagram::Hello {
            mesh: self.config.mesh_prefix.clone(),
            from: self.config.node_id,
        };
        if let Err(e) = self.send(&hello) {
            debug!("Hello beacon not sent: {}", e);
        }
    }

    fn drain(&mut self, now: Instant) {
        loop {
            let (len, addr) = match self.socket.try_recv_from(&mut self.buf) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("UDP receive failed: {}", e);
                    break;
                }
            };

            let datagram: Datagram = match serde_json::from_slice(&self.buf[..len]) {
                Ok(datagram) => datagram,
                Err(e) => {
                    trace!("Dropping unparsable datagram from {}: {}", addr, e);
                    continue;
                }
            };

            self.accept(datagram, now);
        }
    }

    fn accept(&mut self, datagram: Datagram, now: Instant) {
        let (mesh, from) = datagram.origin();
        if mesh != self.config.mesh_prefix {
            trace!("Dropping datagram for mesh '{}'", mesh);
            return;
        }
        if from == self.config.node_id {
            return;
        }

        if self.peers.insert(from, now).is_none() {
            debug!("New connection, node {}", from);
            self.events.push_back(MeshEvent::NewConnection(from));
            self.events.push_back(MeshEvent::ChangedConnections {
                peers: self.peers.len(),
            });
        }

        if let Datagram::Broadcast { msg, .. } = datagram {
            self.events.push_back(MeshEvent::Message { from, text: msg });
        }
    }

    fn expire(&mut self, now: Instant) {
        let timeout = self.config.peer_timeout;
        let before = self.peers.len();
        self.peers
            .retain(|_, last_seen| now.duration_since(*last_seen) < timeout);

        if self.peers.len() != before {
            debug!("{} peers timed out", before - self.peers.len());
            self.events.push_back(MeshEvent::ChangedConnections {
                peers: self.peers.len(),
            });
        }
    }
}

impl MeshTransport for UdpMesh {
    fn node_id(&self) -> NodeId {
        self.config.node_id
    }

    fn update(&mut self, now: Instant) {
        self.send_hello(now);
        self.drain(now);
        self.expire(now);
    }

    fn broadcast(&mut self, text: &str) -> Result<(), TransportError> {
        self.send(&Datagram::Broadcast {
            mesh: self.config.mesh_prefix.clone(),
            from: self.config.node_id,
            msg: text.to_string(),
        })
    }

    fn poll_event(&mut self) -> Option<MeshEvent> {
        self.events.pop_front()
    }

    fn peer_count(&self) -> usize {
        self.peers.len()
    }
}
