//! Configuration handling for the synchrobike node.
//!
//! Settings start from built-in defaults, are overlaid with a YAML file when
//! one is present, and finally with `SYNCHRO_*` environment variables.
//! Command line flags are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use synchro_node::{NodeSettings, Role};
use synchro_transport::{NodeId, UdpMeshConfig};
use synchro_wire::WireFormat;
use tracing::{info, warn};

/// Mesh name shared by all synchrobike nodes
pub const DEFAULT_MESH_PREFIX: &str = "synchrobike";

/// UDP port shared by all synchrobike nodes
pub const DEFAULT_MESH_PORT: u16 = 5555;

/// Node configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node identity and role
    pub node: NodeSection,
    /// Mesh transport
    pub mesh: MeshSection,
    /// LED strip and animation
    pub leds: LedSection,
}

/// Node identity and role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Node ID; 0 derives one from the process id
    pub id: NodeId,
    /// Static role
    pub role: Role,
    /// Format for outgoing palette broadcasts
    pub format: WireFormat,
    /// Palette broadcast interval (milliseconds, master only)
    pub broadcast_ms: u64,
    /// Seed for the confetti sequence; defaults to the node ID
    pub seed: Option<u64>,
}

/// Mesh transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSection {
    /// Mesh name; traffic from other meshes is ignored
    pub prefix: String,
    /// Local bind address
    pub bind: String,
    /// Broadcast destination
    pub broadcast: String,
    /// Hello beacon interval (milliseconds)
    pub hello_ms: u64,
    /// Silence after which a peer is dropped (milliseconds)
    pub peer_timeout_ms: u64,
}

/// LED strip and animation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedSection {
    /// Number of LEDs
    pub count: usize,
    /// Global brightness (0-255)
    pub brightness: u8,
    /// Animation frame rate
    pub frames_per_second: u64,
    /// Interval between confetti sparkles (milliseconds)
    pub confetti_ms: u64,
    /// Status pixel refresh interval (milliseconds)
    pub status_ms: u64,
    /// Pixel used as connectivity indicator; none disables it
    pub status_pixel: Option<usize>,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            id: 0,
            role: Role::Receiver,
            format: WireFormat::Envelope,
            broadcast_ms: 5000,
            seed: None,
        }
    }
}

impl Default for MeshSection {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_MESH_PREFIX.to_string(),
            bind: format!("0.0.0.0:{}", DEFAULT_MESH_PORT),
            broadcast: format!("255.255.255.255:{}", DEFAULT_MESH_PORT),
            hello_ms: 1000,
            peer_timeout_ms: 5000,
        }
    }
}

impl Default for LedSection {
    fn default() -> Self {
        Self {
            count: 16,
            brightness: 48,
            frames_per_second: synchro_node::FRAMES_PER_SECOND,
            confetti_ms: 200,
            status_ms: 500,
            status_pixel: Some(0),
        }
    }
}

impl NodeConfig {
    /// Load configuration from file and environment variables
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Self {
        let mut config = Self::from_file(config_path.as_ref());
        config.apply_environment_overrides(|key| std::env::var(key).ok());

        info!(
            "Final node configuration: node_id={}, role={}, mesh={}, bind={}, leds={}",
            config.node.id, config.node.role, config.mesh.prefix, config.mesh.bind, config.leds.count
        );

        config
    }

    fn from_file(config_path: &Path) -> Self {
        let content = match std::fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(_) => {
                warn!("Config file {:?} not found, using defaults", config_path);
                return Self::default();
            }
        };

        match serde_yaml::from_str::<NodeConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                config
            }
            Err(e) => {
                warn!("Failed to parse config file {:?}, using defaults: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Apply `SYNCHRO_*` overrides read through `var`
    pub fn apply_environment_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = var("SYNCHRO_NODE_ID").and_then(|v| v.parse::<NodeId>().ok()) {
            self.node.id = id;
            info!("Node ID overridden by environment: {}", id);
        }

        if let Some(role) = var("SYNCHRO_ROLE").and_then(|v| v.parse::<Role>().ok()) {
            self.node.role = role;
            info!("Role overridden by environment: {}", role);
        }

        if let Some(format) = var("SYNCHRO_FORMAT").and_then(|v| v.parse::<WireFormat>().ok()) {
            self.node.format = format;
            info!("Wire format overridden by environment: {:?}", format);
        }

        if let Some(prefix) = var("SYNCHRO_MESH_PREFIX") {
            info!("Mesh prefix overridden by environment: {}", prefix);
            self.mesh.prefix = prefix;
        }

        if let Some(bind) = var("SYNCHRO_BIND") {
            info!("Bind address overridden by environment: {}", bind);
            self.mesh.bind = bind;
        }

        if let Some(broadcast) = var("SYNCHRO_BROADCAST") {
            info!("Broadcast address overridden by environment: {}", broadcast);
            self.mesh.broadcast = broadcast;
        }

        if let Some(count) = var("SYNCHRO_NUM_LEDS").and_then(|v| v.parse::<usize>().ok()) {
            self.leds.count = count;
            info!("LED count overridden by environment: {}", count);
        }

        if let Some(brightness) = var("SYNCHRO_BRIGHTNESS").and_then(|v| v.parse::<u8>().ok()) {
            self.leds.brightness = brightness;
            info!("Brightness overridden by environment: {}", brightness);
        }
    }

    /// Node ID, deriving one from the process id when unset
    pub fn node_id(&self) -> NodeId {
        if self.node.id != 0 {
            self.node.id
        } else {
            std::process::id()
        }
    }

    /// Runtime settings for the node
    pub fn node_settings(&self) -> NodeSettings {
        let fps = self.leds.frames_per_second.max(1);
        NodeSettings {
            role: self.node.role,
            format: self.node.format,
            frame_interval: Duration::from_millis(1000 / fps),
            confetti_interval: Duration::from_millis(self.leds.confetti_ms),
            broadcast_interval: Duration::from_millis(self.node.broadcast_ms),
            status_interval: Duration::from_millis(self.leds.status_ms),
            status_pixel: self.leds.status_pixel,
            seed: self.node.seed.unwrap_or_else(|| u64::from(self.node_id())),
            ..NodeSettings::default()
        }
    }

    /// UDP transport settings
    pub fn udp_config(&self) -> Result<UdpMeshConfig> {
        let bind: SocketAddr = self
            .mesh
            .bind
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.mesh.bind))?;
        let broadcast: SocketAddr = self
            .mesh
            .broadcast
            .parse()
            .with_context(|| format!("invalid broadcast address '{}'", self.mesh.broadcast))?;

        Ok(UdpMeshConfig {
            node_id: self.node_id(),
            mesh_prefix: self.mesh.prefix.clone(),
            bind,
            broadcast,
            hello_interval: Duration::from_millis(self.mesh.hello_ms),
            peer_timeout: Duration::from_millis(self.mesh.peer_timeout_ms),
        })
    }
}
