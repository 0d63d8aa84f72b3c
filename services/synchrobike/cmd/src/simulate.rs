//! In-process mesh simulation on a virtual clock.
//!
//! Node 1 is the master; every other node is a receiver. All nodes share a
//! [`LoopbackHub`] and are stepped in id order on each tick.

use std::time::{Duration, Instant};
use synchro_node::{
    Catalog, FrameBuffer, LedStrip, Node, NodeSettings, ReceiveStats, Role,
};
use synchro_transport::{LoopbackHub, LoopbackMesh, NodeId};

/// Node id of the simulated master
pub const MASTER_ID: NodeId = 1;

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of nodes including the master
    pub nodes: usize,
    /// Virtual time to simulate
    pub duration: Duration,
    /// Virtual time between steps
    pub tick: Duration,
    /// LEDs per node
    pub leds: usize,
    /// Settings shared by all nodes; the role is assigned per node
    pub settings: NodeSettings,
}

/// Final state of one simulated node
#[derive(Debug, Clone)]
pub struct NodeReport {
    /// Node id
    pub id: NodeId,
    /// Role
    pub role: Role,
    /// Catalog name of the active palette, if it is a catalog palette
    pub palette: Option<&'static str>,
    /// Whether a palette was ever acquired
    pub acquired: bool,
    /// Receive counters
    pub stats: ReceiveStats,
    /// Pixels currently lit
    pub lit: usize,
}

/// Outcome of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Per-node state, in id order
    pub nodes: Vec<NodeReport>,
}

impl SimulationReport {
    /// True when every node shows the same acquired palette
    pub fn converged(&self) -> bool {
        match self.nodes.first() {
            Some(first) => self
                .nodes
                .iter()
                .all(|node| node.acquired && node.palette == first.palette),
            None => true,
        }
    }
}

struct SimNode {
    node: Node,
    mesh: LoopbackMesh,
    strip: FrameBuffer,
}

/// Run the simulation to completion
pub fn run(config: &SimulationConfig, catalog: &Catalog) -> anyhow::Result<SimulationReport> {
    let hub = LoopbackHub::new();
    let start = Instant::now();

    let mut nodes: Vec<SimNode> = (1..=config.nodes as NodeId)
        .map(|id| {
            let role = if id == MASTER_ID {
                Role::Master
            } else {
                Role::Receiver
            };
            let settings = NodeSettings {
                role,
                seed: config.settings.seed.wrapping_add(u64::from(id)),
                ..config.settings.clone()
            };
            SimNode {
                node: Node::new(id, &settings, catalog.clone(), start),
                mesh: hub.join(id),
                strip: FrameBuffer::new(config.leds),
            }
        })
        .collect();

    for sim in &nodes {
        sim.node.check_strip(config.leds)?;
    }

    let tick = config.tick.max(Duration::from_millis(1));
    let end = start + config.duration;
    let mut now = start;
    while now <= end {
        for sim in nodes.iter_mut() {
            sim.node.step(&mut sim.mesh, &mut sim.strip, now)?;
        }
        now += tick;
    }

    let reports = nodes
        .iter()
        .map(|sim| {
            let state = sim.node.state();
            NodeReport {
                id: sim.node.id(),
                role: sim.node.role(),
                palette: catalog.identify(state.palette()),
                acquired: state.is_acquired(),
                stats: *state.stats(),
                lit: sim
                    .strip
                    .pixels()
                    .iter()
                    .filter(|p| p.r > 0 || p.g > 0 || p.b > 0)
                    .count(),
            }
        })
        .collect();

    Ok(SimulationReport { nodes: reports })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(nodes: usize, duration: Duration) -> SimulationConfig {
        SimulationConfig {
            nodes,
            duration,
            tick: Duration::from_millis(5),
            leds: 16,
            settings: NodeSettings::default(),
        }
    }

    #[test]
    fn test_receivers_converge_on_master_palette() {
        let catalog = Catalog::builtin();
        let report = run(&config(6, Duration::from_secs(11)), &catalog).unwrap();

        assert_eq!(report.nodes.len(), 6);
        assert_eq!(report.nodes[0].role, Role::Master);
        assert_eq!(report.nodes[0].palette, Some(catalog.get(2).unwrap().name));
        assert!(report.converged());
        for node in &report.nodes[1..] {
            assert_eq!(node.stats.adopted, 2);
            assert!(node.lit > 0);
        }
    }

    #[test]
    fn test_receivers_idle_before_first_broadcast() {
        let catalog = Catalog::builtin();
        let report = run(&config(3, Duration::from_secs(4)), &catalog).unwrap();

        assert!(!report.converged());
        assert!(report.nodes[0].acquired);
        for node in &report.nodes[1..] {
            assert!(!node.acquired);
            // Only the status pixel is lit
            assert_eq!(node.lit, 1);
        }
    }

    #[test]
    fn test_status_pixel_outside_strip() {
        let mut config = config(2, Duration::from_secs(1));
        config.leds = 0;
        assert!(run(&config, &Catalog::builtin()).is_err());
    }
}
