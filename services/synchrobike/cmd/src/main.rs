//! Synchrobike node binary.
//!
//! Runs one LED node on a UDP broadcast mesh, or simulates a whole mesh of
//! nodes in-process with `--simulate <N>`.

use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use synchro_node::{Catalog, FrameBuffer, LedStrip, Node, Role};
use synchro_transport::{MeshTransport, UdpMesh};
use synchro_wire::WireFormat;
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod logging;
mod simulate;
mod terminal;

use config::NodeConfig;
use logging::SynchroLogFormatter;
use simulate::SimulationConfig;
use terminal::TerminalStrip;

/// Mesh-synchronized confetti LED node
#[derive(Parser, Debug)]
#[command(name = "synchrobike", version, about = "Mesh-synchronized confetti LED node")]
struct Args {
    /// Configuration file path
    #[arg(long, default_value = "synchrobike.yaml")]
    config: PathBuf,

    /// Node ID (0 derives one from the process id)
    #[arg(long)]
    node_id: Option<u32>,

    /// Role: master or receiver
    #[arg(long)]
    role: Option<Role>,

    /// Broadcast format for the master: envelope or flat
    #[arg(long)]
    format: Option<WireFormat>,

    /// Local bind address, e.g. 0.0.0.0:5555
    #[arg(long)]
    bind: Option<String>,

    /// Broadcast destination, e.g. 192.168.1.255:5555
    #[arg(long)]
    broadcast: Option<String>,

    /// Number of LEDs
    #[arg(long)]
    leds: Option<usize>,

    /// Global brightness (0-255)
    #[arg(long)]
    brightness: Option<u8>,

    /// Palette broadcast interval, e.g. 5s
    #[arg(long)]
    broadcast_interval: Option<humantime::Duration>,

    /// Seed for the confetti sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Render the LED strip to the terminal
    #[arg(long)]
    render: bool,

    /// Simulate a mesh of N nodes in-process instead of joining the network
    #[arg(long, value_name = "N")]
    simulate: Option<usize>,

    /// Stop after this long (virtual time when simulating, default 30s there)
    #[arg(long)]
    duration: Option<humantime::Duration>,

    /// Control loop poll interval
    #[arg(long, default_value = "5ms")]
    poll_interval: humantime::Duration,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Command line flags take precedence over file and environment
    fn apply(&self, config: &mut NodeConfig) {
        if let Some(id) = self.node_id {
            config.node.id = id;
        }
        if let Some(role) = self.role {
            config.node.role = role;
        }
        if let Some(format) = self.format {
            config.node.format = format;
        }
        if let Some(bind) = &self.bind {
            config.mesh.bind = bind.clone();
        }
        if let Some(broadcast) = &self.broadcast {
            config.mesh.broadcast = broadcast.clone();
        }
        if let Some(leds) = self.leds {
            config.leds.count = leds;
        }
        if let Some(brightness) = self.brightness {
            config.leds.brightness = brightness;
        }
        if let Some(interval) = self.broadcast_interval {
            config.node.broadcast_ms = Duration::from(interval).as_millis() as u64;
        }
        if let Some(seed) = self.seed {
            config.node.seed = Some(seed);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::new("warn")
        .add_directive(format!("synchrobike={}", args.log_level).parse()?)
        .add_directive(format!("synchro_node={}", args.log_level).parse()?)
        .add_directive(format!("synchro_transport={}", args.log_level).parse()?)
        .add_directive(format!("synchro_wire={}", args.log_level).parse()?);

    let formatter = SynchroLogFormatter::new("synchrobike");

    // Logs go to stderr so the rendered strip owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .event_format(formatter)
        .init();

    info!("Starting synchrobike v{}", env!("CARGO_PKG_VERSION"));

    let mut config = NodeConfig::load_from_file(&args.config);
    args.apply(&mut config);

    let result = match args.simulate {
        Some(nodes) => run_simulation(&config, nodes, args.duration.map(Duration::from)),
        None => run_node(&config, &args).await,
    };

    if let Err(e) = &result {
        component_error!("node", "Stopped: {:#}", e);
    }
    result
}

async fn run_node(config: &NodeConfig, args: &Args) -> anyhow::Result<()> {
    let udp_config = config.udp_config()?;
    let node_id = udp_config.node_id;
    let mut transport = UdpMesh::bind(udp_config).await?;

    let settings = config.node_settings();
    let mut node = Node::new(node_id, &settings, Catalog::builtin(), Instant::now());

    let mut strip: Box<dyn LedStrip> = if args.render {
        component_debug!("node", "Rendering {} LEDs to the terminal", config.leds.count);
        Box::new(TerminalStrip::new(
            config.leds.count,
            config.leds.brightness,
            std::io::stdout(),
        ))
    } else {
        Box::new(FrameBuffer::new(config.leds.count))
    };
    node.check_strip(strip.pixels().len())?;

    let mut tick = tokio::time::interval(Duration::from(args.poll_interval));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let deadline = args.duration.map(|d| tokio::time::Instant::now() + Duration::from(d));
    let stop = async move {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(stop);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    component_info!("node", "Node {} running as {}", node_id, node.role());

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                component_info!("node", "Received Ctrl+C, shutting down");
                break;
            }

            _ = &mut stop => {
                component_info!("node", "Run duration elapsed, shutting down");
                break;
            }

            ready = transport.readable() => {
                if let Err(e) = ready {
                    component_warn!("mesh", "Socket readiness failed: {}", e);
                }
            }

            _ = tick.tick() => {}
        }

        node.step(&mut transport, strip.as_mut(), Instant::now())?;
    }

    if args.render {
        println!();
    }

    let stats = node.state().stats();
    component_info!(
        "node",
        "Received {} messages: {} adopted, {} rejected, {} foreign, {} ignored; {} peers at exit",
        stats.received,
        stats.adopted,
        stats.rejected,
        stats.foreign,
        stats.ignored,
        transport.peer_count()
    );

    Ok(())
}

fn run_simulation(
    config: &NodeConfig,
    nodes: usize,
    duration: Option<Duration>,
) -> anyhow::Result<()> {
    anyhow::ensure!(nodes >= 1, "simulation needs at least one node");

    let duration = duration.unwrap_or(Duration::from_secs(30));
    let catalog = Catalog::builtin();
    let sim = SimulationConfig {
        nodes,
        duration,
        tick: Duration::from_millis(5),
        leds: config.leds.count,
        settings: config.node_settings(),
    };

    component_info!(
        "simulate",
        "Simulating {} nodes for {} of virtual time",
        nodes,
        humantime::format_duration(duration)
    );

    let report = simulate::run(&sim, &catalog)?;
    for node in &report.nodes {
        component_info!(
            "simulate",
            "node {} ({}): palette={} adopted={} rejected={} lit={}",
            node.id,
            node.role,
            node.palette.unwrap_or(if node.acquired { "custom" } else { "none" }),
            node.stats.adopted,
            node.stats.rejected,
            node.lit
        );
    }

    if report.converged() {
        component_info!("simulate", "All {} nodes converged", report.nodes.len());
    } else {
        component_warn!("simulate", "Nodes did not converge");
    }

    Ok(())
}
