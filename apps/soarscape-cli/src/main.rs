use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use soarscape_kernel::{ManualTime, SystemTime, TimeSource};
use soarscape_render::Canvas;
use soarscape_sim::{Scenario, SimConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soarscape", about = "Glider soaring simulation with a software 3D renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the cloud placement seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective config as YAML and exit
    #[arg(long)]
    dump_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the simulation and print where every glider ended up
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Pace ticks against the wall clock instead of running flat out
        #[arg(long)]
        realtime: bool,
        /// Print statuses as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate, then render one frame to an image file
    Frame {
        /// Ticks to simulate before rendering
        #[arg(short, long, default_value = "30")]
        ticks: u64,
        /// Output image path; the extension picks the format (png, ppm)
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;
    if cli.dump_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Info) {
        Commands::Info => {
            println!("soarscape v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", soarscape_common::crate_info());
            println!("render: {}", soarscape_render::crate_info());
            println!("kernel: {}", soarscape_kernel::crate_info());
            println!("input: {}", soarscape_input::crate_info());
            println!("sim: {}", soarscape_sim::crate_info());
            println!(
                "config: seed={} tick={}ms dt={}s gliders={} ridges={}",
                config.seed,
                config.tick_period_ms,
                config.sim_dt,
                config.gliders.count,
                config.ridges.len()
            );
        }
        Commands::Run {
            ticks,
            realtime,
            json,
        } => {
            let time: Box<dyn TimeSource> = if realtime {
                Box::new(SystemTime::new())
            } else {
                Box::new(ManualTime::new())
            };
            let mut scenario = Scenario::with_time_source(config, time)?;
            let stats = scenario.run(Some(ticks), |sim| {
                if sim.ticks() > 0 && sim.ticks() % 100 == 0 {
                    tracing::info!(t = sim.sim_time(), clouds = sim.clouds().len(), "progress");
                }
            })?;

            let statuses = scenario.sim().statuses();
            if json {
                println!("{}", soarscape_sim::status::to_json(&statuses)?);
            } else {
                println!("after {} ({:.0}s simulated)", stats, scenario.sim().sim_time());
                for status in &statuses {
                    println!("{status}");
                }
            }
        }
        Commands::Frame { ticks, out } => {
            let (width, height) = (config.camera.width as usize, config.camera.height as usize);
            let mut scenario = Scenario::with_time_source(config, Box::new(ManualTime::new()))?;
            for _ in 0..ticks {
                scenario.step();
            }

            let mut canvas = Canvas::new(width, height);
            canvas.clear(scenario.sim().camera().background());
            let stats = scenario.sim_mut().render(&mut canvas);

            canvas
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!(
                "wrote {} ({width}x{height}): layers={} objects={} in_view={}",
                out.display(),
                stats.layers,
                stats.objects,
                stats.objects_in_view
            );
        }
    }

    Ok(())
}
