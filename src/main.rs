//! Brinesim CLI - anti-icing spray design evaluation.
//!
//! Run the probabilistic decision pipeline or the rule-based judgment against
//! serialized project files, using the built-in regional climate presets.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use brinesim::climate;
use brinesim::domain::{PhysicsAsset, SimulationInput, SimulationType};
use brinesim::project::SimulationProject;
use brinesim::simulation::{run_decision, run_rule_judgment};
use brinesim::site::{self, EnvironmentContext, Season, TimeOfDay, TrafficLevel};

/// Anti-icing brine-spray design evaluation.
#[derive(Parser)]
#[command(name = "brinesim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Monte Carlo decision pipeline over a physics asset file.
    Decide {
        /// JSON file containing the asset list.
        #[arg(short, long)]
        assets: PathBuf,

        /// Climate preset key (see `presets`).
        #[arg(short, long, default_value = climate::DEFAULT_PRESET)]
        preset: String,

        /// Physics engine selection.
        #[arg(long, value_enum, default_value = "salt-spray")]
        sim_type: SimKind,

        /// Monte Carlo sample count.
        #[arg(short = 'n', long, default_value = "1000")]
        samples: usize,

        /// Random seed for reproducible runs.
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Mean safety-factor target for a PASS.
        #[arg(short, long, default_value = "1.5")]
        target: f64,
    },

    /// Run the deterministic failure-first judgment over a project file.
    Judge {
        /// JSON file containing the neutral project model.
        #[arg(short, long)]
        project: PathBuf,

        /// Site climate preset key (see `presets`).
        #[arg(short = 'c', long, default_value = site::DEFAULT_SITE_PRESET)]
        site_preset: String,

        /// Coverage grid resolution in meters.
        #[arg(short, long, default_value = "1.0")]
        resolution: f64,
    },

    /// List the registered climate presets.
    Presets,
}

#[derive(Clone, Copy, ValueEnum)]
enum SimKind {
    /// Grid-based spray coverage.
    SaltSpray,
    /// Road surface temperature and icing margin.
    Thermal,
    /// Trajectory-based spray coverage.
    Fluid,
}

impl From<SimKind> for SimulationType {
    fn from(kind: SimKind) -> Self {
        match kind {
            SimKind::SaltSpray => SimulationType::SaltSpray,
            SimKind::Thermal => SimulationType::Thermal,
            SimKind::Fluid => SimulationType::Fluid,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Decide { assets, preset, sim_type, samples, seed, target } => {
            run_decide(assets, preset, sim_type, samples, seed, target);
        }
        Commands::Judge { project, site_preset, resolution } => {
            run_judge(project, site_preset, resolution);
        }
        Commands::Presets => run_presets(),
    }
}

fn read_file(path: &PathBuf) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn run_decide(
    assets_path: PathBuf,
    preset: String,
    sim_type: SimKind,
    samples: usize,
    seed: u64,
    target: f64,
) {
    if samples == 0 {
        eprintln!("Error: sample count must be at least 1");
        std::process::exit(1);
    }
    if target <= 0.0 {
        eprintln!("Error: safety factor target must be positive");
        std::process::exit(1);
    }

    let assets: Vec<PhysicsAsset> =
        serde_json::from_str(&read_file(&assets_path)).unwrap_or_else(|e| {
            eprintln!("Error parsing asset file: {}", e);
            std::process::exit(1);
        });

    let climate_preset = climate::get_preset_or_default(&preset);
    println!("Brinesim - Decision Pipeline");
    println!("============================");
    println!("Assets: {} ({} entries)", assets_path.display(), assets.len());
    println!("Climate: {} [{}]", climate_preset.name, climate_preset.region);
    println!("Samples: {}  Seed: {}  Target SF: {}", samples, seed, target);

    let input = SimulationInput {
        project_id: assets_path.display().to_string(),
        simulation_type: sim_type.into(),
        assets,
        environment: climate_preset.conditions,
        safety_factor_target: target,
        monte_carlo_n: samples,
        seed,
        calibration_params: None,
    };

    let start = Instant::now();
    let decision = run_decision(&input).unwrap_or_else(|e| {
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    });
    println!("Completed in {:.2?}\n", start.elapsed());

    match serde_json::to_string_pretty(&decision) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing decision: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_judge(project_path: PathBuf, site_preset: String, resolution: f64) {
    if resolution <= 0.0 {
        eprintln!("Error: resolution must be positive");
        std::process::exit(1);
    }

    let project = SimulationProject::from_json(&read_file(&project_path)).unwrap_or_else(|e| {
        eprintln!("Error parsing project file: {}", e);
        std::process::exit(1);
    });

    let climate = site::site_preset_or_default(&site_preset);
    let elevation = project.road_segments.first().map(|r| r.elevation_m).unwrap_or(0.0);
    let env = EnvironmentContext {
        location_name: if project.location_name.is_empty() {
            "Unknown".into()
        } else {
            project.location_name.clone()
        },
        latitude: project.latitude,
        longitude: project.longitude,
        elevation_m: elevation,
        season: Season::Winter,
        time_of_day: TimeOfDay::Night,
        climate,
        traffic_level: TrafficLevel::Low,
        is_shaded: false,
        is_wind_exposed: true,
    };

    println!("Brinesim - Rule Judgment");
    println!("========================");
    println!("Project: {} ({})", project.project_name, project.project_id);
    println!(
        "Roads: {}  Devices: {}  Utilities: {}",
        project.road_segments.len(),
        project.spray_devices.len(),
        project.underground_utilities.len()
    );

    let (sim, judgment) = run_rule_judgment(&project, &env, resolution).unwrap_or_else(|e| {
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    });

    println!("Coverage: {:.1}%  Uncovered zones: {}", sim.coverage_ratio * 100.0, sim.uncovered_zones.len());
    println!();

    let report = serde_json::json!({
        "simulation": {
            "total_road_area_m2": sim.total_road_area_m2,
            "covered_area_m2": sim.covered_area_m2,
            "coverage_ratio": sim.coverage_ratio,
            "uncovered_zones": sim.uncovered_zones,
            "overlap_area_m2": sim.overlap_area_m2,
            "total_brine_consumption_lph": sim.total_brine_consumption_lph,
        },
        "judgment": judgment,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing judgment: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_presets() {
    println!("Decision-pipeline climate presets:");
    for key in climate::list_presets() {
        // Lookup cannot fail for a listed key.
        if let Some(p) = climate::get_preset(key) {
            println!(
                "  {:<28} {:>6.1} °C  wind {:>4.1} m/s  [{}]",
                key, p.conditions.temperature, p.conditions.wind_speed, p.region
            );
        }
    }
    println!();
    println!("Site presets (rule judgment):");
    for (key, c) in site::KOREA_CLIMATE_PRESETS.iter() {
        println!(
            "  {:<28} air {:>6.1} °C  surface {:>6.1} °C",
            key, c.air_temperature_c, c.road_surface_temperature_c
        );
    }
}
