use std::path::{Path, PathBuf};

use aerocorner::{
    AeroConfig, AeroCornerError, AeroForceModel, AirDensity, CornerAnalyzer, EngineConfig,
    PhysicsResult, TelemetryOverride, batch, track::load_track_profile,
};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::{error, info, warn};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse one team's car on a track
    Analyze {
        #[arg(long)]
        team: String,

        /// Track profile JSON file
        #[arg(long)]
        track: PathBuf,

        /// Aerodynamic configuration JSON file
        #[arg(long)]
        car: PathBuf,

        /// Measured apex speeds, per regime object or array of samples
        #[arg(long)]
        telemetry: Option<PathBuf>,

        /// Engine configuration, defaults to the user config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the snapshot here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyse every team in a JSON lines file on the same track
    Batch {
        #[arg(long)]
        track: PathBuf,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Aerodynamic forces for a car at one speed
    Physics {
        #[arg(long)]
        car: PathBuf,

        /// Speed in km/h
        #[arg(short, long)]
        speed: f64,

        /// Altitude above sea level in meters
        #[arg(short, long, default_value_t = 0.0)]
        altitude: f64,

        #[arg(long)]
        drs: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the engine configuration, or write the defaults to the user config file
    Config {
        #[arg(short, long)]
        write: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, AeroCornerError> {
    match path {
        Some(path) => EngineConfig::from_file(path),
        None => match EngineConfig::from_local_file() {
            Ok(config) => Ok(config.unwrap_or_default()),
            Err(e) => {
                warn!("Ignoring user engine config: {e}");
                Ok(EngineConfig::default())
            }
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AeroCornerError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| AeroCornerError::OutputFileError {
        source: std::io::Error::other(e),
    })?;
    println!("{json}");
    Ok(())
}

fn analyze(
    team: &str,
    track: &Path,
    car: &Path,
    telemetry: Option<&Path>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), AeroCornerError> {
    let analyzer = CornerAnalyzer::new(load_config(config)?)?;
    let track = load_track_profile(track)?;
    let aero: AeroConfig = batch::read_json(car)?;
    let measured = telemetry.map(TelemetryOverride::from_file).transpose()?;

    let snapshot = analyzer.compute_snapshot(team, &track, &aero, measured.as_ref())?;
    match output {
        Some(path) => {
            batch::write_snapshot(path, &snapshot)?;
            info!("Snapshot for {team} written to {:?}", path);
            Ok(())
        }
        None => print_json(&snapshot),
    }
}

fn run_batch(
    track: &Path,
    input: &Path,
    output: &Path,
    config: Option<&Path>,
) -> Result<(), AeroCornerError> {
    let analyzer = CornerAnalyzer::new(load_config(config)?)?;
    let track = load_track_profile(track)?;
    let entries = batch::read_team_entries(input)?;

    let snapshots = analyzer.compute_batch(&track, &entries)?;
    for snapshot in &snapshots {
        info!(
            "{}: {}",
            snapshot.team,
            snapshot
                .corner_performance
                .iter()
                .map(|p| format!(
                    "{} {:.1} km/h ({})",
                    p.regime, p.apex_speed_kmh, p.performance_level
                ))
                .join(", ")
        );
    }
    batch::write_snapshots(output, &snapshots)
}

fn physics_result(
    aero: AeroConfig,
    speed_kmh: f64,
    altitude_m: f64,
    drs: bool,
    config: &EngineConfig,
) -> Result<PhysicsResult, AeroCornerError> {
    let density = AirDensity::at_altitude(altitude_m, &config.physics)?;
    let model = AeroForceModel::with_constants(aero, density, config.physics)?;

    let result = model.compute_kmh(speed_kmh)?;
    Ok(if drs { result.with_drs() } else { result })
}

fn physics(
    car: &Path,
    speed_kmh: f64,
    altitude_m: f64,
    drs: bool,
    config: Option<&Path>,
) -> Result<(), AeroCornerError> {
    let config = load_config(config)?;
    let aero: AeroConfig = batch::read_json(car)?;

    let result = physics_result(aero, speed_kmh, altitude_m, drs, &config)?;
    let risk = result.porpoising_risk();
    if risk.score > 0.6 {
        warn!("Porpoising risk {:?} ({:.2}): {}", risk.level, risk.score, risk.advisory);
    }
    print_json(&result)
}

fn show_config(write: bool) -> Result<(), AeroCornerError> {
    if write {
        let path = EngineConfig::default().save()?;
        info!("Default engine config written to {:?}", path);
        return Ok(());
    }
    print_json(&load_config(None)?)
}

fn main() {
    colog::init();

    let cli = Args::parse();
    let result = match &cli.command {
        Commands::Analyze {
            team,
            track,
            car,
            telemetry,
            config,
            output,
        } => analyze(
            team,
            track,
            car,
            telemetry.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
        Commands::Batch {
            track,
            input,
            output,
            config,
        } => run_batch(track, input, output, config.as_deref()),
        Commands::Physics {
            car,
            speed,
            altitude,
            drs,
            config,
        } => physics(car, *speed, *altitude, *drs, config.as_deref()),
        Commands::Config { write } => show_config(*write),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
