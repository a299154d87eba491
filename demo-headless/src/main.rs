use anyhow::{bail, Context, Result};
use clap::Parser;
use firecast_core::{
    Frame, KeywordExtractor, ParameterExtractor, ParameterOverrides, QualityPreset, Simulation,
    SimulationConfig, SimulationParameters, SimulationRunner,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Wildfire spread simulation with configurable conditions
#[derive(Parser, Debug)]
#[command(name = "firecast-headless")]
#[command(about = "Stochastic grid wildfire-spread simulation", long_about = None)]
struct Args {
    /// Air temperature in °F
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Relative humidity in %
    #[arg(long)]
    humidity: Option<f64>,

    /// Fuel moisture in %
    #[arg(long)]
    moisture: Option<f64>,

    /// Wind speed in mph
    #[arg(short, long)]
    wind_speed: Option<f64>,

    /// Compass point the wind blows from (N, NE, E, SE, S, SW, W, NW)
    #[arg(long)]
    wind_direction: Option<String>,

    /// Terrain slope in degrees (0-45 nominal)
    #[arg(short, long)]
    slope: Option<f64>,

    /// Simulated hours
    #[arg(short, long)]
    duration: Option<i64>,

    /// Latitude of the ignition point
    #[arg(long, allow_hyphen_values = true)]
    origin_lat: Option<f64>,

    /// Longitude of the ignition point
    #[arg(long, allow_hyphen_values = true)]
    origin_lon: Option<f64>,

    /// JSON file with a full parameter set (flags override it)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Free-text request, e.g. "bone dry northeasterly gale for 12 hours"
    #[arg(long)]
    prompt: Option<String>,

    /// Fixed random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Export every burning cell instead of a random 30%
    #[arg(long)]
    full_field: bool,

    /// Active-front cap (draft, standard, detailed, exhaustive)
    #[arg(short, long, default_value = "standard")]
    quality: String,

    /// Run this many seeds in parallel and print per-seed summaries
    #[arg(short, long, default_value_t = 0)]
    ensemble: u64,

    /// Emit frames as a GeoJSON feature collection
    #[arg(long)]
    geojson: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn flag_overrides(&self) -> ParameterOverrides {
        ParameterOverrides {
            temperature: self.temperature,
            humidity: self.humidity,
            moisture: self.moisture,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction.clone(),
            slope: self.slope,
            duration: self.duration,
            origin_latitude: self.origin_lat,
            origin_longitude: self.origin_lon,
        }
    }
}

/// Defaults, then the params file, then the prompt, then explicit flags.
fn resolve_parameters(args: &Args) -> Result<SimulationParameters> {
    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading parameters from {}", path.display()))?;
            SimulationParameters::from_json(&text)
                .with_context(|| format!("parsing parameters in {}", path.display()))?
        }
        None => SimulationParameters::default(),
    };

    if let Some(prompt) = &args.prompt {
        match KeywordExtractor.extract(prompt) {
            Ok(overrides) => {
                info!("Prompt overrides: {:?}", overrides);
                params = overrides.apply_to(params);
            }
            Err(e) => warn!("Ignoring prompt: {}", e),
        }
    }

    Ok(args.flag_overrides().apply_to(params))
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let Some(quality) = QualityPreset::from_name(&args.quality) else {
        bail!(
            "unknown quality preset '{}' (expected draft, standard, detailed or exhaustive)",
            args.quality
        );
    };
    let mut config = SimulationConfig::default().with_quality(quality);
    config.seed = args.seed;
    if args.full_field {
        config = config.without_downsampling();
    }
    Ok(config)
}

fn run_single(params: &SimulationParameters, config: &SimulationConfig, geojson: bool) -> Result<Value> {
    let mut sim = Simulation::new(params, config)?;
    let steps_per_hour = config.steps_per_hour;
    let threshold = config.spread.active_threshold;

    while sim.step().is_some() {
        let step = sim.steps_completed();
        if step % steps_per_hour == 0 {
            let field = sim.field();
            let centroid = field
                .burn_centroid(threshold)
                .map_or_else(|| "none".to_string(), |(r, c)| format!("({r:.1}, {c:.1})"));
            info!(
                "Hour {:3}: {:5} cells burning, {:5} points exported, centroid {}",
                step / steps_per_hour,
                field.burned_area(threshold),
                sim.history().frames().last().map_or(0, Frame::len),
                centroid
            );
        }
    }

    let outcome = sim.finish();
    let peak = outcome.history.peak_frame();
    info!(
        "Run complete: {} frames, {} points total, busiest frame {:?}",
        outcome.history.len(),
        outcome.history.total_points(),
        peak
    );

    if geojson {
        Ok(outcome.history.to_geojson())
    } else {
        Ok(serde_json::to_value(&outcome.history)?)
    }
}

fn run_ensemble(params: &SimulationParameters, config: &SimulationConfig, runs: u64) -> Result<Value> {
    let base = config.seed.unwrap_or(0);
    let seeds: Vec<u64> = (0..runs).map(|i| base.wrapping_add(i)).collect();
    let threshold = config.spread.active_threshold;
    let runner = SimulationRunner::new(config.clone());

    let mut summaries = Vec::with_capacity(seeds.len());
    for (seed, result) in seeds.iter().zip(runner.run_ensemble(params, &seeds)) {
        let outcome = result.with_context(|| format!("ensemble run with seed {seed}"))?;
        let centroid = outcome.final_field.burn_centroid(threshold);
        summaries.push(json!({
            "seed": seed,
            "summary": outcome.summary,
            "finalCentroid": centroid.map(|(row, col)| json!({ "row": row, "col": col })),
        }));
    }
    Ok(Value::Array(summaries))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = resolve_parameters(&args)?;
    let config = build_config(&args)?;

    info!(
        "Conditions: {:.0}°F, {:.0}% humidity, {:.0}% fuel moisture, wind {} at {:.0} mph, slope {:.0}°, {} h at ({:.4}, {:.4})",
        params.temperature,
        params.humidity,
        params.moisture,
        params.wind_direction,
        params.wind_speed,
        params.slope,
        params.duration,
        params.origin_latitude,
        params.origin_longitude
    );

    let output = if args.ensemble > 0 {
        run_ensemble(&params, &config, args.ensemble)?
    } else {
        run_single(&params, &config, args.geojson)?
    };

    let text = serde_json::to_string(&output)?;
    match &args.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
