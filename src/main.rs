//! Pupil tracking over a sequence of still frames with precomputed landmarks.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use pupil_tracking::{Config, Eye, EyeMode, LandmarkSet, PupilEngine, PupilEstimate, TrackingState};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Frames to process, in order
    #[arg(short, long, num_args = 1.., required_unless_present = "write_config")]
    images: Vec<PathBuf>,

    /// YAML landmark file: one list of [x, y] points per frame
    #[arg(short, long, required_unless_present = "write_config")]
    landmarks: Option<PathBuf>,

    /// Eyes to track (left, right, both)
    #[arg(short, long, default_value = "both")]
    eye: EyeMode,

    /// Temporal filter model (overrides the configuration)
    #[arg(short, long)]
    filter: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this path
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Per-frame output document
#[derive(Serialize)]
struct FrameReport {
    frame: usize,
    image: String,
    estimates: BTreeMap<Eye, PupilEstimate>,
    states: BTreeMap<Eye, TrackingState>,
}

fn load_landmarks(path: &Path, frame_count: usize) -> Result<Vec<LandmarkSet>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read landmarks from {}", path.display()))?;
    let sets: Vec<LandmarkSet> =
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse landmarks in {}", path.display()))?;

    match sets.len() {
        0 => bail!("Landmark file {} contains no frames", path.display()),
        // A single set applies to every frame
        1 => Ok(vec![sets[0].clone(); frame_count]),
        n if n == frame_count => Ok(sets),
        n => bail!("Landmark file has {n} frames but {frame_count} images were given"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(model) = &args.filter {
        config.filter.model.clone_from(model);
    }

    if let Some(path) = &args.write_config {
        config.validate()?;
        config.to_file(path)?;
        info!("Configuration written to {}", path.display());
        if args.images.is_empty() {
            return Ok(());
        }
    }

    let Some(landmark_path) = &args.landmarks else {
        bail!("--landmarks is required when processing images");
    };
    let landmark_sets = load_landmarks(landmark_path, args.images.len())?;
    let mut engine = PupilEngine::new(config)?;
    info!("Processing {} frames ({} eye mode)", args.images.len(), args.eye);

    for (index, (path, landmarks)) in args.images.iter().zip(&landmark_sets).enumerate() {
        let frame = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };

        let estimates = engine.detect(&frame, landmarks, args.eye);
        let states = args.eye.eyes().iter().map(|&eye| (eye, engine.tracking_state(eye))).collect();
        let report = FrameReport { frame: index, image: path.display().to_string(), estimates, states };
        print!("---\n{}", serde_yaml::to_string(&report)?);
    }

    Ok(())
}
