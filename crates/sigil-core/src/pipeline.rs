//! One-shot generation pipeline: seeds -> mesh -> raster -> post-process ->
//! three image files. Every failure is fatal; there are no retries, and a
//! late failure may leave earlier output files already written.

use crate::config::{ConfigError, LogoConfig};
use crate::geometry::Circle;
use crate::mesh::PolyMesh;
use crate::post::{self, ResampleError};
use crate::render;
use crate::seeding::{self, PlacementError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{error::Error, fmt};

pub const LOGO_FILENAME: &str = "logo.png";
pub const PADDED_PREFIX: &str = "pad_";
pub const FAVICON_FILENAME: &str = "favicon.ico";

#[derive(Debug)]
pub enum GenerateError {
    Config(ConfigError),
    Placement(PlacementError),
    Resample(ResampleError),
    Encode(image::ImageError),
    Io(std::io::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Config(e) => write!(f, "{e}"),
            GenerateError::Placement(e) => write!(f, "{e}"),
            GenerateError::Resample(e) => write!(f, "{e}"),
            GenerateError::Encode(e) => write!(f, "image encoding failed: {e}"),
            GenerateError::Io(e) => write!(f, "output write failed: {e}"),
        }
    }
}

impl Error for GenerateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerateError::Config(e) => Some(e),
            GenerateError::Placement(e) => Some(e),
            GenerateError::Resample(e) => Some(e),
            GenerateError::Encode(e) => Some(e),
            GenerateError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(err: ConfigError) -> Self {
        GenerateError::Config(err)
    }
}

impl From<PlacementError> for GenerateError {
    fn from(err: PlacementError) -> Self {
        GenerateError::Placement(err)
    }
}

impl From<ResampleError> for GenerateError {
    fn from(err: ResampleError) -> Self {
        GenerateError::Resample(err)
    }
}

impl From<image::ImageError> for GenerateError {
    fn from(err: image::ImageError) -> Self {
        GenerateError::Encode(err)
    }
}

impl From<std::io::Error> for GenerateError {
    fn from(err: std::io::Error) -> Self {
        GenerateError::Io(err)
    }
}

/// Wall-clock micros spent in each stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageTimings {
    pub seeding_us: u64,
    pub meshing_us: u64,
    pub render_us: u64,
    pub post_us: u64,
    pub total_us: u64,
}

fn default_schema_version() -> u32 {
    1
}

/// What one run produced, serializable for tooling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed_count: usize,
    pub point_count: usize,
    pub facet_count: usize,
    pub interior_facet_count: usize,
    pub spike_count: usize,
    pub foreground_pixels: usize,
    pub logo_path: PathBuf,
    pub padded_path: PathBuf,
    pub favicon_path: PathBuf,
    pub timings: StageTimings,
}

/// Run the whole pipeline and write `logo.png`, `pad_logo.png`, and
/// `favicon.ico` under `out_dir` (created if missing).
pub fn generate(config: &LogoConfig, out_dir: &Path) -> Result<RunSummary, GenerateError> {
    let total_start = Instant::now();
    config.validate()?;
    let domain = Circle::unit();

    let t0 = Instant::now();
    let radii = seeding::sample_radii(config.n_seeds, config.size_seed, config.seed_radius_max);
    let seeds = seeding::place_seeds(&radii, &domain, config.position_seed)?;
    let seeding_us = t0.elapsed().as_micros() as u64;
    info!("placed {} seeds", seeds.len());

    let t1 = Instant::now();
    let mesh = PolyMesh::from_seeds(&seeds, &domain);
    let spikes = render::boundary_spikes(&mesh, &domain);
    let meshing_us = t1.elapsed().as_micros() as u64;
    debug!(
        "mesh: {} points, {} facets ({} interior), {} spikes",
        mesh.points.len(),
        mesh.facets.len(),
        mesh.interior_facet_count(),
        spikes.len()
    );

    let t2 = Instant::now();
    let mut canvas = render::render_mesh(&mesh, &spikes, &domain, config);
    let render_us = t2.elapsed().as_micros() as u64;

    let t3 = Instant::now();
    let foreground_pixels = post::background_mask(&canvas)
        .iter()
        .filter(|&&background| !background)
        .count();
    post::apply_gradient(&mut canvas, config.gradient_start, config.gradient_end);
    let logo = post::resample(&canvas, config.logo_size)?;
    let padded = post::pad_horizontal(&logo);
    let favicon = post::resample(&logo, config.favicon_size)?;
    let post_us = t3.elapsed().as_micros() as u64;

    std::fs::create_dir_all(out_dir)?;
    let logo_path = out_dir.join(LOGO_FILENAME);
    let padded_path = out_dir.join(format!("{PADDED_PREFIX}{LOGO_FILENAME}"));
    let favicon_path = out_dir.join(FAVICON_FILENAME);
    logo.save(&logo_path)?;
    padded.save(&padded_path)?;
    favicon.save(&favicon_path)?;
    info!(
        "wrote {}, {}, {}",
        logo_path.display(),
        padded_path.display(),
        favicon_path.display()
    );

    Ok(RunSummary {
        schema_version: default_schema_version(),
        seed_count: seeds.len(),
        point_count: mesh.points.len(),
        facet_count: mesh.facets.len(),
        interior_facet_count: mesh.interior_facet_count(),
        spike_count: spikes.len(),
        foreground_pixels,
        logo_path,
        padded_path,
        favicon_path,
        timings: StageTimings {
            seeding_us,
            meshing_us,
            render_us,
            post_us,
            total_us: total_start.elapsed().as_micros() as u64,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sigil-{tag}-{}", std::process::id()))
    }

    fn small_config() -> LogoConfig {
        LogoConfig {
            canvas_size: 240,
            logo_size: 180,
            favicon_size: 48,
            ..LogoConfig::default()
        }
    }

    #[test]
    fn generate_writes_three_nonempty_files() {
        let out_dir = scratch_dir("e2e");
        let summary = generate(&small_config(), &out_dir).expect("pipeline must succeed");
        for path in [
            &summary.logo_path,
            &summary.padded_path,
            &summary.favicon_path,
        ] {
            let meta = std::fs::metadata(path).expect("output file must exist");
            assert!(meta.len() > 0, "{} must be non-empty", path.display());
        }
        assert_eq!(summary.seed_count, 14);
        assert!(summary.facet_count > 0);
        assert!(summary.foreground_pixels > 0);
        std::fs::remove_dir_all(&out_dir).ok();
    }

    #[test]
    fn degenerate_single_seed_run_still_produces_outputs() {
        let out_dir = scratch_dir("degenerate");
        let config = LogoConfig {
            n_seeds: 1,
            size_seed: 0,
            position_seed: 0,
            line_width_scale: 1.0,
            ..small_config()
        };
        let summary = generate(&config, &out_dir).expect("single-seed run must succeed");
        assert_eq!(summary.seed_count, 1);
        assert_eq!(summary.interior_facet_count, 0);
        assert_eq!(summary.spike_count, 0, "no facet has exactly one boundary endpoint");
        for path in [
            &summary.logo_path,
            &summary.padded_path,
            &summary.favicon_path,
        ] {
            assert!(path.exists(), "{} must exist", path.display());
        }
        let favicon = image::open(&summary.favicon_path)
            .expect("favicon must decode")
            .to_rgba8();
        assert_eq!(favicon.dimensions(), (48, 48));
        std::fs::remove_dir_all(&out_dir).ok();
    }

    #[test]
    fn favicon_dimensions_follow_the_config_regardless_of_logo_size() {
        let out_dir = scratch_dir("favicon");
        let config = LogoConfig {
            canvas_size: 300,
            logo_size: 220,
            favicon_size: 32,
            ..LogoConfig::default()
        };
        let summary = generate(&config, &out_dir).expect("pipeline must succeed");
        let favicon = image::open(&summary.favicon_path)
            .expect("favicon must decode")
            .to_rgba8();
        assert_eq!(favicon.dimensions(), (32, 32));
        let logo = image::open(&summary.logo_path)
            .expect("logo must decode")
            .to_rgba8();
        assert_eq!(logo.dimensions(), (220, 220));
        let padded = image::open(&summary.padded_path)
            .expect("padded logo must decode")
            .to_rgba8();
        assert_eq!(padded.dimensions(), (2 * 110 + 220, 220));
        std::fs::remove_dir_all(&out_dir).ok();
    }

    #[test]
    fn invalid_config_fails_before_any_output() {
        let out_dir = scratch_dir("invalid");
        let config = LogoConfig {
            n_seeds: 0,
            ..LogoConfig::default()
        };
        let err = generate(&config, &out_dir).expect_err("zero seeds must fail");
        assert!(matches!(err, GenerateError::Config(ConfigError::NoSeeds)));
        assert!(!out_dir.exists(), "validation must fail before any write");
    }

    #[test]
    fn run_summary_round_trips_through_json() {
        let out_dir = scratch_dir("summary");
        let summary = generate(&small_config(), &out_dir).expect("pipeline must succeed");
        let json = serde_json::to_string(&summary).expect("serialize");
        let back: RunSummary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.schema_version, 1);
        assert_eq!(back.seed_count, summary.seed_count);
        assert_eq!(back.facet_count, summary.facet_count);
        assert_eq!(back.logo_path, summary.logo_path);
        std::fs::remove_dir_all(&out_dir).ok();
    }
}
