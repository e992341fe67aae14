use anyhow::Context;
use clap::Parser;
use log::info;
use sigil_core::{generate, LogoConfig};
use std::path::PathBuf;

/// Generate the project logo, padded logo, and favicon.
#[derive(Parser, Debug)]
#[command(name = "sigil", version, about)]
struct Args {
    /// Number of mosaic seeds.
    #[arg(long, default_value_t = 14)]
    seeds: usize,

    /// RNG seed for seed radii.
    #[arg(long, default_value_t = 4)]
    size_seed: u64,

    /// RNG seed for seed placement.
    #[arg(long, default_value_t = 7)]
    position_seed: u64,

    /// Stroke width scale factor.
    #[arg(long, default_value_t = 1.1)]
    line_width: f64,

    /// Canvas resolution rendered before downsampling.
    #[arg(long, default_value_t = 2000)]
    canvas_size: u32,

    /// Logo resolution.
    #[arg(long, default_value_t = 1500)]
    logo_size: u32,

    /// Favicon resolution.
    #[arg(long, default_value_t = 48)]
    favicon_size: u32,

    /// Directory the three image files are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the run summary as JSON to this path.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = LogoConfig {
        n_seeds: args.seeds,
        size_seed: args.size_seed,
        position_seed: args.position_seed,
        line_width_scale: args.line_width,
        canvas_size: args.canvas_size,
        logo_size: args.logo_size,
        favicon_size: args.favicon_size,
        ..LogoConfig::default()
    };
    info!("config: {config:?}");

    let summary = generate(&config, &args.out_dir)
        .with_context(|| format!("generating assets in {}", args.out_dir.display()))?;

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
    }

    println!(
        "wrote {}, {}, {} ({} seeds, {} facets, {:.1} ms)",
        summary.logo_path.display(),
        summary.padded_path.display(),
        summary.favicon_path.display(),
        summary.seed_count,
        summary.facet_count,
        summary.timings.total_us as f64 / 1000.0
    );
    Ok(())
}
