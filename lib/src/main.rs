//! Slicer fill CLI - Command-line interface for the fill library
//!
//! Usage:
//!   slicer-fill fill <surface.json> --pattern honeycomb [options]
//!   slicer-fill fill <surfaces.json> -o <paths.json> --layers 20 --density 0.15
//!   slicer-fill patterns

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use slicer_fill::{
    fill_surfaces_parallel, unscale, BoundingBox, Fill, FillJob, FillParams, InfillPattern,
    Octree, Polylines, PrintConfig, PrintObjectConfig, Surface, Vec3d,
};
use std::fs;
use std::path::PathBuf;

/// Infill toolpath generation for layered 3D printing
#[derive(Parser, Debug)]
#[command(name = "slicer-fill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill surfaces read from a JSON file and write the toolpaths as JSON
    Fill {
        /// Input JSON: one surface or a list of surfaces
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Print/object configuration file (JSON format)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Infill pattern id
        #[arg(short, long, default_value = "rectilinear")]
        pattern: String,

        /// Infill density (0-1)
        #[arg(long, default_value = "0.2")]
        density: f64,

        /// Line spacing in mm [default: infill width of the print config]
        #[arg(long)]
        spacing: Option<f64>,

        /// Base infill angle in degrees
        #[arg(long, default_value = "45")]
        angle: f64,

        /// Overlap with the perimeters in mm
        #[arg(long, default_value = "0")]
        overlap: f64,

        /// Number of layers to fill each surface on
        #[arg(long, default_value = "1")]
        layers: usize,

        /// Index of the first layer
        #[arg(long, default_value = "0")]
        first_layer: usize,

        /// Layer height in mm [default: layer height of the print config]
        #[arg(long)]
        layer_height: Option<f64>,

        /// Anchor length in mm
        #[arg(long, default_value = "1000")]
        anchor_length: f64,

        /// Maximum anchor length in mm (below 0.05 lines are not connected)
        #[arg(long, default_value = "1000")]
        anchor_length_max: f64,

        /// Spread full infill lines evenly over the region
        #[arg(long)]
        adjust_spacing: bool,

        /// Print all lines in the same direction
        #[arg(long)]
        monotonic: bool,

        /// Variable-width concentric paths
        #[arg(long)]
        arachne: bool,

        /// Number of threads to use (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        threads: usize,
    },

    /// List the available infill patterns
    Patterns,
}

/// Surfaces in the input file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SurfaceInput {
    One(Surface),
    Many(Vec<Surface>),
}

/// Settings read from `--config`.
#[derive(Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    print: PrintConfig,
    object: PrintObjectConfig,
}

/// Toolpaths of one filled surface, in scaled coordinates.
#[derive(Serialize)]
struct FilledSurface {
    surface: usize,
    layer_id: usize,
    z: f64,
    polylines: Polylines,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Fill {
            input,
            output,
            config,
            pattern,
            density,
            spacing,
            angle,
            overlap,
            layers,
            first_layer,
            layer_height,
            anchor_length,
            anchor_length_max,
            adjust_spacing,
            monotonic,
            arachne,
            threads,
        } => {
            let options = FillOptions {
                pattern,
                density,
                spacing,
                angle,
                overlap,
                layers,
                first_layer,
                layer_height,
                anchor_length,
                anchor_length_max,
                adjust_spacing,
                monotonic,
                arachne,
            };
            cmd_fill(input, output, config, options, threads)
        }
        Commands::Patterns => {
            cmd_patterns();
            Ok(())
        }
    }
}

struct FillOptions {
    pattern: String,
    density: f64,
    spacing: Option<f64>,
    angle: f64,
    overlap: f64,
    layers: usize,
    first_layer: usize,
    layer_height: Option<f64>,
    anchor_length: f64,
    anchor_length_max: f64,
    adjust_spacing: bool,
    monotonic: bool,
    arachne: bool,
}

impl FillOptions {
    /// Fill the gaps left on the command line from the print configuration.
    /// Full density takes the solid infill width.
    fn resolve(&mut self, print: &PrintConfig) {
        if self.spacing.is_none() {
            self.spacing = Some(if self.density >= 1.0 {
                print.solid_infill_width()
            } else {
                print.infill_width()
            });
        }
        if self.layer_height.is_none() {
            self.layer_height = Some(print.layer_height);
        }
    }

    fn spacing(&self) -> f64 {
        self.spacing.unwrap_or_default()
    }

    fn layer_height(&self) -> f64 {
        self.layer_height.unwrap_or_default()
    }

    fn params(&self) -> FillParams {
        let mut params = FillParams::with_density(self.density)
            .anchors(self.anchor_length, self.anchor_length_max)
            .adjust(self.adjust_spacing)
            .monotonic(self.monotonic);
        if self.arachne {
            params = params.arachne(self.layer_height());
        }
        params
    }
}

fn cmd_fill(
    input: PathBuf,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    mut options: FillOptions,
    threads: usize,
) -> Result<()> {
    if !(0.0..=1.0).contains(&options.density) {
        bail!("density must be between 0 and 1, got {}", options.density);
    }
    let pattern: InfillPattern = options.pattern.parse()?;

    // Set thread count if specified
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize thread pool")?;
    }

    info!("Loading surfaces from: {}", input.display());
    let content = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let surfaces = match serde_json::from_str(&content).context("Failed to parse surfaces")? {
        SurfaceInput::One(surface) => vec![surface],
        SurfaceInput::Many(surfaces) => surfaces,
    };
    if surfaces.is_empty() {
        warn!("No surfaces in {}", input.display());
    }
    if options.density < 1.0 {
        for (idx, surface) in surfaces.iter().enumerate().filter(|(_, s)| s.is_solid()) {
            info!(
                "Surface {idx} is {} but filled at {:.0}% density",
                surface.surface_type,
                options.density * 100.0
            );
        }
    }

    let config = match config_file {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: ConfigFile =
                serde_json::from_str(&content).context("Failed to parse config file")?;
            config.print.validate().map_err(anyhow::Error::msg)?;
            config
        }
        None => ConfigFile::default(),
    };
    info!("Print: {}", config.print);
    if options.arachne {
        info!("Object: {}", config.object);
    }

    options.resolve(&config.print);
    if options.spacing() <= 0.0 {
        bail!("spacing must be positive, got {}", options.spacing());
    }
    if options.layer_height() <= 0.0 {
        bail!("layer height must be positive, got {}", options.layer_height());
    }

    let octree = if pattern.needs_octree() {
        Some(build_octree(&surfaces, &options)?)
    } else {
        None
    };

    let mut prototype = Fill::new_from_type(pattern)
        .with_print_config(&config.print)
        .with_print_object_config(&config.object);
    if let Some(octree) = &octree {
        prototype = prototype.with_octree(octree);
    }
    prototype.state.spacing = options.spacing();
    prototype.state.angle = Some(options.angle.to_radians());
    prototype.state.overlap = options.overlap;
    let params = options.params();

    info!("Filling {} surfaces with {pattern}:", surfaces.len());
    info!("  Density: {:.1}%", options.density * 100.0);
    info!("  Spacing: {} mm", options.spacing());
    info!(
        "  Layers: {}..{}",
        options.first_layer,
        options.first_layer + options.layers
    );

    let layer_height = options.layer_height();
    let jobs: Vec<(usize, FillJob)> = surfaces
        .iter()
        .enumerate()
        .flat_map(|(idx, surface)| {
            (options.first_layer..options.first_layer + options.layers).map(move |layer_id| {
                let z = (layer_id + 1) as f64 * layer_height;
                (idx, FillJob::new(layer_id, z, surface.clone()))
            })
        })
        .collect();

    let progress = ProgressBar::new(jobs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    progress.set_message("Filling...");

    let fill_jobs: Vec<FillJob> = jobs.iter().map(|(_, job)| job.clone()).collect();
    let results = fill_surfaces_parallel(&prototype, &fill_jobs, &params);

    let mut filled = Vec::with_capacity(results.len());
    let mut failed = 0;
    for ((surface, job), result) in jobs.into_iter().zip(results) {
        progress.inc(1);
        match result {
            Ok(polylines) => filled.push(FilledSurface {
                surface,
                layer_id: job.layer_id,
                z: job.z,
                polylines,
            }),
            Err(err) => {
                warn!("Surface {surface}, layer {} not filled: {err}", job.layer_id);
                failed += 1;
            }
        }
    }
    progress.finish_with_message("Done!");

    let json = serde_json::to_string_pretty(&filled).context("Failed to serialize toolpaths")?;
    match &output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Toolpaths written to: {}", path.display());
        }
        None => println!("{json}"),
    }

    let paths: usize = filled.iter().map(|f| f.polylines.len()).sum();
    info!("{} fills, {paths} paths, {failed} failed", filled.len());
    if failed > 0 {
        bail!("{failed} of {} fills failed", failed + filled.len());
    }
    Ok(())
}

/// Uniform octree spanning every surface over the filled layers.
fn build_octree(surfaces: &[Surface], options: &FillOptions) -> Result<Octree> {
    if options.density <= 0.0 {
        bail!("adaptive cubic infill needs a positive density");
    }
    let mut bbox = BoundingBox::new();
    for surface in surfaces {
        bbox.merge(&surface.expolygon.bounding_box());
    }
    if !bbox.is_defined() {
        bail!("no surface geometry to build an octree for");
    }

    let z_min = options.first_layer as f64 * options.layer_height();
    let z_max = (options.first_layer + options.layers) as f64 * options.layer_height();
    let center = bbox.center();
    let size = unscale(bbox.width())
        .max(unscale(bbox.height()))
        .max(z_max - z_min);
    let line_spacing = options.spacing() / options.density;

    let octree = Octree::dense(
        Vec3d::new(unscale(center.x), unscale(center.y), 0.5 * (z_min + z_max)),
        size,
        line_spacing,
    )
    .with_context(|| format!("Region too small for adaptive cubic cells of {line_spacing:.2} mm"))?;
    info!(
        "Built octree: {} levels, {} cubes",
        octree.cubes_properties.len(),
        octree.cube_count()
    );
    Ok(octree)
}

fn cmd_patterns() {
    println!("Available Infill Patterns ({} total):", InfillPattern::ALL.len());
    println!("{:-<60}", "");
    println!(
        "{:<16} {:>9} {:>11} {:>8} {:>8}",
        "ID", "CROSSING", "CONSISTENT", "NO SORT", "BRIDGE"
    );
    for pattern in InfillPattern::ALL {
        let fill = Fill::new_from_type(pattern);
        let flag = |b: bool| if b { "yes" } else { "-" };
        println!(
            "{:<16} {:>9} {:>11} {:>8} {:>8}",
            pattern.name(),
            flag(fill.is_self_crossing()),
            flag(fill.has_consistent_pattern()),
            flag(fill.no_sort()),
            flag(Fill::use_bridge_flow(pattern)),
        );
    }
}
