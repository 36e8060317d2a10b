use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use image::{DynamicImage, ImageReader};
use page_stitch_core::{
    JobOutcome, OptimizationSpec, OutputFormat, PageImage, PngCompression, StitchJob,
    stitch_batch, stitch_exact, write_composite,
};
use serde::Deserialize;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "page-stitch",
    about = "Stitch page images into near-square composites within a size budget",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stitch exactly four page images into one composite
    Stitch(StitchArgs),
    /// Stitch exactly two page images into one composite
    Pair(StitchArgs),
    /// Compose a folder of numbered page images in fixed-size groups
    Batch(BatchArgs),
}

#[derive(Parser, Debug, Clone)]
struct StitchArgs {
    /// Input image paths followed by the output path (4+1 for `stitch`, 2+1 for `pair`)
    #[arg(required = true, help_heading = "Input/Output")]
    paths: Vec<PathBuf>,
    /// Write the composite's stats (JSON) to this file
    #[arg(long, help_heading = "Input/Output")]
    export_stats: Option<PathBuf>,
    #[command(flatten)]
    opt: OptimizeArgs,
}

#[derive(Parser, Debug, Clone)]
struct BatchArgs {
    /// Directory of page images with numeric stems (1.png, 2.png, ...)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory for the composites
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Images per composite (2 or 4 use the specialized strategies)
    #[arg(long, default_value_t = 4, help_heading = "Input/Output")]
    group_size: usize,
    #[command(flatten)]
    opt: OptimizeArgs,
}

#[derive(Parser, Debug, Clone)]
struct OptimizeArgs {
    /// Downscale factor in (0, 1]
    #[arg(long, default_value_t = 1.0, help_heading = "Optimization")]
    downscale: f32,
    /// Output format: png | jpeg
    #[arg(long, default_value = "png", help_heading = "Optimization")]
    format: String,
    /// JPEG quality (1..=100)
    #[arg(long, default_value_t = 85, help_heading = "Optimization")]
    jpeg_quality: u8,
    /// PNG compression: fast | default | best
    #[arg(long, default_value = "default", help_heading = "Optimization")]
    png_compression: String,
    /// YAML config file (overrides optimization flags)
    #[arg(long, help_heading = "Optimization")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Stitch(args) => run_stitch(args, 4),
        Commands::Pair(args) => run_stitch(args, 2),
        Commands::Batch(args) => run_batch(args, cli.progress && !cli.quiet),
    }
}

fn run_stitch(cli: &StitchArgs, arity: usize) -> anyhow::Result<()> {
    if cli.paths.len() != arity + 1 {
        anyhow::bail!(
            "expected {} input images followed by the output path, got {} arguments",
            arity,
            cli.paths.len()
        );
    }
    let (out_path, input_paths) = cli
        .paths
        .split_last()
        .expect("arity check guarantees at least one path");
    let spec = cli.opt.to_spec()?;
    spec.validate()?;

    let inputs = load_pages(input_paths)?;
    let composite = stitch_exact(inputs, arity, &spec)?;
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    write_composite(&composite, out_path)
        .with_context(|| format!("write {}", out_path.display()))?;
    info!(
        out = %out_path.display(),
        provenance = ?composite.provenance,
        "{}",
        composite.stats.summary()
    );

    if let Some(stats_path) = &cli.export_stats {
        fs::write(stats_path, serde_json::to_string_pretty(&composite.stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
        info!(?stats_path, "stats exported");
    }
    Ok(())
}

fn run_batch(cli: &BatchArgs, show_progress: bool) -> anyhow::Result<()> {
    if cli.group_size == 0 {
        anyhow::bail!("group size must be at least 1");
    }
    let spec = cli.opt.to_spec()?;
    spec.validate()?;
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;

    let paths = gather_pages(&cli.input)?;
    if paths.is_empty() {
        anyhow::bail!("no page images found in {}", cli.input.display());
    }
    info!(
        count = paths.len(),
        group_size = cli.group_size,
        "found page images"
    );

    let ext = spec.format.extension();
    let mut jobs: Vec<StitchJob> = Vec::new();
    // Decode failures are isolated to their set, like any other per-set error.
    let mut failed: Vec<JobOutcome> = Vec::new();
    let bar = progress_bar(show_progress, paths.len() as u64);
    for chunk in paths.chunks(cli.group_size) {
        let out_path = cli.out_dir.join(format!("{}.{}", group_name(chunk), ext));
        match load_pages(chunk) {
            Ok(inputs) => jobs.push(StitchJob { inputs, out_path }),
            Err(e) => {
                error!(out = %out_path.display(), error = %e, "skip set");
                failed.push(JobOutcome {
                    out_path,
                    result: Err(page_stitch_core::StitchError::InvalidInput(e.to_string())),
                });
            }
        }
        if let Some(b) = &bar {
            b.inc(chunk.len() as u64);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    let mut outcomes = stitch_batch(jobs, &spec);
    outcomes.extend(failed);

    let mut ok = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(stats) => {
                ok += 1;
                info!(out = %outcome.out_path.display(), "{}", stats.summary());
            }
            Err(e) => {
                error!(out = %outcome.out_path.display(), error = %e, "set failed");
            }
        }
    }
    info!(ok, failed = outcomes.len() - ok, "batch complete");
    if ok == 0 {
        anyhow::bail!("all {} sets failed", outcomes.len());
    }
    Ok(())
}

impl OptimizeArgs {
    fn to_spec(&self) -> anyhow::Result<OptimizationSpec> {
        let format: OutputFormat = self
            .format
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown format: {}", self.format))?;
        let png_compression: PngCompression = self
            .png_compression
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown png compression: {}", self.png_compression))?;
        let mut spec = OptimizationSpec {
            downscale: self.downscale,
            format,
            png_compression,
            jpeg_quality: self.jpeg_quality,
        };
        // Config file overrides flags en bloc, field by field.
        if let Some(path) = &self.config {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlSpec = serde_yaml::from_str(&file)
                .with_context(|| format!("parse config {}", path.display()))?;
            spec = y
                .into_spec(spec)
                .with_context(|| format!("invalid config {}", path.display()))?;
        }
        Ok(spec)
    }
}

#[derive(Debug, Deserialize, Default)]
struct YamlSpec {
    downscale: Option<f32>,
    format: Option<String>,
    png_compression: Option<String>,
    jpeg_quality: Option<u8>,
}

impl YamlSpec {
    /// Overlay config-file fields onto `spec`. A value that does not parse
    /// is an error, never silently replaced by the flag value.
    fn into_spec(self, mut spec: OptimizationSpec) -> anyhow::Result<OptimizationSpec> {
        if let Some(v) = self.downscale {
            spec.downscale = v;
        }
        if let Some(v) = self.format {
            spec.format = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown format: {v}"))?;
        }
        if let Some(v) = self.png_compression {
            spec.png_compression = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown png compression: {v}"))?;
        }
        if let Some(v) = self.jpeg_quality {
            spec.jpeg_quality = v;
        }
        Ok(spec)
    }
}

/// Output stem for one group, `<first>_<last>` of the input stems (a lone
/// trailing page keeps its own stem).
fn group_name(chunk: &[PathBuf]) -> String {
    let stem = |p: &PathBuf| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page")
            .to_string()
    };
    match chunk {
        [single] => stem(single),
        [first, .., last] => format!("{}_{}", stem(first), stem(last)),
        [] => "empty".to_string(),
    }
}

/// Collect page images directly inside `dir`, ordered by numeric stem
/// (1.png, 2.png, ..., 10.png) the way the upstream rasterizer writes
/// them; non-numeric stems sort after, lexically.
fn gather_pages(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image(p))
        .collect();
    paths.sort_by_key(|p| (numeric_stem(p).unwrap_or(u64::MAX), p.clone()));
    Ok(paths)
}

fn numeric_stem(p: &Path) -> Option<u64> {
    p.file_stem()?.to_str()?.parse().ok()
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn load_pages(paths: &[PathBuf]) -> anyhow::Result<Vec<PageImage>> {
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let image = load_image(p).with_context(|| format!("load {}", p.display()))?;
        let key = p.to_string_lossy().replace('\\', "/");
        list.push(PageImage { key, image });
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn progress_bar(show: bool, len: u64) -> Option<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return None;
    }
    let b = ProgressBar::new(len);
    b.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )
        .unwrap(),
    );
    Some(b)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
