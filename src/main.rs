use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mediagroup::core::{HashAlgorithm, HashSettings};
use mediagroup::report::Report;
use mediagroup::services::{MediaMode, Pipeline, hash_still};
use mediagroup::{PartialConfig, RunConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "mediagroup", version, about = "Group visually similar media by perceptual hash")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash every file in a directory and list similarity groups
    Scan {
        /// Directory containing media files
        #[arg(short, long, value_name = "DIR", default_value = "input")]
        input: PathBuf,

        #[command(flatten)]
        options: ScanOptions,

        /// JSON config file (default: `<config dir>/mediagroup/config.json`)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write a JSON report of the run
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Print groups as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the fingerprint of each still image
    Hash {
        #[command(flatten)]
        hash: HashArgs,

        /// Images to hash
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Print the Hamming distance between two still images
    Compare {
        #[command(flatten)]
        hash: HashArgs,

        #[arg(value_name = "FILE")]
        first: PathBuf,

        #[arg(value_name = "FILE")]
        second: PathBuf,
    },
}

#[derive(Args, Debug)]
struct HashArgs {
    /// Hashing algorithm
    #[arg(long, value_enum)]
    hash_type: HashAlgorithm,

    /// Hash grid size (algorithm default if omitted)
    #[arg(long)]
    hash_size: Option<u32>,
}

#[derive(Args, Debug)]
struct ScanOptions {
    /// Hashing algorithm
    #[arg(long, value_enum)]
    hash_type: Option<HashAlgorithm>,

    /// Processing mode
    #[arg(long, value_enum)]
    mode: Option<MediaMode>,

    /// Hash grid size (algorithm default if omitted)
    #[arg(long)]
    hash_size: Option<u32>,

    /// Maximum Hamming distance within a group (algorithm default if omitted)
    #[arg(long)]
    threshold: Option<u32>,

    /// Frames sampled per video
    #[arg(long)]
    frames_to_sample: Option<usize>,

    /// Parallel hashing workers
    #[arg(long)]
    workers: Option<usize>,

    /// Batch coefficient for the chunk size
    #[arg(long)]
    chunk_coef: Option<usize>,
}

impl From<ScanOptions> for PartialConfig {
    fn from(options: ScanOptions) -> Self {
        Self {
            hash_type: options.hash_type,
            mode: options.mode,
            hash_size: options.hash_size,
            threshold: options.threshold,
            frames_to_sample: options.frames_to_sample,
            workers: options.workers,
            chunk_coef: options.chunk_coef,
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            input,
            options,
            config,
            report,
            json,
        } => {
            let file_config = match config {
                Some(path) => PartialConfig::load(&path)?,
                None => PartialConfig::load_default()?,
            };
            let config = RunConfig::resolve(&input, PartialConfig::from(options).or(file_config))?;
            scan(&config, report, json)?;
        }

        Commands::Hash { hash, files } => {
            let settings = HashSettings::new(hash.hash_type, hash.hash_size)?;
            for file in &files {
                let fingerprint = hash_still(file, &settings)
                    .with_context(|| format!("Failed to hash {:?}", file))?;
                println!("{}  {}", fingerprint, file.display());
            }
        }

        Commands::Compare {
            hash,
            first,
            second,
        } => {
            let settings = HashSettings::new(hash.hash_type, hash.hash_size)?;
            let a = hash_still(&first, &settings)
                .with_context(|| format!("Failed to hash {:?}", first))?;
            let b = hash_still(&second, &settings)
                .with_context(|| format!("Failed to hash {:?}", second))?;
            let distance = a.hamming_distance(&b)?;
            println!("{} / {} bits differ", distance, a.len());
        }
    }

    Ok(())
}

fn scan(config: &RunConfig, report: Option<PathBuf>, json: bool) -> Result<()> {
    let start = Instant::now();
    eprintln!(
        "▶ Using {} workers, hash={}, size={}, thresh={}",
        config.workers, config.hash.algorithm, config.hash.hash_size, config.threshold
    );

    let pipeline = Pipeline::new(config);
    let files = pipeline
        .discover()
        .with_context(|| format!("Failed to list {:?}", config.input))?;
    eprintln!("▶ Found {} {:?} files to process", files.len(), config.mode);

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{bar:30}] {pos}/{len} {msg}",
    )?);
    progress.set_message("Hashing files…");
    progress.enable_steady_tick(Duration::from_millis(100));

    let summary = benchmark("hashing and grouping", || {
        pipeline.run(&files, |_| progress.inc(1))
    })?;
    progress.finish_with_message("Hashing complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&summary.groups)?);
    } else if summary.groups.is_empty() {
        println!("No similar files found.");
    } else {
        println!("Found {} group(s):", summary.groups.len());
        for (i, group) in summary.groups.iter().enumerate() {
            println!(" Group {}:", i + 1);
            for id in group {
                println!("   ▶ {}", id);
            }
        }
    }

    if !summary.skipped.is_empty() {
        eprintln!("⚠️  Skipped {} unreadable file(s)", summary.skipped.len());
    }

    if let Some(path) = report {
        Report::new(config, &summary)
            .write_to(&path)
            .with_context(|| format!("Failed to write report {:?}", path))?;
        eprintln!("✅ Wrote report to {}", path.display());
    }

    eprintln!(
        "Identified {} groups in {:.2?}",
        summary.groups.len(),
        start.elapsed()
    );
    Ok(())
}

/// Run `f()`, print how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    eprintln!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
