//! # CLI Module
//!
//! Command-line interface for the photo vision engine.
//!
//! ## Usage
//! ```bash
//! # Score a handful of photos
//! photo-vision score IMG_0001.jpg IMG_0002.jpg
//!
//! # JSON output, four workers
//! photo-vision score ~/Photos/*.jpg --output json --threads 4
//!
//! # Paths of blurry photos only
//! photo-vision score ~/Photos/*.jpg --output minimal
//!
//! # Feature print of one photo
//! photo-vision feature-print IMG_0001.jpg --descriptor gray-thumbnail
//!
//! # Method channel over stdin/stdout
//! photo-vision serve
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_vision::channel::{serve, FeaturePrintRecord, VisionChannel};
use photo_vision::core::blur::{BlurQuality, BlurResult};
use photo_vision::core::capability;
use photo_vision::core::decode::{read_file_bytes, FileBytes};
use photo_vision::core::feature_print::DescriptorKind;
use photo_vision::error::{PhotoVisionError, Result};
use photo_vision::events::{BatchEvent, Event, EventChannel};
use photo_vision::EngineConfig;
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Vision - Blur scores and feature prints for photos
#[derive(Parser, Debug)]
#[command(name = "photo-vision")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON engine configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score how blurry each photo is
    Score {
        /// Photos to score
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Worker threads (defaults to one per core)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Compute the feature print of one photo
    FeaturePrint {
        /// Photo to describe
        file: PathBuf,

        /// Descriptor backend
        #[arg(short, long)]
        descriptor: Option<Descriptor>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Answer method-channel requests (one JSON object per line) on stdin
    Serve,

    /// Show which capabilities this build has
    Info {
        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Descriptor {
    /// Packed gradient hash bits (default)
    GradientHash,
    /// Normalized 16x16 grayscale thumbnail
    GrayThumbnail,
}

impl From<Descriptor> for DescriptorKind {
    fn from(descriptor: Descriptor) -> Self {
        match descriptor {
            Descriptor::GradientHash => DescriptorKind::GradientHash,
            Descriptor::GrayThumbnail => DescriptorKind::GrayThumbnail,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (blurry paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Score {
            files,
            output,
            threads,
        } => {
            if threads.is_some() {
                config.batch.threads = threads;
            }
            run_score(&config, &files, output)
        }
        Commands::FeaturePrint {
            file,
            descriptor,
            output,
        } => {
            if let Some(descriptor) = descriptor {
                config.feature_print.descriptor = descriptor.into();
            }
            run_feature_print(&config, &file, output)
        }
        Commands::Serve => run_serve(&config),
        Commands::Info { output } => run_info(output),
    }
}

fn run_score(config: &EngineConfig, files: &[PathBuf], output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    let coordinator = config.coordinator()?;

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Vision").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let images = files
        .iter()
        .map(|path| read_file_bytes(path))
        .collect::<Result<Vec<FileBytes>>>()?;

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let names: Vec<String> = files.iter().map(|path| display_name(path)).collect();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Batch(BatchEvent::Scored(p)) => {
                    pb.set_position(p.completed as u64);
                    if let Some(name) = names.get(p.index) {
                        pb.set_message(format!("{} ({})", name, p.quality));
                    }
                }
                Event::Batch(BatchEvent::Failed { index, .. }) => {
                    if let Some(name) = names.get(index) {
                        pb.set_message(format!("{} failed", name));
                    }
                }
                Event::Batch(BatchEvent::Completed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let outcome = coordinator.score_all_with_events(&images, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let results = match outcome {
        Ok(results) => results,
        Err(e) => {
            if let Some(path) = files.get(e.index) {
                term.write_line(&format!(
                    "{} {}",
                    style("✗").red().bold(),
                    style(path.display()).bold()
                ))
                .ok();
            }
            return Err(e.into());
        }
    };

    match output {
        OutputFormat::Pretty => print_pretty_scores(&term, files, &results),
        OutputFormat::Json => print_json_scores(files, &results)?,
        OutputFormat::Minimal => print_minimal_scores(files, &results),
    }

    Ok(())
}

fn print_pretty_scores(term: &Term, files: &[PathBuf], results: &[BlurResult]) {
    for (path, result) in files.iter().zip(results) {
        let label = match result.quality {
            BlurQuality::Sharp => style(format!("{:<8}", result.quality)).green(),
            BlurQuality::Moderate => style(format!("{:<8}", result.quality)).yellow(),
            BlurQuality::Blurry => style(format!("{:<8}", result.quality)).red(),
        };
        term.write_line(&format!(
            "  {} {:.3}  {}",
            label,
            result.score,
            path.display()
        ))
        .ok();
    }

    let count = |quality: BlurQuality| results.iter().filter(|r| r.quality == quality).count();

    term.write_line("").ok();
    term.write_line(&format!(
        "{} {} photos scored: {} sharp, {} moderate, {} blurry",
        style("✓").green().bold(),
        style(results.len()).cyan(),
        count(BlurQuality::Sharp),
        count(BlurQuality::Moderate),
        count(BlurQuality::Blurry)
    ))
    .ok();
}

fn print_json_scores(files: &[PathBuf], results: &[BlurResult]) -> Result<()> {
    let output: Vec<serde_json::Value> = files
        .iter()
        .zip(results)
        .map(|(path, result)| {
            serde_json::json!({
                "path": path,
                "blurScore": result.score,
                "quality": result.quality,
                "meanVariance": result.mean_variance,
                "step": result.step,
            })
        })
        .collect();

    print_json(&output)
}

fn print_minimal_scores(files: &[PathBuf], results: &[BlurResult]) {
    for (path, result) in files.iter().zip(results) {
        if result.is_blurry() {
            println!("{}", path.display());
        }
    }
}

fn run_feature_print(config: &EngineConfig, file: &Path, output: OutputFormat) -> Result<()> {
    let generator = config.feature_print.build()?;
    let bytes = read_file_bytes(file)?;
    let print = generator.generate(&bytes)?;
    let record = FeaturePrintRecord::from(&print);

    match output {
        OutputFormat::Json => print_json(&record)?,
        OutputFormat::Minimal => println!("{}", to_hex(print.data())),
        OutputFormat::Pretty => {
            let term = Term::stdout();
            term.write_line(&format!("{}", style(file.display()).bold())).ok();
            term.write_line(&format!(
                "  {} {}",
                style("Descriptor:").dim(),
                record.feature_print_version
            ))
            .ok();
            term.write_line(&format!(
                "  {} {} x {}",
                style("Elements:").dim(),
                record.feature_print_length,
                record.feature_print_type
            ))
            .ok();
            term.write_line(&format!(
                "  {} {}",
                style("Data:").dim(),
                to_hex(print.data())
            ))
            .ok();
        }
    }

    Ok(())
}

fn run_serve(config: &EngineConfig) -> Result<()> {
    let channel = VisionChannel::new(config)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    let answered = serve(&channel, stdin.lock(), stdout.lock())?;
    tracing::info!(answered, "channel closed");
    Ok(())
}

fn run_info(output: OutputFormat) -> Result<()> {
    let capabilities = capability::probe();

    if !matches!(output, OutputFormat::Pretty) {
        return print_json(capabilities);
    }

    let term = Term::stdout();
    term.write_line(&format!("{}", style(&capabilities.version).bold().cyan()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!("  {} blur scoring", mark(capabilities.blur)))
        .ok();
    term.write_line(&format!(
        "  {} feature prints",
        mark(capabilities.feature_print)
    ))
    .ok();
    for descriptor in &capabilities.descriptors {
        term.write_line(&format!(
            "    {} {} {}",
            mark(descriptor.available),
            descriptor.kind,
            style(descriptor.version).dim()
        ))
        .ok();
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PhotoVisionError::Config(format!("failed to encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn mark(enabled: bool) -> String {
    if enabled {
        style("✓").green().to_string()
    } else {
        style("✗").red().to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
