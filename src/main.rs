use clap::{Parser, Subcommand};
use imgnorm::fetch::{Fetcher, HttpFetcher};
use imgnorm::imaging::{RustBackend, normalize, supported_input_extensions};
use imgnorm::pipeline::{ActiveRequests, Pipeline, Source};
use imgnorm::store::DirStore;
use imgnorm::{config, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("IMGNORM_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("IMGNORM_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once per process
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgnorm")]
#[command(about = "Normalize images to canonical square, portrait and landscape presets")]
#[command(long_about = "\
Normalize images to canonical square, portrait and landscape presets

Every image is classified by aspect ratio (width / height):

  portrait   896x1152   ratio < 0.9
  square     1024x1024  0.9 <= ratio <= 1.1
  landscape  1152x896   ratio > 1.1

Images larger than their preset are shrunk to fit inside it, keeping their
aspect ratio, and re-encoded in their original format. Images that already
fit are passed through byte-for-byte. Nothing is ever enlarged.

Sources can be local files, directories (batch only, walked recursively) or
http(s) URLs.

Run 'imgnorm gen-config' to generate a documented imgnorm.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing imgnorm.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a single image
    Normalize {
        /// Image file or URL
        source: String,
        /// Write the normalized image here
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Normalize many images into the configured store
    Batch {
        /// Image files, directories or URLs
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Print the preset table
    Presets,
    /// Print a stock imgnorm.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize {
            source,
            output: out_path,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let fetcher = HttpFetcher::new(&config.fetch)?;

            let bytes = match Source::parse(&source) {
                Source::Url(url) => fetcher.fetch(&url)?,
                Source::Path(path) => std::fs::read(path)?,
            };
            let result = normalize(&RustBackend::new(), &bytes, &config.normalize_options())?;

            if let Some(path) = &out_path {
                std::fs::write(path, &result.buffer)?;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let written = out_path.as_ref().map(|p| p.display().to_string());
                let original = (result.source_width, result.source_height);
                output::print_normalize_output(&source, original, &result, written.as_deref());
            }
        }
        Command::Batch { sources } => {
            let config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&config.processing);

            let sources = expand_sources(&sources)?;
            let fetcher = HttpFetcher::new(&config.fetch)?;
            let store = DirStore::new(&config.store.dir, config.store.base_url.clone());
            let observer = ActiveRequests::new();
            let pipeline = Pipeline {
                fetcher: &fetcher,
                backend: &RustBackend::new(),
                store: &store,
                observer: &observer,
                options: config.normalize_options(),
            };

            let (tx, rx) = std::sync::mpsc::channel();
            let quiet = cli.json;
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if quiet {
                        continue;
                    }
                    for line in output::format_pipeline_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = pipeline.run(&sources, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            if cli.json {
                let items: Vec<serde_json::Value> = report
                    .items
                    .iter()
                    .map(|item| match &item.result {
                        Ok(outcome) => serde_json::json!({
                            "source": item.source,
                            "outcome": outcome,
                        }),
                        Err(e) => serde_json::json!({
                            "source": item.source,
                            "error": e.to_string(),
                        }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                println!();
                println!("{}", output::format_summary(&report));
            }

            if !report.all_succeeded() {
                return Err(format!(
                    "{} of {} images failed",
                    report.failed(),
                    report.items.len()
                )
                .into());
            }
        }
        Command::Presets => {
            output::print_presets();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imgnorm=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Turn CLI arguments into pipeline sources, walking directories for
/// supported image files in sorted order.
fn expand_sources(inputs: &[String]) -> Result<Vec<Source>, Box<dyn std::error::Error>> {
    let mut sources = Vec::new();
    for input in inputs {
        match Source::parse(input) {
            Source::Path(path) if path.is_dir() => {
                for entry in walkdir::WalkDir::new(&path).sort_by_file_name() {
                    let entry = entry?;
                    if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                        sources.push(Source::Path(entry.into_path()));
                    }
                }
            }
            source => sources.push(source),
        }
    }
    Ok(sources)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}
