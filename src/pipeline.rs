//! Batch normalization pipeline.
//!
//! Wires the capabilities together for a list of sources:
//!
//! ```text
//! Source ──► bytes ──► normalize ──► store ──► URL
//!  (URL → Fetcher, path → filesystem)
//! ```
//!
//! Each item succeeds or fails on its own. A failed fetch or a corrupt image
//! is reported in the [`PipelineReport`] and the rest of the batch carries
//! on; deciding whether a partial batch is acceptable is the caller's job.
//!
//! ## Parallel Processing
//!
//! Items run in parallel on the global [rayon](https://docs.rs/rayon) pool.
//! Results come back in input order regardless of completion order. Progress
//! is streamed as [`PipelineEvent`]s over an optional channel so the CLI can
//! print while work is still running.
//!
//! ## Request tracking
//!
//! A [`RequestObserver`] is told when each item starts and ends, failures
//! included. There is no process-wide registry; pass [`ActiveRequests`] (or
//! your own observer) in when you need one.

use crate::fetch::{FetchError, Fetcher};
use crate::imaging::{ImageBackend, ImagingError, NormalizeOptions, Preset, normalize};
use crate::store::{Store, StoreError};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] ImagingError),
    #[error("Store failed: {0}")]
    Store(#[from] StoreError),
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` strings are URLs, anything else is a path.
    pub fn parse(input: &str) -> Self {
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(input.to_string())
        } else {
            Source::Path(PathBuf::from(input))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Start/end hooks around each pipeline item.
pub trait RequestObserver: Sync {
    fn on_start(&self, id: &str);
    fn on_end(&self, id: &str);
}

/// No-op observer.
impl RequestObserver for () {
    fn on_start(&self, _id: &str) {}
    fn on_end(&self, _id: &str) {}
}

/// Observer tracking which items are currently in flight.
#[derive(Debug, Default)]
pub struct ActiveRequests {
    active: Mutex<HashSet<String>>,
}

impl ActiveRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panic elsewhere never corrupts the set, so a poisoned lock still
    /// holds the real state.
    fn set(&self) -> MutexGuard<'_, HashSet<String>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn count(&self) -> usize {
        self.set().len()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.set().contains(id)
    }
}

impl RequestObserver for ActiveRequests {
    fn on_start(&self, id: &str) {
        self.set().insert(id.to_string());
    }

    fn on_end(&self, id: &str) {
        self.set().remove(id);
    }
}

/// A successfully normalized and stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub url: String,
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
    pub resized: bool,
    pub preset: Preset,
    pub preset_label: &'static str,
    pub content_type: &'static str,
    pub bytes: usize,
}

/// Progress event, one per finished item.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Normalized {
        index: usize,
        source: Source,
        outcome: PipelineOutcome,
    },
    Failed {
        index: usize,
        source: Source,
        error: String,
    },
}

/// Per-item result of a batch, in input order.
#[derive(Debug)]
pub struct ItemResult {
    pub index: usize,
    pub source: Source,
    pub result: Result<PipelineOutcome, PipelineError>,
}

/// Results of a whole batch.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub items: Vec<ItemResult>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn resized(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(&i.result, Ok(o) if o.resized))
            .count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// The capabilities a batch runs against.
pub struct Pipeline<'a, F, B, S, O = ()>
where
    F: Fetcher,
    B: ImageBackend,
    S: Store,
    O: RequestObserver,
{
    pub fetcher: &'a F,
    pub backend: &'a B,
    pub store: &'a S,
    pub observer: &'a O,
    pub options: NormalizeOptions,
}

impl<F, B, S, O> Pipeline<'_, F, B, S, O>
where
    F: Fetcher,
    B: ImageBackend,
    S: Store,
    O: RequestObserver,
{
    fn read(&self, source: &Source) -> Result<Vec<u8>, PipelineError> {
        match source {
            Source::Url(url) => Ok(self.fetcher.fetch(url)?),
            Source::Path(path) => Ok(std::fs::read(path)?),
        }
    }

    fn process(&self, source: &Source) -> Result<PipelineOutcome, PipelineError> {
        let bytes = self.read(source)?;
        let normalized = normalize(self.backend, &bytes, &self.options)?;
        let url = self
            .store
            .store(&normalized.buffer, normalized.content_type)?;
        Ok(PipelineOutcome {
            url,
            source_width: normalized.source_width,
            source_height: normalized.source_height,
            width: normalized.width,
            height: normalized.height,
            resized: normalized.resized,
            preset: normalized.preset,
            preset_label: normalized.preset_label,
            content_type: normalized.content_type,
            bytes: normalized.buffer.len(),
        })
    }

    /// Run a single item, bracketed by the observer hooks.
    pub fn run_one(&self, id: &str, source: &Source) -> Result<PipelineOutcome, PipelineError> {
        self.observer.on_start(id);
        let result = self.process(source);
        self.observer.on_end(id);
        result
    }

    /// Run every source in parallel; never aborts early.
    pub fn run(&self, sources: &[Source], events: Option<Sender<PipelineEvent>>) -> PipelineReport {
        let items = sources
            .par_iter()
            .enumerate()
            .map(|(index, source)| {
                let id = format!("{index}:{source}");
                let result = self.run_one(&id, source);

                let event = match &result {
                    Ok(outcome) => PipelineEvent::Normalized {
                        index,
                        source: source.clone(),
                        outcome: outcome.clone(),
                    },
                    Err(e) => {
                        warn!(%source, error = %e, "item failed");
                        PipelineEvent::Failed {
                            index,
                            source: source.clone(),
                            error: e.to_string(),
                        }
                    }
                };
                if let Some(tx) = &events {
                    // Receiver gone just means nobody is listening
                    let _ = tx.send(event);
                }

                ItemResult {
                    index,
                    source: source.clone(),
                    result,
                }
            })
            .collect();

        PipelineReport { items }
    }
}
