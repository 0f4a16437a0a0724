//! CLI output formatting.
//!
//! # Output Format
//!
//! ## normalize
//!
//! ```text
//! photos/dawn.jpg
//!     4032x3024 → 1152x864 (resized)
//!     Preset: landscape 1152x896
//!     Output: dawn-normalized.jpg (312 KB)
//! ```
//!
//! ## batch
//!
//! ```text
//! 001 photos/dawn.jpg
//!     4032x3024 → 1152x864 landscape (resized)
//!     URL: file:///srv/normalized/9f2c1a0b7d3e4f51.jpg
//! 002 https://example.com/broken.png
//!     Failed: Image processing failed: Decode failed: ...
//!
//! Normalized 1 of 2 images (1 resized, 1 failed)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{
    LANDSCAPE_ABOVE, NormalizationResult, PORTRAIT_BELOW, PRESETS, Preset, PresetSpec,
};
use crate::pipeline::{PipelineEvent, PipelineReport};

/// Format a 1-based positional index as a zero-padded 3-digit string.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos + 1)
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.0} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn resize_note(resized: bool) -> &'static str {
    if resized { "resized" } else { "unchanged" }
}

// ============================================================================
// normalize
// ============================================================================

/// Format the outcome of a single `normalize` call.
///
/// `original` is the source size; `written` is where the buffer went, if anywhere.
pub fn format_normalize_output(
    source: &str,
    original: (u32, u32),
    result: &NormalizationResult,
    written: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![source.to_string()];
    lines.push(format!(
        "    {}x{} → {}x{} ({})",
        original.0,
        original.1,
        result.width,
        result.height,
        resize_note(result.resized)
    ));
    lines.push(format!(
        "    Preset: {} {}",
        result.preset, result.preset_label
    ));
    if let Some(path) = written {
        lines.push(format!(
            "    Output: {} ({})",
            path,
            format_size(result.buffer.len())
        ));
    }
    lines
}

pub fn print_normalize_output(
    source: &str,
    original: (u32, u32),
    result: &NormalizationResult,
    written: Option<&str>,
) {
    for line in format_normalize_output(source, original, result, written) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Normalized {
            index,
            source,
            outcome,
        } => vec![
            format!("{} {}", format_index(*index), source),
            format!(
                "    {}x{} → {}x{} {} ({})",
                outcome.source_width,
                outcome.source_height,
                outcome.width,
                outcome.height,
                outcome.preset,
                resize_note(outcome.resized)
            ),
            format!("    URL: {}", outcome.url),
        ],
        PipelineEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}", format_index(*index), source),
            format!("    Failed: {}", error),
        ],
    }
}

/// One-line batch summary.
pub fn format_summary(report: &PipelineReport) -> String {
    format!(
        "Normalized {} of {} images ({} resized, {} failed)",
        report.succeeded(),
        report.items.len(),
        report.resized(),
        report.failed()
    )
}

// ============================================================================
// presets
// ============================================================================

fn preset_row(spec: &PresetSpec, rule: &str) -> String {
    format!("{:<10} {:>9}  {}", spec.name, spec.label, rule)
}

/// Format the preset table.
pub fn format_presets() -> Vec<String> {
    let mut lines = vec![format!("{:<10} {:>9}  {}", "Preset", "Box", "Aspect (w/h)")];
    for spec in &PRESETS {
        let rule = match spec.preset {
            Preset::Portrait => format!("< {PORTRAIT_BELOW}"),
            Preset::Landscape => format!("> {LANDSCAPE_ABOVE}"),
            Preset::Square => format!("{PORTRAIT_BELOW} ..= {LANDSCAPE_ABOVE}"),
        };
        lines.push(preset_row(spec, &rule));
    }
    lines
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Format;
    use crate::pipeline::{ItemResult, PipelineError, PipelineOutcome, Source};

    fn outcome(resized: bool) -> PipelineOutcome {
        PipelineOutcome {
            url: "mem://abc.png".into(),
            source_width: 3000,
            source_height: 1500,
            width: 1152,
            height: 576,
            resized,
            preset: Preset::Landscape,
            preset_label: "1152x896",
            content_type: "image/png",
            bytes: 10,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(0), "001");
        assert_eq!(format_index(41), "042");
        assert_eq!(format_index(999), "1000");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    #[test]
    fn normalize_output_resized_with_file() {
        let result = NormalizationResult {
            buffer: vec![0; 2048],
            source_width: 3000,
            source_height: 1500,
            width: 1152,
            height: 576,
            resized: true,
            preset: Preset::Landscape,
            preset_label: "1152x896",
            format: Format::Png,
            content_type: "image/png",
        };
        let lines = format_normalize_output("a.png", (3000, 1500), &result, Some("out.png"));
        assert_eq!(
            lines,
            vec![
                "a.png",
                "    3000x1500 → 1152x576 (resized)",
                "    Preset: landscape 1152x896",
                "    Output: out.png (2 KB)",
            ]
        );
    }

    #[test]
    fn normalize_output_pass_through_without_file() {
        let result = NormalizationResult {
            buffer: vec![],
            source_width: 500,
            source_height: 500,
            width: 500,
            height: 500,
            resized: false,
            preset: Preset::Square,
            preset_label: "1024x1024",
            format: Format::Jpeg,
            content_type: "image/jpeg",
        };
        let lines = format_normalize_output("b.jpg", (500, 500), &result, None);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "    500x500 → 500x500 (unchanged)");
    }

    #[test]
    fn pipeline_event_normalized() {
        let event = PipelineEvent::Normalized {
            index: 0,
            source: Source::parse("https://x.test/a.png"),
            outcome: outcome(true),
        };
        assert_eq!(
            format_pipeline_event(&event),
            vec![
                "001 https://x.test/a.png",
                "    3000x1500 → 1152x576 landscape (resized)",
                "    URL: mem://abc.png",
            ]
        );
    }

    #[test]
    fn pipeline_event_failed() {
        let event = PipelineEvent::Failed {
            index: 2,
            source: Source::parse("b.png"),
            error: "boom".into(),
        };
        assert_eq!(
            format_pipeline_event(&event),
            vec!["003 b.png", "    Failed: boom"]
        );
    }

    #[test]
    fn summary_counts() {
        let report = PipelineReport {
            items: vec![
                ItemResult {
                    index: 0,
                    source: Source::parse("a.png"),
                    result: Ok(outcome(true)),
                },
                ItemResult {
                    index: 1,
                    source: Source::parse("b.png"),
                    result: Ok(outcome(false)),
                },
                ItemResult {
                    index: 2,
                    source: Source::parse("c.png"),
                    result: Err(PipelineError::Io(std::io::Error::other("gone"))),
                },
            ],
        };
        assert_eq!(
            format_summary(&report),
            "Normalized 2 of 3 images (1 resized, 1 failed)"
        );
    }

    #[test]
    fn presets_table_lists_all_presets() {
        let lines = format_presets();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("square"));
        assert!(lines[1].contains("1024x1024"));
        assert!(lines[2].contains("896x1152") && lines[2].contains("< 0.9"));
        assert!(lines[3].contains("1152x896") && lines[3].contains("> 1.1"));
    }
}
