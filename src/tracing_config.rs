//! Tracing configuration for debugging lowering output.
//!
//! Supports three output formats controlled by `ESDOWN_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! The subscriber is only initialised when `ESDOWN_LOG` (or `RUST_LOG`) is
//! set, so there is zero overhead in normal builds. All output goes to stderr
//! so it never interferes with emitted JavaScript on stdout.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse from the `ESDOWN_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        match std::env::var("ESDOWN_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Build an `EnvFilter` from `ESDOWN_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("ESDOWN_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Called once at startup by the embedding compiler driver; the transform
/// itself only emits `tracing` events and never installs a subscriber.
///
/// Does nothing when neither `ESDOWN_LOG` nor `RUST_LOG` is set. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    let has_esdown_log = std::env::var("ESDOWN_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_esdown_log && !has_rust_log {
        return;
    }

    let filter = build_filter();

    let result = match LogFormat::from_env() {
        LogFormat::Tree => {
            let layer = tracing_tree::HierarchicalLayer::new(2)
                .with_writer(std::io::stderr)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(layer).try_init()
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(fmt::format::FmtSpan::ENTER | fmt::format::FmtSpan::CLOSE);
            Registry::default().with(filter).with(layer).try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(layer).try_init()
        }
    };

    // A subscriber may already be installed by the embedding compiler.
    let _ = result;
}
