//! Tracing configuration for debugging resolution.
//!
//! Output format is chosen by `KFIR_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`, one level per nested unit build
//! - `json`: one JSON object per event
//!
//! ```bash
//! # Which units get built, nested by the request that triggered them
//! KFIR_LOG=kfir_resolve=debug KFIR_LOG_FORMAT=tree cargo test -p kfir-api
//!
//! # Per-request start/end records, for tooling
//! KFIR_LOG=kfir::resolve_json=trace KFIR_LOG_FORMAT=json cargo test
//! ```
//!
//! Nothing is installed unless `KFIR_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a `KFIR_LOG_FORMAT` value; unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        std::env::var("KFIR_LOG_FORMAT")
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }
}

/// `KFIR_LOG` wins over `RUST_LOG`; both use `RUST_LOG` directive syntax.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(directives) = std::env::var("KFIR_LOG") {
        return Some(EnvFilter::builder().parse_lossy(directives));
    }
    std::env::var("RUST_LOG")
        .is_ok()
        .then(EnvFilter::from_default_env)
}

/// Install the global subscriber, writing to stderr.
///
/// Returns `false` when logging is not requested or a subscriber is already
/// installed, so tests may call it repeatedly.
pub fn init_tracing() -> bool {
    let Some(filter) = build_filter() else {
        return false;
    };

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
