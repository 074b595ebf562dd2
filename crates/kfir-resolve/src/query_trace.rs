//! Structured tracing for `resolve_to` requests.
//!
//! Events use target `kfir::resolve_json` and are intended to be consumed with:
//! `KFIR_LOG=kfir::resolve_json=trace KFIR_LOG_FORMAT=json`.
//!
//! Environment:
//! - `KFIR_RESOLVE_RUN_ID`: optional run identifier attached to every event.

use kfir_tree::{FirResolvePhase, SyntaxNodeId};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static RESOLVE_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "kfir::resolve_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    RESOLVE_RUN_ID
        .get_or_init(|| {
            std::env::var("KFIR_RESOLVE_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn resolve_start(query_id: u64, node: SyntaxNodeId, phase: FirResolvePhase) {
    trace!(
        target: "kfir::resolve_json",
        event = "resolve",
        phase = "start",
        run_id = run_id(),
        query_id,
        node = node.0,
        requested_phase = phase.as_str()
    );
}

#[inline]
pub(crate) fn resolve_end(
    query_id: u64,
    node: SyntaxNodeId,
    reached: Option<FirResolvePhase>,
    cache_hit: bool,
) {
    trace!(
        target: "kfir::resolve_json",
        event = "resolve",
        phase = "end",
        run_id = run_id(),
        query_id,
        node = node.0,
        reached_phase = reached.map_or("error", FirResolvePhase::as_str),
        cache_hit
    );
}

#[inline]
pub(crate) fn unit_built(unit: SyntaxNodeId, phase: FirResolvePhase, elements: usize) {
    trace!(
        target: "kfir::resolve_json",
        event = "build",
        run_id = run_id(),
        unit = unit.0,
        built_phase = phase.as_str(),
        elements
    );
}
