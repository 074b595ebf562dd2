//! Lazy, phase-aware resolution engine.
//!
//! - [`ModuleResolveState`] and [`SymbolProvider`]: the contracts the facade
//!   consumes
//! - [`ResolveSession`]: the reference engine, caching one snapshot per
//!   resolution unit and rebuilding it phase by phase on deeper requests
//! - [`builtins`]: the builtins file every session is seeded with

mod builder;
pub mod builtins;
pub mod cancellation;
pub mod error;
pub(crate) mod query_trace;
pub mod session;
pub mod state;

pub use cancellation::CancellationFlag;
pub use error::ResolveError;
pub use session::{ResolveSession, ResolveStats};
pub use state::{ModuleResolveState, SymbolProvider};
