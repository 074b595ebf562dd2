//! Common types and utilities for the kfir resolution frontend.
//!
//! This crate provides foundational types used across all kfir crates:
//! - String interning (`Atom`, `Interner`)
//! - Well-known names (`OperatorNameConventions`, `StandardClassNames`)
//! - Resolution limits and thresholds
//! - Session options (`ResolveOptions`)

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Fixed name tables shared by the engine and the facade
pub mod names;
pub use names::{OperatorNameConventions, StandardClassNames};

// Centralized limits and thresholds
pub mod limits;

// Session configuration
pub mod options;
pub use options::{OptionsError, ResolveOptions};
