//! Facade over the lazy resolution engine.
//!
//! Everything here is a thin, stateless layer over two collaborator traits:
//! [`ModuleResolveState`](kfir_resolve::ModuleResolveState) builds elements on
//! demand and [`SymbolProvider`](kfir_resolve::SymbolProvider) navigates from
//! symbols back to declarations.
//!
//! - [`accessors`]: fetch an element at a phase, optionally narrowed to a variant
//! - [`calls`]: callee symbols and implicit `invoke` detection
//! - [`overrides`]: unwind fake overrides to the declaration they copy
//! - [`symbols`]: memoized `KtSymbol`s for resolved references

pub mod accessors;
pub mod calls;
pub mod error;
pub mod overrides;
pub mod symbols;

pub use accessors::{get_or_build_fir, get_or_build_fir_of_type, get_or_build_fir_safe};
pub use calls::{callee_symbol, is_implicit_function_call, resolved_symbol_of_name_reference};
pub use error::{FirApiError, OverrideChainDefect};
pub use overrides::{unroll_fake_overrides, unroll_fake_overrides_with_limit};
pub use symbols::{
    KtSymbol, KtSymbolByFirBuilder, KtSymbolKind, KtSymbolOrigin,
    resolved_kt_symbol_of_name_reference,
};
