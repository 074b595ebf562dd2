//! kfir: lazy, phase-aware semantic resolution for a Kotlin-like frontend.
//!
//! The workspace is split the way the resolution pipeline is layered:
//!
//! - [`common`] (`kfir-common`): interning, well-known names, limits, options
//! - [`tree`] (`kfir-tree`): phases, syntax arena, FIR elements, symbols, types
//! - [`resolve`] (`kfir-resolve`): the engine contracts and [`ResolveSession`]
//! - [`api`] (`kfir-api`): typed accessors, call inspection, override unwinding
//!
//! ```
//! use kfir::{FirFunctionCall, FirResolvePhase, ResolveSession, SyntaxArena};
//! use kfir::tree::{BinaryOp, DeclarationModifiers};
//!
//! let mut arena = SyntaxArena::new();
//! let one = arena.int(1);
//! let zero = arena.int(0);
//! let two = arena.int(2);
//! let range = arena.binary(BinaryOp::RangeTo, zero, two);
//! let check = arena.binary(BinaryOp::In, one, range);
//! let f = arena.function("f", DeclarationModifiers::empty(), vec![], None, Some(check));
//! arena.file("f.kt", vec![f]);
//!
//! let session = ResolveSession::new(arena);
//! let call = kfir::get_or_build_fir_of_type::<FirFunctionCall>(
//!     &session,
//!     check,
//!     FirResolvePhase::DEFAULT,
//! )
//! .unwrap();
//! assert!(kfir::callee_symbol(&call).is_some());
//! ```

pub use kfir_api as api;
pub use kfir_common as common;
pub use kfir_resolve as resolve;
pub use kfir_tree as tree;

pub use kfir_api::{
    FirApiError, KtSymbol, KtSymbolByFirBuilder, callee_symbol, get_or_build_fir,
    get_or_build_fir_of_type, get_or_build_fir_safe, is_implicit_function_call,
    resolved_kt_symbol_of_name_reference, resolved_symbol_of_name_reference,
    unroll_fake_overrides,
};
pub use kfir_common::{Atom, ResolveOptions};
pub use kfir_resolve::{
    CancellationFlag, ModuleResolveState, ResolveError, ResolveSession, SymbolProvider,
};
pub use kfir_tree::{
    Fir, FirElement, FirElementKind, FirFunctionCall, FirProperty, FirResolvePhase,
    FirSimpleFunction, SymbolId, SyntaxArena, SyntaxNodeId,
};

pub mod tracing_config;
