//! Syntax and semantic trees for kfir.
//!
//! - [`phase`]: ordered resolution depths
//! - [`syntax`]: the syntax arena (`SyntaxNodeId` handles, parent links, text)
//! - [`symbols`]: stable symbol handles and the symbol arena
//! - [`types`]: cone types and type references
//! - [`fir`]: the closed FIR element sum type and the typed `Fir<E>` handle

pub mod fir;
pub mod phase;
pub mod symbols;
pub mod syntax;
pub mod types;

pub use fir::*;
pub use phase::FirResolvePhase;
pub use symbols::{Symbol, SymbolArena, SymbolId, SymbolKind, SymbolOrigin};
pub use syntax::{BinaryOp, DeclarationModifiers, SyntaxArena, SyntaxData, SyntaxKind, SyntaxNodeId};
pub use types::{ConeType, FirTypeRef};
