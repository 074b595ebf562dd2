//! Collaborator contracts consumed by the facade.

use crate::ResolveError;
use kfir_tree::{FirElement, FirResolvePhase, Symbol, SymbolId, SyntaxArena, SyntaxNodeId};
use std::sync::Arc;

/// The resolution engine of one module.
pub trait ModuleResolveState {
    fn syntax(&self) -> &SyntaxArena;

    /// Semantic element of `node`, resolved to at least `phase`.
    ///
    /// Repeated requests return the same allocation until the node's unit is
    /// rebuilt for a deeper phase or invalidated.
    fn resolve_to(
        &self,
        node: SyntaxNodeId,
        phase: FirResolvePhase,
    ) -> Result<Arc<FirElement>, ResolveError>;
}

/// Navigation between symbols and their declarations.
pub trait SymbolProvider {
    fn symbol(&self, id: SymbolId) -> Option<Symbol>;

    /// Declaration that owns `id`, at whatever phase it was last built.
    fn owning_declaration(&self, id: SymbolId) -> Option<Arc<FirElement>>;

    fn overridden_symbol(&self, id: SymbolId) -> Option<SymbolId> {
        self.symbol(id).and_then(|symbol| symbol.overridden_symbol())
    }

    fn is_fake_override(&self, id: SymbolId) -> bool {
        self.symbol(id).is_some_and(|symbol| symbol.is_fake_override())
    }

    /// Whether symbols of this kind can be fake overrides at all.
    fn supports_fake_override(&self, id: SymbolId) -> bool {
        self.symbol(id)
            .is_some_and(|symbol| symbol.kind.supports_fake_override())
    }
}
