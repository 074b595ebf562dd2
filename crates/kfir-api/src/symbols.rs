//! User-facing symbols built from resolved declarations.
//!
//! A [`KtSymbol`] is a snapshot of one declaration: its kind, name, origin
//! and the element it was built from. The builder memoizes one symbol per
//! [`SymbolId`], so repeated lookups of the same reference share an `Arc`.

use crate::calls::resolved_symbol_of_name_reference;
use kfir_common::Atom;
use kfir_resolve::SymbolProvider;
use kfir_tree::{FirDeclarationOrigin, FirElement, FirReference, SymbolId};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KtSymbolKind {
    Class,
    Function,
    Property,
    ValueParameter,
    LocalVariable,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KtSymbolOrigin {
    Source,
    Library,
    /// An inherited member synthesized in a subclass.
    FakeOverride,
}

impl From<FirDeclarationOrigin> for KtSymbolOrigin {
    fn from(origin: FirDeclarationOrigin) -> Self {
        match origin {
            FirDeclarationOrigin::Source => KtSymbolOrigin::Source,
            FirDeclarationOrigin::Library => KtSymbolOrigin::Library,
            FirDeclarationOrigin::FakeOverride => KtSymbolOrigin::FakeOverride,
        }
    }
}

#[derive(Clone, Debug)]
pub struct KtSymbol {
    pub symbol: SymbolId,
    pub kind: KtSymbolKind,
    pub name: Atom,
    pub origin: KtSymbolOrigin,
    /// The declaration this symbol was built from, at the phase it had then.
    pub fir: Arc<FirElement>,
}

/// Builds and caches [`KtSymbol`]s for one symbol provider.
pub struct KtSymbolByFirBuilder<'a> {
    symbols: &'a dyn SymbolProvider,
    cache: FxHashMap<SymbolId, Arc<KtSymbol>>,
}

impl<'a> KtSymbolByFirBuilder<'a> {
    pub fn new(symbols: &'a dyn SymbolProvider) -> Self {
        KtSymbolByFirBuilder {
            symbols,
            cache: FxHashMap::default(),
        }
    }

    /// Symbol for a declaration element; `None` for non-declarations.
    pub fn build_symbol(&mut self, declaration: &Arc<FirElement>) -> Option<Arc<KtSymbol>> {
        let symbol = declaration.declaration_symbol()?;
        if let Some(cached) = self.cache.get(&symbol) {
            return Some(Arc::clone(cached));
        }
        let (kind, name, origin) = match &**declaration {
            FirElement::RegularClass(class) => (KtSymbolKind::Class, class.name, class.origin),
            FirElement::SimpleFunction(function) => {
                (KtSymbolKind::Function, function.name, function.origin)
            }
            FirElement::Property(property) => {
                let kind = if property.is_local {
                    KtSymbolKind::LocalVariable
                } else {
                    KtSymbolKind::Property
                };
                (kind, property.name, property.origin)
            }
            FirElement::ValueParameter(parameter) => (
                KtSymbolKind::ValueParameter,
                parameter.name,
                FirDeclarationOrigin::Source,
            ),
            _ => return None,
        };
        trace!(symbol = symbol.0, kind = ?kind, "built symbol");
        let built = Arc::new(KtSymbol {
            symbol,
            kind,
            name,
            origin: origin.into(),
            fir: Arc::clone(declaration),
        });
        self.cache.insert(symbol, Arc::clone(&built));
        Some(built)
    }

    /// Symbol for `id`, looking up its owning declaration on a cache miss.
    pub fn symbol_for(&mut self, id: SymbolId) -> Option<Arc<KtSymbol>> {
        if let Some(cached) = self.cache.get(&id) {
            return Some(Arc::clone(cached));
        }
        let declaration = self.symbols.owning_declaration(id)?;
        self.build_symbol(&declaration)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Forget every built symbol, e.g. after the engine invalidated units.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// The symbol a resolved reference points at, built through `builder`.
pub fn resolved_kt_symbol_of_name_reference(
    reference: &FirReference,
    builder: &mut KtSymbolByFirBuilder<'_>,
) -> Option<Arc<KtSymbol>> {
    let symbol = resolved_symbol_of_name_reference(reference)?;
    builder.symbol_for(symbol)
}

#[cfg(test)]
#[path = "tests/symbols_tests.rs"]
mod tests;
