//! Symbols: stable handles to the semantic identity of declarations.
//!
//! A symbol outlives every FIR rebuild of its declaration. Source symbols are
//! keyed by their declaring syntax node; fake-override symbols are keyed by
//! the (class, inherited member) pair that produced them, so repeated builds
//! of a class hand out the same ids.

use crate::syntax::SyntaxNodeId;
use kfir_common::Atom;
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Function,
    Property,
    ValueParameter,
    LocalVariable,
}

impl SymbolKind {
    /// Only callable members can be inherited as fake overrides.
    pub const fn supports_fake_override(self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Property)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// Declared in source (including the builtins file).
    Source { syntax: SyntaxNodeId },
    /// Synthesized in `owner` for an inherited member.
    FakeOverride { overridden: SymbolId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: Atom,
    pub kind: SymbolKind,
    pub origin: SymbolOrigin,
    /// Class whose member scope declares this symbol.
    pub containing_class: Option<SymbolId>,
}

impl Symbol {
    #[inline]
    pub fn is_fake_override(&self) -> bool {
        matches!(self.origin, SymbolOrigin::FakeOverride { .. })
    }

    #[inline]
    pub fn overridden_symbol(&self) -> Option<SymbolId> {
        match self.origin {
            SymbolOrigin::FakeOverride { overridden } => Some(overridden),
            SymbolOrigin::Source { .. } => None,
        }
    }

    #[inline]
    pub fn source(&self) -> Option<SyntaxNodeId> {
        match self.origin {
            SymbolOrigin::Source { syntax } => Some(syntax),
            SymbolOrigin::FakeOverride { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
    by_syntax: FxHashMap<SyntaxNodeId, SymbolId>,
    fake_overrides: FxHashMap<(SymbolId, SymbolId), SymbolId>,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Allocate a symbol with no stable key.
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        self.push(symbol)
    }

    /// Symbol declared by `syntax`, allocated on first request.
    pub fn source_symbol(
        &mut self,
        syntax: SyntaxNodeId,
        name: Atom,
        kind: SymbolKind,
        containing_class: Option<SymbolId>,
    ) -> SymbolId {
        if let Some(&existing) = self.by_syntax.get(&syntax) {
            return existing;
        }
        let id = self.push(Symbol {
            name,
            kind,
            origin: SymbolOrigin::Source { syntax },
            containing_class,
        });
        self.by_syntax.insert(syntax, id);
        id
    }

    #[inline]
    pub fn symbol_for_syntax(&self, syntax: SyntaxNodeId) -> Option<SymbolId> {
        self.by_syntax.get(&syntax).copied()
    }

    /// Fake override of `overridden` inside `owner`, allocated on first request.
    ///
    /// Returns `None` when `overridden` is unknown.
    pub fn fake_override(&mut self, owner: SymbolId, overridden: SymbolId) -> Option<SymbolId> {
        if let Some(&existing) = self.fake_overrides.get(&(owner, overridden)) {
            return Some(existing);
        }
        let base = self.get(overridden)?;
        let symbol = Symbol {
            name: base.name,
            kind: base.kind,
            origin: SymbolOrigin::FakeOverride { overridden },
            containing_class: Some(owner),
        };
        let id = self.push(symbol);
        self.fake_overrides.insert((owner, overridden), id);
        Some(id)
    }
}
