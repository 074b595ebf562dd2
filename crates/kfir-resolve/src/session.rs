//! The lazy resolution session.
//!
//! Resolution happens per unit: a file header, a class header, or a function
//! or property declared directly in a file or class. Each unit is cached with
//! the phase it reached and a map from every syntax node it covers to the
//! element built for it. A request for a shallower or equal phase is served
//! from the cache; a deeper request rebuilds the unit phase by phase and
//! publishes every step.
//!
//! The session is single-threaded (`RefCell` state, `!Sync`). Re-entrant
//! resolution of a (unit, phase) pair already on the stack fails with
//! [`ResolveError::Cycle`]; the builder turns such cycles into error types.

use crate::builder::UnitBuilder;
use crate::builtins;
use crate::cancellation::CancellationFlag;
use crate::query_trace;
use crate::state::{ModuleResolveState, SymbolProvider};
use crate::ResolveError;
use kfir_common::{Atom, ResolveOptions};
use kfir_tree::{
    ConeType, FirDeclarationOrigin, FirElement, FirResolvePhase, Symbol, SymbolArena, SymbolId,
    SymbolKind, SymbolOrigin, SyntaxArena, SyntaxData, SyntaxKind, SyntaxNodeId,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Counters for observing cache behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// `resolve_to` calls from outside the engine.
    pub requests: u64,
    /// Unit lookups served without building.
    pub cache_hits: u64,
    /// Unit builds, one per (unit, phase) step.
    pub unit_builds: u64,
    pub invalidations: u64,
}

/// A unit as last published.
#[derive(Clone)]
pub(crate) struct UnitSnapshot {
    pub(crate) phase: FirResolvePhase,
    pub(crate) root: Arc<FirElement>,
    pub(crate) elements: Arc<FxHashMap<SyntaxNodeId, Arc<FirElement>>>,
}

pub struct ResolveSession {
    syntax: SyntaxArena,
    library_file: SyntaxNodeId,
    options: ResolveOptions,
    cancellation: CancellationFlag,
    symbols: RefCell<SymbolArena>,
    units: RefCell<FxHashMap<SyntaxNodeId, UnitSnapshot>>,
    in_progress: RefCell<FxHashSet<(SyntaxNodeId, FirResolvePhase)>>,
    depth: Cell<u32>,
    stats: Cell<ResolveStats>,
}

/// Marks a (unit, phase) build as in flight for the lifetime of the guard.
struct BuildGuard<'s> {
    session: &'s ResolveSession,
    key: (SyntaxNodeId, FirResolvePhase),
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.session.in_progress.borrow_mut().remove(&self.key);
        self.session
            .depth
            .set(self.session.depth.get().saturating_sub(1));
    }
}

impl ResolveSession {
    /// Create a session over every file in `syntax`. The builtins file is
    /// appended to the arena.
    pub fn new(syntax: SyntaxArena) -> Self {
        Self::with_options(syntax, ResolveOptions::default())
    }

    pub fn with_options(mut syntax: SyntaxArena, options: ResolveOptions) -> Self {
        let library_file = builtins::install(&mut syntax);
        debug!(
            nodes = syntax.len(),
            library_file = library_file.0,
            "created resolve session"
        );
        ResolveSession {
            syntax,
            library_file,
            options,
            cancellation: CancellationFlag::new(),
            symbols: RefCell::new(SymbolArena::new()),
            units: RefCell::new(FxHashMap::default()),
            in_progress: RefCell::new(FxHashSet::default()),
            depth: Cell::new(0),
            stats: Cell::new(ResolveStats::default()),
        }
    }

    #[inline]
    pub fn syntax(&self) -> &SyntaxArena {
        &self.syntax
    }

    #[inline]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    #[inline]
    pub fn stats(&self) -> ResolveStats {
        self.stats.get()
    }

    /// A handle that cancels in-flight and future requests when set.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    #[inline]
    pub fn library_file(&self) -> SyntaxNodeId {
        self.library_file
    }

    /// Every file of the session, the builtins file last.
    pub fn files(&self) -> Vec<SyntaxNodeId> {
        self.syntax
            .ids()
            .filter(|&id| self.syntax.kind(id) == Some(SyntaxKind::File))
            .collect()
    }

    /// Phase the unit containing `node` is cached at, if built.
    pub fn cached_phase(&self, node: SyntaxNodeId) -> Option<FirResolvePhase> {
        let unit = self.syntax.containing_unit(node)?;
        self.units.borrow().get(&unit).map(|snapshot| snapshot.phase)
    }

    /// Drop the cached builds of the unit containing `node`.
    ///
    /// The next request rebuilds from syntax and hands out new elements;
    /// symbols are kept. Returns false when nothing was cached.
    pub fn invalidate(&self, node: SyntaxNodeId) -> bool {
        let Some(unit) = self.syntax.containing_unit(node) else {
            return false;
        };
        let removed = self.units.borrow_mut().remove(&unit).is_some();
        if removed {
            self.bump(|stats| stats.invalidations += 1);
            debug!(unit = unit.0, "invalidated resolution unit");
        }
        removed
    }

    pub fn invalidate_all(&self) {
        let dropped = {
            let mut units = self.units.borrow_mut();
            let dropped = units.len() as u64;
            units.clear();
            dropped
        };
        self.bump(|stats| stats.invalidations += dropped);
    }

    /// Symbol of the declaration at `node`, allocated on first request.
    pub fn declaration_symbol(&self, node: SyntaxNodeId) -> Option<SymbolId> {
        let data = self.syntax.data(node)?;
        let name = data.name()?;
        let kind = match data {
            SyntaxData::Class { .. } => SymbolKind::Class,
            SyntaxData::Function { .. } => SymbolKind::Function,
            SyntaxData::Parameter { .. } => SymbolKind::ValueParameter,
            SyntaxData::Property { .. } if self.syntax.is_resolution_unit(node) => {
                SymbolKind::Property
            }
            SyntaxData::Property { .. } => SymbolKind::LocalVariable,
            _ => return None,
        };
        let containing_class = match self.syntax.parent(node) {
            Some(parent) if self.syntax.kind(parent) == Some(SyntaxKind::Class) => {
                self.declaration_symbol(parent)
            }
            _ => None,
        };
        Some(
            self.symbols
                .borrow_mut()
                .source_symbol(node, name, kind, containing_class),
        )
    }

    fn bump(&self, update: impl FnOnce(&mut ResolveStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    // =========================================================================
    // Engine internals shared with the builder
    // =========================================================================

    pub(crate) fn fake_override_symbol(
        &self,
        owner: SymbolId,
        overridden: SymbolId,
    ) -> Option<SymbolId> {
        self.symbols.borrow_mut().fake_override(owner, overridden)
    }

    /// Declaring syntax node of a source symbol.
    pub(crate) fn symbol_source(&self, symbol: SymbolId) -> Option<SyntaxNodeId> {
        self.symbols.borrow().get(symbol).and_then(Symbol::source)
    }

    pub(crate) fn origin_of(&self, node: SyntaxNodeId) -> FirDeclarationOrigin {
        if self.syntax.containing_file(node) == Some(self.library_file) {
            FirDeclarationOrigin::Library
        } else {
            FirDeclarationOrigin::Source
        }
    }

    /// Top-level class named `name` visible from `file`: the file's own
    /// classes first, then the builtins.
    pub(crate) fn find_class(&self, file: Option<SyntaxNodeId>, name: Atom) -> Option<SyntaxNodeId> {
        file.into_iter()
            .chain(std::iter::once(self.library_file))
            .flat_map(|file| self.top_level(file, name))
            .find(|&node| self.syntax.kind(node) == Some(SyntaxKind::Class))
    }

    /// Top-level declarations of `file` named `name`.
    pub(crate) fn top_level(&self, file: SyntaxNodeId, name: Atom) -> Vec<SyntaxNodeId> {
        match self.syntax.data(file) {
            Some(SyntaxData::File { declarations, .. }) => declarations
                .iter()
                .copied()
                .filter(|&decl| self.syntax.data(decl).and_then(SyntaxData::name) == Some(name))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Type of the builtin class `name`.
    pub(crate) fn builtin_type(&self, name: Atom, nullable: bool) -> ConeType {
        self.find_class(None, name)
            .and_then(|class| self.declaration_symbol(class))
            .map_or_else(
                || ConeType::error(format!("missing builtin {}", self.syntax.resolve_name(name))),
                |symbol| ConeType::Class {
                    symbol,
                    name,
                    nullable,
                },
            )
    }

    pub(crate) fn builtin_class_symbol(&self, name: Atom) -> Option<SymbolId> {
        self.find_class(None, name)
            .and_then(|class| self.declaration_symbol(class))
    }

    /// Element for `node`, with its unit resolved to at least `phase`.
    pub(crate) fn element_at(
        &self,
        node: SyntaxNodeId,
        phase: FirResolvePhase,
    ) -> Result<(Arc<FirElement>, bool), ResolveError> {
        if !self.syntax.contains(node) {
            return Err(ResolveError::UnknownNode(node));
        }
        let unit = self
            .syntax
            .containing_unit(node)
            .ok_or(ResolveError::NoContainingDeclaration(node))?;
        let (snapshot, cache_hit) = self.unit_at(unit, phase)?;
        let element = snapshot
            .elements
            .get(&node)
            .cloned()
            .ok_or(ResolveError::NotMapped {
                node,
                phase: snapshot.phase,
            })?;
        Ok((element, cache_hit))
    }

    /// Snapshot of `unit` at `phase` or deeper, building missing phases.
    pub(crate) fn unit_at(
        &self,
        unit: SyntaxNodeId,
        phase: FirResolvePhase,
    ) -> Result<(UnitSnapshot, bool), ResolveError> {
        let cached = self.units.borrow().get(&unit).cloned();
        let from = match cached {
            Some(snapshot) if snapshot.phase >= phase => {
                self.bump(|stats| stats.cache_hits += 1);
                return Ok((snapshot, true));
            }
            Some(snapshot) => snapshot.phase.next(),
            None => Some(FirResolvePhase::Raw),
        };

        let mut step = from;
        while let Some(current) = step {
            let snapshot = self.build_unit(unit, current)?;
            if current >= phase {
                return Ok((snapshot, false));
            }
            step = current.next();
        }
        Err(ResolveError::NotMapped { node: unit, phase })
    }

    fn build_unit(
        &self,
        unit: SyntaxNodeId,
        phase: FirResolvePhase,
    ) -> Result<UnitSnapshot, ResolveError> {
        if self.cancellation.is_cancelled() {
            debug!(unit = unit.0, phase = %phase, "resolution cancelled");
            return Err(ResolveError::Cancelled);
        }
        let key = (unit, phase);
        if !self.in_progress.borrow_mut().insert(key) {
            return Err(ResolveError::Cycle { unit, phase });
        }
        self.depth.set(self.depth.get() + 1);
        let _guard = BuildGuard { session: self, key };
        if self.depth.get() > self.options.max_resolution_depth {
            return Err(ResolveError::DepthExceeded {
                limit: self.options.max_resolution_depth,
            });
        }

        let span = debug_span!("build_unit", unit = unit.0, phase = %phase);
        let _enter = span.enter();

        let built = UnitBuilder::new(self, unit, phase).build()?;
        let snapshot = UnitSnapshot {
            phase,
            root: built.root,
            elements: Arc::new(built.elements),
        };
        self.bump(|stats| stats.unit_builds += 1);
        query_trace::unit_built(unit, phase, snapshot.elements.len());
        debug!(elements = snapshot.elements.len(), "built resolution unit");

        let mut units = self.units.borrow_mut();
        match units.get(&unit) {
            Some(existing) if existing.phase >= phase => Ok(existing.clone()),
            _ => {
                units.insert(unit, snapshot.clone());
                Ok(snapshot)
            }
        }
    }

    /// Current element of a source declaration, building its unit to `Raw`
    /// if it was never requested.
    fn current_element(&self, node: SyntaxNodeId) -> Result<Arc<FirElement>, ResolveError> {
        self.element_at(node, FirResolvePhase::Raw)
            .map(|(element, _)| element)
    }

    fn fake_override_element(&self, symbol: SymbolId, owner: SymbolId) -> Option<Arc<FirElement>> {
        let class_node = self.symbols.borrow().get(owner)?.source()?;
        let (snapshot, _) = match self.unit_at(class_node, FirResolvePhase::Signatures) {
            Ok(found) => found,
            Err(err) => {
                debug!(symbol = symbol.0, error = %err, "no owning class for fake override");
                return None;
            }
        };
        match &*snapshot.root {
            FirElement::RegularClass(class) => class
                .fake_overrides
                .iter()
                .find(|fake| fake.declaration_symbol() == Some(symbol))
                .cloned(),
            _ => None,
        }
    }
}

impl ModuleResolveState for ResolveSession {
    fn syntax(&self) -> &SyntaxArena {
        &self.syntax
    }

    fn resolve_to(
        &self,
        node: SyntaxNodeId,
        phase: FirResolvePhase,
    ) -> Result<Arc<FirElement>, ResolveError> {
        self.bump(|stats| stats.requests += 1);
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(id) = query_id {
            query_trace::resolve_start(id, node, phase);
        }

        let result = self.element_at(node, phase);

        if let Some(id) = query_id {
            match &result {
                Ok((_, cache_hit)) => {
                    query_trace::resolve_end(id, node, self.cached_phase(node), *cache_hit);
                }
                Err(_) => query_trace::resolve_end(id, node, None, false),
            }
        }
        result.map(|(element, _)| element)
    }
}

impl SymbolProvider for ResolveSession {
    fn symbol(&self, id: SymbolId) -> Option<Symbol> {
        self.symbols.borrow().get(id).cloned()
    }

    fn owning_declaration(&self, id: SymbolId) -> Option<Arc<FirElement>> {
        let symbol = self.symbol(id)?;
        match symbol.origin {
            SymbolOrigin::Source { syntax } => match self.current_element(syntax) {
                Ok(element) => Some(element),
                Err(err) => {
                    debug!(symbol = id.0, error = %err, "owning declaration unavailable");
                    None
                }
            },
            SymbolOrigin::FakeOverride { .. } => {
                self.fake_override_element(id, symbol.containing_class?)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_unit_tests.rs"]
mod tests;
