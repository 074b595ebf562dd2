//! Candidate collection, overload selection and subtyping.
//!
//! Unqualified names are looked up level by level: locals, members of the
//! enclosing class (implicit `this`), the containing file, then the builtins.
//! The first level with an applicable candidate wins. Within a level,
//! functions are tried before `invoke` on a callable-valued variable.

use super::{UnitBuilder, recover};
use crate::ResolveError;
use crate::state::SymbolProvider;
use kfir_common::limits::MAX_SUPERTYPE_WALK;
use kfir_common::{Atom, OperatorNameConventions, StandardClassNames};
use kfir_tree::{
    ConeType, FirElement, FirFunctionCall, FirReference, FirResolvePhase, FirTypeRef,
    ReferenceDiagnostic, SymbolId, SymbolKind, SyntaxKind, SyntaxNodeId,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

/// A declaration a name may refer to.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub(crate) symbol: SymbolId,
    pub(crate) element: Arc<FirElement>,
}

impl Candidate {
    pub(crate) fn name(&self) -> Atom {
        self.element.declaration_name().unwrap_or(Atom::NONE)
    }

    pub(crate) fn is_function(&self) -> bool {
        matches!(&*self.element, FirElement::SimpleFunction(_))
    }

    /// Properties, locals and parameters.
    pub(crate) fn is_property(&self) -> bool {
        matches!(
            &*self.element,
            FirElement::Property(_) | FirElement::ValueParameter(_)
        )
    }

    fn parameter_types(&self) -> SmallVec<[ConeType; 4]> {
        match &*self.element {
            FirElement::SimpleFunction(function) => function
                .parameter_type_refs()
                .map(|type_ref| {
                    type_ref
                        .cone_type()
                        .cloned()
                        .unwrap_or_else(|| ConeType::error("unresolved parameter type"))
                })
                .collect(),
            _ => SmallVec::new(),
        }
    }

    fn return_type(&self) -> ConeType {
        self.element
            .type_ref()
            .and_then(FirTypeRef::cone_type)
            .cloned()
            .unwrap_or_else(|| ConeType::error("unresolved return type"))
    }
}

enum Selection {
    Resolved(Candidate),
    Ambiguous(usize),
    Inapplicable,
    NoCandidates,
}

/// Reference, receivers and type of a call, before its arguments are attached.
pub(crate) struct CallResolution {
    reference: FirReference,
    explicit_receiver: Option<Arc<FirElement>>,
    dispatch_receiver: Option<Arc<FirElement>>,
    type_ref: FirTypeRef,
}

impl CallResolution {
    pub(crate) fn simple(name: Atom) -> Self {
        CallResolution {
            reference: FirReference::Simple { name },
            explicit_receiver: None,
            dispatch_receiver: None,
            type_ref: FirTypeRef::Implicit,
        }
    }

    pub(crate) fn failed(name: Atom, diagnostic: ReferenceDiagnostic) -> Self {
        CallResolution {
            reference: FirReference::Error { name, diagnostic },
            explicit_receiver: None,
            dispatch_receiver: None,
            type_ref: FirTypeRef::Resolved(ConeType::error("unresolved call")),
        }
    }

    fn resolved(
        name: Atom,
        candidate: &Candidate,
        explicit_receiver: Option<Arc<FirElement>>,
        dispatch_receiver: Option<Arc<FirElement>>,
    ) -> Self {
        CallResolution {
            reference: FirReference::Resolved {
                name,
                symbol: candidate.symbol,
            },
            explicit_receiver,
            dispatch_receiver,
            type_ref: FirTypeRef::Resolved(candidate.return_type()),
        }
    }

    pub(crate) fn with_explicit(mut self, receiver: Arc<FirElement>) -> Self {
        self.explicit_receiver = Some(receiver);
        self
    }

    pub(crate) fn into_call(
        self,
        source: Option<SyntaxNodeId>,
        arguments: Vec<Arc<FirElement>>,
    ) -> Arc<FirElement> {
        Arc::new(FirElement::FunctionCall(FirFunctionCall {
            source,
            callee_reference: self.reference,
            explicit_receiver: self.explicit_receiver,
            dispatch_receiver: self.dispatch_receiver,
            arguments,
            type_ref: self.type_ref,
        }))
    }
}

/// Keep the more specific failure.
fn merge(current: ReferenceDiagnostic, next: ReferenceDiagnostic) -> ReferenceDiagnostic {
    match current {
        ReferenceDiagnostic::Unresolved => next,
        other => other,
    }
}

impl UnitBuilder<'_> {
    /// The containing file, then the builtins file.
    pub(super) fn lookup_files(&self) -> SmallVec<[SyntaxNodeId; 2]> {
        let library = self.session.library_file();
        let mut files = SmallVec::new();
        if let Some(file) = self.file.filter(|&file| file != library) {
            files.push(file);
        }
        files.push(library);
        files
    }

    /// Members of the class of `receiver` named `name`: declared members and
    /// fake overrides.
    pub(super) fn member_candidates(
        &self,
        receiver: &ConeType,
        name: Atom,
    ) -> Result<SmallVec<[Candidate; 4]>, ResolveError> {
        let mut candidates = SmallVec::new();
        let Some(class_node) = receiver
            .class_symbol()
            .and_then(|class| self.session.symbol_source(class))
        else {
            return Ok(candidates);
        };
        let Some((snapshot, _)) =
            recover(self.session.unit_at(class_node, FirResolvePhase::Signatures))?
        else {
            return Ok(candidates);
        };
        let FirElement::RegularClass(class) = &*snapshot.root else {
            return Ok(candidates);
        };

        for &member in &class.declarations {
            let Some(symbol) = self.session.symbol(member) else {
                continue;
            };
            if symbol.name != name
                || !matches!(symbol.kind, SymbolKind::Function | SymbolKind::Property)
            {
                continue;
            }
            let Some(source) = symbol.source() else {
                continue;
            };
            if let Some((element, _)) =
                recover(self.session.element_at(source, FirResolvePhase::Signatures))?
            {
                candidates.push(Candidate {
                    symbol: member,
                    element,
                });
            }
        }
        for fake in &class.fake_overrides {
            if fake.declaration_name() != Some(name) {
                continue;
            }
            if let Some(symbol) = fake.declaration_symbol() {
                candidates.push(Candidate {
                    symbol,
                    element: Arc::clone(fake),
                });
            }
        }
        Ok(candidates)
    }

    /// Top-level functions and properties of `file` named `name`.
    pub(super) fn top_level_candidates(
        &self,
        file: SyntaxNodeId,
        name: Atom,
    ) -> Result<SmallVec<[Candidate; 4]>, ResolveError> {
        let mut candidates = SmallVec::new();
        for node in self.session.top_level(file, name) {
            if !matches!(
                self.syntax.kind(node),
                Some(SyntaxKind::Function | SyntaxKind::Property)
            ) {
                continue;
            }
            let Some(symbol) = self.session.declaration_symbol(node) else {
                continue;
            };
            if let Some((element, _)) =
                recover(self.session.element_at(node, FirResolvePhase::Signatures))?
            {
                candidates.push(Candidate { symbol, element });
            }
        }
        Ok(candidates)
    }

    /// Resolve `name(arguments)` written without a receiver.
    pub(super) fn resolve_unqualified_call(
        &self,
        callee: SyntaxNodeId,
        name: Atom,
        arguments: &[Arc<FirElement>],
    ) -> Result<CallResolution, ResolveError> {
        let mut failure = ReferenceDiagnostic::Unresolved;

        if let Some(local) = self.lookup_local(name) {
            match self.resolve_in_level(Some(callee), &[local], name, arguments, None, None)? {
                Ok(resolution) => return Ok(resolution),
                Err(diagnostic) => failure = merge(failure, diagnostic),
            }
        }

        if let Some(this_type) = self.this_type() {
            let candidates = self.member_candidates(&this_type, name)?;
            if !candidates.is_empty() {
                let this = self.this_receiver();
                match self.resolve_in_level(
                    Some(callee),
                    &candidates,
                    name,
                    arguments,
                    None,
                    this.as_ref(),
                )? {
                    Ok(resolution) => return Ok(resolution),
                    Err(diagnostic) => failure = merge(failure, diagnostic),
                }
            }
        }

        for file in self.lookup_files() {
            let candidates = self.top_level_candidates(file, name)?;
            if candidates.is_empty() {
                continue;
            }
            match self.resolve_in_level(Some(callee), &candidates, name, arguments, None, None)? {
                Ok(resolution) => return Ok(resolution),
                Err(diagnostic) => failure = merge(failure, diagnostic),
            }
        }

        trace!(
            name = self.syntax.resolve_name(name),
            diagnostic = ?failure,
            "unresolved call"
        );
        Ok(CallResolution::failed(name, failure))
    }

    /// Resolve a call among the candidates of one scope level.
    pub(super) fn resolve_in_level(
        &self,
        source: Option<SyntaxNodeId>,
        candidates: &[Candidate],
        name: Atom,
        arguments: &[Arc<FirElement>],
        explicit_receiver: Option<&Arc<FirElement>>,
        dispatch_receiver: Option<&Arc<FirElement>>,
    ) -> Result<Result<CallResolution, ReferenceDiagnostic>, ResolveError> {
        let mut diagnostic = ReferenceDiagnostic::Unresolved;

        let functions = candidates
            .iter()
            .filter(|candidate| candidate.is_function())
            .cloned()
            .collect::<SmallVec<[Candidate; 4]>>();
        match self.select(&functions, arguments)? {
            Selection::Resolved(function) => {
                return Ok(Ok(CallResolution::resolved(
                    name,
                    &function,
                    explicit_receiver.cloned(),
                    dispatch_receiver.cloned(),
                )));
            }
            Selection::Ambiguous(count) => {
                diagnostic = ReferenceDiagnostic::Ambiguous { candidates: count };
            }
            Selection::Inapplicable | Selection::NoCandidates => {}
        }

        // `name(args)` on a callable-valued variable is `name.invoke(args)`.
        let Some(variable) = candidates.iter().find(|candidate| candidate.is_property()) else {
            return Ok(Err(diagnostic));
        };
        let access = self.variable_access(
            source,
            variable,
            explicit_receiver.cloned(),
            dispatch_receiver.cloned(),
        )?;
        let access_type = Self::expr_cone(&access);
        let invokes = self
            .member_candidates(&access_type, OperatorNameConventions::INVOKE)?
            .into_iter()
            .filter(Candidate::is_function)
            .collect::<SmallVec<[Candidate; 4]>>();
        match self.select(&invokes, arguments)? {
            Selection::Resolved(invoke) => Ok(Ok(CallResolution::resolved(
                OperatorNameConventions::INVOKE,
                &invoke,
                Some(Arc::clone(&access)),
                Some(access),
            ))),
            Selection::Ambiguous(count) => Ok(Err(merge(
                diagnostic,
                ReferenceDiagnostic::Ambiguous { candidates: count },
            ))),
            Selection::Inapplicable | Selection::NoCandidates => Ok(Err(diagnostic)),
        }
    }

    /// Pick the applicable function, breaking ties by specificity.
    fn select(
        &self,
        functions: &[Candidate],
        arguments: &[Arc<FirElement>],
    ) -> Result<Selection, ResolveError> {
        if functions.is_empty() {
            return Ok(Selection::NoCandidates);
        }
        let argument_types = arguments
            .iter()
            .map(|argument| Self::expr_cone(argument))
            .collect::<SmallVec<[ConeType; 4]>>();

        let mut applicable: SmallVec<[(&Candidate, SmallVec<[ConeType; 4]>); 4]> = SmallVec::new();
        for function in functions {
            let parameters = function.parameter_types();
            if parameters.len() != argument_types.len() {
                continue;
            }
            if self.all_subtypes(&argument_types, &parameters)? {
                applicable.push((function, parameters));
            }
        }

        match applicable.len() {
            0 => return Ok(Selection::Inapplicable),
            1 => return Ok(Selection::Resolved(applicable[0].0.clone())),
            _ => {}
        }

        let mut most_specific: SmallVec<[&Candidate; 2]> = SmallVec::new();
        for (i, (candidate, parameters)) in applicable.iter().enumerate() {
            let mut dominates = true;
            for (j, (_, other)) in applicable.iter().enumerate() {
                if i != j && !self.all_subtypes(parameters, other)? {
                    dominates = false;
                    break;
                }
            }
            if dominates {
                most_specific.push(*candidate);
            }
        }
        if let [single] = most_specific.as_slice() {
            return Ok(Selection::Resolved((*single).clone()));
        }
        trace!(
            candidates = applicable.len(),
            "ambiguous overload resolution"
        );
        Ok(Selection::Ambiguous(applicable.len()))
    }

    fn all_subtypes(&self, subs: &[ConeType], sups: &[ConeType]) -> Result<bool, ResolveError> {
        for (sub, sup) in subs.iter().zip(sups) {
            if !self.is_subtype(sub, sup)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Nullable-aware subtyping over class supertypes. Error types are
    /// compatible with everything.
    pub(super) fn is_subtype(&self, sub: &ConeType, sup: &ConeType) -> Result<bool, ResolveError> {
        let (Some(sub_class), Some(sup_class)) = (sub.class_symbol(), sup.class_symbol()) else {
            return Ok(true);
        };
        if sub.is_nullable() && !sup.is_nullable() {
            return Ok(false);
        }
        if sub_class == sup_class
            || Some(sub_class) == self.session.builtin_class_symbol(StandardClassNames::NOTHING)
            || Some(sup_class) == self.session.builtin_class_symbol(StandardClassNames::ANY)
        {
            return Ok(true);
        }

        let mut visited = FxHashSet::default();
        let mut pending = vec![sub_class];
        while let Some(class) = pending.pop() {
            if !visited.insert(class) || visited.len() > MAX_SUPERTYPE_WALK {
                continue;
            }
            for supertype in self.direct_supertypes(class)? {
                if supertype == sup_class {
                    return Ok(true);
                }
                pending.push(supertype);
            }
        }
        Ok(false)
    }

    fn direct_supertypes(&self, class: SymbolId) -> Result<SmallVec<[SymbolId; 2]>, ResolveError> {
        let Some(node) = self.session.symbol_source(class) else {
            return Ok(SmallVec::new());
        };
        let Some((snapshot, _)) = recover(self.session.unit_at(node, FirResolvePhase::Signatures))?
        else {
            return Ok(SmallVec::new());
        };
        Ok(match &*snapshot.root {
            FirElement::RegularClass(class) => class
                .super_type_refs
                .iter()
                .filter_map(|type_ref| type_ref.cone_type()?.class_symbol())
                .collect(),
            _ => SmallVec::new(),
        })
    }

    /// Type of a variable, inferring an implicit declaration type on demand.
    ///
    /// `None` when the type is being inferred further up the stack.
    pub(super) fn variable_type(&self, variable: &Candidate) -> Result<Option<ConeType>, ResolveError> {
        if let Some(cone) = variable.element.type_ref().and_then(FirTypeRef::cone_type) {
            return Ok(Some(cone.clone()));
        }
        let Some(source) = self.source_declaration(variable.symbol) else {
            return Ok(Some(ConeType::error("variable without declaration")));
        };
        let inferred = recover(self.session.element_at(source, FirResolvePhase::Types))?;
        Ok(inferred.map(|(element, _)| {
            element
                .type_ref()
                .and_then(FirTypeRef::cone_type)
                .cloned()
                .unwrap_or_else(|| ConeType::error("implicit type not inferred"))
        }))
    }

    /// Source declaration behind a possibly fake-override symbol.
    fn source_declaration(&self, symbol: SymbolId) -> Option<SyntaxNodeId> {
        let mut current = symbol;
        // `limit` links followed, plus the check on the symbol the last one lands on.
        for _ in 0..=self.session.options().max_fake_override_chain {
            match self.session.overridden_symbol(current) {
                Some(overridden) => current = overridden,
                None => return self.session.symbol_source(current),
            }
        }
        None
    }
}
