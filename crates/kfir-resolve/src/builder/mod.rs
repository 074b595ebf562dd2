//! Builds one resolution unit at one phase, from syntax.
//!
//! | Phase | Declarations | Bodies and initializers |
//! |-------|--------------|-------------------------|
//! | `Raw` | unresolved type refs | simple references, implicit types |
//! | `Signatures` | explicit types, supertypes, fake overrides | as `Raw` |
//! | `Types` | implicit property types inferred | resolved only where inference needs it |
//! | `BodyResolve` | as `Types` | fully resolved |
//!
//! Operators are desugared at every phase, so the shape of a body never
//! changes between phases; only references and types fill in.

mod body;
mod calls;

use crate::session::ResolveSession;
use crate::ResolveError;
use kfir_common::{Atom, StandardClassNames};
use kfir_tree::{
    ConeType, DeclarationModifiers, FirDeclarationOrigin, FirElement, FirFile, FirProperty,
    FirRegularClass, FirResolvePhase, FirSimpleFunction, FirTypeRef, FirTypeRefElement,
    FirValueParameter, SymbolId, SymbolKind, SyntaxArena, SyntaxData, SyntaxKind, SyntaxNodeId,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

pub(crate) use body::LocalScope;

pub(crate) struct BuiltUnit {
    pub(crate) root: Arc<FirElement>,
    pub(crate) elements: FxHashMap<SyntaxNodeId, Arc<FirElement>>,
}

pub(crate) struct UnitBuilder<'s> {
    session: &'s ResolveSession,
    syntax: &'s SyntaxArena,
    unit: SyntaxNodeId,
    phase: FirResolvePhase,
    file: Option<SyntaxNodeId>,
    /// Class whose members are in implicit-`this` scope.
    this_class: Option<(SymbolId, Atom)>,
    /// Whether expressions get references and types resolved.
    resolving: bool,
    scopes: Vec<LocalScope>,
    elements: FxHashMap<SyntaxNodeId, Arc<FirElement>>,
}

/// Override-matching key: name plus parameter types as (class name, nullable).
type SignatureKey = (Atom, SymbolKind, SmallVec<[(Atom, bool); 4]>);

/// Map a cycle to `None`; every other error propagates.
fn recover<T>(result: Result<T, ResolveError>) -> Result<Option<T>, ResolveError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_cycle() => {
            trace!(error = %err, "recovered from resolution cycle");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl<'s> UnitBuilder<'s> {
    pub(crate) fn new(session: &'s ResolveSession, unit: SyntaxNodeId, phase: FirResolvePhase) -> Self {
        let syntax = session.syntax();
        UnitBuilder {
            session,
            syntax,
            unit,
            phase,
            file: syntax.containing_file(unit),
            this_class: None,
            resolving: false,
            scopes: Vec::new(),
            elements: FxHashMap::default(),
        }
    }

    #[inline]
    fn signatures(&self) -> bool {
        self.phase >= FirResolvePhase::Signatures
    }

    #[inline]
    fn types(&self) -> bool {
        self.phase >= FirResolvePhase::Types
    }

    #[inline]
    fn bodies(&self) -> bool {
        self.phase >= FirResolvePhase::BodyResolve
    }

    fn record(&mut self, node: SyntaxNodeId, element: Arc<FirElement>) -> Arc<FirElement> {
        self.elements.insert(node, Arc::clone(&element));
        element
    }

    fn symbol_of(&self, node: SyntaxNodeId) -> Result<SymbolId, ResolveError> {
        self.session
            .declaration_symbol(node)
            .ok_or(ResolveError::NotMapped {
                node,
                phase: self.phase,
            })
    }

    pub(crate) fn build(mut self) -> Result<BuiltUnit, ResolveError> {
        let syntax = self.syntax;
        let unit = self.unit;
        let data = syntax.data(unit).ok_or(ResolveError::UnknownNode(unit))?;
        let root = match data {
            SyntaxData::File { name, declarations } => self.build_file(*name, declarations)?,
            SyntaxData::Class {
                name,
                modifiers,
                supertypes,
                members,
            } => self.build_class(*name, *modifiers, supertypes, members)?,
            SyntaxData::Function { .. } => {
                self.enter_member_scope();
                self.build_function(unit)?
            }
            SyntaxData::Property { .. } => {
                self.enter_member_scope();
                self.build_property(unit)?
            }
            _ => return Err(ResolveError::NoContainingDeclaration(unit)),
        };
        let root = self.record(unit, root);
        Ok(BuiltUnit {
            root,
            elements: self.elements,
        })
    }

    fn enter_member_scope(&mut self) {
        let Some(class) = self.syntax.parent(self.unit) else {
            return;
        };
        if self.syntax.kind(class) != Some(SyntaxKind::Class) {
            return;
        }
        let name = self.syntax.data(class).and_then(SyntaxData::name);
        if let (Some(symbol), Some(name)) = (self.session.declaration_symbol(class), name) {
            self.this_class = Some((symbol, name));
        }
    }

    fn build_file(
        &mut self,
        name: Atom,
        declarations: &[SyntaxNodeId],
    ) -> Result<Arc<FirElement>, ResolveError> {
        let declarations = declarations
            .iter()
            .map(|&decl| self.symbol_of(decl))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(FirElement::File(FirFile {
            source: self.unit,
            name,
            declarations,
            resolve_phase: self.phase,
        })))
    }

    // =========================================================================
    // Classes and fake overrides
    // =========================================================================

    fn build_class(
        &mut self,
        name: Atom,
        modifiers: DeclarationModifiers,
        supertypes: &[SyntaxNodeId],
        members: &[SyntaxNodeId],
    ) -> Result<Arc<FirElement>, ResolveError> {
        let symbol = self.symbol_of(self.unit)?;
        let origin = self.session.origin_of(self.unit);

        let mut super_type_refs = supertypes
            .iter()
            .map(|&node| self.type_ref(node))
            .collect::<Vec<_>>();
        let is_root = origin == FirDeclarationOrigin::Library && name == StandardClassNames::ANY;
        if self.signatures() && super_type_refs.is_empty() && !is_root {
            super_type_refs.push(FirTypeRef::Resolved(
                self.session.builtin_type(StandardClassNames::ANY, false),
            ));
        }

        let mut fake_overrides = Vec::new();
        if self.signatures() {
            for type_ref in &mut super_type_refs {
                let Some(super_class) = self.super_class_node(type_ref) else {
                    continue;
                };
                match recover(self.session.unit_at(super_class, FirResolvePhase::Signatures))? {
                    Some((snapshot, _)) => {
                        self.inherit_members(symbol, members, &snapshot.root, &mut fake_overrides)?;
                    }
                    None => {
                        let rendered = type_ref.render(self.syntax.interner());
                        *type_ref = FirTypeRef::Resolved(ConeType::error(format!(
                            "cyclic supertype {rendered}"
                        )));
                    }
                }
            }
        }

        let declarations = members
            .iter()
            .map(|&member| self.symbol_of(member))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arc::new(FirElement::RegularClass(FirRegularClass {
            source: self.unit,
            symbol,
            name,
            status: modifiers,
            origin,
            super_type_refs,
            declarations,
            fake_overrides,
            resolve_phase: self.phase,
        })))
    }

    fn super_class_node(&self, type_ref: &FirTypeRef) -> Option<SyntaxNodeId> {
        let symbol = type_ref.cone_type()?.class_symbol()?;
        self.session.symbol_source(symbol)
    }

    /// Synthesize fake overrides in `owner` for the members of `super_class`
    /// that `owner` does not redeclare.
    fn inherit_members(
        &self,
        owner: SymbolId,
        own_members: &[SyntaxNodeId],
        super_class: &FirElement,
        out: &mut Vec<Arc<FirElement>>,
    ) -> Result<(), ResolveError> {
        let FirElement::RegularClass(super_class) = super_class else {
            return Ok(());
        };
        let own_keys = own_members
            .iter()
            .filter_map(|&member| self.syntax_signature(member))
            .collect::<SmallVec<[SignatureKey; 8]>>();

        let mut inherited: Vec<Arc<FirElement>> = Vec::new();
        for &member_symbol in &super_class.declarations {
            let Some(source) = self.session.symbol_source(member_symbol) else {
                continue;
            };
            if !matches!(
                self.syntax.kind(source),
                Some(SyntaxKind::Function | SyntaxKind::Property)
            ) {
                continue;
            }
            if let Some((element, _)) =
                recover(self.session.element_at(source, FirResolvePhase::Signatures))?
            {
                inherited.push(element);
            }
        }
        inherited.extend(super_class.fake_overrides.iter().cloned());

        for base in inherited {
            let Some(key) = Self::element_signature(&base) else {
                continue;
            };
            if own_keys.contains(&key) {
                continue;
            }
            let Some(base_symbol) = base.declaration_symbol() else {
                continue;
            };
            let Some(symbol) = self.session.fake_override_symbol(owner, base_symbol) else {
                continue;
            };
            if out.iter().any(|fake| fake.declaration_symbol() == Some(symbol)) {
                continue;
            }
            if let Some(fake) = self.fake_override(&base, symbol, owner) {
                out.push(fake);
            }
        }
        Ok(())
    }

    fn fake_override(
        &self,
        base: &FirElement,
        symbol: SymbolId,
        owner: SymbolId,
    ) -> Option<Arc<FirElement>> {
        let element = match base {
            FirElement::SimpleFunction(function) => FirElement::SimpleFunction(FirSimpleFunction {
                source: None,
                symbol,
                origin: FirDeclarationOrigin::FakeOverride,
                dispatch_receiver_class: Some(owner),
                body: None,
                resolve_phase: self.phase,
                ..function.clone()
            }),
            FirElement::Property(property) => FirElement::Property(FirProperty {
                source: None,
                symbol,
                origin: FirDeclarationOrigin::FakeOverride,
                dispatch_receiver_class: Some(owner),
                initializer: None,
                resolve_phase: self.phase,
                ..property.clone()
            }),
            _ => return None,
        };
        Some(Arc::new(element))
    }

    fn syntax_signature(&self, member: SyntaxNodeId) -> Option<SignatureKey> {
        match self.syntax.data(member)? {
            SyntaxData::Function { name, params, .. } => {
                let params = params
                    .iter()
                    .map(|&param| {
                        let type_node = match self.syntax.data(param) {
                            Some(SyntaxData::Parameter { type_ref, .. }) => *type_ref,
                            _ => return (Atom::NONE, false),
                        };
                        match self.syntax.data(type_node) {
                            Some(SyntaxData::TypeRef { name, nullable }) => (*name, *nullable),
                            _ => (Atom::NONE, false),
                        }
                    })
                    .collect();
                Some((*name, SymbolKind::Function, params))
            }
            SyntaxData::Property { name, .. } => {
                Some((*name, SymbolKind::Property, SmallVec::new()))
            }
            _ => None,
        }
    }

    fn element_signature(element: &FirElement) -> Option<SignatureKey> {
        match element {
            FirElement::SimpleFunction(function) => {
                let params = function
                    .parameter_type_refs()
                    .map(|type_ref| match type_ref.cone_type() {
                        Some(ConeType::Class { name, nullable, .. }) => (*name, *nullable),
                        _ => (Atom::NONE, false),
                    })
                    .collect();
                Some((function.name, SymbolKind::Function, params))
            }
            FirElement::Property(property) => {
                Some((property.name, SymbolKind::Property, SmallVec::new()))
            }
            _ => None,
        }
    }

    // =========================================================================
    // Functions and properties
    // =========================================================================

    fn build_function(&mut self, node: SyntaxNodeId) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let Some(SyntaxData::Function {
            name,
            modifiers,
            params,
            return_type,
            body,
        }) = syntax.data(node)
        else {
            return Err(ResolveError::NotMapped {
                node,
                phase: self.phase,
            });
        };
        let symbol = self.symbol_of(node)?;

        self.scopes.push(LocalScope::default());
        let mut value_parameters = Vec::with_capacity(params.len());
        for &param in params {
            value_parameters.push(self.build_parameter(param)?);
        }

        let return_type_ref = match return_type {
            Some(type_node) => self.type_ref(*type_node),
            None if self.signatures() => {
                FirTypeRef::Resolved(self.session.builtin_type(StandardClassNames::UNIT, false))
            }
            None => FirTypeRef::Implicit,
        };

        let body = match body {
            Some(body) => {
                self.resolving = self.bodies();
                let lowered = self.lower_expr(*body);
                self.resolving = false;
                Some(lowered?)
            }
            None => None,
        };
        self.scopes.pop();

        Ok(Arc::new(FirElement::SimpleFunction(FirSimpleFunction {
            source: Some(node),
            symbol,
            name: *name,
            status: *modifiers,
            origin: self.session.origin_of(node),
            dispatch_receiver_class: self.this_class.map(|(class, _)| class),
            value_parameters,
            return_type_ref,
            body,
            resolve_phase: self.phase,
        })))
    }

    fn build_parameter(&mut self, node: SyntaxNodeId) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let Some(SyntaxData::Parameter { name, type_ref }) = syntax.data(node) else {
            return Err(ResolveError::NotMapped {
                node,
                phase: self.phase,
            });
        };
        let symbol = self.symbol_of(node)?;
        let return_type_ref = self.type_ref(*type_ref);
        let element = Arc::new(FirElement::ValueParameter(FirValueParameter {
            source: Some(node),
            symbol,
            name: *name,
            return_type_ref,
            resolve_phase: self.phase,
        }));
        self.declare_local(*name, symbol, &element);
        Ok(self.record(node, element))
    }

    fn build_property(&mut self, node: SyntaxNodeId) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let Some(SyntaxData::Property {
            name,
            modifiers,
            type_ref,
            initializer,
        }) = syntax.data(node)
        else {
            return Err(ResolveError::NotMapped {
                node,
                phase: self.phase,
            });
        };
        let symbol = self.symbol_of(node)?;
        let declared = type_ref.map(|type_node| self.type_ref(type_node));

        // An implicit type needs the initializer resolved from `Types` on.
        self.resolving = self.bodies() || (self.types() && declared.is_none());
        let lowered = initializer.map(|init| self.lower_expr(init)).transpose();
        self.resolving = false;
        let initializer = lowered?;

        let return_type_ref = match declared {
            Some(declared) => declared,
            None if self.types() => Self::inferred_type(initializer.as_deref()),
            None => FirTypeRef::Implicit,
        };

        Ok(Arc::new(FirElement::Property(FirProperty {
            source: Some(node),
            symbol,
            name: *name,
            status: *modifiers,
            origin: self.session.origin_of(node),
            dispatch_receiver_class: self.this_class.map(|(class, _)| class),
            is_local: false,
            return_type_ref,
            initializer,
            resolve_phase: self.phase,
        })))
    }

    fn inferred_type(initializer: Option<&FirElement>) -> FirTypeRef {
        match initializer.and_then(FirElement::type_ref) {
            Some(FirTypeRef::Resolved(cone)) => FirTypeRef::Resolved(cone.clone()),
            Some(_) => FirTypeRef::Resolved(ConeType::error("cannot infer type")),
            None => FirTypeRef::Resolved(ConeType::error("no initializer to infer type from")),
        }
    }

    // =========================================================================
    // Type references
    // =========================================================================

    /// Lower a type annotation; resolved from `Signatures` on.
    fn type_ref(&mut self, node: SyntaxNodeId) -> FirTypeRef {
        let type_ref = match self.syntax.data(node) {
            Some(SyntaxData::TypeRef { name, nullable }) if self.signatures() => {
                FirTypeRef::Resolved(self.resolve_type_name(*name, *nullable))
            }
            Some(SyntaxData::TypeRef { name, nullable }) => FirTypeRef::Unresolved {
                name: *name,
                nullable: *nullable,
            },
            _ => FirTypeRef::Resolved(ConeType::error("not a type")),
        };
        self.record(
            node,
            Arc::new(FirElement::TypeRef(FirTypeRefElement {
                source: Some(node),
                type_ref: type_ref.clone(),
            })),
        );
        type_ref
    }

    fn resolve_type_name(&self, name: Atom, nullable: bool) -> ConeType {
        let symbol = self
            .session
            .find_class(self.file, name)
            .and_then(|class| self.session.declaration_symbol(class));
        match symbol {
            Some(symbol) => ConeType::Class {
                symbol,
                name,
                nullable,
            },
            None => ConeType::error(format!(
                "unresolved type {}",
                self.syntax.resolve_name(name)
            )),
        }
    }

    fn this_type(&self) -> Option<ConeType> {
        self.this_class.map(|(symbol, name)| ConeType::Class {
            symbol,
            name,
            nullable: false,
        })
    }
}
