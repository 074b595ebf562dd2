use super::FirElement;
use crate::phase::FirResolvePhase;
use crate::symbols::SymbolId;
use crate::syntax::{DeclarationModifiers, SyntaxNodeId};
use crate::types::FirTypeRef;
use kfir_common::Atom;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FirDeclarationOrigin {
    Source,
    /// Declared in the builtins file.
    Library,
    /// Synthesized for an inherited member that the class does not override.
    FakeOverride,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirFile {
    pub source: SyntaxNodeId,
    pub name: Atom,
    pub declarations: Vec<SymbolId>,
    pub resolve_phase: FirResolvePhase,
}

/// A class header.
///
/// Members are listed by symbol: each member is its own resolution unit and
/// is fetched through the symbol layer at whatever phase it has reached.
/// Fake overrides are synthesized with the class and owned by it.
#[derive(Clone, Debug, PartialEq)]
pub struct FirRegularClass {
    pub source: SyntaxNodeId,
    pub symbol: SymbolId,
    pub name: Atom,
    pub status: DeclarationModifiers,
    pub origin: FirDeclarationOrigin,
    pub super_type_refs: Vec<FirTypeRef>,
    pub declarations: Vec<SymbolId>,
    pub fake_overrides: Vec<Arc<FirElement>>,
    pub resolve_phase: FirResolvePhase,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirSimpleFunction {
    pub source: Option<SyntaxNodeId>,
    pub symbol: SymbolId,
    pub name: Atom,
    pub status: DeclarationModifiers,
    pub origin: FirDeclarationOrigin,
    /// Class whose member scope holds the function.
    pub dispatch_receiver_class: Option<SymbolId>,
    pub value_parameters: Vec<Arc<FirElement>>,
    pub return_type_ref: FirTypeRef,
    pub body: Option<Arc<FirElement>>,
    pub resolve_phase: FirResolvePhase,
}

impl FirSimpleFunction {
    #[inline]
    pub fn is_operator(&self) -> bool {
        self.status.contains(DeclarationModifiers::OPERATOR)
    }

    /// Declared types of the value parameters, in order.
    pub fn parameter_type_refs(&self) -> impl Iterator<Item = &FirTypeRef> {
        self.value_parameters.iter().filter_map(|p| match &**p {
            FirElement::ValueParameter(param) => Some(&param.return_type_ref),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirProperty {
    pub source: Option<SyntaxNodeId>,
    pub symbol: SymbolId,
    pub name: Atom,
    pub status: DeclarationModifiers,
    pub origin: FirDeclarationOrigin,
    pub dispatch_receiver_class: Option<SymbolId>,
    pub is_local: bool,
    pub return_type_ref: FirTypeRef,
    pub initializer: Option<Arc<FirElement>>,
    pub resolve_phase: FirResolvePhase,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirValueParameter {
    pub source: Option<SyntaxNodeId>,
    pub symbol: SymbolId,
    pub name: Atom,
    pub return_type_ref: FirTypeRef,
    pub resolve_phase: FirResolvePhase,
}
