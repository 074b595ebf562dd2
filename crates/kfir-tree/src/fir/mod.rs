//! FIR: the resolved counterpart of syntax.
//!
//! `FirElement` is a closed sum type shared as `Arc<FirElement>`. The
//! resolution engine owns every element; callers only ever hold shared
//! references, and identity is `Arc::ptr_eq`.
//!
//! Narrowing to a concrete variant goes through [`Fir::narrow`], the single
//! checked downcast built on [`FirVariant::project`].

mod declarations;
mod expressions;
mod handle;

pub use declarations::*;
pub use expressions::*;
pub use handle::{Fir, FirDeclarationVariant, FirVariant};

use crate::phase::FirResolvePhase;
use crate::symbols::SymbolId;
use crate::syntax::SyntaxNodeId;
use crate::types::FirTypeRef;
use kfir_common::Atom;
use std::fmt;

/// Variant tag of a [`FirElement`], used in diagnostics instead of
/// reflective type names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FirElementKind {
    File,
    RegularClass,
    SimpleFunction,
    Property,
    ValueParameter,
    Block,
    FunctionCall,
    QualifiedAccessExpression,
    ThisReceiver,
    ConstExpression,
    IfExpression,
    ReturnExpression,
    TypeRef,
    ErrorExpression,
}

impl FirElementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            FirElementKind::File => "FirFile",
            FirElementKind::RegularClass => "FirRegularClass",
            FirElementKind::SimpleFunction => "FirSimpleFunction",
            FirElementKind::Property => "FirProperty",
            FirElementKind::ValueParameter => "FirValueParameter",
            FirElementKind::Block => "FirBlock",
            FirElementKind::FunctionCall => "FirFunctionCall",
            FirElementKind::QualifiedAccessExpression => "FirQualifiedAccessExpression",
            FirElementKind::ThisReceiver => "FirThisReceiverExpression",
            FirElementKind::ConstExpression => "FirConstExpression",
            FirElementKind::IfExpression => "FirIfExpression",
            FirElementKind::ReturnExpression => "FirReturnExpression",
            FirElementKind::TypeRef => "FirTypeRef",
            FirElementKind::ErrorExpression => "FirErrorExpression",
        }
    }

    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            FirElementKind::RegularClass
                | FirElementKind::SimpleFunction
                | FirElementKind::Property
                | FirElementKind::ValueParameter
        )
    }
}

impl fmt::Display for FirElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FirElement {
    File(FirFile),
    RegularClass(FirRegularClass),
    SimpleFunction(FirSimpleFunction),
    Property(FirProperty),
    ValueParameter(FirValueParameter),
    Block(FirBlock),
    FunctionCall(FirFunctionCall),
    QualifiedAccessExpression(FirQualifiedAccessExpression),
    ThisReceiver(FirThisReceiverExpression),
    ConstExpression(FirConstExpression),
    IfExpression(FirIfExpression),
    ReturnExpression(FirReturnExpression),
    TypeRef(FirTypeRefElement),
    ErrorExpression(FirErrorExpression),
}

impl FirElement {
    pub fn kind(&self) -> FirElementKind {
        match self {
            FirElement::File(_) => FirElementKind::File,
            FirElement::RegularClass(_) => FirElementKind::RegularClass,
            FirElement::SimpleFunction(_) => FirElementKind::SimpleFunction,
            FirElement::Property(_) => FirElementKind::Property,
            FirElement::ValueParameter(_) => FirElementKind::ValueParameter,
            FirElement::Block(_) => FirElementKind::Block,
            FirElement::FunctionCall(_) => FirElementKind::FunctionCall,
            FirElement::QualifiedAccessExpression(_) => FirElementKind::QualifiedAccessExpression,
            FirElement::ThisReceiver(_) => FirElementKind::ThisReceiver,
            FirElement::ConstExpression(_) => FirElementKind::ConstExpression,
            FirElement::IfExpression(_) => FirElementKind::IfExpression,
            FirElement::ReturnExpression(_) => FirElementKind::ReturnExpression,
            FirElement::TypeRef(_) => FirElementKind::TypeRef,
            FirElement::ErrorExpression(_) => FirElementKind::ErrorExpression,
        }
    }

    /// Syntax node this element was built from; `None` for synthetic elements.
    pub fn source(&self) -> Option<SyntaxNodeId> {
        match self {
            FirElement::File(e) => Some(e.source),
            FirElement::RegularClass(e) => Some(e.source),
            FirElement::SimpleFunction(e) => e.source,
            FirElement::Property(e) => e.source,
            FirElement::ValueParameter(e) => e.source,
            FirElement::Block(e) => e.source,
            FirElement::FunctionCall(e) => e.source,
            FirElement::QualifiedAccessExpression(e) => e.source,
            FirElement::ThisReceiver(e) => e.source,
            FirElement::ConstExpression(e) => e.source,
            FirElement::IfExpression(e) => e.source,
            FirElement::ReturnExpression(e) => e.source,
            FirElement::TypeRef(e) => e.source,
            FirElement::ErrorExpression(e) => e.source,
        }
    }

    /// Symbol of a declaration element.
    pub fn declaration_symbol(&self) -> Option<SymbolId> {
        match self {
            FirElement::RegularClass(e) => Some(e.symbol),
            FirElement::SimpleFunction(e) => Some(e.symbol),
            FirElement::Property(e) => Some(e.symbol),
            FirElement::ValueParameter(e) => Some(e.symbol),
            _ => None,
        }
    }

    /// Declared name of a declaration or file element.
    pub fn declaration_name(&self) -> Option<Atom> {
        match self {
            FirElement::File(e) => Some(e.name),
            FirElement::RegularClass(e) => Some(e.name),
            FirElement::SimpleFunction(e) => Some(e.name),
            FirElement::Property(e) => Some(e.name),
            FirElement::ValueParameter(e) => Some(e.name),
            _ => None,
        }
    }

    /// Phase reached by a declaration or file element.
    pub fn resolve_phase(&self) -> Option<FirResolvePhase> {
        match self {
            FirElement::File(e) => Some(e.resolve_phase),
            FirElement::RegularClass(e) => Some(e.resolve_phase),
            FirElement::SimpleFunction(e) => Some(e.resolve_phase),
            FirElement::Property(e) => Some(e.resolve_phase),
            FirElement::ValueParameter(e) => Some(e.resolve_phase),
            _ => None,
        }
    }

    /// Type of an expression, or the declared type of a typed declaration.
    pub fn type_ref(&self) -> Option<&FirTypeRef> {
        match self {
            FirElement::SimpleFunction(e) => Some(&e.return_type_ref),
            FirElement::Property(e) => Some(&e.return_type_ref),
            FirElement::ValueParameter(e) => Some(&e.return_type_ref),
            FirElement::Block(e) => Some(&e.type_ref),
            FirElement::FunctionCall(e) => Some(&e.type_ref),
            FirElement::QualifiedAccessExpression(e) => Some(&e.type_ref),
            FirElement::ThisReceiver(e) => Some(&e.type_ref),
            FirElement::ConstExpression(e) => Some(&e.type_ref),
            FirElement::IfExpression(e) => Some(&e.type_ref),
            FirElement::ReturnExpression(e) => Some(&e.type_ref),
            FirElement::TypeRef(e) => Some(&e.type_ref),
            FirElement::ErrorExpression(e) => Some(&e.type_ref),
            FirElement::File(_) | FirElement::RegularClass(_) => None,
        }
    }
}

/// A name in an expression that refers to a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FirReference {
    /// Not yet resolved: name only.
    Simple { name: Atom },
    Resolved { name: Atom, symbol: SymbolId },
    Error {
        name: Atom,
        diagnostic: ReferenceDiagnostic,
    },
}

impl FirReference {
    #[inline]
    pub fn name(&self) -> Atom {
        match self {
            FirReference::Simple { name }
            | FirReference::Resolved { name, .. }
            | FirReference::Error { name, .. } => *name,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, FirReference::Resolved { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceDiagnostic {
    Unresolved,
    Ambiguous { candidates: usize },
    /// The reference needs a type that is still being inferred.
    Recursive,
}

#[cfg(test)]
#[path = "../tests/fir_tests.rs"]
mod tests;
