//! Cone types and type references.

use crate::symbols::SymbolId;
use kfir_common::{Atom, Interner};
use std::sync::Arc;

/// A resolved type: a (possibly nullable) class type, or an error type
/// carrying the reason resolution failed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConeType {
    Class {
        symbol: SymbolId,
        name: Atom,
        nullable: bool,
    },
    Error(Arc<str>),
}

impl ConeType {
    pub fn error(reason: impl Into<Arc<str>>) -> Self {
        ConeType::Error(reason.into())
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, ConeType::Error(_))
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        matches!(self, ConeType::Class { nullable: true, .. })
    }

    #[inline]
    pub fn class_symbol(&self) -> Option<SymbolId> {
        match self {
            ConeType::Class { symbol, .. } => Some(*symbol),
            ConeType::Error(_) => None,
        }
    }

    #[inline]
    pub fn class_name(&self) -> Option<Atom> {
        match self {
            ConeType::Class { name, .. } => Some(*name),
            ConeType::Error(_) => None,
        }
    }

    /// Kotlin-style rendering, e.g. `Int?` or `<ERROR: reason>`.
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            ConeType::Class { name, nullable, .. } => {
                let mut out = interner.resolve(*name).to_string();
                if *nullable {
                    out.push('?');
                }
                out
            }
            ConeType::Error(reason) => format!("<ERROR: {reason}>"),
        }
    }
}

/// A type position in the FIR tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FirTypeRef {
    /// Written in source, not yet resolved.
    Unresolved { name: Atom, nullable: bool },
    /// Not written in source; inferred later.
    Implicit,
    Resolved(ConeType),
}

impl FirTypeRef {
    #[inline]
    pub fn cone_type(&self) -> Option<&ConeType> {
        match self {
            FirTypeRef::Resolved(cone) => Some(cone),
            _ => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, FirTypeRef::Resolved(_))
    }

    pub fn render(&self, interner: &Interner) -> String {
        match self {
            FirTypeRef::Unresolved { name, nullable } => {
                let mut out = format!("<unresolved: {}", interner.resolve(*name));
                if *nullable {
                    out.push('?');
                }
                out.push('>');
                out
            }
            FirTypeRef::Implicit => "<implicit>".to_string(),
            FirTypeRef::Resolved(cone) => cone.render(interner),
        }
    }
}

impl From<ConeType> for FirTypeRef {
    fn from(cone: ConeType) -> Self {
        FirTypeRef::Resolved(cone)
    }
}
