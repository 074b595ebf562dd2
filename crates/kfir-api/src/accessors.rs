//! Phase-aware element accessors.
//!
//! All three accessors delegate to [`ModuleResolveState::resolve_to`]; they
//! differ only in how they narrow the result. Callers that want the default
//! depth pass [`FirResolvePhase::DEFAULT`].

use crate::FirApiError;
use kfir_resolve::{ModuleResolveState, ResolveError};
use kfir_tree::{Fir, FirElement, FirResolvePhase, FirVariant, SyntaxNodeId};
use std::sync::Arc;
use tracing::trace;

/// The element for `node`, resolved to at least `phase`.
pub fn get_or_build_fir(
    state: &(impl ModuleResolveState + ?Sized),
    node: SyntaxNodeId,
    phase: FirResolvePhase,
) -> Result<Arc<FirElement>, ResolveError> {
    state.resolve_to(node, phase)
}

/// Like [`get_or_build_fir`], but `Ok(None)` when the element is not an `E`.
pub fn get_or_build_fir_safe<E: FirVariant>(
    state: &(impl ModuleResolveState + ?Sized),
    node: SyntaxNodeId,
    phase: FirResolvePhase,
) -> Result<Option<Fir<E>>, ResolveError> {
    let element = state.resolve_to(node, phase)?;
    match Fir::<E>::narrow(element) {
        Ok(fir) => Ok(Some(fir)),
        Err(other) => {
            trace!(
                node = node.0,
                expected = %E::KIND,
                actual = %other.kind(),
                "element kind mismatch"
            );
            Ok(None)
        }
    }
}

/// Like [`get_or_build_fir`], but a kind mismatch is an
/// [`FirApiError::InvalidFirElementType`] carrying the node's source text.
pub fn get_or_build_fir_of_type<E: FirVariant>(
    state: &(impl ModuleResolveState + ?Sized),
    node: SyntaxNodeId,
    phase: FirResolvePhase,
) -> Result<Fir<E>, FirApiError> {
    let element = state.resolve_to(node, phase)?;
    Fir::<E>::narrow(element).map_err(|other| FirApiError::InvalidFirElementType {
        node,
        text: state.syntax().text(node),
        expected: E::KIND,
        actual: other.kind(),
    })
}

#[cfg(test)]
#[path = "tests/accessors_tests.rs"]
mod tests;
