//! Fake-override unwinding.
//!
//! A fake override is the copy of an inherited member that a class's member
//! scope synthesizes. Its symbol points at the member it copies, which may
//! itself be a fake override one level further up the hierarchy.

use crate::{FirApiError, OverrideChainDefect};
use kfir_common::limits::MAX_FAKE_OVERRIDE_CHAIN;
use kfir_resolve::SymbolProvider;
use kfir_tree::{Fir, FirDeclarationVariant};
use tracing::trace;

/// The declaration `declaration` was copied from, or `declaration` itself if
/// it is not a fake override.
///
/// The result has the same variant as the input: unwinding a function never
/// yields a property.
pub fn unroll_fake_overrides<D: FirDeclarationVariant>(
    declaration: Fir<D>,
    symbols: &(impl SymbolProvider + ?Sized),
) -> Result<Fir<D>, FirApiError> {
    unroll_fake_overrides_with_limit(declaration, symbols, MAX_FAKE_OVERRIDE_CHAIN)
}

/// [`unroll_fake_overrides`] following at most `limit` overridden links.
///
/// Chains are not checked for cycles; a cyclic chain runs into the limit.
pub fn unroll_fake_overrides_with_limit<D: FirDeclarationVariant>(
    declaration: Fir<D>,
    symbols: &(impl SymbolProvider + ?Sized),
    limit: u32,
) -> Result<Fir<D>, FirApiError> {
    let start = declaration.symbol();
    if !symbols.supports_fake_override(start) || !symbols.is_fake_override(start) {
        return Ok(declaration);
    }

    let mut current = start;
    let mut links = 0u32;
    while symbols.supports_fake_override(current) && symbols.is_fake_override(current) {
        if links >= limit {
            return Err(FirApiError::OverrideChainTooLong { start, limit });
        }
        current = symbols
            .overridden_symbol(current)
            .ok_or(FirApiError::MalformedOverrideChain {
                symbol: current,
                defect: OverrideChainDefect::MissingOverridden,
            })?;
        links += 1;
    }

    let terminal = symbols
        .owning_declaration(current)
        .ok_or(FirApiError::MalformedOverrideChain {
            symbol: current,
            defect: OverrideChainDefect::MissingDeclaration,
        })?;
    trace!(
        start = start.0,
        terminal = current.0,
        links,
        "unrolled fake override"
    );
    Fir::<D>::narrow(terminal).map_err(|other| FirApiError::MalformedOverrideChain {
        symbol: current,
        defect: OverrideChainDefect::VariantMismatch {
            expected: D::KIND,
            actual: other.kind(),
        },
    })
}

#[cfg(test)]
#[path = "tests/overrides_tests.rs"]
mod tests;
