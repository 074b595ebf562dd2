//! Navigation from calls and references to the symbols they resolve to.

use kfir_common::OperatorNameConventions;
use kfir_resolve::SymbolProvider;
use kfir_tree::{FirElement, FirFunctionCall, FirReference, SymbolId};

/// Whether `call` is an `invoke` call on a callable-valued receiver, as in
/// `f(x)` where `f` is a variable. An explicit `f.invoke(x)` also counts.
///
/// Never fails: an unresolved callee or a missing declaration is `false`.
pub fn is_implicit_function_call(
    call: &FirFunctionCall,
    symbols: &(impl SymbolProvider + ?Sized),
) -> bool {
    if !matches!(
        call.dispatch_receiver.as_deref(),
        Some(FirElement::QualifiedAccessExpression(_))
    ) {
        return false;
    }
    let Some(symbol) = callee_symbol(call) else {
        return false;
    };
    match symbols.owning_declaration(symbol).as_deref() {
        Some(FirElement::SimpleFunction(function)) => {
            function.name == OperatorNameConventions::INVOKE
        }
        _ => false,
    }
}

#[inline]
pub fn callee_symbol(call: &FirFunctionCall) -> Option<SymbolId> {
    resolved_symbol_of_name_reference(&call.callee_reference)
}

/// `Some` only for a `Resolved` reference.
#[inline]
pub fn resolved_symbol_of_name_reference(reference: &FirReference) -> Option<SymbolId> {
    match reference {
        FirReference::Resolved { symbol, .. } => Some(*symbol),
        FirReference::Simple { .. } | FirReference::Error { .. } => None,
    }
}

#[cfg(test)]
#[path = "tests/calls_tests.rs"]
mod tests;
