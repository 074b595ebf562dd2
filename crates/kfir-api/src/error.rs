use kfir_resolve::ResolveError;
use kfir_tree::{FirElementKind, SymbolId, SyntaxNodeId};

/// What is wrong with a fake-override chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OverrideChainDefect {
    #[error("fake override has no overridden symbol")]
    MissingOverridden,
    #[error("terminal symbol has no owning declaration")]
    MissingDeclaration,
    #[error("terminal declaration is a {actual}, expected {expected}")]
    VariantMismatch {
        expected: FirElementKind,
        actual: FirElementKind,
    },
}

/// Failures of the facade.
///
/// Engine failures pass through unchanged as [`FirApiError::Resolve`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FirApiError {
    #[error("for {node:?} with text `{text}` a {expected} was expected, but {actual} was found")]
    InvalidFirElementType {
        node: SyntaxNodeId,
        text: String,
        expected: FirElementKind,
        actual: FirElementKind,
    },
    #[error("malformed fake override chain at {symbol:?}: {defect}")]
    MalformedOverrideChain {
        symbol: SymbolId,
        defect: OverrideChainDefect,
    },
    #[error("fake override chain from {start:?} is longer than {limit}")]
    OverrideChainTooLong { start: SymbolId, limit: u32 },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl FirApiError {
    /// The engine error behind this failure, if any.
    pub fn as_resolve_error(&self) -> Option<&ResolveError> {
        match self {
            FirApiError::Resolve(err) => Some(err),
            _ => None,
        }
    }
}
