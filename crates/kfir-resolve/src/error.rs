use kfir_tree::{FirResolvePhase, SyntaxNodeId};

/// Failures of the resolution engine.
///
/// Expected absence (an unresolved name, a type mismatch) is never an error:
/// it is encoded in the tree as an error reference or error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("syntax node {0:?} does not belong to this session")]
    UnknownNode(SyntaxNodeId),
    #[error("syntax node {0:?} has no containing declaration or file")]
    NoContainingDeclaration(SyntaxNodeId),
    #[error("syntax node {node:?} has no semantic counterpart at phase {phase}")]
    NotMapped {
        node: SyntaxNodeId,
        phase: FirResolvePhase,
    },
    #[error("cyclic resolution of {unit:?} to phase {phase}")]
    Cycle {
        unit: SyntaxNodeId,
        phase: FirResolvePhase,
    },
    #[error("resolution depth limit of {limit} exceeded")]
    DepthExceeded { limit: u32 },
    #[error("resolution was cancelled")]
    Cancelled,
}

impl ResolveError {
    /// Cycles are recovered from locally by the builder (as error types);
    /// every other error aborts the request.
    #[inline]
    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolveError::Cycle { .. })
    }
}
