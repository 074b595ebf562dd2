//! Resolution phases.

use serde::Serialize;
use std::fmt;

/// Ordered depth of semantic resolution.
///
/// | Phase | What is resolved |
/// |-------|------------------|
/// | `Raw` | tree skeleton, names only |
/// | `Signatures` | supertypes, explicit type annotations, fake overrides |
/// | `Types` | implicit declaration types inferred from initializers |
/// | `BodyResolve` | every reference, call and expression type in bodies |
///
/// Phases are monotonic: an element never goes back to a shallower phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum FirResolvePhase {
    Raw,
    Signatures,
    Types,
    #[default]
    BodyResolve,
}

impl FirResolvePhase {
    /// The phase accessors use unless a caller asks for less.
    pub const DEFAULT: Self = Self::BodyResolve;

    pub const ALL: [Self; 4] = [Self::Raw, Self::Signatures, Self::Types, Self::BodyResolve];

    /// The phase directly after this one, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Raw => Some(Self::Signatures),
            Self::Signatures => Some(Self::Types),
            Self::Types => Some(Self::BodyResolve),
            Self::BodyResolve => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::Signatures => "SIGNATURES",
            Self::Types => "TYPES",
            Self::BodyResolve => "BODY_RESOLVE",
        }
    }
}

impl fmt::Display for FirResolvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
