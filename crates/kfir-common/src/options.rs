//! Resolution session options.
//!
//! Options can be built in code or read from a JSON document using camelCase
//! keys, e.g. `{ "maxResolutionDepth": 64 }`. Missing keys take their
//! defaults from [`crate::limits`].

use crate::limits;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Nested unit resolutions allowed before `DepthExceeded`.
    pub max_resolution_depth: u32,
    /// Fake-override hops followed before `OverrideChainTooLong`.
    pub max_fake_override_chain: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            max_resolution_depth: limits::MAX_RESOLUTION_DEPTH,
            max_fake_override_chain: limits::MAX_FAKE_OVERRIDE_CHAIN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid resolve options: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },
}

impl ResolveOptions {
    /// Parse options from JSON, rejecting zero limits.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        let options: ResolveOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_resolution_depth == 0 {
            return Err(OptionsError::Zero {
                field: "maxResolutionDepth",
            });
        }
        if self.max_fake_override_chain == 0 {
            return Err(OptionsError::Zero {
                field: "maxFakeOverrideChain",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
