//! Centralized limits and thresholds for lazy resolution.
//!
//! Centralizing these values prevents duplicate definitions with inconsistent
//! values and gives [`ResolveOptions`](crate::ResolveOptions) a single source
//! for its defaults.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum number of nested unit resolutions on one call stack.
///
/// Resolving a body resolves the signatures of every callee, which may in turn
/// infer implicit types from other initializers. Each nested request adds a
/// handful of frames; at this depth the engine fails with
/// `ResolveError::DepthExceeded` instead of overflowing the stack.
///
/// # Kotlin example
///
/// ```kotlin
/// val a = b
/// val b = c
/// val c = d
/// // ... hundreds of chained implicit types ...
/// ```
pub const MAX_RESOLUTION_DEPTH: u32 = 128;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of fake-override hops followed when unwinding to the
/// original declaration.
///
/// Real hierarchies are shallow; a chain this long is either cyclic or
/// corrupt. Hitting the cap is reported as `OverrideChainTooLong`, distinct
/// from a chain that ends without a declaration.
///
/// # Kotlin example
///
/// ```kotlin
/// open class A { fun f() {} }
/// open class B : A()   // B.f is a fake override of A.f
/// class C : B()        // C.f is a fake override of B.f
/// ```
pub const MAX_FAKE_OVERRIDE_CHAIN: u32 = 1024;

/// Maximum number of supertypes visited when computing a class's ancestors.
pub const MAX_SUPERTYPE_WALK: usize = 256;
