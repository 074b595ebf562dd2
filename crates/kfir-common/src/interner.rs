//! Name interning.
//!
//! Every identifier in a syntax arena is stored once and referred to by an
//! [`Atom`]. The well-known names of [`crate::names`] are pre-seeded in table
//! order, so `OperatorNameConventions::INVOKE` is the same atom in every
//! interner and name checks against them never touch a string.

use crate::names::KNOWN_NAMES;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Handle of an interned name. `Atom::NONE` is the empty name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Atom::NONE
    }
}

/// Deduplicating name table.
///
/// ```
/// use kfir_common::{Interner, OperatorNameConventions};
/// let mut names = Interner::new();
/// let x = names.intern("x");
/// assert_eq!(names.intern("x"), x);
/// assert_eq!(names.resolve(x), "x");
/// assert_eq!(names.intern("invoke"), OperatorNameConventions::INVOKE);
/// ```
#[derive(Clone)]
pub struct Interner {
    atoms: FxHashMap<Arc<str>, Atom>,
    /// Indexed by atom; slot 0 is the empty name.
    names: Vec<Arc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        let mut interner = Interner {
            atoms: FxHashMap::default(),
            names: Vec::with_capacity(KNOWN_NAMES.len() + 64),
        };
        interner.push(Arc::from(""));
        for &(atom, name) in KNOWN_NAMES {
            let seeded = interner.intern(name);
            debug_assert_eq!(seeded, atom, "known name `{name}` out of order");
        }
        interner
    }

    fn push(&mut self, name: Arc<str>) -> Atom {
        let atom = Atom(self.names.len() as u32);
        self.names.push(Arc::clone(&name));
        self.atoms.insert(name, atom);
        atom
    }

    #[inline]
    pub fn intern(&mut self, name: &str) -> Atom {
        match self.atoms.get(name) {
            Some(&atom) => atom,
            None => self.push(Arc::from(name)),
        }
    }

    /// Atom of `name` if it was interned before.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<Atom> {
        self.atoms.get(name).copied()
    }

    /// Name of `atom`; the empty name for atoms of another interner.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.names.get(atom.0 as usize).map_or("", |name| &**name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True while only the empty name and the known names are present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.len() <= KNOWN_NAMES.len() + 1
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/interner_tests.rs"]
mod tests;
