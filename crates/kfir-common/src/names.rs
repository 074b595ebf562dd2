//! Well-known names.
//!
//! Operator conventions and builtin class names are reserved at fixed atom
//! indices by [`Interner::new`](crate::Interner::new), so both the engine and
//! the facade can compare names without access to an interner.

use crate::interner::Atom;

/// Canonical names of operator-convention functions.
pub struct OperatorNameConventions;

impl OperatorNameConventions {
    /// `operator fun invoke`: target of implicit-call sugar `value(args)`.
    pub const INVOKE: Atom = Atom(1);
    /// `operator fun contains`: target of `x in range`.
    pub const CONTAINS: Atom = Atom(2);
    /// `operator fun rangeTo`: target of `a..b`.
    pub const RANGE_TO: Atom = Atom(3);
    /// `operator fun not`: target of `!x` and of the negation in `x !in r`.
    pub const NOT: Atom = Atom(4);
    pub const PLUS: Atom = Atom(5);
    pub const COMPARE_TO: Atom = Atom(6);
}

/// Names of the builtin classes every session provides.
pub struct StandardClassNames;

impl StandardClassNames {
    pub const ANY: Atom = Atom(7);
    pub const NOTHING: Atom = Atom(8);
    pub const UNIT: Atom = Atom(9);
    pub const BOOLEAN: Atom = Atom(10);
    pub const INT: Atom = Atom(11);
    pub const STRING: Atom = Atom(12);
    pub const INT_PROGRESSION: Atom = Atom(13);
    pub const INT_RANGE: Atom = Atom(14);
}

/// Reserved interner slots. Order must match the atom constants above.
pub(crate) const KNOWN_NAMES: &[(Atom, &str)] = &[
    (OperatorNameConventions::INVOKE, "invoke"),
    (OperatorNameConventions::CONTAINS, "contains"),
    (OperatorNameConventions::RANGE_TO, "rangeTo"),
    (OperatorNameConventions::NOT, "not"),
    (OperatorNameConventions::PLUS, "plus"),
    (OperatorNameConventions::COMPARE_TO, "compareTo"),
    (StandardClassNames::ANY, "Any"),
    (StandardClassNames::NOTHING, "Nothing"),
    (StandardClassNames::UNIT, "Unit"),
    (StandardClassNames::BOOLEAN, "Boolean"),
    (StandardClassNames::INT, "Int"),
    (StandardClassNames::STRING, "String"),
    (StandardClassNames::INT_PROGRESSION, "IntProgression"),
    (StandardClassNames::INT_RANGE, "IntRange"),
];

/// Returns the reserved spelling of a well-known atom.
pub fn known_name(atom: Atom) -> Option<&'static str> {
    KNOWN_NAMES
        .iter()
        .find(|(known, _)| *known == atom)
        .map(|(_, name)| *name)
}
