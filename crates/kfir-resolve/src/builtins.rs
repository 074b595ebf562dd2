//! The builtins file every session resolves against.
//!
//! ```kotlin
//! // kotlin/builtins.kt
//! open class Any { open fun toString(): String; open fun hashCode(): Int }
//! class Nothing
//! class Unit
//! class Boolean { operator fun not(): Boolean }
//! class Int {
//!     operator fun rangeTo(other: Int): IntRange
//!     operator fun plus(other: Int): Int
//!     operator fun compareTo(other: Int): Int
//! }
//! class String { operator fun plus(other: Any?): String }
//! open class IntProgression {
//!     operator fun contains(value: Int): Boolean
//!     operator fun contains(value: Int?): Boolean
//! }
//! class IntRange : IntProgression
//! ```
//!
//! `IntRange` declares no members of its own, so its `contains` overloads are
//! fake overrides of the `IntProgression` ones.

use kfir_tree::{DeclarationModifiers, SyntaxArena, SyntaxNodeId};

pub const BUILTINS_FILE_NAME: &str = "kotlin/builtins.kt";

struct Decl<'a> {
    arena: &'a mut SyntaxArena,
}

impl Decl<'_> {
    fn fun(
        &mut self,
        name: &str,
        modifiers: DeclarationModifiers,
        params: &[(&str, &str, bool)],
        returns: &str,
    ) -> SyntaxNodeId {
        let params = params
            .iter()
            .map(|&(param, ty, nullable)| {
                let ty = self.arena.type_ref(ty, nullable);
                self.arena.parameter(param, ty)
            })
            .collect();
        let returns = self.arena.type_ref(returns, false);
        self.arena
            .function(name, modifiers, params, Some(returns), None)
    }

    fn class(
        &mut self,
        name: &str,
        modifiers: DeclarationModifiers,
        supertype: Option<&str>,
        members: Vec<SyntaxNodeId>,
    ) -> SyntaxNodeId {
        let supertypes = supertype
            .map(|ty| vec![self.arena.type_ref(ty, false)])
            .unwrap_or_default();
        self.arena.class(name, modifiers, supertypes, members)
    }
}

/// Append the builtins file to `arena` and return its file node.
pub(crate) fn install(arena: &mut SyntaxArena) -> SyntaxNodeId {
    let open = DeclarationModifiers::OPEN;
    let operator = DeclarationModifiers::OPERATOR;
    let none = DeclarationModifiers::empty();
    let mut d = Decl { arena };

    let to_string = d.fun("toString", open, &[], "String");
    let hash_code = d.fun("hashCode", open, &[], "Int");
    let any = d.class("Any", open, None, vec![to_string, hash_code]);

    let nothing = d.class("Nothing", none, None, vec![]);
    let unit = d.class("Unit", none, None, vec![]);

    let not = d.fun("not", operator, &[], "Boolean");
    let boolean = d.class("Boolean", none, None, vec![not]);

    let range_to = d.fun("rangeTo", operator, &[("other", "Int", false)], "IntRange");
    let plus = d.fun("plus", operator, &[("other", "Int", false)], "Int");
    let compare_to = d.fun("compareTo", operator, &[("other", "Int", false)], "Int");
    let int = d.class("Int", none, None, vec![range_to, plus, compare_to]);

    let concat = d.fun("plus", operator, &[("other", "Any", true)], "String");
    let string = d.class("String", none, None, vec![concat]);

    let contains = d.fun("contains", operator, &[("value", "Int", false)], "Boolean");
    let contains_nullable = d.fun("contains", operator, &[("value", "Int", true)], "Boolean");
    let progression = d.class("IntProgression", open, None, vec![contains, contains_nullable]);
    let range = d.class("IntRange", none, Some("IntProgression"), vec![]);

    d.arena.file(
        BUILTINS_FILE_NAME,
        vec![any, nothing, unit, boolean, int, string, progression, range],
    )
}
