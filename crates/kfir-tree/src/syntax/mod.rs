//! Syntax arena.
//!
//! Syntax trees are built bottom-up: children are allocated first and the
//! parent constructor links them. Node handles (`SyntaxNodeId`) stay valid for
//! the lifetime of the arena; several files can live in one arena.
//!
//! Parsing is not part of kfir, so trees are assembled through the
//! constructor methods on [`SyntaxArena`].

mod print;

use bitflags::bitflags;
use kfir_common::{Atom, Interner};
use serde::Serialize;
use std::sync::Arc;

/// Handle to a syntax node inside a [`SyntaxArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SyntaxNodeId(pub u32);

bitflags! {
    /// Declaration modifiers, shared by syntax and FIR declaration status.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DeclarationModifiers: u8 {
        const OPEN = 1 << 0;
        const OVERRIDE = 1 << 1;
        const OPERATOR = 1 << 2;
        const ABSTRACT = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `a in b`
    In,
    /// `a !in b`
    NotIn,
    /// `a..b`
    RangeTo,
    /// `a + b`
    Plus,
}

impl BinaryOp {
    pub const fn text(self) -> &'static str {
        match self {
            BinaryOp::In => "in",
            BinaryOp::NotIn => "!in",
            BinaryOp::RangeTo => "..",
            BinaryOp::Plus => "+",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SyntaxData {
    File {
        name: Atom,
        declarations: Vec<SyntaxNodeId>,
    },
    Class {
        name: Atom,
        modifiers: DeclarationModifiers,
        supertypes: Vec<SyntaxNodeId>,
        members: Vec<SyntaxNodeId>,
    },
    Function {
        name: Atom,
        modifiers: DeclarationModifiers,
        params: Vec<SyntaxNodeId>,
        return_type: Option<SyntaxNodeId>,
        body: Option<SyntaxNodeId>,
    },
    Parameter {
        name: Atom,
        type_ref: SyntaxNodeId,
    },
    Property {
        name: Atom,
        modifiers: DeclarationModifiers,
        type_ref: Option<SyntaxNodeId>,
        initializer: Option<SyntaxNodeId>,
    },
    TypeRef {
        name: Atom,
        nullable: bool,
    },
    Block {
        statements: Vec<SyntaxNodeId>,
    },
    NameReference {
        name: Atom,
    },
    Call {
        callee: SyntaxNodeId,
        args: Vec<SyntaxNodeId>,
    },
    DotQualified {
        receiver: SyntaxNodeId,
        selector: SyntaxNodeId,
    },
    IntLiteral(i64),
    StringLiteral(Arc<str>),
    BooleanLiteral(bool),
    NullLiteral,
    Binary {
        op: BinaryOp,
        lhs: SyntaxNodeId,
        rhs: SyntaxNodeId,
    },
    If {
        condition: SyntaxNodeId,
        then_branch: SyntaxNodeId,
        else_branch: Option<SyntaxNodeId>,
    },
    Return {
        value: Option<SyntaxNodeId>,
    },
}

/// Tag of a [`SyntaxData`] variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    File,
    Class,
    Function,
    Parameter,
    Property,
    TypeRef,
    Block,
    NameReference,
    Call,
    DotQualified,
    IntLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    Binary,
    If,
    Return,
}

impl SyntaxData {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxData::File { .. } => SyntaxKind::File,
            SyntaxData::Class { .. } => SyntaxKind::Class,
            SyntaxData::Function { .. } => SyntaxKind::Function,
            SyntaxData::Parameter { .. } => SyntaxKind::Parameter,
            SyntaxData::Property { .. } => SyntaxKind::Property,
            SyntaxData::TypeRef { .. } => SyntaxKind::TypeRef,
            SyntaxData::Block { .. } => SyntaxKind::Block,
            SyntaxData::NameReference { .. } => SyntaxKind::NameReference,
            SyntaxData::Call { .. } => SyntaxKind::Call,
            SyntaxData::DotQualified { .. } => SyntaxKind::DotQualified,
            SyntaxData::IntLiteral(_) => SyntaxKind::IntLiteral,
            SyntaxData::StringLiteral(_) => SyntaxKind::StringLiteral,
            SyntaxData::BooleanLiteral(_) => SyntaxKind::BooleanLiteral,
            SyntaxData::NullLiteral => SyntaxKind::NullLiteral,
            SyntaxData::Binary { .. } => SyntaxKind::Binary,
            SyntaxData::If { .. } => SyntaxKind::If,
            SyntaxData::Return { .. } => SyntaxKind::Return,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<SyntaxNodeId> {
        match self {
            SyntaxData::File { declarations, .. } => declarations.clone(),
            SyntaxData::Class {
                supertypes,
                members,
                ..
            } => supertypes.iter().chain(members).copied().collect(),
            SyntaxData::Function {
                params,
                return_type,
                body,
                ..
            } => params
                .iter()
                .copied()
                .chain(*return_type)
                .chain(*body)
                .collect(),
            SyntaxData::Parameter { type_ref, .. } => vec![*type_ref],
            SyntaxData::Property {
                type_ref,
                initializer,
                ..
            } => type_ref.iter().chain(initializer).copied().collect(),
            SyntaxData::Block { statements } => statements.clone(),
            SyntaxData::Call { callee, args } => {
                std::iter::once(*callee).chain(args.iter().copied()).collect()
            }
            SyntaxData::DotQualified { receiver, selector } => vec![*receiver, *selector],
            SyntaxData::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            SyntaxData::If {
                condition,
                then_branch,
                else_branch,
            } => [*condition, *then_branch]
                .into_iter()
                .chain(*else_branch)
                .collect(),
            SyntaxData::Return { value } => value.iter().copied().collect(),
            SyntaxData::TypeRef { .. }
            | SyntaxData::NameReference { .. }
            | SyntaxData::IntLiteral(_)
            | SyntaxData::StringLiteral(_)
            | SyntaxData::BooleanLiteral(_)
            | SyntaxData::NullLiteral => Vec::new(),
        }
    }

    /// Declared name for declarations and name references.
    pub fn name(&self) -> Option<Atom> {
        match self {
            SyntaxData::File { name, .. }
            | SyntaxData::Class { name, .. }
            | SyntaxData::Function { name, .. }
            | SyntaxData::Parameter { name, .. }
            | SyntaxData::Property { name, .. }
            | SyntaxData::TypeRef { name, .. }
            | SyntaxData::NameReference { name } => Some(*name),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SyntaxNode {
    pub data: SyntaxData,
    pub parent: Option<SyntaxNodeId>,
}

/// Owner of every syntax node of a session.
#[derive(Clone, Default)]
pub struct SyntaxArena {
    nodes: Vec<SyntaxNode>,
    interner: Interner,
}

impl SyntaxArena {
    pub fn new() -> Self {
        SyntaxArena {
            nodes: Vec::with_capacity(256),
            interner: Interner::new(),
        }
    }

    #[inline]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn intern(&mut self, name: &str) -> Atom {
        self.interner.intern(name)
    }

    #[inline]
    pub fn resolve_name(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: SyntaxNodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: SyntaxNodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0 as usize)
    }

    #[inline]
    pub fn data(&self, id: SyntaxNodeId) -> Option<&SyntaxData> {
        self.get(id).map(|node| &node.data)
    }

    #[inline]
    pub fn kind(&self, id: SyntaxNodeId) -> Option<SyntaxKind> {
        self.data(id).map(SyntaxData::kind)
    }

    #[inline]
    pub fn parent(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Every node id, in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = SyntaxNodeId> + '_ {
        (0..self.nodes.len() as u32).map(SyntaxNodeId)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: SyntaxNodeId) -> impl Iterator<Item = SyntaxNodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// True for nodes the resolver builds as a unit: files, classes, and
    /// functions or properties declared directly in a file or class.
    pub fn is_resolution_unit(&self, id: SyntaxNodeId) -> bool {
        match self.kind(id) {
            Some(SyntaxKind::File | SyntaxKind::Class) => true,
            Some(SyntaxKind::Function | SyntaxKind::Property) => matches!(
                self.parent(id).and_then(|p| self.kind(p)),
                Some(SyntaxKind::File | SyntaxKind::Class)
            ),
            _ => false,
        }
    }

    /// Nearest resolution unit containing `id` (possibly `id` itself).
    pub fn containing_unit(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        if !self.contains(id) {
            return None;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| self.is_resolution_unit(candidate))
    }

    /// Nearest enclosing class, excluding `id` itself.
    pub fn containing_class(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        self.ancestors(id)
            .find(|&a| self.kind(a) == Some(SyntaxKind::Class))
    }

    /// File that `id` belongs to.
    pub fn containing_file(&self, id: SyntaxNodeId) -> Option<SyntaxNodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&a| self.kind(a) == Some(SyntaxKind::File))
    }

    /// Source text of a node, rendered from the tree.
    pub fn text(&self, id: SyntaxNodeId) -> String {
        let mut out = String::new();
        print::SyntaxPrinter::new(self, &mut out).node(id);
        out
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn alloc(&mut self, data: SyntaxData) -> SyntaxNodeId {
        let id = SyntaxNodeId(self.nodes.len() as u32);
        for child in data.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                debug_assert!(node.parent.is_none(), "syntax node attached twice");
                node.parent = Some(id);
            }
        }
        self.nodes.push(SyntaxNode { data, parent: None });
        id
    }

    pub fn file(&mut self, name: &str, declarations: Vec<SyntaxNodeId>) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::File { name, declarations })
    }

    pub fn class(
        &mut self,
        name: &str,
        modifiers: DeclarationModifiers,
        supertypes: Vec<SyntaxNodeId>,
        members: Vec<SyntaxNodeId>,
    ) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::Class {
            name,
            modifiers,
            supertypes,
            members,
        })
    }

    pub fn function(
        &mut self,
        name: &str,
        modifiers: DeclarationModifiers,
        params: Vec<SyntaxNodeId>,
        return_type: Option<SyntaxNodeId>,
        body: Option<SyntaxNodeId>,
    ) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::Function {
            name,
            modifiers,
            params,
            return_type,
            body,
        })
    }

    pub fn parameter(&mut self, name: &str, type_ref: SyntaxNodeId) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::Parameter { name, type_ref })
    }

    pub fn property(
        &mut self,
        name: &str,
        modifiers: DeclarationModifiers,
        type_ref: Option<SyntaxNodeId>,
        initializer: Option<SyntaxNodeId>,
    ) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::Property {
            name,
            modifiers,
            type_ref,
            initializer,
        })
    }

    pub fn type_ref(&mut self, name: &str, nullable: bool) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::TypeRef { name, nullable })
    }

    pub fn block(&mut self, statements: Vec<SyntaxNodeId>) -> SyntaxNodeId {
        self.alloc(SyntaxData::Block { statements })
    }

    pub fn name_ref(&mut self, name: &str) -> SyntaxNodeId {
        let name = self.intern(name);
        self.alloc(SyntaxData::NameReference { name })
    }

    pub fn call(&mut self, callee: SyntaxNodeId, args: Vec<SyntaxNodeId>) -> SyntaxNodeId {
        self.alloc(SyntaxData::Call { callee, args })
    }

    /// `name(args)` with a fresh name reference as callee.
    pub fn call_named(&mut self, name: &str, args: Vec<SyntaxNodeId>) -> SyntaxNodeId {
        let callee = self.name_ref(name);
        self.call(callee, args)
    }

    pub fn dot(&mut self, receiver: SyntaxNodeId, selector: SyntaxNodeId) -> SyntaxNodeId {
        self.alloc(SyntaxData::DotQualified { receiver, selector })
    }

    pub fn int(&mut self, value: i64) -> SyntaxNodeId {
        self.alloc(SyntaxData::IntLiteral(value))
    }

    pub fn string(&mut self, value: &str) -> SyntaxNodeId {
        self.alloc(SyntaxData::StringLiteral(Arc::from(value)))
    }

    pub fn boolean(&mut self, value: bool) -> SyntaxNodeId {
        self.alloc(SyntaxData::BooleanLiteral(value))
    }

    pub fn null(&mut self) -> SyntaxNodeId {
        self.alloc(SyntaxData::NullLiteral)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: SyntaxNodeId, rhs: SyntaxNodeId) -> SyntaxNodeId {
        self.alloc(SyntaxData::Binary { op, lhs, rhs })
    }

    pub fn if_expr(
        &mut self,
        condition: SyntaxNodeId,
        then_branch: SyntaxNodeId,
        else_branch: Option<SyntaxNodeId>,
    ) -> SyntaxNodeId {
        self.alloc(SyntaxData::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn return_expr(&mut self, value: Option<SyntaxNodeId>) -> SyntaxNodeId {
        self.alloc(SyntaxData::Return { value })
    }
}

#[cfg(test)]
#[path = "../tests/syntax_tests.rs"]
mod tests;
