//! Renders syntax nodes back to Kotlin-like source text.

use super::{BinaryOp, DeclarationModifiers, SyntaxArena, SyntaxData, SyntaxNodeId};
use std::fmt::Write;

pub(super) struct SyntaxPrinter<'a> {
    arena: &'a SyntaxArena,
    out: &'a mut String,
}

impl<'a> SyntaxPrinter<'a> {
    pub(super) fn new(arena: &'a SyntaxArena, out: &'a mut String) -> Self {
        SyntaxPrinter { arena, out }
    }

    fn name(&mut self, atom: kfir_common::Atom) {
        let arena = self.arena;
        self.out.push_str(arena.resolve_name(atom));
    }

    fn modifiers(&mut self, modifiers: DeclarationModifiers) {
        for (flag, text) in [
            (DeclarationModifiers::ABSTRACT, "abstract "),
            (DeclarationModifiers::OPEN, "open "),
            (DeclarationModifiers::OVERRIDE, "override "),
            (DeclarationModifiers::OPERATOR, "operator "),
        ] {
            if modifiers.contains(flag) {
                self.out.push_str(text);
            }
        }
    }

    fn list(&mut self, items: &[SyntaxNodeId], separator: &str) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(separator);
            }
            self.node(item);
        }
    }

    pub(super) fn node(&mut self, id: SyntaxNodeId) {
        let arena = self.arena;
        let Some(data) = arena.data(id) else {
            return;
        };
        match data {
            SyntaxData::File { declarations, .. } => self.list(declarations, "\n"),
            SyntaxData::Class {
                name,
                modifiers,
                supertypes,
                members,
            } => {
                self.modifiers(*modifiers);
                self.out.push_str("class ");
                self.name(*name);
                if !supertypes.is_empty() {
                    self.out.push_str(" : ");
                    self.list(supertypes, ", ");
                }
                if !members.is_empty() {
                    self.out.push_str(" { ");
                    self.list(members, "; ");
                    self.out.push_str(" }");
                }
            }
            SyntaxData::Function {
                name,
                modifiers,
                params,
                return_type,
                body,
            } => {
                self.modifiers(*modifiers);
                self.out.push_str("fun ");
                self.name(*name);
                self.out.push('(');
                self.list(params, ", ");
                self.out.push(')');
                if let Some(return_type) = return_type {
                    self.out.push_str(": ");
                    self.node(*return_type);
                }
                if let Some(body) = body {
                    self.out.push(' ');
                    self.node(*body);
                }
            }
            SyntaxData::Parameter { name, type_ref } => {
                self.name(*name);
                self.out.push_str(": ");
                self.node(*type_ref);
            }
            SyntaxData::Property {
                name,
                modifiers,
                type_ref,
                initializer,
            } => {
                self.modifiers(*modifiers);
                self.out.push_str("val ");
                self.name(*name);
                if let Some(type_ref) = type_ref {
                    self.out.push_str(": ");
                    self.node(*type_ref);
                }
                if let Some(initializer) = initializer {
                    self.out.push_str(" = ");
                    self.node(*initializer);
                }
            }
            SyntaxData::TypeRef { name, nullable } => {
                self.name(*name);
                if *nullable {
                    self.out.push('?');
                }
            }
            SyntaxData::Block { statements } => {
                if statements.is_empty() {
                    self.out.push_str("{}");
                } else {
                    self.out.push_str("{ ");
                    self.list(statements, "; ");
                    self.out.push_str(" }");
                }
            }
            SyntaxData::NameReference { name } => self.name(*name),
            SyntaxData::Call { callee, args } => {
                self.node(*callee);
                self.out.push('(');
                self.list(args, ", ");
                self.out.push(')');
            }
            SyntaxData::DotQualified { receiver, selector } => {
                self.node(*receiver);
                self.out.push('.');
                self.node(*selector);
            }
            SyntaxData::IntLiteral(value) => {
                let _ = write!(self.out, "{value}");
            }
            SyntaxData::StringLiteral(value) => {
                let _ = write!(self.out, "\"{value}\"");
            }
            SyntaxData::BooleanLiteral(value) => {
                let _ = write!(self.out, "{value}");
            }
            SyntaxData::NullLiteral => self.out.push_str("null"),
            SyntaxData::Binary { op, lhs, rhs } => {
                self.node(*lhs);
                match op {
                    BinaryOp::RangeTo => self.out.push_str(op.text()),
                    _ => {
                        self.out.push(' ');
                        self.out.push_str(op.text());
                        self.out.push(' ');
                    }
                }
                self.node(*rhs);
            }
            SyntaxData::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("if (");
                self.node(*condition);
                self.out.push_str(") ");
                self.node(*then_branch);
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.node(*else_branch);
                }
            }
            SyntaxData::Return { value } => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.node(*value);
                }
            }
        }
    }
}
