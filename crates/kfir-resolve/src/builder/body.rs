//! Expression lowering.
//!
//! Every expression node is lowered the same way at every phase. When the
//! builder is resolving, references are resolved and every expression gets a
//! type; otherwise references stay `Simple` and types stay implicit.

use super::calls::{Candidate, CallResolution};
use super::UnitBuilder;
use crate::ResolveError;
use kfir_common::{Atom, OperatorNameConventions, StandardClassNames};
use kfir_tree::{
    BinaryOp, ConeType, ConstValue, FirBlock, FirConstExpression, FirElement, FirErrorExpression,
    FirIfExpression, FirProperty, FirQualifiedAccessExpression, FirReference,
    FirReturnExpression, FirThisReceiverExpression, FirTypeRef, ReferenceDiagnostic, SymbolId,
    SyntaxData, SyntaxNodeId,
};
use std::sync::Arc;

/// Locals and parameters visible in one block.
#[derive(Default)]
pub(crate) struct LocalScope {
    entries: Vec<(Atom, Candidate)>,
}

impl UnitBuilder<'_> {
    pub(super) fn declare_local(&mut self, name: Atom, symbol: SymbolId, element: &Arc<FirElement>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.entries.push((
                name,
                Candidate {
                    symbol,
                    element: Arc::clone(element),
                },
            ));
        }
    }

    pub(super) fn lookup_local(&self, name: Atom) -> Option<Candidate> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.entries.iter().rev())
            .find(|(local, _)| *local == name)
            .map(|(_, candidate)| candidate.clone())
    }

    /// `Resolved(cone)` while resolving, `Implicit` otherwise.
    fn typed(&self, cone: impl FnOnce() -> ConeType) -> FirTypeRef {
        if self.resolving {
            FirTypeRef::Resolved(cone())
        } else {
            FirTypeRef::Implicit
        }
    }

    pub(super) fn lower_expr(&mut self, node: SyntaxNodeId) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let data = syntax.data(node).ok_or(ResolveError::UnknownNode(node))?;
        let element = match data {
            SyntaxData::IntLiteral(value) => {
                self.constant(node, ConstValue::Int(*value), StandardClassNames::INT, false)
            }
            SyntaxData::StringLiteral(value) => self.constant(
                node,
                ConstValue::String(Arc::clone(value)),
                StandardClassNames::STRING,
                false,
            ),
            SyntaxData::BooleanLiteral(value) => self.constant(
                node,
                ConstValue::Boolean(*value),
                StandardClassNames::BOOLEAN,
                false,
            ),
            SyntaxData::NullLiteral => {
                self.constant(node, ConstValue::Null, StandardClassNames::NOTHING, true)
            }
            SyntaxData::Block { statements } => self.block(node, statements)?,
            SyntaxData::Property { .. } => self.local_property(node)?,
            SyntaxData::NameReference { name } => self.access(Some(node), None, *name)?,
            SyntaxData::DotQualified { receiver, selector } => {
                let receiver = self.lower_expr(*receiver)?;
                self.selector(*selector, receiver)?
            }
            SyntaxData::Call { callee, args } => self.call(node, *callee, args)?,
            SyntaxData::Binary { op, lhs, rhs } => self.binary(node, *op, *lhs, *rhs)?,
            SyntaxData::If {
                condition,
                then_branch,
                else_branch,
            } => self.if_expr(node, *condition, *then_branch, *else_branch)?,
            SyntaxData::Return { value } => {
                let result = value.map(|value| self.lower_expr(value)).transpose()?;
                let type_ref = self.typed(|| {
                    self.session
                        .builtin_type(StandardClassNames::NOTHING, false)
                });
                Arc::new(FirElement::ReturnExpression(FirReturnExpression {
                    source: Some(node),
                    result,
                    type_ref,
                }))
            }
            SyntaxData::File { .. }
            | SyntaxData::Class { .. }
            | SyntaxData::Function { .. }
            | SyntaxData::Parameter { .. }
            | SyntaxData::TypeRef { .. } => {
                Self::error_expression(Some(node), "declaration in expression position")
            }
        };
        Ok(self.record(node, element))
    }

    pub(super) fn error_expression(source: Option<SyntaxNodeId>, reason: &str) -> Arc<FirElement> {
        Arc::new(FirElement::ErrorExpression(FirErrorExpression {
            source,
            reason: Arc::from(reason),
            type_ref: FirTypeRef::Resolved(ConeType::error(reason)),
        }))
    }

    fn constant(
        &self,
        node: SyntaxNodeId,
        value: ConstValue,
        class: Atom,
        nullable: bool,
    ) -> Arc<FirElement> {
        let type_ref = self.typed(|| self.session.builtin_type(class, nullable));
        Arc::new(FirElement::ConstExpression(FirConstExpression {
            source: Some(node),
            value,
            type_ref,
        }))
    }

    fn block(
        &mut self,
        node: SyntaxNodeId,
        statements: &[SyntaxNodeId],
    ) -> Result<Arc<FirElement>, ResolveError> {
        self.scopes.push(super::LocalScope::default());
        let lowered = statements
            .iter()
            .map(|&statement| self.lower_expr(statement))
            .collect::<Result<Vec<_>, _>>();
        self.scopes.pop();
        let statements = lowered?;

        let type_ref = match statements.last().map(|last| &**last) {
            _ if !self.resolving => FirTypeRef::Implicit,
            Some(last) if !last.kind().is_declaration() => last
                .type_ref()
                .cloned()
                .unwrap_or(FirTypeRef::Implicit),
            _ => FirTypeRef::Resolved(self.session.builtin_type(StandardClassNames::UNIT, false)),
        };
        Ok(Arc::new(FirElement::Block(FirBlock {
            source: Some(node),
            statements,
            type_ref,
        })))
    }

    fn local_property(&mut self, node: SyntaxNodeId) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let Some(SyntaxData::Property {
            name,
            modifiers,
            type_ref,
            initializer,
        }) = syntax.data(node)
        else {
            return Err(ResolveError::UnknownNode(node));
        };
        let symbol = self.symbol_of(node)?;
        let declared = type_ref.map(|type_node| self.type_ref(type_node));
        let initializer = initializer
            .map(|init| self.lower_expr(init))
            .transpose()?;
        let return_type_ref = match declared {
            Some(declared) => declared,
            None if self.resolving => Self::inferred_type(initializer.as_deref()),
            None => FirTypeRef::Implicit,
        };
        let element = Arc::new(FirElement::Property(FirProperty {
            source: Some(node),
            symbol,
            name: *name,
            status: *modifiers,
            origin: self.session.origin_of(node),
            dispatch_receiver_class: None,
            is_local: true,
            return_type_ref,
            initializer,
            resolve_phase: self.phase,
        }));
        self.declare_local(*name, symbol, &element);
        Ok(element)
    }

    fn if_expr(
        &mut self,
        node: SyntaxNodeId,
        condition: SyntaxNodeId,
        then_branch: SyntaxNodeId,
        else_branch: Option<SyntaxNodeId>,
    ) -> Result<Arc<FirElement>, ResolveError> {
        let condition = self.lower_expr(condition)?;
        let then_branch = self.lower_expr(then_branch)?;
        let else_branch = else_branch
            .map(|branch| self.lower_expr(branch))
            .transpose()?;

        let type_ref = if self.resolving {
            FirTypeRef::Resolved(self.if_type(&then_branch, else_branch.as_deref()))
        } else {
            FirTypeRef::Implicit
        };
        Ok(Arc::new(FirElement::IfExpression(FirIfExpression {
            source: Some(node),
            condition,
            then_branch,
            else_branch,
            type_ref,
        })))
    }

    /// `Unit` without an else branch; a jumping branch takes the other's type;
    /// equal branch types are kept and anything else widens to `Any`.
    fn if_type(&self, then_branch: &FirElement, else_branch: Option<&FirElement>) -> ConeType {
        let Some(else_branch) = else_branch else {
            return self.session.builtin_type(StandardClassNames::UNIT, false);
        };
        let nothing = self.session.builtin_class_symbol(StandardClassNames::NOTHING);
        let then_type = Self::expr_cone(then_branch);
        let else_type = Self::expr_cone(else_branch);
        if then_type.class_symbol().is_some() && then_type.class_symbol() == nothing {
            return else_type;
        }
        if else_type.class_symbol().is_some() && else_type.class_symbol() == nothing {
            return then_type;
        }
        if then_type == else_type {
            return then_type;
        }
        let nullable = then_type.is_nullable() || else_type.is_nullable();
        self.session.builtin_type(StandardClassNames::ANY, nullable)
    }

    pub(super) fn expr_cone(element: &FirElement) -> ConeType {
        element
            .type_ref()
            .and_then(FirTypeRef::cone_type)
            .cloned()
            .unwrap_or_else(|| ConeType::error("expression type not inferred"))
    }

    pub(super) fn this_receiver(&self) -> Option<Arc<FirElement>> {
        let (class_symbol, _) = self.this_class?;
        let this_type = self.this_type()?;
        Some(Arc::new(FirElement::ThisReceiver(FirThisReceiverExpression {
            source: None,
            class_symbol,
            type_ref: FirTypeRef::Resolved(this_type),
        })))
    }

    // =========================================================================
    // Accesses
    // =========================================================================

    /// A read of `name`, optionally through `receiver`.
    fn access(
        &mut self,
        source: Option<SyntaxNodeId>,
        receiver: Option<Arc<FirElement>>,
        name: Atom,
    ) -> Result<Arc<FirElement>, ResolveError> {
        if !self.resolving {
            return Ok(Arc::new(FirElement::QualifiedAccessExpression(
                FirQualifiedAccessExpression {
                    source,
                    callee_reference: FirReference::Simple { name },
                    explicit_receiver: receiver,
                    dispatch_receiver: None,
                    type_ref: FirTypeRef::Implicit,
                },
            )));
        }

        if let Some(receiver) = receiver {
            let receiver_type = Self::expr_cone(&receiver);
            let property = self
                .member_candidates(&receiver_type, name)?
                .into_iter()
                .find(Candidate::is_property);
            return match property {
                Some(property) => self.variable_access(
                    source,
                    &property,
                    Some(Arc::clone(&receiver)),
                    Some(receiver),
                ),
                None => Ok(Self::unresolved_access(source, name, Some(receiver))),
            };
        }

        if let Some(local) = self.lookup_local(name) {
            return self.variable_access(source, &local, None, None);
        }
        if let Some(this_type) = self.this_type() {
            let member = self
                .member_candidates(&this_type, name)?
                .into_iter()
                .find(Candidate::is_property);
            if let Some(member) = member {
                let this = self.this_receiver();
                return self.variable_access(source, &member, None, this);
            }
        }
        for file in self.lookup_files() {
            let found = self
                .top_level_candidates(file, name)?
                .into_iter()
                .find(Candidate::is_property);
            if let Some(property) = found {
                return self.variable_access(source, &property, None, None);
            }
        }
        Ok(Self::unresolved_access(source, name, None))
    }

    fn unresolved_access(
        source: Option<SyntaxNodeId>,
        name: Atom,
        receiver: Option<Arc<FirElement>>,
    ) -> Arc<FirElement> {
        Arc::new(FirElement::QualifiedAccessExpression(
            FirQualifiedAccessExpression {
                source,
                callee_reference: FirReference::Error {
                    name,
                    diagnostic: ReferenceDiagnostic::Unresolved,
                },
                explicit_receiver: receiver,
                dispatch_receiver: None,
                type_ref: FirTypeRef::Resolved(ConeType::error("unresolved reference")),
            },
        ))
    }

    pub(super) fn variable_access(
        &self,
        source: Option<SyntaxNodeId>,
        variable: &Candidate,
        explicit_receiver: Option<Arc<FirElement>>,
        dispatch_receiver: Option<Arc<FirElement>>,
    ) -> Result<Arc<FirElement>, ResolveError> {
        let name = variable.name();
        let (callee_reference, cone) = match self.variable_type(variable)? {
            Some(cone) => (
                FirReference::Resolved {
                    name,
                    symbol: variable.symbol,
                },
                cone,
            ),
            None => (
                FirReference::Error {
                    name,
                    diagnostic: ReferenceDiagnostic::Recursive,
                },
                ConeType::error("recursive implicit type"),
            ),
        };
        Ok(Arc::new(FirElement::QualifiedAccessExpression(
            FirQualifiedAccessExpression {
                source,
                callee_reference,
                explicit_receiver,
                dispatch_receiver,
                type_ref: FirTypeRef::Resolved(cone),
            },
        )))
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Lower the selector of `receiver.selector`.
    fn selector(
        &mut self,
        selector: SyntaxNodeId,
        receiver: Arc<FirElement>,
    ) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let element = match syntax.data(selector) {
            Some(SyntaxData::NameReference { name }) => {
                self.access(Some(selector), Some(receiver), *name)?
            }
            Some(SyntaxData::Call { callee, args }) => match syntax.data(*callee) {
                Some(SyntaxData::NameReference { name }) => {
                    let arguments = self.lower_arguments(args)?;
                    let call = self.member_call(Some(selector), receiver, *name, arguments)?;
                    self.record(*callee, call)
                }
                _ => Self::error_expression(Some(selector), "unsupported qualified call"),
            },
            _ => Self::error_expression(Some(selector), "unsupported selector"),
        };
        Ok(self.record(selector, element))
    }

    fn lower_arguments(&mut self, args: &[SyntaxNodeId]) -> Result<Vec<Arc<FirElement>>, ResolveError> {
        args.iter().map(|&arg| self.lower_expr(arg)).collect()
    }

    fn call(
        &mut self,
        node: SyntaxNodeId,
        callee: SyntaxNodeId,
        args: &[SyntaxNodeId],
    ) -> Result<Arc<FirElement>, ResolveError> {
        let syntax = self.syntax;
        let Some(SyntaxData::NameReference { name }) = syntax.data(callee) else {
            // `expr(args)` is `expr.invoke(args)`.
            let receiver = self.lower_expr(callee)?;
            let arguments = self.lower_arguments(args)?;
            return self.member_call(Some(node), receiver, OperatorNameConventions::INVOKE, arguments);
        };

        let arguments = self.lower_arguments(args)?;
        let resolution = if self.resolving {
            self.resolve_unqualified_call(callee, *name, &arguments)?
        } else {
            CallResolution::simple(*name)
        };
        let call = resolution.into_call(Some(node), arguments);
        Ok(self.record(callee, call))
    }

    /// `receiver.name(arguments)`, falling back to `receiver.name.invoke(arguments)`.
    pub(super) fn member_call(
        &mut self,
        source: Option<SyntaxNodeId>,
        receiver: Arc<FirElement>,
        name: Atom,
        arguments: Vec<Arc<FirElement>>,
    ) -> Result<Arc<FirElement>, ResolveError> {
        let resolution = if self.resolving {
            let receiver_type = Self::expr_cone(&receiver);
            let candidates = self.member_candidates(&receiver_type, name)?;
            self.resolve_in_level(
                source,
                &candidates,
                name,
                &arguments,
                Some(&receiver),
                Some(&receiver),
            )?
            .unwrap_or_else(|diagnostic| {
                CallResolution::failed(name, diagnostic).with_explicit(Arc::clone(&receiver))
            })
        } else {
            CallResolution::simple(name).with_explicit(receiver)
        };
        Ok(resolution.into_call(source, arguments))
    }

    fn binary(
        &mut self,
        node: SyntaxNodeId,
        op: BinaryOp,
        lhs: SyntaxNodeId,
        rhs: SyntaxNodeId,
    ) -> Result<Arc<FirElement>, ResolveError> {
        let lhs = self.lower_expr(lhs)?;
        let rhs = self.lower_expr(rhs)?;
        match op {
            BinaryOp::RangeTo => {
                self.member_call(Some(node), lhs, OperatorNameConventions::RANGE_TO, vec![rhs])
            }
            BinaryOp::Plus => {
                self.member_call(Some(node), lhs, OperatorNameConventions::PLUS, vec![rhs])
            }
            BinaryOp::In => {
                self.member_call(Some(node), rhs, OperatorNameConventions::CONTAINS, vec![lhs])
            }
            BinaryOp::NotIn => {
                let contains =
                    self.member_call(None, rhs, OperatorNameConventions::CONTAINS, vec![lhs])?;
                self.member_call(Some(node), contains, OperatorNameConventions::NOT, Vec::new())
            }
        }
    }
}
