use super::{FirElement, FirReference};
use crate::symbols::SymbolId;
use crate::syntax::SyntaxNodeId;
use crate::types::FirTypeRef;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct FirBlock {
    pub source: Option<SyntaxNodeId>,
    pub statements: Vec<Arc<FirElement>>,
    pub type_ref: FirTypeRef,
}

/// A call. Operators are desugared into calls: `a..b` is `a.rangeTo(b)`,
/// `x in r` is `r.contains(x)`, and `value(args)` on a callable-valued
/// `value` is `value.invoke(args)` with `value` as dispatch receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct FirFunctionCall {
    pub source: Option<SyntaxNodeId>,
    pub callee_reference: FirReference,
    pub explicit_receiver: Option<Arc<FirElement>>,
    pub dispatch_receiver: Option<Arc<FirElement>>,
    pub arguments: Vec<Arc<FirElement>>,
    pub type_ref: FirTypeRef,
}

/// A read of a property, parameter or local variable, optionally qualified
/// by a receiver (`a.b`).
#[derive(Clone, Debug, PartialEq)]
pub struct FirQualifiedAccessExpression {
    pub source: Option<SyntaxNodeId>,
    pub callee_reference: FirReference,
    pub explicit_receiver: Option<Arc<FirElement>>,
    pub dispatch_receiver: Option<Arc<FirElement>>,
    pub type_ref: FirTypeRef,
}

/// Implicit `this` of a member body.
#[derive(Clone, Debug, PartialEq)]
pub struct FirThisReceiverExpression {
    pub source: Option<SyntaxNodeId>,
    pub class_symbol: SymbolId,
    pub type_ref: FirTypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Int(i64),
    Boolean(bool),
    String(Arc<str>),
    Null,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirConstExpression {
    pub source: Option<SyntaxNodeId>,
    pub value: ConstValue,
    pub type_ref: FirTypeRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirIfExpression {
    pub source: Option<SyntaxNodeId>,
    pub condition: Arc<FirElement>,
    pub then_branch: Arc<FirElement>,
    pub else_branch: Option<Arc<FirElement>>,
    pub type_ref: FirTypeRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirReturnExpression {
    pub source: Option<SyntaxNodeId>,
    pub result: Option<Arc<FirElement>>,
    pub type_ref: FirTypeRef,
}

/// A type annotation as an element of its own.
#[derive(Clone, Debug, PartialEq)]
pub struct FirTypeRefElement {
    pub source: Option<SyntaxNodeId>,
    pub type_ref: FirTypeRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirErrorExpression {
    pub source: Option<SyntaxNodeId>,
    pub reason: Arc<str>,
    pub type_ref: FirTypeRef,
}
