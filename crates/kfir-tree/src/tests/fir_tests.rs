use super::*;
use crate::types::ConeType;
use std::sync::Arc;

fn int_type() -> FirTypeRef {
    FirTypeRef::Resolved(ConeType::Class {
        symbol: SymbolId(0),
        name: kfir_common::StandardClassNames::INT,
        nullable: false,
    })
}

fn const_int(value: i64) -> Arc<FirElement> {
    Arc::new(FirElement::ConstExpression(FirConstExpression {
        source: Some(SyntaxNodeId(7)),
        value: ConstValue::Int(value),
        type_ref: int_type(),
    }))
}

fn function(name: Atom) -> Arc<FirElement> {
    Arc::new(FirElement::SimpleFunction(FirSimpleFunction {
        source: None,
        symbol: SymbolId(4),
        name,
        status: crate::DeclarationModifiers::OPERATOR,
        origin: FirDeclarationOrigin::Library,
        dispatch_receiver_class: Some(SymbolId(1)),
        value_parameters: Vec::new(),
        return_type_ref: int_type(),
        body: None,
        resolve_phase: FirResolvePhase::BodyResolve,
    }))
}

#[test]
fn test_narrow_matching_variant() {
    let element = const_int(42);
    let narrowed = Fir::<FirConstExpression>::narrow(Arc::clone(&element)).expect("const");
    assert_eq!(narrowed.value, ConstValue::Int(42));
    assert!(Arc::ptr_eq(narrowed.element(), &element));
}

#[test]
fn test_narrow_mismatch_returns_element() {
    let element = const_int(1);
    let back = Fir::<FirFunctionCall>::narrow(Arc::clone(&element)).expect_err("not a call");
    assert!(Arc::ptr_eq(&back, &element));
    assert_eq!(back.kind(), FirElementKind::ConstExpression);
}

#[test]
fn test_clone_shares_identity() {
    let narrowed = Fir::<FirSimpleFunction>::narrow(function(Atom(30))).expect("function");
    let copy = narrowed.clone();
    assert!(narrowed.ptr_eq(&copy));
    assert!(narrowed.is_operator());

    let other = Fir::<FirSimpleFunction>::narrow(function(Atom(30))).expect("function");
    assert!(!narrowed.ptr_eq(&other));
    assert_eq!(*narrowed, *other);

    let shared = Arc::clone(copy.element());
    assert!(Arc::ptr_eq(&copy.into_element(), &shared));
}

#[test]
fn test_declaration_accessors() {
    let element = function(Atom(31));
    assert_eq!(element.declaration_symbol(), Some(SymbolId(4)));
    assert_eq!(element.declaration_name(), Some(Atom(31)));
    assert_eq!(element.resolve_phase(), Some(FirResolvePhase::BodyResolve));
    assert!(element.kind().is_declaration());

    let narrowed = Fir::<FirSimpleFunction>::narrow(element).expect("function");
    assert_eq!(FirDeclarationVariant::symbol(&*narrowed), SymbolId(4));
    assert_eq!(
        FirDeclarationVariant::origin(&*narrowed),
        FirDeclarationOrigin::Library
    );
}

#[test]
fn test_expression_has_no_declaration_data() {
    let element = const_int(0);
    assert_eq!(element.declaration_symbol(), None);
    assert_eq!(element.resolve_phase(), None);
    assert_eq!(element.source(), Some(SyntaxNodeId(7)));
    assert_eq!(element.type_ref(), Some(&int_type()));
}

#[test]
fn test_kind_display_names() {
    assert_eq!(FirElementKind::FunctionCall.to_string(), "FirFunctionCall");
    assert_eq!(
        FirElementKind::ThisReceiver.to_string(),
        "FirThisReceiverExpression"
    );
    assert_eq!(<FirProperty as FirVariant>::KIND, FirElementKind::Property);
}

#[test]
fn test_reference_names() {
    let resolved = FirReference::Resolved {
        name: Atom(2),
        symbol: SymbolId(9),
    };
    let error = FirReference::Error {
        name: Atom(2),
        diagnostic: ReferenceDiagnostic::Ambiguous { candidates: 2 },
    };
    assert_eq!(resolved.name(), error.name());
    assert!(resolved.is_resolved());
    assert!(!error.is_resolved());
    assert!(!FirReference::Simple { name: Atom(2) }.is_resolved());
}
