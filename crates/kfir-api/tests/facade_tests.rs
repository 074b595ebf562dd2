use kfir_api::{
    FirApiError, KtSymbolByFirBuilder, KtSymbolKind, KtSymbolOrigin, callee_symbol,
    get_or_build_fir, get_or_build_fir_of_type, get_or_build_fir_safe, is_implicit_function_call,
    resolved_kt_symbol_of_name_reference, resolved_symbol_of_name_reference,
    unroll_fake_overrides,
};
use kfir_common::{OperatorNameConventions, StandardClassNames};
use kfir_resolve::{ResolveError, ResolveSession, SymbolProvider};
use kfir_tree::{
    BinaryOp, DeclarationModifiers, Fir, FirDeclarationOrigin, FirElement, FirElementKind,
    FirFunctionCall, FirProperty, FirResolvePhase, FirSimpleFunction, FirTypeRef, SyntaxArena,
    SyntaxNodeId,
};
use std::sync::Arc;

struct Sample {
    session: ResolveSession,
    x: SyntaxNodeId,
    box_fun: SyntaxNodeId,
    in_check: SyntaxNodeId,
    implicit_invoke: SyntaxNodeId,
    explicit_invoke: SyntaxNodeId,
}

/// ```kotlin
/// val x: Int? = 42
/// fun box(): String { if (x in 0..2) return "Fail in"; return "OK" }
///
/// class Greeter { operator fun invoke(name: String): String }
/// fun greet(g: Greeter) { g("a"); g.invoke("b") }
/// ```
fn sample() -> Sample {
    let mut arena = SyntaxArena::new();
    let int_q = arena.type_ref("Int", true);
    let forty_two = arena.int(42);
    let x = arena.property("x", DeclarationModifiers::empty(), Some(int_q), Some(forty_two));

    let x_ref = arena.name_ref("x");
    let zero = arena.int(0);
    let two = arena.int(2);
    let range = arena.binary(BinaryOp::RangeTo, zero, two);
    let in_check = arena.binary(BinaryOp::In, x_ref, range);
    let fail = arena.string("Fail in");
    let ret_fail = arena.return_expr(Some(fail));
    let if_expr = arena.if_expr(in_check, ret_fail, None);
    let ok = arena.string("OK");
    let ret_ok = arena.return_expr(Some(ok));
    let box_body = arena.block(vec![if_expr, ret_ok]);
    let string_ty = arena.type_ref("String", false);
    let box_fun = arena.function(
        "box",
        DeclarationModifiers::empty(),
        vec![],
        Some(string_ty),
        Some(box_body),
    );

    let name_ty = arena.type_ref("String", false);
    let name = arena.parameter("name", name_ty);
    let invoke_ret = arena.type_ref("String", false);
    let invoke = arena.function(
        "invoke",
        DeclarationModifiers::OPERATOR,
        vec![name],
        Some(invoke_ret),
        None,
    );
    let greeter = arena.class("Greeter", DeclarationModifiers::empty(), vec![], vec![invoke]);
    let g_ty = arena.type_ref("Greeter", false);
    let g = arena.parameter("g", g_ty);
    let a = arena.string("a");
    let implicit_invoke = arena.call_named("g", vec![a]);
    let g_ref = arena.name_ref("g");
    let b = arena.string("b");
    let invoke_call = arena.call_named("invoke", vec![b]);
    let explicit_invoke = arena.dot(g_ref, invoke_call);
    let greet_body = arena.block(vec![implicit_invoke, explicit_invoke]);
    let greet = arena.function(
        "greet",
        DeclarationModifiers::empty(),
        vec![g],
        None,
        Some(greet_body),
    );

    arena.file("sample.kt", vec![x, box_fun, greeter, greet]);
    Sample {
        session: ResolveSession::new(arena),
        x,
        box_fun,
        in_check,
        implicit_invoke,
        explicit_invoke,
    }
}

#[test]
fn repeated_accessor_calls_are_idempotent() {
    let s = sample();
    let first = get_or_build_fir(&s.session, s.box_fun, FirResolvePhase::DEFAULT).expect("box");
    let builds = s.session.stats().unit_builds;
    let second = get_or_build_fir(&s.session, s.box_fun, FirResolvePhase::DEFAULT).expect("box");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(s.session.stats().unit_builds, builds);

    let typed = get_or_build_fir_of_type::<FirSimpleFunction>(
        &s.session,
        s.box_fun,
        FirResolvePhase::DEFAULT,
    )
    .expect("a function");
    assert!(Arc::ptr_eq(typed.element(), &first));
}

#[test]
fn resolve_phase_never_decreases() {
    let s = sample();
    let mut last = None;
    for phase in FirResolvePhase::ALL {
        let x = get_or_build_fir_of_type::<FirProperty>(&s.session, s.x, phase).expect("x");
        assert!(x.resolve_phase >= phase);
        if let Some(previous) = last {
            assert!(x.resolve_phase >= previous);
        }
        last = Some(x.resolve_phase);
    }
    let raw = get_or_build_fir_of_type::<FirProperty>(&s.session, s.x, FirResolvePhase::Raw)
        .expect("cached");
    assert_eq!(raw.resolve_phase, FirResolvePhase::BodyResolve);
}

#[test]
fn safe_and_typed_accessors_agree() {
    let s = sample();
    for node in [s.x, s.box_fun, s.in_check] {
        let element = get_or_build_fir(&s.session, node, FirResolvePhase::DEFAULT).expect("node");
        let safe = get_or_build_fir_safe::<FirFunctionCall>(&s.session, node, FirResolvePhase::DEFAULT)
            .expect("resolves");
        let typed = get_or_build_fir_of_type::<FirFunctionCall>(
            &s.session,
            node,
            FirResolvePhase::DEFAULT,
        );
        match (safe, typed) {
            (Some(safe), Ok(typed)) => {
                assert!(safe.ptr_eq(&typed));
                assert_eq!(element.kind(), FirElementKind::FunctionCall);
            }
            (None, Err(FirApiError::InvalidFirElementType { expected, actual, text, .. })) => {
                assert_eq!(expected, FirElementKind::FunctionCall);
                assert_eq!(actual, element.kind());
                assert_eq!(text, s.session.syntax().text(node));
            }
            (safe, typed) => panic!("accessors disagree: {safe:?} vs {typed:?}"),
        }
    }
}

#[test]
fn mismatch_error_names_both_kinds() {
    let s = sample();
    let err = get_or_build_fir_of_type::<FirFunctionCall>(&s.session, s.x, FirResolvePhase::Raw)
        .expect_err("a property is not a call");
    let message = err.to_string();
    assert!(message.contains("FirFunctionCall"));
    assert!(message.contains("FirProperty"));
    assert!(message.contains("val x: Int? = 42"));
}

#[test]
fn operator_calls_are_not_implicit_invokes() {
    let s = sample();
    let contains = get_or_build_fir_of_type::<FirFunctionCall>(
        &s.session,
        s.in_check,
        FirResolvePhase::DEFAULT,
    )
    .expect("contains call");
    assert!(callee_symbol(&contains).is_some());
    assert!(!is_implicit_function_call(&contains, &s.session));
}

#[test]
fn invoke_through_a_variable_is_detected() {
    let s = sample();
    let implicit = get_or_build_fir_of_type::<FirFunctionCall>(
        &s.session,
        s.implicit_invoke,
        FirResolvePhase::DEFAULT,
    )
    .expect("g(\"a\")");
    assert!(is_implicit_function_call(&implicit, &s.session));
    assert_eq!(
        implicit.callee_reference.name(),
        OperatorNameConventions::INVOKE
    );

    // An explicit `g.invoke(..)` has the same shape once resolved.
    let explicit = get_or_build_fir_of_type::<FirFunctionCall>(
        &s.session,
        s.explicit_invoke,
        FirResolvePhase::DEFAULT,
    )
    .expect("g.invoke(\"b\")");
    assert!(is_implicit_function_call(&explicit, &s.session));
    assert_eq!(callee_symbol(&explicit), callee_symbol(&implicit));
}

#[test]
fn unresolved_phases_have_no_callee_symbol() {
    let s = sample();
    let raw = get_or_build_fir_of_type::<FirFunctionCall>(&s.session, s.in_check, FirResolvePhase::Raw)
        .expect("contains call");
    assert_eq!(resolved_symbol_of_name_reference(&raw.callee_reference), None);
    assert!(!is_implicit_function_call(&raw, &s.session));
}

#[test]
fn nullable_in_primitive_range_resolves_to_the_progression_member() {
    let s = sample();
    let contains = get_or_build_fir_of_type::<FirFunctionCall>(
        &s.session,
        s.in_check,
        FirResolvePhase::DEFAULT,
    )
    .expect("contains call");
    let symbol = callee_symbol(&contains).expect("resolved");
    assert!(s.session.is_fake_override(symbol));

    let fake = Fir::<FirSimpleFunction>::narrow(
        s.session.owning_declaration(symbol).expect("fake override"),
    )
    .expect("a function");
    assert_eq!(fake.origin, FirDeclarationOrigin::FakeOverride);

    let original = unroll_fake_overrides(fake.clone(), &s.session).expect("unrolls");
    assert!(!original.ptr_eq(&fake));
    assert_eq!(original.origin, FirDeclarationOrigin::Library);
    assert_eq!(original.name, OperatorNameConventions::CONTAINS);
    assert!(original.source.is_some());
    assert!(!s.session.is_fake_override(original.symbol));
    assert_eq!(s.session.overridden_symbol(symbol), Some(original.symbol));

    let parameter = original.parameter_type_refs().next().expect("value parameter");
    let cone = parameter.cone_type().expect("resolved parameter type");
    assert!(cone.is_nullable());
    assert_eq!(cone.class_name(), Some(StandardClassNames::INT));

    let owner = original.dispatch_receiver_class.expect("member of a class");
    let owner = s.session.symbol(owner).expect("owner symbol");
    assert_eq!(owner.name, StandardClassNames::INT_PROGRESSION);

    // Unrolling the original again is the identity.
    let again = unroll_fake_overrides(original.clone(), &s.session).expect("no-op");
    assert!(again.ptr_eq(&original));
}

#[test]
fn box_function_body_is_fully_typed() {
    let s = sample();
    let box_fun = get_or_build_fir_of_type::<FirSimpleFunction>(
        &s.session,
        s.box_fun,
        FirResolvePhase::DEFAULT,
    )
    .expect("box");
    let Some(FirElement::Block(body)) = box_fun.body.as_deref() else {
        panic!("box has a block body");
    };
    let FirElement::IfExpression(if_expr) = &*body.statements[0] else {
        panic!("if first");
    };
    let FirElement::FunctionCall(condition) = &*if_expr.condition else {
        panic!("condition is a call");
    };
    assert!(condition.callee_reference.is_resolved());
    let FirTypeRef::Resolved(condition_type) = &condition.type_ref else {
        panic!("condition is typed");
    };
    assert_eq!(condition_type.class_name(), Some(StandardClassNames::BOOLEAN));
    let FirTypeRef::Resolved(return_type) = &box_fun.return_type_ref else {
        panic!("declared return type");
    };
    assert_eq!(return_type.class_name(), Some(StandardClassNames::STRING));
}

#[test]
fn references_build_memoized_symbols() {
    let s = sample();
    let contains = get_or_build_fir_of_type::<FirFunctionCall>(
        &s.session,
        s.in_check,
        FirResolvePhase::DEFAULT,
    )
    .expect("contains call");
    let mut builder = KtSymbolByFirBuilder::new(&s.session);
    let symbol = resolved_kt_symbol_of_name_reference(&contains.callee_reference, &mut builder)
        .expect("resolved reference");
    assert_eq!(symbol.kind, KtSymbolKind::Function);
    assert_eq!(symbol.origin, KtSymbolOrigin::FakeOverride);
    assert_eq!(symbol.name, OperatorNameConventions::CONTAINS);

    let again = resolved_kt_symbol_of_name_reference(&contains.callee_reference, &mut builder)
        .expect("cached");
    assert!(Arc::ptr_eq(&symbol, &again));

    let FirElement::FunctionCall(receiver) = contains
        .explicit_receiver
        .as_deref()
        .expect("range receiver")
    else {
        panic!("range is a call");
    };
    let range_to = resolved_kt_symbol_of_name_reference(&receiver.callee_reference, &mut builder)
        .expect("rangeTo");
    assert_eq!(range_to.origin, KtSymbolOrigin::Library);
    assert_eq!(builder.len(), 2);
}

#[test]
fn cancellation_reaches_the_caller_unchanged() {
    let s = sample();
    s.session.cancellation().cancel();
    assert_eq!(
        get_or_build_fir(&s.session, s.box_fun, FirResolvePhase::DEFAULT),
        Err(ResolveError::Cancelled)
    );
    let err = get_or_build_fir_of_type::<FirSimpleFunction>(
        &s.session,
        s.box_fun,
        FirResolvePhase::DEFAULT,
    )
    .expect_err("cancelled");
    assert_eq!(err, FirApiError::Resolve(ResolveError::Cancelled));
}
