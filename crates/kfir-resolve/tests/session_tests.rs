use kfir_common::{Atom, OperatorNameConventions, ResolveOptions, StandardClassNames};
use kfir_resolve::{ModuleResolveState, ResolveError, ResolveSession, SymbolProvider};
use kfir_tree::{
    BinaryOp, ConeType, DeclarationModifiers, FirDeclarationOrigin, FirElement, FirReference,
    FirResolvePhase, FirTypeRef, ReferenceDiagnostic, SymbolKind, SyntaxArena, SyntaxKind,
    SyntaxNodeId,
};
use std::sync::Arc;

struct RangeFixture {
    session: ResolveSession,
    file: SyntaxNodeId,
    x: SyntaxNodeId,
    box_fun: SyntaxNodeId,
    in_check: SyntaxNodeId,
    range: SyntaxNodeId,
}

/// ```kotlin
/// val x: Int? = 42
/// fun box(): String { if (x in 0..2) return "Fail in"; return "OK" }
/// ```
fn range_fixture() -> RangeFixture {
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
    let body = arena.block(vec![if_expr, ret_ok]);
    let string_ty = arena.type_ref("String", false);
    let box_fun = arena.function(
        "box",
        DeclarationModifiers::empty(),
        vec![],
        Some(string_ty),
        Some(body),
    );
    let file = arena.file("nullableInPrimitiveRange.kt", vec![x, box_fun]);
    RangeFixture {
        session: ResolveSession::new(arena),
        file,
        x,
        box_fun,
        in_check,
        range,
    }
}

fn call_of(element: &FirElement) -> &kfir_tree::FirFunctionCall {
    match element {
        FirElement::FunctionCall(call) => call,
        other => panic!("expected a call, got {}", other.kind()),
    }
}

fn cone(type_ref: Option<&FirTypeRef>) -> ConeType {
    type_ref
        .and_then(FirTypeRef::cone_type)
        .cloned()
        .expect("resolved type")
}

#[test]
fn repeated_requests_return_the_same_element() {
    let fx = range_fixture();
    let first = fx
        .session
        .resolve_to(fx.in_check, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let builds = fx.session.stats().unit_builds;
    let second = fx
        .session
        .resolve_to(fx.in_check, FirResolvePhase::BodyResolve)
        .expect("resolves");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fx.session.stats().unit_builds, builds);
}

#[test]
fn shallower_request_is_served_from_the_deeper_cache() {
    let fx = range_fixture();
    let deep = fx
        .session
        .resolve_to(fx.box_fun, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let builds = fx.session.stats().unit_builds;
    let shallow = fx
        .session
        .resolve_to(fx.box_fun, FirResolvePhase::Raw)
        .expect("resolves");
    assert!(Arc::ptr_eq(&deep, &shallow));
    assert_eq!(shallow.resolve_phase(), Some(FirResolvePhase::BodyResolve));
    assert_eq!(fx.session.stats().unit_builds, builds);
}

#[test]
fn deeper_request_rebuilds_phase_by_phase() {
    let fx = range_fixture();
    let raw = fx
        .session
        .resolve_to(fx.x, FirResolvePhase::Raw)
        .expect("resolves");
    assert_eq!(fx.session.cached_phase(fx.x), Some(FirResolvePhase::Raw));

    let before = fx.session.stats().unit_builds;
    let resolved = fx
        .session
        .resolve_to(fx.x, FirResolvePhase::BodyResolve)
        .expect("resolves");
    // Signatures, Types and BodyResolve of `x` itself.
    assert!(fx.session.stats().unit_builds >= before + 3);
    assert!(!Arc::ptr_eq(&raw, &resolved));
    assert_eq!(resolved.resolve_phase(), Some(FirResolvePhase::BodyResolve));
    assert!(resolved.resolve_phase() >= raw.resolve_phase());
}

#[test]
fn raw_phase_keeps_names_unresolved() {
    let fx = range_fixture();
    let element = fx
        .session
        .resolve_to(fx.in_check, FirResolvePhase::Raw)
        .expect("resolves");
    let contains = call_of(&element);
    assert_eq!(
        contains.callee_reference,
        FirReference::Simple {
            name: OperatorNameConventions::CONTAINS
        }
    );
    assert!(contains.dispatch_receiver.is_none());
    assert_eq!(contains.type_ref, FirTypeRef::Implicit);

    let receiver = contains.explicit_receiver.as_deref().expect("range receiver");
    assert_eq!(
        call_of(receiver).callee_reference.name(),
        OperatorNameConventions::RANGE_TO
    );

    let x = fx
        .session
        .resolve_to(fx.x, FirResolvePhase::Raw)
        .expect("resolves");
    assert!(matches!(
        x.type_ref(),
        Some(FirTypeRef::Unresolved { nullable: true, .. })
    ));
}

#[test]
fn signatures_resolve_declared_types() {
    let fx = range_fixture();
    let x = fx
        .session
        .resolve_to(fx.x, FirResolvePhase::Signatures)
        .expect("resolves");
    let ty = cone(x.type_ref());
    assert_eq!(ty.class_name(), Some(StandardClassNames::INT));
    assert!(ty.is_nullable());
}

#[test]
fn body_resolve_picks_the_nullable_contains_overload() {
    let fx = range_fixture();
    let element = fx
        .session
        .resolve_to(fx.in_check, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let contains = call_of(&element);
    let FirReference::Resolved { symbol, .. } = contains.callee_reference else {
        panic!("contains is resolved: {:?}", contains.callee_reference);
    };
    let symbol_data = fx.session.symbol(symbol).expect("known symbol");
    assert!(symbol_data.is_fake_override());
    assert_eq!(symbol_data.kind, SymbolKind::Function);

    let declaration = fx.session.owning_declaration(symbol).expect("fake override");
    let FirElement::SimpleFunction(function) = &*declaration else {
        panic!("function expected");
    };
    assert_eq!(function.origin, FirDeclarationOrigin::FakeOverride);
    let parameter = function.parameter_type_refs().next().expect("one parameter");
    assert!(cone(Some(parameter)).is_nullable());

    assert_eq!(
        cone(Some(&contains.type_ref)).class_name(),
        Some(StandardClassNames::BOOLEAN)
    );
    assert!(contains.dispatch_receiver.is_some());

    let range = fx
        .session
        .resolve_to(fx.range, FirResolvePhase::BodyResolve)
        .expect("resolves");
    assert_eq!(
        cone(range.type_ref()).class_name(),
        Some(StandardClassNames::INT_RANGE)
    );
}

#[test]
fn non_nullable_argument_prefers_the_most_specific_overload() {
    let mut arena = SyntaxArena::new();
    let one = arena.int(1);
    let zero = arena.int(0);
    let two = arena.int(2);
    let range = arena.binary(BinaryOp::RangeTo, zero, two);
    let in_check = arena.binary(BinaryOp::In, one, range);
    let f = arena.function(
        "f",
        DeclarationModifiers::empty(),
        vec![],
        None,
        Some(in_check),
    );
    arena.file("specific.kt", vec![f]);
    let session = ResolveSession::new(arena);

    let element = session
        .resolve_to(in_check, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let FirReference::Resolved { symbol, .. } = call_of(&element).callee_reference else {
        panic!("resolved");
    };
    let declaration = session.owning_declaration(symbol).expect("declaration");
    let FirElement::SimpleFunction(function) = &*declaration else {
        panic!("function expected");
    };
    let parameter = function.parameter_type_refs().next().expect("one parameter");
    assert!(!cone(Some(parameter)).is_nullable());
}

#[test]
fn not_in_is_negated_contains() {
    let mut arena = SyntaxArena::new();
    let one = arena.int(1);
    let zero = arena.int(0);
    let two = arena.int(2);
    let range = arena.binary(BinaryOp::RangeTo, zero, two);
    let not_in = arena.binary(BinaryOp::NotIn, one, range);
    let f = arena.function("f", DeclarationModifiers::empty(), vec![], None, Some(not_in));
    arena.file("not_in.kt", vec![f]);
    let session = ResolveSession::new(arena);

    let element = session
        .resolve_to(not_in, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let not = call_of(&element);
    assert_eq!(not.callee_reference.name(), OperatorNameConventions::NOT);
    assert!(not.callee_reference.is_resolved());
    let contains = call_of(not.explicit_receiver.as_deref().expect("receiver"));
    assert_eq!(contains.callee_reference.name(), OperatorNameConventions::CONTAINS);
    assert!(contains.callee_reference.is_resolved());
}

#[test]
fn implicit_invoke_on_parameter() {
    // class Greeter { operator fun invoke(name: String): String }
    // fun greet(g: Greeter): String { return g("kfir") }
    let mut arena = SyntaxArena::new();
    let name_ty = arena.type_ref("String", false);
    let name_param = arena.parameter("name", name_ty);
    let invoke_ret = arena.type_ref("String", false);
    let invoke = arena.function(
        "invoke",
        DeclarationModifiers::OPERATOR,
        vec![name_param],
        Some(invoke_ret),
        None,
    );
    let greeter = arena.class("Greeter", DeclarationModifiers::empty(), vec![], vec![invoke]);

    let g_ty = arena.type_ref("Greeter", false);
    let g = arena.parameter("g", g_ty);
    let arg = arena.string("kfir");
    let call = arena.call_named("g", vec![arg]);
    let ret = arena.return_expr(Some(call));
    let body = arena.block(vec![ret]);
    let ret_ty = arena.type_ref("String", false);
    let greet = arena.function(
        "greet",
        DeclarationModifiers::empty(),
        vec![g],
        Some(ret_ty),
        Some(body),
    );
    arena.file("invoke.kt", vec![greeter, greet]);
    let session = ResolveSession::new(arena);

    let element = session
        .resolve_to(call, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let call = call_of(&element);
    assert_eq!(
        call.callee_reference,
        FirReference::Resolved {
            name: OperatorNameConventions::INVOKE,
            symbol: session.declaration_symbol(invoke).expect("symbol"),
        }
    );
    let receiver = call.dispatch_receiver.as_deref().expect("dispatch receiver");
    let FirElement::QualifiedAccessExpression(access) = receiver else {
        panic!("receiver is an access");
    };
    assert_eq!(
        access.callee_reference,
        FirReference::Resolved {
            name: session.syntax().interner().lookup("g").expect("interned"),
            symbol: session.declaration_symbol(g).expect("symbol"),
        }
    );
}

#[test]
fn member_calls_use_implicit_this() {
    // open class Base { fun id(): Int }
    // class Derived : Base { fun use(): Int { return id() } }
    let mut arena = SyntaxArena::new();
    let id_ret = arena.type_ref("Int", false);
    let id = arena.function("id", DeclarationModifiers::empty(), vec![], Some(id_ret), None);
    let base = arena.class("Base", DeclarationModifiers::OPEN, vec![], vec![id]);
    let call = arena.call_named("id", vec![]);
    let ret = arena.return_expr(Some(call));
    let body = arena.block(vec![ret]);
    let use_ret = arena.type_ref("Int", false);
    let use_fun = arena.function(
        "use",
        DeclarationModifiers::empty(),
        vec![],
        Some(use_ret),
        Some(body),
    );
    let base_ty = arena.type_ref("Base", false);
    let derived = arena.class(
        "Derived",
        DeclarationModifiers::empty(),
        vec![base_ty],
        vec![use_fun],
    );
    arena.file("members.kt", vec![base, derived]);
    let session = ResolveSession::new(arena);

    let element = session
        .resolve_to(call, FirResolvePhase::BodyResolve)
        .expect("resolves");
    let call = call_of(&element);
    let FirReference::Resolved { symbol, .. } = call.callee_reference else {
        panic!("resolved");
    };
    let id_symbol = session.declaration_symbol(id).expect("symbol");
    assert_eq!(session.overridden_symbol(symbol), Some(id_symbol));
    assert!(matches!(
        call.dispatch_receiver.as_deref(),
        Some(FirElement::ThisReceiver(_))
    ));
}

#[test]
fn unresolved_and_ambiguous_calls_become_error_references() {
    // fun a(x: Int?) {}  fun a(x: Int?) {}  fun f() { a(1); missing() }
    fn overload(arena: &mut SyntaxArena) -> SyntaxNodeId {
        let ty = arena.type_ref("Int", true);
        let param = arena.parameter("x", ty);
        let body = arena.block(vec![]);
        arena.function("a", DeclarationModifiers::empty(), vec![param], None, Some(body))
    }
    let mut arena = SyntaxArena::new();
    let a1 = overload(&mut arena);
    let a2 = overload(&mut arena);
    let one = arena.int(1);
    let ambiguous = arena.call_named("a", vec![one]);
    let missing = arena.call_named("missing", vec![]);
    let body = arena.block(vec![ambiguous, missing]);
    let f = arena.function("f", DeclarationModifiers::empty(), vec![], None, Some(body));
    arena.file("errors.kt", vec![a1, a2, f]);
    let session = ResolveSession::new(arena);

    let ambiguous = session
        .resolve_to(ambiguous, FirResolvePhase::BodyResolve)
        .expect("resolves");
    assert!(matches!(
        call_of(&ambiguous).callee_reference,
        FirReference::Error {
            diagnostic: ReferenceDiagnostic::Ambiguous { candidates: 2 },
            ..
        }
    ));
    let missing = session
        .resolve_to(missing, FirResolvePhase::BodyResolve)
        .expect("resolves");
    assert!(matches!(
        call_of(&missing).callee_reference,
        FirReference::Error {
            diagnostic: ReferenceDiagnostic::Unresolved,
            ..
        }
    ));
    assert!(cone(missing.type_ref()).is_error());
}

#[test]
fn implicit_type_recursion_becomes_an_error_type() {
    // val a = b
    // val b = a
    let mut arena = SyntaxArena::new();
    let b_ref = arena.name_ref("b");
    let a = arena.property("a", DeclarationModifiers::empty(), None, Some(b_ref));
    let a_ref = arena.name_ref("a");
    let b = arena.property("b", DeclarationModifiers::empty(), None, Some(a_ref));
    arena.file("cycle.kt", vec![a, b]);
    let session = ResolveSession::new(arena);

    let a = session
        .resolve_to(a, FirResolvePhase::Types)
        .expect("cycles do not fail the request");
    assert!(cone(a.type_ref()).is_error());
    let inner = session
        .resolve_to(a_ref, FirResolvePhase::Types)
        .expect("resolves");
    let FirElement::QualifiedAccessExpression(access) = &*inner else {
        panic!("access expected");
    };
    assert!(matches!(
        access.callee_reference,
        FirReference::Error {
            diagnostic: ReferenceDiagnostic::Recursive,
            ..
        }
    ));
}

#[test]
fn implicit_property_types_are_inferred_at_types() {
    let mut arena = SyntaxArena::new();
    let value = arena.int(7);
    let p = arena.property("p", DeclarationModifiers::empty(), None, Some(value));
    arena.file("infer.kt", vec![p]);
    let session = ResolveSession::new(arena);

    let signatures = session
        .resolve_to(p, FirResolvePhase::Signatures)
        .expect("resolves");
    assert_eq!(signatures.type_ref(), Some(&FirTypeRef::Implicit));
    let types = session
        .resolve_to(p, FirResolvePhase::Types)
        .expect("resolves");
    assert_eq!(
        cone(types.type_ref()).class_name(),
        Some(StandardClassNames::INT)
    );
}

#[test]
fn invalidation_rebuilds_with_stable_symbols() {
    let fx = range_fixture();
    let before = fx
        .session
        .resolve_to(fx.x, FirResolvePhase::BodyResolve)
        .expect("resolves");
    assert!(fx.session.invalidate(fx.x));
    assert_eq!(fx.session.cached_phase(fx.x), None);
    let after = fx
        .session
        .resolve_to(fx.x, FirResolvePhase::BodyResolve)
        .expect("resolves");
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.declaration_symbol(), after.declaration_symbol());

    fx.session.invalidate_all();
    assert_eq!(fx.session.cached_phase(fx.box_fun), None);
    assert_eq!(fx.session.cached_phase(fx.file), None);
}

#[test]
fn cancellation_fails_new_builds() {
    let fx = range_fixture();
    fx.session.cancellation().cancel();
    assert_eq!(
        fx.session.resolve_to(fx.in_check, FirResolvePhase::BodyResolve),
        Err(ResolveError::Cancelled)
    );
    fx.session.cancellation().reset();
    assert!(
        fx.session
            .resolve_to(fx.in_check, FirResolvePhase::BodyResolve)
            .is_ok()
    );
}

#[test]
fn depth_limit_is_reported() {
    // val p0 = 0; val p1 = p0; ...; val last = p7
    let mut arena = SyntaxArena::new();
    let mut previous = arena.int(0);
    let mut declarations = Vec::new();
    for i in 0..8 {
        let name = format!("p{i}");
        let p = arena.property(&name, DeclarationModifiers::empty(), None, Some(previous));
        declarations.push(p);
        previous = arena.name_ref(&name);
    }
    let last = arena.property("last", DeclarationModifiers::empty(), None, Some(previous));
    declarations.push(last);
    arena.file("chain.kt", declarations);
    let options = ResolveOptions {
        max_resolution_depth: 3,
        ..ResolveOptions::default()
    };
    let session = ResolveSession::with_options(arena, options);
    assert!(matches!(
        session.resolve_to(last, FirResolvePhase::Types),
        Err(ResolveError::DepthExceeded { limit: 3 })
    ));
}

#[test]
fn lookup_failures_are_errors() {
    let mut arena = SyntaxArena::new();
    let x = arena.name_ref("x");
    let detached = arena.int(5);
    let one = arena.int(1);
    let g = arena.call_named("g", vec![]);
    let odd_call = arena.call(g, vec![one]);
    let qualified = arena.dot(x, odd_call);
    let f = arena.function("f", DeclarationModifiers::empty(), vec![], None, Some(qualified));
    arena.file("odd.kt", vec![f]);
    let session = ResolveSession::new(arena);

    assert_eq!(
        session.resolve_to(SyntaxNodeId(u32::MAX), FirResolvePhase::Raw),
        Err(ResolveError::UnknownNode(SyntaxNodeId(u32::MAX)))
    );
    assert_eq!(
        session.resolve_to(detached, FirResolvePhase::Raw),
        Err(ResolveError::NoContainingDeclaration(detached))
    );
    assert!(matches!(
        session.resolve_to(one, FirResolvePhase::Raw),
        Err(ResolveError::NotMapped { .. })
    ));
    let selector = session
        .resolve_to(odd_call, FirResolvePhase::Raw)
        .expect("selector is mapped");
    assert!(matches!(&*selector, FirElement::ErrorExpression(_)));
}

#[test]
fn builtins_range_inherits_progression_members() {
    let fx = range_fixture();
    let library = fx.session.library_file();
    let range_class = fx
        .session
        .syntax()
        .ids()
        .find(|&id| {
            fx.session.syntax().containing_file(id) == Some(library)
                && fx.session.syntax().kind(id) == Some(SyntaxKind::Class)
                && fx.session.syntax().data(id).and_then(|d| d.name())
                    == Some(StandardClassNames::INT_RANGE)
        })
        .expect("IntRange is declared");
    let class = fx
        .session
        .resolve_to(range_class, FirResolvePhase::Signatures)
        .expect("resolves");
    let FirElement::RegularClass(class) = &*class else {
        panic!("class expected");
    };
    assert_eq!(class.origin, FirDeclarationOrigin::Library);
    let names: Vec<Atom> = class
        .fake_overrides
        .iter()
        .filter_map(|fake| fake.declaration_name())
        .collect();
    assert_eq!(
        names
            .iter()
            .filter(|&&name| name == OperatorNameConventions::CONTAINS)
            .count(),
        2
    );
    assert_eq!(
        class.super_type_refs[0].cone_type().and_then(ConeType::class_name),
        Some(StandardClassNames::INT_PROGRESSION)
    );
}
