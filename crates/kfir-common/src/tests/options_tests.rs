use super::*;

#[test]
fn test_defaults_come_from_limits() {
    let options = ResolveOptions::default();
    assert_eq!(options.max_resolution_depth, limits::MAX_RESOLUTION_DEPTH);
    assert_eq!(options.max_fake_override_chain, limits::MAX_FAKE_OVERRIDE_CHAIN);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let options = ResolveOptions::from_json_str(r#"{ "maxResolutionDepth": 8 }"#)
        .expect("valid options");
    assert_eq!(options.max_resolution_depth, 8);
    assert_eq!(options.max_fake_override_chain, limits::MAX_FAKE_OVERRIDE_CHAIN);
}

#[test]
fn test_zero_limit_is_rejected() {
    let err = ResolveOptions::from_json_str(r#"{ "maxFakeOverrideChain": 0 }"#)
        .expect_err("zero must be rejected");
    assert!(matches!(
        err,
        OptionsError::Zero {
            field: "maxFakeOverrideChain"
        }
    ));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = ResolveOptions::from_json_str("{ maxResolutionDepth: }").expect_err("malformed");
    assert!(matches!(err, OptionsError::Parse(_)));
}
