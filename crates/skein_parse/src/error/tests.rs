use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2003.to_string(), "E2003");
    assert!(ErrorCode::E1003.is_failure());
    assert!(ErrorCode::E2006.is_usage_error());
    assert!(!ErrorCode::E3001.is_failure());
}

#[test]
fn test_unexpected_display() {
    let failure = Failure::unexpected('x', "'a'");
    assert_eq!(failure.to_string(), "unexpected 'x', expected 'a'");
    assert_eq!(failure.code(), ErrorCode::E1001);
    assert!(!failure.is_fatal());
}

#[test]
fn test_end_of_input_display() {
    let failure: Failure<char> = Failure::end_of_input("digit");
    assert_eq!(failure.to_string(), "unexpected end of input, expected digit");
    assert_eq!(failure.code(), ErrorCode::E1002);
}

#[test]
fn test_fatal_keeps_kind() {
    let failure = Failure::unexpected("baz", "\"foo\"").into_fatal();
    assert!(failure.is_fatal());
    assert_eq!(failure.severity(), Severity::Fatal);
    assert!(matches!(
        failure.kind(),
        FailureKind::Unexpected { found: "baz", .. }
    ));
    assert_eq!(failure.to_string(), "fatal: unexpected \"baz\", expected \"foo\"");
}

#[test]
fn test_context_innermost_wins() {
    let failure: Failure<char> = Failure::message("bad digit")
        .with_context("while parsing number")
        .with_context("while parsing list");
    assert_eq!(failure.context(), Some("while parsing number"));
    assert_eq!(failure.to_string(), "bad digit (while parsing number)");
}

#[test]
fn test_aggregate_lists_members() {
    let failure = Failure::aggregate(vec![
        Failure::unexpected("baz", "\"foo\""),
        Failure::unexpected("baz", "\"bar\""),
    ]);
    assert_eq!(failure.code(), ErrorCode::E1003);
    assert_eq!(failure.alternatives().len(), 2);
    assert_eq!(
        failure.to_string(),
        "no alternative matched: unexpected \"baz\", expected \"foo\"; \
         unexpected \"baz\", expected \"bar\""
    );
}

#[test]
fn test_empty_aggregate() {
    let failure: Failure<char> = Failure::aggregate(Vec::new());
    assert_eq!(failure.to_string(), "no alternative matched: no alternatives");
    assert!(failure.alternatives().is_empty());
}

#[test]
fn test_single_failure_alternatives() {
    let failure = Failure::unexpected(1u8, "2");
    assert_eq!(failure.alternatives(), std::slice::from_ref(&failure));
}

#[test]
fn test_protocol_violation_is_fatal() {
    let failure: Failure<char> = Failure::protocol_violation("expected an item");
    assert!(failure.is_fatal());
    assert_eq!(failure.code(), ErrorCode::E1005);
}

#[test]
fn test_parse_error_accessors() {
    let error = ParseError::failure(Failure::unexpected('b', "'a'"), 4);
    assert_eq!(error.offset(), Some(4));
    assert_eq!(error.code(), ErrorCode::E1001);
    assert!(error.as_failure().is_some());
    assert!(error.as_usage().is_none());
    assert_eq!(error.to_string(), "unexpected 'b', expected 'a' at offset 4");

    let error: ParseError<char> = UsageError::NoConsumption.into();
    assert_eq!(error.code(), ErrorCode::E2001);
    assert_eq!(error.as_usage(), Some(&UsageError::NoConsumption));
    assert_eq!(error.offset(), None);

    let error: ParseError<char> = ParseError::BufferOverflow {
        retained: 9,
        limit: 8,
    };
    assert_eq!(error.code(), ErrorCode::E3001);
    assert_eq!(error.to_string(), "retained buffer holds 9 items, limit is 8");
}

#[test]
fn test_usage_error_messages() {
    let error = UsageError::ForeignSnapshot {
        token: SessionId(0),
        current: SessionId(2),
    };
    assert_eq!(
        error.to_string(),
        "snapshot from session #0 replayed into session #2"
    );
    assert_eq!(error.code(), ErrorCode::E2003);

    let error = UsageError::StaleSnapshot {
        offset: 1,
        start: 3,
        end: 5,
    };
    assert_eq!(
        error.to_string(),
        "snapshot offset 1 lies outside the retained input 3..=5"
    );
}
