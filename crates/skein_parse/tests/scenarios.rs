//! End-to-end behavior of the engine through its public API.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use skein_parse::{
    catch, choice, consume, fatal, literal, noop, parse_all, pattern, repeat, rollback, sequence,
    snapshot, Driver, Failure, FailureKind, ParseError, Parser, UsageError,
};

fn digit() -> impl Parser<Input = char, Output = char> + Clone {
    pattern("[0-9]").unwrap()
}

fn digit_token() -> impl Parser<Input = &'static str, Output = &'static str> + Clone {
    pattern("[0-9]").unwrap()
}

#[test]
fn test_literal_match_and_mismatch() {
    assert_eq!(parse_all(literal("A"), ["A"]).unwrap(), vec!["A"]);

    let error = parse_all(literal("A"), ["B"]).unwrap_err();
    assert_eq!(
        error,
        ParseError::Failure {
            failure: Failure::unexpected("B", "\"A\""),
            offset: 0,
        }
    );
}

#[test]
fn test_sequence_of_literals() {
    let ab = sequence((literal("A"), literal("B")));
    assert_eq!(parse_all(ab.clone(), ["A", "B"]).unwrap(), vec![("A", "B")]);

    let error = parse_all(ab, ["A", "C"]).unwrap_err();
    assert_eq!(error.offset(), Some(1));
    assert!(matches!(
        error.as_failure().map(Failure::kind),
        Some(FailureKind::Unexpected { found: "C", .. })
    ));
}

#[test]
fn test_choice_tie_aggregates() {
    let keyword = choice([literal("foo").boxed(), literal("bar").boxed()]);
    let error = parse_all(keyword, ["baz"]).unwrap_err();
    let failure = error.as_failure().unwrap();
    assert_eq!(
        failure.alternatives(),
        &[
            Failure::unexpected("baz", "\"foo\""),
            Failure::unexpected("baz", "\"bar\""),
        ]
    );
    assert_eq!(
        error.to_string(),
        "no alternative matched: unexpected \"baz\", expected \"foo\"; \
         unexpected \"baz\", expected \"bar\" at offset 0"
    );
}

#[test]
fn test_unbounded_repeat() {
    let digits = repeat(digit_token(), 0, None);
    assert_eq!(
        parse_all(digits.clone(), ["1", "2", "3"]).unwrap(),
        vec![vec!["1", "2", "3"]]
    );
    assert_eq!(parse_all(digits, []).unwrap(), vec![Vec::<&str>::new()]);
}

#[test]
fn test_streaming_bounded_repeat() {
    let pairs = repeat(digit(), 1, Some(2)).map(|digits| digits.into_iter().collect::<String>());
    let mut driver = Driver::new(pairs);

    let first: Vec<_> = driver.drive("12".chars(), true).unwrap().collect();
    assert_eq!(first, vec![Ok("12".to_string())]);

    let rest: Vec<_> = driver.drive("3456".chars(), false).unwrap().collect();
    assert_eq!(rest, vec![Ok("34".to_string()), Ok("56".to_string())]);
}

#[test]
fn test_choice_furthest_error() {
    let alternatives = [
        literal('x').map(|_| 0).boxed(),
        sequence((literal('a'), literal('x'))).map(|_| 1).boxed(),
        sequence((literal('a'), literal('b'), literal('x')))
            .map(|_| 2)
            .boxed(),
    ];
    let error = parse_all(choice(alternatives), "abc".chars()).unwrap_err();
    assert_eq!(
        error,
        ParseError::Failure {
            failure: Failure::unexpected('c', "'x'"),
            offset: 2,
        }
    );
}

#[test]
fn test_repeat_boundary_leaves_cursor_after_third() {
    let parser = repeat(literal('a'), 2, Some(4)).pair(literal(';'));
    let outputs = parse_all(parser, "aaa;".chars()).unwrap();
    assert_eq!(outputs, vec![(vec!['a'; 3], ';')]);
}

#[test]
fn test_snapshot_round_trip() {
    let replay = snapshot::<char>().then(|token| {
        repeat(consume::<char>(), 3, Some(3))
            .then(move |_| rollback::<char>(token))
            .then(|_| consume::<char>().many())
    });
    let outputs = parse_all(replay, "abcde".chars()).unwrap();
    assert_eq!(outputs, vec![vec!['a', 'b', 'c', 'd', 'e']]);
}

#[test]
fn test_no_consumption_guard() {
    let error = parse_all(noop::<char, _>("value"), "abc".chars()).unwrap_err();
    assert_eq!(error, ParseError::Usage(UsageError::NoConsumption));
}

#[test]
fn test_fatal_escapes_catch() {
    let parser = catch(fatal(literal("X")), |_| literal("Y"));
    let error = parse_all(parser, ["Y"]).unwrap_err();
    assert!(error.as_failure().unwrap().is_fatal());
}

#[test]
fn test_catch_recovers_non_fatal() {
    let parser = catch(literal("X"), |_| literal("Y"));
    assert_eq!(parse_all(parser, ["Y"]).unwrap(), vec!["Y"]);
}
