//! Function registry behavior across unit rotations

use yapl::util::config::YaplConfig;

use crate::{output, output_with, values};

#[test]
fn test_prototype_resolves_after_rotation() {
    // `7;` commits and rotates the unit between the prototype and the call.
    let source = "
        int foo(int x);
        7;
        int foo(int x) { return x * 10; }
        foo(1);
    ";
    assert_eq!(values(source), vec!["7", "10"]);
}

#[test]
fn test_definitions_survive_many_rotations() {
    let source = "
        int sq(int x) { return x * x; }
        1; 2; 3;
        sq(4);
        double avg(double a, double b) { return (a + b) / 2.0; }
        avg(sq(2), 5);
    ";
    assert_eq!(values(source), vec!["1", "2", "3", "16", "4.5"]);
}

#[test]
fn test_call_before_definition_fails_at_run_time_only() {
    let source = "
        int later(int x);
        int early(int y) { return later(y) + 1; }
        early(1);
        int later(int x) { return x + 100; }
        early(1);
    ";
    assert_eq!(values(source), vec!["102"]);
}

#[test]
fn test_redefinition_is_rejected_by_default() {
    let source = "
        int version() { return 1; }
        int version() { return 2; }
        version();
    ";
    assert_eq!(values(source), vec!["1"]);
}

#[test]
fn test_rejected_redefinition_keeps_live_types() {
    let source = "
        int f(int x) { return x + 1; }
        double f(double x) { return x * 2.5; }
        f(2);
        double f(double x);
        f(2) * 3;
    ";
    assert_eq!(values(source), vec!["3", "9"]);
}

#[test]
fn test_redefinition_when_allowed() {
    let mut config = YaplConfig::default();
    config.jit.allow_redefinition = true;
    let source = "
        int version() { return 1; }
        version();
        int version() { return 2; }
        version();
    ";
    assert_eq!(
        output_with(source, &config),
        "Evaluated to 1\nEvaluated to 2\n"
    );
}

#[test]
fn test_prototype_after_definition_is_harmless() {
    let source = "
        int one() { return 1; }
        int one();
        one();
    ";
    assert_eq!(output(source), "Evaluated to 1\n");
}
