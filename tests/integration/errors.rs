//! Every failure is scoped to its own top-level form

use yapl::util::config::YaplConfig;
use yapl::run_source;

use crate::{output, values};

#[test]
fn test_wrong_argument_count_leaves_session_intact() {
    let source = "
        int add(int a, int b) { return a + b; }
        add(1);
        add(1, 2, 3);
        add(2, 3);
    ";
    assert_eq!(values(source), vec!["5"]);
}

#[test]
fn test_wrong_argument_count_is_counted() {
    let mut out = Vec::new();
    let stats = run_source(
        "int add(int a, int b) { return a + b; } add(1); add(2, 3);",
        &YaplConfig::default(),
        &mut out,
    )
    .expect("session");
    assert_eq!(stats.forms, 3);
    assert_eq!(stats.evaluated, 1);
    assert_eq!(stats.failed, 1);
}

#[test]
fn test_syntax_errors_resynchronize() {
    let source = "
        int (x);
        double f(double x { return x; }
        3;
    ";
    assert_eq!(values(source), vec!["3"]);
}

#[test]
fn test_unknown_identifier() {
    assert_eq!(values("nope + 1; 2;"), vec!["2"]);
}

#[test]
fn test_duplicate_parameters() {
    assert_eq!(values("int f(int a, int a) { return a; } 4;"), vec!["4"]);
}

#[test]
fn test_initializer_mismatch() {
    assert_eq!(values("int x = 2.5; 6;"), vec!["6"]);
}

#[test]
fn test_division_by_zero_is_scoped() {
    let source = "
        int div(int a, int b) { return a / b; }
        div(1, 0);
        div(9, 3);
        1.0 / 0.0;
    ";
    assert_eq!(values(source), vec!["3", "inf"]);
}

#[test]
fn test_runaway_recursion_is_bounded() {
    let mut config = YaplConfig::default();
    config.jit.max_call_depth = 64;
    let mut out = Vec::new();
    let stats = run_source(
        "int spin(int n) { return spin(n + 1); } spin(0); 1;",
        &config,
        &mut out,
    )
    .expect("session");
    assert_eq!(String::from_utf8(out).expect("utf-8"), "Evaluated to 1\n");
    assert_eq!(stats.failed, 1);
}

#[test]
fn test_deep_recursion_within_the_limit() {
    let source = "
        int down(int n) { return if (n < 1) 0 else down(n - 1); }
        down(500);
        down(600);
        down(10);
    ";
    assert_eq!(values(source), vec!["0", "0"]);

    let mut config = YaplConfig::default();
    config.jit.max_call_depth = 200_000;
    let source = "int up(int n) { return if (n < 1) 0 else up(n - 1) + 1; } up(150000);";
    assert_eq!(crate::output_with(source, &config), "Evaluated to 150000\n");
}

#[test]
fn test_empty_input() {
    assert_eq!(output(""), "");
    assert_eq!(output("   \n\t  "), "");
}
