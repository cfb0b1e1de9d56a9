//! End-to-end sessions: parse, lower, commit, run, print

use proptest::prelude::*;

use crate::{output, values};

#[test]
fn test_add_function() {
    assert_eq!(
        output("int add(int a, int b) { return a + b; } add(2, 3);"),
        "Evaluated to 5\n"
    );
}

#[test]
fn test_mixed_arithmetic_is_float() {
    assert_eq!(values("1 + 2.5;"), vec!["3.5"]);
}

#[test]
fn test_conditionals() {
    assert_eq!(values("if (0) 1 else 2;"), vec!["2"]);
    assert_eq!(values("if (1) 1.0 else 2.0;"), vec!["1.0"]);
    assert_eq!(values("if (2.5 < 1.0) 10 else 20;"), vec!["20"]);
}

#[test]
fn test_precedence() {
    assert_eq!(values("1 + 2 * 3; (1 + 2) * 3; 10 - 4 - 3; 8 / 2 / 2;"), vec!["7", "9", "3", "2"]);
}

#[test]
fn test_comparison_results() {
    assert_eq!(values("1 < 2; 2 < 1; 1.5 < 2.5;"), vec!["1", "0", "1.0"]);
}

#[test]
fn test_signed_compare_by_default() {
    assert_eq!(values("int neg(int x) { return 0 - x; } neg(1) < 1;"), vec!["1"]);
}

#[test]
fn test_recursive_function() {
    let source = "
        int fib(int n) {
            return if (n < 2) n else fib(n - 1) + fib(n - 2);
        }
        fib(15);
    ";
    assert_eq!(values(source), vec!["610"]);
}

#[test]
fn test_function_bodies_with_locals() {
    let source = "
        double scale(double x) {
            double factor = 2.5;
            int unused;
            return x * factor;
        }
        scale(4.0);
    ";
    assert_eq!(values(source), vec!["10.0"]);
}

#[test]
fn test_argument_and_return_coercion() {
    let source = "
        double half(double x) { return x / 2.0; }
        int trunc(double x) { return x; }
        half(3);
        trunc(7.9);
    ";
    assert_eq!(values(source), vec!["1.5", "7"]);
}

#[test]
fn test_missing_return_yields_zero() {
    assert_eq!(values("int nothing() { } nothing(); double zero() { } zero();"), vec!["0", "0.0"]);
}

#[test]
fn test_host_functions() {
    let source = "
        double sqrt(double x);
        double fabs(double x);
        sqrt(2.0 * 8.0);
        fabs(0.0 - 3.0);
    ";
    assert_eq!(values(source), vec!["4.0", "3.0"]);
}

#[test]
fn test_global_variables_print_nothing() {
    assert_eq!(output("int x = 3; double y; 1;"), "Evaluated to 1\n");
}

#[test]
fn test_include_is_skipped() {
    assert_eq!(values("include stdio; 5;"), vec!["5"]);
}

proptest! {
    #[test]
    fn prop_int_literals_evaluate_to_themselves(n in 0i32..=i32::MAX) {
        prop_assert_eq!(values(&format!("{};", n)), vec![n.to_string()]);
    }

    #[test]
    fn prop_sum_matches_wrapping_add(a in 0i32..100_000, b in 0i32..100_000) {
        prop_assert_eq!(
            values(&format!("{} + {};", a, b)),
            vec![a.wrapping_add(b).to_string()]
        );
    }
}
