//! # YAPL benchmarks
//!
//! Criterion.rs benchmarks for each stage of the pipeline.
//!
//! ## Groups
//! - `frontend`: tokenizing and parsing
//! - `lowering`: IR generation and function passes
//! - `session`: whole read-eval-print sessions
//!
//! ## Usage
//! ```bash
//! cargo bench           # run everything
//! cargo bench frontend  # tokenizer and parser only
//! ```

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use yapl::frontend::{parse_all, tokenize, Node};
use yapl::backends::interpreter::Engine;
use yapl::middle::core::ir_gen::{IrGenerator, LowerOptions};
use yapl::util::config::{OptLevel, YaplConfig};
use yapl::run_source;

const FIB: &str = "
int fib(int n) { return if (n < 2) n else fib(n - 1) + fib(n - 2); }
fib(18);
";

fn arithmetic_program(forms: usize) -> String {
    let mut source = String::from("double poly(double x, int n) { return x * x * n + x / 2.0 - 1; }\n");
    for i in 0..forms {
        source.push_str(&format!("poly({}.5, {}) + {} * 3 - (1 < {});\n", i, i, i, i));
    }
    source
}

// ============================================================================
// Frontend
// ============================================================================

fn bench_tokenize(c: &mut Criterion) {
    let source = arithmetic_program(200);
    c.bench_function("frontend/tokenize", |b| b.iter(|| tokenize(black_box(&source))));
}

fn bench_parse(c: &mut Criterion) {
    let source = arithmetic_program(200);
    c.bench_function("frontend/parse", |b| b.iter(|| parse_all(black_box(&source))));
}

// ============================================================================
// Lowering
// ============================================================================

fn lower_all(
    nodes: &[Node],
    level: OptLevel,
) -> usize {
    let options = LowerOptions {
        opt_level: level,
        ..LowerOptions::default()
    };
    let mut gen = IrGenerator::new(Arc::new(Engine::default()), options);
    let mut instructions = 0;
    for node in nodes {
        let lowered = match node {
            Node::Decl(decl) => gen.lower_declaration(decl).map(|_| ()),
            Node::Anon(anon) => gen.lower_anonymous(anon).map(|_| ()),
            Node::Expr(_) => Ok(()),
        };
        if lowered.is_ok() {
            instructions += gen.take_unit().functions().map(|f| f.instruction_count()).sum::<usize>();
        }
    }
    instructions
}

fn bench_lowering(c: &mut Criterion) {
    let (nodes, _) = parse_all(&arithmetic_program(200));
    let mut group = c.benchmark_group("lowering");
    for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2] {
        group.bench_function(level.to_string(), |b| b.iter(|| lower_all(black_box(&nodes), level)));
    }
    group.finish();
}

// ============================================================================
// Sessions
// ============================================================================

fn bench_session_fib(c: &mut Criterion) {
    let config = YaplConfig::default();
    c.bench_function("session/fib18", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            run_source(black_box(FIB), &config, &mut out).map(|stats| stats.evaluated)
        })
    });
}

fn bench_session_arithmetic(c: &mut Criterion) {
    let source = arithmetic_program(100);
    let config = YaplConfig::default();
    c.bench_function("session/arithmetic100", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            run_source(black_box(&source), &config, &mut out).map(|stats| stats.evaluated)
        })
    });
}

criterion_group!(frontend, bench_tokenize, bench_parse);
criterion_group!(lowering, bench_lowering);
criterion_group!(session, bench_session_fib, bench_session_arithmetic);
criterion_main!(frontend, lowering, session);
