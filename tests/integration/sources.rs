//! Character sources and tokenizer modes

use std::io::Write;

use yapl::frontend::{ReaderSource, StrSource, TokenQueue, Tokenizer};
use yapl::util::config::YaplConfig;

use crate::{output, output_from};

const PROGRAM: &str = "
int add(int a, int b) { return a + b; }
double mix(double x, int n) { return x * n; }
add(2, 3);
mix(1.5, 4);
if (add(1, 1) < 3) 100 else 200;
";

const EXPECTED: &str = "Evaluated to 5\nEvaluated to 6.0\nEvaluated to 100\n";

#[test]
fn test_string_source() {
    assert_eq!(output(PROGRAM), EXPECTED);
}

#[test]
fn test_file_source() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(PROGRAM.as_bytes()).expect("write program");
    file.flush().expect("flush");

    let source = ReaderSource::open(file.path()).expect("open program");
    let out = output_from(Tokenizer::new(source), &YaplConfig::default());
    assert_eq!(out, EXPECTED);
}

#[test]
fn test_threaded_tokenizer_matches_synchronous() {
    let config = YaplConfig::default();
    let sync = output_from(Tokenizer::new(StrSource::new(PROGRAM)), &config);

    for capacity in [1, 2, 256] {
        let queue = TokenQueue::spawn(StrSource::new(PROGRAM), capacity).expect("spawn tokenizer");
        assert_eq!(output_from(queue, &config), sync, "capacity {}", capacity);
    }
}

#[test]
fn test_threaded_file_source() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(PROGRAM.as_bytes()).expect("write program");
    file.flush().expect("flush");

    let source = ReaderSource::open(file.path()).expect("open program");
    let queue = TokenQueue::spawn(source, 8).expect("spawn tokenizer");
    assert_eq!(output_from(queue, &YaplConfig::default()), EXPECTED);
}
