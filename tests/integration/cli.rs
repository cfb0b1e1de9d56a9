//! The `yapl` binary

use std::io::Write;
use std::process::{Command, Stdio};

fn yapl() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_yapl"));
    // Keep the user's configuration out of the way.
    command.env("XDG_CONFIG_HOME", std::env::temp_dir().join("yapl-test-config"));
    command
}

#[test]
fn test_runs_file_argument() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "int add(int a, int b) {{ return a + b; }} add(2, 3);").expect("write");

    let output = yapl().arg(file.path()).output().expect("run yapl");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Evaluated to 5\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("YAPL v"));
}

#[test]
fn test_reads_piped_stdin() {
    let mut child = yapl()
        .arg("--sync-lexer")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn yapl");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"1 + 2.5;\nif (0) 1 else 2;\n")
        .expect("write stdin");

    let output = child.wait_with_output().expect("wait for yapl");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Evaluated to 3.5\nEvaluated to 2\n"
    );
}

#[test]
fn test_errors_do_not_change_exit_code() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "nope(1); 1 / 0; 4;").expect("write");

    let output = yapl().arg(file.path()).output().expect("run yapl");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Evaluated to 4\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR"));
}

#[test]
fn test_emit_ir_logs_units() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "int one() {{ return 1; }}").expect("write");

    let output = yapl()
        .args(["--emit-ir", "-O", "0"])
        .arg(file.path())
        .output()
        .expect("run yapl");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("define i32 @one()"));
}
