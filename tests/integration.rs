//! End-to-end tests for the Lox interpreter.
//!
//! These tests write a script to a temporary file, run it via the compiled
//! `lox` binary, and inspect stdout/stderr/exit status — mirroring the
//! build-then-run-and-capture style used elsewhere in this pack's
//! integration suites.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

struct RunResult {
    stdout: String,
    stderr: String,
    code: i32,
}

fn run_script(source: &str) -> RunResult {
    let mut file = NamedTempFile::with_suffix(".lox").expect("failed to create temp script file");
    file.write_all(source.as_bytes())
        .expect("failed to write script contents");

    let output: Output = Command::new(env!("CARGO_BIN_EXE_lox"))
        .arg(file.path())
        .output()
        .expect("failed to run the lox binary");

    RunResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code().expect("process exited via a signal"),
    }
}

#[test]
fn hello_world() {
    let result = run_script(r#"print "hello";"#);
    assert_eq!(result.stdout, "hello\n");
    assert_eq!(result.code, 0);
}

#[test]
fn variable_arithmetic() {
    let result = run_script("var a = 1; var b = 2; print a + b;");
    assert_eq!(result.stdout, "3\n");
    assert_eq!(result.code, 0);
}

#[test]
fn closure_over_counter() {
    let result = run_script(
        r#"
        fun makeCounter() {
          var i = 0;
          fun count() {
            i = i + 1;
            print i;
          }
          return count;
        }
        var c = makeCounter();
        c();
        c();
        "#,
    );
    assert_eq!(result.stdout, "1\n2\n");
    assert_eq!(result.code, 0);
}

#[test]
fn block_scope_shadowing() {
    let result = run_script(
        r#"
        var a = "outer";
        { var a = "inner"; print a; }
        print a;
        "#,
    );
    assert_eq!(result.stdout, "inner\nouter\n");
    assert_eq!(result.code, 0);
}

#[test]
fn parse_error_reports_and_exits_65() {
    let result = run_script("print;");
    assert!(result.stderr.contains("Error at ';': Expect expression."));
    assert_eq!(result.code, 65);
    assert_eq!(result.stdout, "");
}

#[test]
fn runtime_type_error_exits_70() {
    let result = run_script(r#"-"a";"#);
    assert!(result.stderr.contains("Unsupported operand for '-', must be 'number'."));
    assert_eq!(result.code, 70);
}

#[test]
fn for_loop_desugars_correctly() {
    let result = run_script("for (var i = 0; i < 3; i = i + 1) print i;");
    assert_eq!(result.stdout, "0\n1\n2\n");
}

#[test]
fn and_or_short_circuit_and_return_operand_values() {
    let result = run_script(r#"print "hi" or "bye"; print nil and "unreached";"#);
    assert_eq!(result.stdout, "hi\nnil\n");
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let result = run_script("print missing;");
    assert!(result.stderr.contains("Undefined variable 'missing'."));
    assert_eq!(result.code, 70);
}

#[test]
fn stringifies_integer_valued_doubles_without_trailing_zero() {
    let result = run_script("print 6 / 2;");
    assert_eq!(result.stdout, "3\n");
}

#[test]
fn recursive_function_calls_work() {
    let result = run_script(
        r#"
        fun fib(n) {
          if (n < 2) return n;
          return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
        "#,
    );
    assert_eq!(result.stdout, "55\n");
}

#[test]
fn top_level_return_is_a_resolve_error_not_a_crash() {
    let result = run_script("return 1;");
    assert!(result.stderr.contains("Can't return from top-level code."));
    assert_eq!(result.code, 70);
}

#[test]
fn repl_sees_a_variable_declared_on_an_earlier_line() {
    use std::process::Stdio;

    let mut child = Command::new(env!("CARGO_BIN_EXE_lox"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn the lox REPL");

    child
        .stdin
        .take()
        .expect("child stdin was not piped")
        .write_all(b"var a = 1;\nprint a;\n")
        .expect("failed to write to REPL stdin");

    let output = child.wait_with_output().expect("failed to run the lox REPL");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains('1'), "expected REPL to print the earlier line's variable, got stdout: {stdout:?}, stderr: {stderr:?}");
    assert!(stderr.is_empty(), "expected no errors, got stderr: {stderr:?}");
}

#[test]
fn multiple_parse_errors_are_all_reported() {
    let result = run_script("print; print;");
    let error_lines = result
        .stderr
        .lines()
        .filter(|line| line.contains("Expect expression."))
        .count();
    assert_eq!(error_lines, 2);
    assert_eq!(result.code, 65);
}
