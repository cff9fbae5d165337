use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn run_tangle(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tangle"))
        .args(args)
        .output()
        .unwrap()
}

fn write_js(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn usage_without_args() {
    let out = run_tangle(&[]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage: tangle"));
}

#[test]
fn unknown_command_fails() {
    let out = run_tangle(&["bundle"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn resolve_orders_and_concatenates() {
    let dir = TempDir::new().unwrap();
    let user = write_js(dir.path(), "user.js", "var app = new Widget('x');\n");
    let lib = write_js(dir.path(), "lib.js", "function Widget(id) { this.id = id; }\n");

    let out = run_tangle(&[
        "resolve",
        user.to_str().unwrap(),
        lib.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let widget = stdout.find("function Widget").unwrap();
    let usage = stdout.find("new Widget").unwrap();
    assert!(widget < usage);
}

#[test]
fn names_only_prints_keys_in_order() {
    let dir = TempDir::new().unwrap();
    let user = write_js(dir.path(), "user.js", "Helper.go();\n");
    let lib = write_js(dir.path(), "helper.js", "var Helper = { go: function () {} };\n");

    let out = run_tangle(&[
        "resolve",
        "names-only",
        user.to_str().unwrap(),
        lib.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("helper.js"));
    assert!(lines[1].ends_with("user.js"));
}

#[test]
fn out_option_writes_a_file() {
    let dir = TempDir::new().unwrap();
    let a = write_js(dir.path(), "a.js", "var A = 1;\n");
    let target = dir.path().join("bundle.js");

    let out = run_tangle(&[
        "resolve",
        &format!("out={}", target.display()),
        a.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("var A = 1;"));
}

#[test]
fn only_option_restricts_the_bundle() {
    let dir = TempDir::new().unwrap();
    let a = write_js(dir.path(), "a.js", "var A = {};\n");
    let b = write_js(dir.path(), "b.js", "var B = { uses: A };\n");
    let c = write_js(dir.path(), "c.js", "var C = {};\n");

    let out = run_tangle(&[
        "resolve",
        "names-only",
        "only=B",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        c.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("a.js"));
    assert!(stdout.contains("b.js"));
    assert!(!stdout.contains("c.js"));
}

#[test]
fn missing_export_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let a = write_js(dir.path(), "a.js", "var A = {};\n");
    let out = run_tangle(&["resolve", "only=Nope", a.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("export does not exist: Nope"));
}

#[test]
fn missing_file_fails_per_key() {
    let out = run_tangle(&["resolve", "no_such_file.js"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no_such_file.js"));
}

#[test]
fn tokens_dumps_a_token_per_line() {
    let dir = TempDir::new().unwrap();
    let a = write_js(dir.path(), "a.js", "var x = 1;\n");
    let out = run_tangle(&["tokens", a.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("KwVar"));
    assert_eq!(stdout.lines().count(), 5);
}

#[test]
fn ast_dumps_the_program() {
    let dir = TempDir::new().unwrap();
    let a = write_js(dir.path(), "a.js", "var x = 1;\n");
    let out = run_tangle(&["ast", a.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Program"));
    assert!(stdout.contains("Var"));
}
