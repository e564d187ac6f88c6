#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn shell() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pipe_shell"));
    cmd.current_dir("/");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn session(args: &[&str], input: &str) -> Output {
    let mut child = shell()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn shell");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .expect("write input");
    child.wait_with_output().expect("wait for shell")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

#[test]
fn one_shot_pipeline() {
    let out = shell()
        .args(["-c", "printf hello | tr a-z A-Z"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "HELLO");
}

#[test]
fn one_shot_unknown_program() {
    let out = shell()
        .args(["-c", "no-such-program-abc"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(127));
    assert_eq!(stderr(&out), "no-such-program-abc: command not found\n");
}

#[test]
fn one_shot_sleep_non_numeric_returns_at_once() {
    let start = std::time::Instant::now();
    let out = shell()
        .args(["-c", "sleep abc"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(start.elapsed() < std::time::Duration::from_secs(1));
}

#[test]
fn banner_prompt_and_exit() {
    let out = session(&[], "exit\n");
    assert_eq!(
        stdout(&out),
        "Custom Shell\nType 'help' for a list of commands or 'exit' to quit\n/ > Exiting shell...\n"
    );
    assert!(out.status.success());
}

#[test]
fn cd_is_reflected_in_next_prompt() {
    let dir = std::fs::canonicalize(std::env::temp_dir()).unwrap();
    let out = session(
        &["--no-banner"],
        &format!("cd /definitely/not/here\ncd {}\nexit\n", dir.display()),
    );
    let expected = format!("/ > / > {} > Exiting shell...\n", dir.display());
    assert_eq!(stdout(&out), expected);
    assert_eq!(stderr(&out).lines().count(), 1);
    assert!(stderr(&out).starts_with("cd: /definitely/not/here: "));
}

#[test]
fn help_twice_is_identical() {
    let out = session(&["--no-banner"], "help\nhelp\n");
    let text = stdout(&out);
    let parts: Vec<&str> = text.split("/ > ").filter(|p| !p.is_empty()).collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], parts[1]);
    assert!(parts[0].starts_with("List of Commands:\n"));
}

#[test]
fn errors_do_not_end_the_session() {
    let out = session(&["--no-banner"], "|\ncd\nno-such-program-abc\nprintf ok\nexit\n");
    assert_eq!(stderr(&out).lines().count(), 3);
    assert!(stdout(&out).contains("ok"));
    assert!(stdout(&out).ends_with("Exiting shell...\n"));
}

#[test]
fn overlong_line_is_rejected() {
    let line = format!("printf {}\nexit\n", "x".repeat(64));
    let out = session(&["--no-banner", "--max-line", "16"], &line);
    assert!(!stdout(&out).contains("xxxx"));
    assert!(stderr(&out).starts_with("input line too long"));
}

