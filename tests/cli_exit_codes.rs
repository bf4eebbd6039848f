use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the binary with a scratch HOME and none of the `AUDIT_*` overrides,
/// so a developer's central config cannot leak into the test.
fn run_audit_bin(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_theme-audit"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("AUDIT_REFERENCE_URL")
        .env_remove("AUDIT_TARGET_URL")
        .env_remove("AUDIT_CDP_HOST")
        .env_remove("AUDIT_CDP_PORT")
        .env_remove("AUDIT_OUTPUT_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("run theme-audit")
}

fn parse_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout should be JSON")
}

/// Nothing listens on the discard port, so discovery fails fast.
const UNREACHABLE: [&str; 4] = ["--cdp-host", "127.0.0.1", "--cdp-port", "9"];

#[test]
fn unknown_category_is_a_config_error() {
    let home = TempDir::new().expect("tempdir");
    let output = run_audit_bin(&home, &["audit", "--only", "css,fonts"]);

    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert_eq!(json["mode"], "error");
    assert_eq!(json["error"]["category"], "config");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown category: fonts"));
    assert!(json["error"]["remediation"]
        .as_str()
        .unwrap()
        .contains("css, behavioral"));
}

#[test]
fn unmatched_focus_element_is_not_a_config_error() {
    let home = TempDir::new().expect("tempdir");
    let mut args = vec!["audit", "--only", "css", "--focus", "no-such-element"];
    args.extend(UNREACHABLE);
    let output = run_audit_bin(&home, &args);

    // The run gets as far as the browser, which is unreachable here.
    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert_eq!(json["error"]["category"], "browser");
}

#[test]
fn unreachable_browser_is_fatal_for_audit() {
    let home = TempDir::new().expect("tempdir");
    let mut args = vec!["audit", "--only", "layout"];
    args.extend(UNREACHABLE);
    let output = run_audit_bin(&home, &args);

    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert_eq!(json["mode"], "error");
    assert_eq!(json["error"]["category"], "browser");
    assert!(json["error"]["remediation"]
        .as_str()
        .unwrap()
        .contains("--cdp-port"));
}

#[test]
fn unreachable_browser_is_fatal_for_diff_and_capture() {
    let home = TempDir::new().expect("tempdir");
    let out_dir = home.path().join("shots");
    let out = out_dir.to_str().unwrap();

    for mode in ["diff", "capture"] {
        let mut args = vec![mode, "--out-dir", out];
        args.extend(UNREACHABLE);
        let output = run_audit_bin(&home, &args);
        assert_eq!(output.status.code(), Some(2), "{mode} should fail fatally");
        assert_eq!(parse_json(&output.stdout)["mode"], "error");
    }
}

#[test]
fn negative_tolerance_is_rejected_with_hint() {
    let home = TempDir::new().expect("tempdir");
    let output = run_audit_bin(&home, &["audit", "--tolerance-px=-1"]);

    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("tolerance.px"));
    assert!(json["error"]["remediation"]
        .as_str()
        .unwrap()
        .contains("non-negative"));
}

#[test]
fn unreadable_config_file_is_fatal() {
    let home = TempDir::new().expect("tempdir");
    let cfg_path = home.path().join("audit.toml");
    std::fs::write(&cfg_path, "tolerance = [not toml").expect("write config");

    let output = run_audit_bin(&home, &["audit", "--config", cfg_path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Failed to read config"));
}

#[test]
fn invalid_port_in_environment_is_fatal() {
    let home = TempDir::new().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_theme-audit"))
        .args(["audit"])
        .env("HOME", home.path())
        .env("AUDIT_CDP_PORT", "not-a-port")
        .output()
        .expect("run theme-audit");

    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid environment"));
}

#[test]
fn pretty_error_written_to_file_stays_json() {
    let home = TempDir::new().expect("tempdir");
    let report = home.path().join("report.json");
    let output = run_audit_bin(
        &home,
        &[
            "audit",
            "--only",
            "typography",
            "--format",
            "pretty",
            "--output",
            report.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    let written = std::fs::read(&report).expect("error report written");
    let json = parse_json(&written);
    assert_eq!(json["mode"], "error");
    assert_eq!(json["version"], "1.0.0");
}
