//! Integration tests for core CLI contract behavior.

use {predicates::prelude::*, std::fs, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("streamburn").expect("binary should be built")
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("streamburn"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn short_help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("streamburn"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("streamburn"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_includes_usage_section() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

/// Exit code 0: successful operations
#[test]
fn exit_code_zero_on_success() {
    let mut cmd = cli_cmd();
    cmd.arg("--help").assert().success().code(0);

    let mut cmd = cli_cmd();
    cmd.arg("--version").assert().success().code(0);

    // completions bash exits 0 (doesn't require hardware)
    let mut cmd = cli_cmd();
    cmd.args(["completions", "bash"]).assert().success().code(0);
}

/// Exit code 2: usage error (unknown command, invalid arguments)
#[test]
fn exit_code_two_for_unknown_command() {
    let mut cmd = cli_cmd();
    cmd.arg("unknown-command-xyz").assert().failure().code(2);
}

#[test]
fn exit_code_two_for_invalid_flag() {
    let mut cmd = cli_cmd();
    cmd.arg("--invalid-flag-xyz").assert().failure().code(2);
}

#[test]
fn exit_code_two_for_missing_flash_argument() {
    let mut cmd = cli_cmd();
    cmd.arg("flash")
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn zero_chunk_size_is_rejected_at_parse_time() {
    let mut cmd = cli_cmd();
    cmd.args(["--chunk-size", "0", "list-ports"])
        .assert()
        .failure()
        .code(2);
}

/// Exit code 1: generic error fallback
#[test]
fn exit_code_one_for_missing_firmware_file() {
    let dir = tempdir().expect("tempdir should be created");
    let nonexistent = dir.path().join("does_not_exist.bin");

    let mut cmd = cli_cmd();
    cmd.arg("flash")
        .arg(nonexistent.as_os_str())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does_not_exist.bin"));
}

#[test]
fn unsupported_url_scheme_fails_before_port_selection() {
    let mut cmd = cli_cmd();
    cmd.args(["flash", "ftp://example.com/fw.bin"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("scheme"));
}

// ============================================================================
// Unknown Command/Flag Suggestion Tests
// ============================================================================

#[test]
fn unknown_command_suggests_similar() {
    let mut cmd = cli_cmd();
    cmd.arg("falsh") // typo for flash
        .assert()
        .failure()
        .stderr(predicate::str::contains("flash").or(predicate::str::contains("did you mean")));
}

#[test]
fn unknown_flag_suggests_similar() {
    let mut cmd = cli_cmd();
    cmd.arg("list-ports")
        .arg("--jason") // typo for --json
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("did you mean")));
}

// ============================================================================
// stdout/stderr Separation Tests
// ============================================================================

#[test]
fn flash_errors_keep_stdout_clean() {
    let mut cmd = cli_cmd();
    cmd.arg("flash")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty().not());
}

#[test]
fn completions_command_writes_to_stdout() {
    let mut cmd = cli_cmd();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains("_streamburn"));
}

// ============================================================================
// JSON Output Purity Tests
// ============================================================================

#[test]
fn list_ports_json_is_valid_json_without_stderr_noise() {
    let mut cmd = cli_cmd();
    let output = cmd.args(["list-ports", "--json"]).output().expect("command should execute");

    // Hosts without a serial stack may fail; JSON purity only applies to
    // successful runs.
    if output.status.success() {
        let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
        let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");

        let parsed: serde_json::Value =
            serde_json::from_str(&stdout).expect("stdout should be valid JSON");
        assert!(parsed["ok"].as_bool().unwrap_or(false));
        assert!(parsed["data"]["ports"].is_array());
        assert!(
            stderr.is_empty(),
            "JSON output should not have stderr: got {stderr}"
        );
    }
}

// ============================================================================
// Non-Interactive Mode Tests
// ============================================================================

#[test]
fn non_interactive_flag_is_recognized() {
    let mut cmd = cli_cmd();
    cmd.arg("--non-interactive")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn non_interactive_environment_variable_works() {
    // Must use "true" not "1" for a bool-valued flag env var
    let mut cmd = cli_cmd();
    cmd.env("STREAMBURN_NON_INTERACTIVE", "true")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn non_interactive_flash_with_bad_port_fails_fast() {
    // An explicit bogus port must fail at open time, never hang on a prompt.
    let dir = tempdir().expect("tempdir should be created");
    let fw = dir.path().join("fw.bin");
    fs::write(&fw, b"payload").expect("write fw.bin");

    let mut cmd = cli_cmd();
    cmd.arg("--non-interactive")
        .arg("-p")
        .arg("INVALID_PORT_NAME_XYZ")
        .arg("flash")
        .arg(&fw)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// -- Option Terminator Tests
// ============================================================================

#[test]
fn option_terminator_allows_dash_prefixed_operand() {
    let dir = tempdir().expect("tempdir should be created");
    let missing = dir.path().join("-dashed.bin");

    let mut cmd = cli_cmd();
    cmd.arg("flash")
        .arg("--")
        .arg(missing)
        .assert()
        .failure(); // File doesn't exist, but parses correctly
}

// ============================================================================
// TTY Detection Tests (colors/animations disabled on non-TTY)
// ============================================================================

#[test]
fn colors_disabled_when_not_tty() {
    let mut cmd = cli_cmd();
    let output = cmd.arg("--help").assert().success().get_output().clone();

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert!(
        !stdout.contains("\x1b["),
        "Colors should be disabled in non-TTY mode"
    );
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn malformed_local_config_warns_but_does_not_abort() {
    let dir = tempdir().expect("tempdir should be created");
    let config = dir.path().join("streamburn.toml");
    fs::write(&config, "invalid toml [[[").expect("write invalid config");

    let output = cli_cmd()
        .current_dir(dir.path())
        .arg("list-ports")
        .output()
        .expect("command should execute");

    // A broken config is a warning, not a fatal error; the command outcome
    // depends only on the host's serial stack.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config") || stderr.contains("parse") || output.status.success(),
        "expected a config warning or success, got: {stderr}"
    );
}
