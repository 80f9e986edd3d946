use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn cmdtree(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmdtree"))
        .args(args)
        .env_remove("CMDTREE_LOG")
        .output()
        .expect("failed to run cmdtree")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_manifest(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write manifest");
    path
}

const DEPLOY_MANIFEST: &str = r#"{
    "options": {
        "region": { "type": "string", "help": "Target region" }
    },
    "global_options": {
        "debug": { "type": "count", "alias": "d" }
    },
    "commands": {
        "deploy": {
            "target": "deploy_service",
            "arguments": [ { "name": "service", "required": true } ],
            "options": {
                "region": { "import": "region", "required": true, "alias": "r" },
                "tag": { "type": "repeated", "transform": "upcase" }
            }
        }
    }
}"#;

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_prints_dispatch_decision_as_json() {
    let output = cmdtree(&["resolve", "--", "hello", "Ada"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["decision"], "dispatch");
    assert_eq!(json["target"], "hello");
    assert_eq!(json["residual_argv"], serde_json::json!([]));
    assert_eq!(json["options"]["name"], "Ada");
    assert_eq!(json["options"]["greeting"], "Hello");
}

#[test]
fn resolve_reports_failure_as_data_and_exits_nonzero() {
    let output = cmdtree(&["resolve", "--", "keys", "set", "--key", "a"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error: missing required option --value"));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["kind"], "missing-required-option");
    assert_eq!(json["option"], "--value");
    assert_eq!(json["command_path"], serde_json::json!(["keys", "set"]));
}

#[test]
fn resolve_keeps_tokens_after_inner_double_dash() {
    let output = cmdtree(&["resolve", "--", "exec", "-e", "A=1", "--", "--verbose", "help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["residual_argv"], serde_json::json!(["--verbose", "help"]));
    assert_eq!(json["options"]["env"], serde_json::json!(["A=1"]));
}

#[test]
fn resolve_help_request() {
    let output = cmdtree(&["resolve", "--", "help", "keys"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["decision"], "help");
    assert_eq!(json["path"], serde_json::json!(["keys"]));
}

#[test]
fn resolve_against_manifest_file_in_yaml_format() {
    let dir = TempDir::new().unwrap();
    let tree = write_manifest(&dir, "deploy.json", DEPLOY_MANIFEST);

    let output = cmdtree(&[
        "resolve",
        "--tree",
        tree.to_str().unwrap(),
        "--format",
        "yaml",
        "--",
        "-dd",
        "deploy",
        "api",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown global option -dd"));

    let output = cmdtree(&[
        "resolve",
        "--tree",
        tree.to_str().unwrap(),
        "--format",
        "yaml",
        "--",
        "-d",
        "-d",
        "deploy",
        "api",
        "-r",
        "eu",
        "--tag",
        "blue",
        "--tag",
        "green",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let yaml: serde_yaml::Value = serde_yaml::from_str(&stdout(&output)).unwrap();
    assert_eq!(yaml["decision"], "dispatch");
    assert_eq!(yaml["target"], "deploy_service");
    assert_eq!(yaml["options"]["debug"], 2);
    assert_eq!(yaml["options"]["region"], "eu");
    assert_eq!(yaml["options"]["service"], "api");
    assert_eq!(
        yaml["options"]["tag"],
        serde_yaml::from_str::<serde_yaml::Value>("[BLUE, GREEN]").unwrap()
    );
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_dispatches_to_demo_handlers() {
    let output = cmdtree(&["run", "--", "hello", "Ada", "--shout"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "HELLO, ADA!");

    let output = cmdtree(&["run", "--", "-v", "ping", "-c", "2"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "pong 1\npong 2\nsent 2 replies");

    let output = cmdtree(&["run", "--", "keys", "-s", "disk", "get", "COLOR"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "disk: color = blue");
}

#[test]
fn run_passes_residual_argv_through() {
    let output = cmdtree(&["run", "--", "exec", "ls", "-la", "--", "--color"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "exec: ls -la -- --color");

    let output = cmdtree(&["run", "--", "exec", "-e", "A=1", "--", "make", "-j4"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "exec: A=1 make -j4");
}

#[test]
fn run_prints_help_for_path() {
    let output = cmdtree(&["run", "--", "keys", "--help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Usage: cmdtree run keys"));
    assert!(out.contains("set"));
    assert!(out.contains("get"));
    assert!(out.contains("-s, --store"));

    let output = cmdtree(&["run"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for command in ["hello", "keys", "ping", "exec"] {
        assert!(out.contains(command), "top-level help lacks {command}: {out}");
    }
}

#[test]
fn run_reports_parse_and_hook_failures() {
    let output = cmdtree(&["run", "--", "ping", "--count", "many"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error: invalid value for --count"));

    let output = cmdtree(&["run", "--", "deploy"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown command 'deploy'"));

    let output = cmdtree(&["run", "--", "keys", "set", "--key", "a=b", "--value", "x"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("must not contain '='"));

    let output = cmdtree(&["run", "--", "ping", "-c", "9999999999999"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--count must be at most 100"));
    assert!(stdout(&output).is_empty());

    let output = cmdtree(&["run", "--", "keys", "get", "missing"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("key 'missing' not found"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_manifest() {
    let dir = TempDir::new().unwrap();
    let tree = write_manifest(&dir, "deploy.json", DEPLOY_MANIFEST);

    let output = cmdtree(&["check", "--tree", tree.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("is valid: 1 command(s), 1 global option(s)"));
}

#[test]
fn check_rejects_unknown_flag_and_reserved_name() {
    let dir = TempDir::new().unwrap();

    let tree = write_manifest(
        &dir,
        "flags.yaml",
        "commands:\n  ping:\n    options:\n      count: { type: integer, colour: red }\n",
    );
    let output = cmdtree(&["check", "--tree", tree.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown flag 'colour' on option 'count'"));

    let tree = write_manifest(&dir, "help.yaml", "commands:\n  help: {}\n");
    let output = cmdtree(&["check", "--tree", tree.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("'help' is reserved"));
}

#[test]
fn usage_errors_exit_with_clap_status() {
    let output = cmdtree(&["check"]);
    assert_eq!(output.status.code(), Some(2));

    let output = cmdtree(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}
