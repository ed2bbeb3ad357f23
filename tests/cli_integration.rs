use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn depsleuth_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_depsleuth"))
}

#[test]
fn cli_reports_dependency_on_simple_project() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.py"), "import requests\nimport os\n").unwrap();
    let output = depsleuth_binary().arg(tmp.path()).arg("--offline").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("requests"), "stdout: {stdout}");
    assert!(!stdout.contains("os"), "stdlib module should not appear. stdout: {stdout}");
}

#[test]
fn cli_json_output_is_parseable() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.py"), "import cv2\n").unwrap();
    let output = depsleuth_binary().arg(tmp.path()).arg("--offline").arg("--json").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("output must be valid JSON");
    let deps = parsed["dependencies"].as_array().unwrap();
    assert!(deps.iter().any(|d| d == "opencv-python"), "stdout: {stdout}");
}

#[test]
fn cli_show_unresolved_lists_unknown_modules() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.py"), "import some_totally_unknown_module_xyz\n").unwrap();
    let output = depsleuth_binary().arg(tmp.path()).arg("--offline").arg("--show-unresolved").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("some_totally_unknown_module_xyz"), "stdout: {stdout}");
}

#[test]
fn cli_on_empty_directory_reports_no_dependencies() {
    let tmp = TempDir::new().unwrap();
    let output = depsleuth_binary().arg(tmp.path()).arg("--offline").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("No third-party dependencies"), "stdout: {stdout}");
}

#[test]
fn cli_nonexistent_root_is_an_error() {
    let output = depsleuth_binary().arg("/definitely/does/not/exist/depsleuth-test").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn cli_help_flag_works() {
    let output = depsleuth_binary().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("depsleuth"));
}

#[test]
fn cli_version_flag_works() {
    let output = depsleuth_binary().arg("--version").output().unwrap();
    assert!(output.status.success());
}

#[test]
fn cli_dry_run_adds_trailer_without_failing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.py"), "import requests\n").unwrap();
    let output = depsleuth_binary().arg(tmp.path()).arg("--offline").arg("--dry-run").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("dry run"), "stdout: {stdout}");
}

#[test]
fn cli_respects_custom_cache_dir() {
    let tmp = TempDir::new().unwrap();
    let cache_dir = tmp.path().join("my-cache");
    fs::write(tmp.path().join("main.py"), "import requests\n").unwrap();
    let output = depsleuth_binary()
        .arg(tmp.path())
        .arg("--offline")
        .arg("--cache-dir")
        .arg(&cache_dir)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(cache_dir.join("parse.json").exists());
}
