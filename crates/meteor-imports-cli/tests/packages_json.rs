//! Integration tests for the `meteor-imports` binary against a fixture build.

use std::fs;
use std::path::Path;
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args([
        "run",
        "-p",
        "meteor-imports-cli",
        "--bin",
        "meteor-imports",
        "--",
    ]);
    cmd
}

/// Lay down a minimal compiled web program under `<root>/programs/web.browser`
/// and a plugin config file pointing at it. Returns the config path.
fn write_fixture(root: &Path) -> std::path::PathBuf {
    let build = root.join("programs").join("web.browser");
    fs::create_dir_all(build.join("packages")).unwrap();
    fs::write(
        build.join("program.json"),
        r#"{
  "format": "web-program-pre1",
  "manifest": [
    { "path": "packages/meteor.js", "type": "js" },
    { "path": "packages/tracker.js", "type": "js" },
    { "path": "packages/autoupdate.js", "type": "js" },
    { "path": "app/app.js", "type": "js" }
  ]
}"#,
    )
    .unwrap();
    for name in ["meteor", "tracker", "autoupdate"] {
        fs::write(
            build.join("packages").join(format!("{name}.js")),
            format!("//////////\n// packages/{name}.js\n//////////\n"),
        )
        .unwrap();
    }

    let config_path = root.join("plugin.json");
    fs::write(&config_path, r#"{ "meteorProgramsFolder": "programs" }"#).unwrap();
    config_path
}

#[test]
fn test_packages_json_is_valid_and_excludes_forced_packages() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_fixture(dir.path());

    let output = cargo_bin()
        .args([
            "--json",
            "--cwd",
            &dir.path().to_string_lossy(),
            "--config",
            &config_path.to_string_lossy(),
            "packages",
        ])
        .output()
        .expect("Failed to run packages command");

    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.trim().starts_with('['),
        "stdout should begin with '[': {stdout}"
    );

    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();

    assert!(names.contains(&"meteor"));
    assert!(names.contains(&"tracker"));
    // the root app entry belongs to the host application
    assert!(!names.contains(&"app/app.js"));
    // autoupdate is force-excluded regardless of configuration
    assert!(!names.contains(&"autoupdate"));
}

#[test]
fn test_entry_lists_retained_packages_in_manifest_order() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_fixture(dir.path());

    let output = cargo_bin()
        .args([
            "--cwd",
            &dir.path().to_string_lossy(),
            "--config",
            &config_path.to_string_lossy(),
            "entry",
        ])
        .output()
        .expect("Failed to run entry command");

    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines[0], "require(\"meteor-config\");");
    let meteor_pos = lines
        .iter()
        .position(|l| l.contains("meteor/meteor"))
        .expect("meteor package missing from entry");
    let tracker_pos = lines
        .iter()
        .position(|l| l.contains("meteor/tracker"))
        .expect("tracker package missing from entry");
    assert!(meteor_pos < tracker_pos);
    assert!(!stdout.contains("autoupdate"));
}

#[test]
fn test_missing_build_reports_actionable_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = cargo_bin()
        .args([
            "--cwd",
            &dir.path().to_string_lossy(),
            "--meteor-folder",
            ".",
            "packages",
        ])
        .output()
        .expect("Failed to run packages command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Run Meteor at least once"),
        "stderr should tell the user to run Meteor: {stderr}"
    );
}
