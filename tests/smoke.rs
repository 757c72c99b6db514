use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("theme-insights").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn show_reads_a_table_without_credentials() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = dir.path().join("insights.json");
    std::fs::write(
        &table,
        r#"{"base_theme_Pay":{"positive_summary":"Bonuses land on time."}}"#,
    )
    .expect("write table");

    let output = Command::cargo_bin("theme-insights")
        .expect("binary exists")
        .env("OUTPUTS_DIR", dir.path())
        .env_remove("OPENAI_API_KEY")
        .args(["show", "--kind", "base", "--name", "Pay", "--input"])
        .arg(&table)
        .output()
        .expect("run show");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bonuses land on time."));
}

#[test]
fn generate_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("theme-insights")
        .expect("binary exists")
        .current_dir(dir.path())
        .env("OUTPUTS_DIR", dir.path())
        .env("OPENAI_API_KEY", "")
        .args(["generate", "--limit", "1"])
        .assert()
        .failure();
}

#[test]
fn generate_accepts_direct_mode_and_rejects_unknown_modes() {
    let output = Command::cargo_bin("theme-insights")
        .expect("binary exists")
        .args(["generate", "--help"])
        .output()
        .expect("run help");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("direct"));
    assert!(stdout.contains("clustered"));

    Command::cargo_bin("theme-insights")
        .expect("binary exists")
        .args(["generate", "--mode", "sideways"])
        .assert()
        .failure();
}
