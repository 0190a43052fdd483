use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("quire-babel")
        .join("tests")
        .join("migrate")
        .join("fixtures")
        .join(name)
}

#[test]
fn convert_legacy_page_to_json() {
    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg("convert")
        .arg(fixture_path("lesson.html"))
        .arg("--to")
        .arg("json");

    let output_pred = predicate::str::contains("\"blocks\"")
        .and(predicate::str::contains("\"type\": \"terminal\""))
        .and(predicate::str::contains("sudo apt install git"))
        .and(predicate::str::contains("\"backgroundColor\": \"yellow\""))
        .and(predicate::str::contains("Intro to Git").not());

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn convert_is_the_default_command() {
    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg(fixture_path("lesson.html"))
        .arg("--to")
        .arg("treeviz");

    cmd.assert().success().stdout(
        predicate::str::contains("Document (16 blocks)")
            .and(predicate::str::contains("Terminal: sudo apt install git")),
    );
}

#[test]
fn convert_json_to_html_with_extra_title() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("content.json");
    fs::write(
        &input_path,
        r#"{"blocks":[{"type":"terminal","props":{"title":"Terminal","code":"ls"},"children":[]}]}"#,
    )
    .unwrap();
    let output_path = dir.path().join("page.html");

    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg(input_path.as_os_str())
        .arg("--to")
        .arg("html")
        .arg("--extra-title")
        .arg("Shell basics")
        .arg("-o")
        .arg(output_path.as_os_str());
    cmd.assert().success().stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&output_path).unwrap();
    assert!(html.contains("<title>Shell basics</title>"));
    assert!(html.contains("<h1>Shell basics</h1>"));
    assert!(html.contains("class=\"terminal-block\""));
}

#[test]
fn convert_uses_code_language_from_config() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("page.html");
    fs::write(
        &input_path,
        r#"<body><div class="code-block"><pre><code>print(1)</code></pre></div></body>"#,
    )
    .unwrap();

    let config_path = dir.path().join("custom.toml");
    fs::write(
        &config_path,
        r#"[migrate]
default_code_language = "python"
"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("json")
        .arg("--config")
        .arg(config_path.as_os_str());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"language\": \"python\""));
}

#[test]
fn convert_rejects_unknown_format() {
    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg("convert")
        .arg(fixture_path("lesson.html"))
        .arg("--to")
        .arg("docx");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn convert_needs_from_for_unknown_extensions() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("page.txt");
    fs::write(&input_path, "<p>hi</p>").unwrap();

    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--from"));

    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg(input_path.as_os_str())
        .arg("--from")
        .arg("html")
        .arg("--to")
        .arg("json");
    cmd.assert().success().stdout(predicate::str::contains("hi"));
}

#[test]
fn list_formats() {
    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg("--list-formats");

    cmd.assert().success().stdout(
        predicate::str::contains("html")
            .and(predicate::str::contains("json"))
            .and(predicate::str::contains("treeviz")),
    );
}
