use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;

const PAGE: &str = r#"<html><body>
<h1>Example Domain</h1>
<form><label for="q">Search</label><input id="q" type="search"><button>Submit</button></form>
</body></html>"#;

const OVERRIDES: &[&str] = &[
    "LOCUS_LLM_PROVIDER",
    "LOCUS_LLM_MODEL",
    "LOCUS_LLM_API_BASE",
    "LOCUS_LLM_API_KEY",
    "LOCUS_LLM_TIMEOUT_MS",
    "LOCUS_CACHE_PATH",
    "LOCUS_SIMPLIFY",
    "LOCUS_MAX_RETRIES",
];

fn write_fixture(dir: &Path, replies: &[&str]) {
    fs::write(dir.join("page.html"), PAGE).unwrap();
    let replies = replies
        .iter()
        .map(|reply| format!("'{reply}'"))
        .collect::<Vec<_>>()
        .join(", ");
    let config = format!(
        "llm:\n  provider: mock\ncache:\n  dir: '{}'\nmock_responses: [{replies}]\n",
        dir.join("cache").display()
    );
    fs::write(dir.join("locus.yaml"), config).unwrap();
}

fn locus(dir: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("locus");
    let mut cmd = Command::new(bin);
    cmd.current_dir(dir).env_remove("RUST_LOG");
    for key in OVERRIDES {
        cmd.env_remove(key);
    }
    cmd.arg("--config").arg(dir.join("locus.yaml"));
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf8 output");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn locate_prints_query_and_persists_it() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        dir.path(),
        &[r#"{"query":"getByRole","params":["heading","Example Domain"]}"#],
    );

    let assert = locus(dir.path())
        .args(["--output", "json", "locate", "the main heading", "--html"])
        .arg(dir.path().join("page.html"))
        .args(["--scope", "smoke test"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["queryName"], "getByRole");
    assert_eq!(value["params"][1], "Example Domain");
    assert_eq!(value["source"], "primary");
    assert_eq!(value["matches"], 1);

    let cached = fs::read_to_string(dir.path().join("cache").join("smoke_test.json")).unwrap();
    assert!(cached.contains("\"the main heading\""));

    // second run is served from the cache; the mock script is already spent
    let assert = locus(dir.path())
        .args(["--output", "json", "locate", "the main heading", "--html"])
        .arg(dir.path().join("page.html"))
        .args(["--scope", "smoke test"])
        .assert()
        .success();
    assert_eq!(stdout_json(assert.get_output())["source"], "cache");
}

#[test]
fn locate_without_model_answers_falls_back_to_text() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &[]);

    let assert = locus(dir.path())
        .args(["--output", "json", "locate", "Example Domain", "--no-cache", "--html"])
        .arg(dir.path().join("page.html"))
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["source"], "literal_fallback");
    assert_eq!(value["queryName"], "getByText");
    assert!(!dir.path().join("cache").exists());
}

#[test]
fn act_clicks_the_submit_button() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        dir.path(),
        &[
            r#"{"action":"click","targetDescription":"the submit button","value":null,"index":null}"#,
            r#"{"query":"getByRole","params":["button","Submit"]}"#,
        ],
    );

    let assert = locus(dir.path())
        .args(["--output", "json", "act", "click the submit button", "--html"])
        .arg(dir.path().join("page.html"))
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["report"]["attempts"], 1);
    assert_eq!(value["dispatched"].as_array().unwrap().len(), 1);
    assert_eq!(value["dispatched"][0]["action"], "click");
}

#[test]
fn act_reports_exhausted_retries() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &["nope"]);

    let assert = locus(dir.path())
        .args(["act", "click the submit button", "--max-retries", "0", "--html"])
        .arg(dir.path().join("page.html"))
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("click the submit button"));
}

#[test]
fn cache_show_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &[]);
    fs::create_dir_all(dir.path().join("cache")).unwrap();
    fs::write(
        dir.path().join("cache").join("default.json"),
        r#"{"the main heading":{"queryName":"getByRole","params":["heading","Example Domain"]}}"#,
    )
    .unwrap();

    let assert = locus(dir.path())
        .args(["--output", "json", "cache", "show"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["the main heading"]["params"][0], "heading");

    locus(dir.path()).args(["cache", "clear"]).assert().success();
    assert!(!dir.path().join("cache").join("default.json").exists());
}

#[test]
fn config_redacts_the_credential() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &[]);

    let assert = locus(dir.path())
        .env("LOCUS_LLM_API_KEY", "sk-secret-value")
        .args(["config"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("provider: mock"));
    assert!(!stdout.contains("sk-secret-value"));
}
