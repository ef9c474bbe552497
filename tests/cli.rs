//! End-to-end tests of the `rak-site` binary.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rak-site"))
        .arg("--config")
        .arg(state)
        .arg("--state-dir")
        .arg(state.join("state"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run rak-site")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "rak-site failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn browse_project_in_english() {
    let tmp = TempDir::new().unwrap();
    let out = stdout(&run(tmp.path(), &["--lang", "en", "browse", "medical", "3"]));
    let mut lines = out.lines();
    assert_eq!(
        lines.next(),
        Some("Categories › Medical › Juffali Medical Center")
    );
    assert!(out.contains("  * 003 Juffali Medical Center"));
    assert!(out.contains("Source: medical/juffali_medical_center.jpg"));
}

#[test]
fn browse_defaults_to_arabic() {
    let tmp = TempDir::new().unwrap();
    let out = stdout(&run(tmp.path(), &["browse", "medical"]));
    assert!(out.starts_with("التصنيفات › طبي"));
}

#[test]
fn browse_rejects_bad_input() {
    let tmp = TempDir::new().unwrap();
    assert!(!run(tmp.path(), &["browse", "aerospace"]).status.success());
    assert!(!run(tmp.path(), &["browse", "medical", "9"]).status.success());
    assert!(!run(tmp.path(), &["browse", "medical", "0"]).status.success());
}

#[test]
fn lang_is_persisted_between_runs() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(stdout(&run(tmp.path(), &["lang"])).trim(), "ar (rtl)");
    assert_eq!(stdout(&run(tmp.path(), &["lang", "en"])).trim(), "en (ltr)");
    assert_eq!(stdout(&run(tmp.path(), &["lang"])).trim(), "en (ltr)");

    let out = stdout(&run(tmp.path(), &["browse"]));
    assert!(out.contains("007 Medical [medical]"));

    assert!(!run(tmp.path(), &["lang", "fr"]).status.success());
}

#[test]
fn config_overrides_default_locale() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.toml"), "[locale]\ndefault = \"en\"\n").unwrap();
    assert_eq!(stdout(&run(tmp.path(), &["lang"])).trim(), "en (ltr)");
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.toml"), "[scroll]\nbogus = 1\n").unwrap();
    assert!(!run(tmp.path(), &["catalog"]).status.success());
}

#[test]
fn gen_config_parses_back() {
    let tmp = TempDir::new().unwrap();
    let out = stdout(&run(tmp.path(), &["gen-config"]));
    let value: toml::Value = toml::from_str(&out).unwrap();
    assert!(value.get("forms").is_some());
}

#[test]
fn generate_writes_pages() {
    let tmp = TempDir::new().unwrap();
    let dist = tmp.path().join("dist");
    let out = stdout(&run(
        tmp.path(),
        &["generate", "--output", dist.to_str().unwrap()],
    ));
    assert!(out.contains("Generated"));
    assert!(dist.join("en/gallery/medical/3.html").is_file());
    assert!(dist.join("ar/gallery/index.html").is_file());
}
