use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn write_doc(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn file_argument_renders_html_page() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "# Title\n\nhello :high[world]\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg(input.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains("<title>Title</title>"))
        .stdout(predicate::str::contains("<h1 id=\"title\">Title</h1>"))
        .stdout(predicate::str::contains("<mark>world</mark>"));
}

#[test]
fn explicit_render_to_json() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "# Title\n");

    let output = cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg("render")
        .arg(input.as_os_str())
        .args(["--to", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["root"]["value"]["children"][0]["type"], "heading");
}

#[test]
fn nested_flag_shifts_headings() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "# Title\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg(input.as_os_str())
        .args(["--to", "treeviz", "--nested"])
        .assert()
        .success()
        .stdout(predicate::str::contains("§ h3 #title"));
}

#[test]
fn no_fragments_drops_ids() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "# Title\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg(input.as_os_str())
        .args(["--to", "treeviz", "--no-fragments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("§ h1\n"))
        .stdout(predicate::str::contains("#title").not());
}

#[test]
fn top_level_and_nested_conflict() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "x\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg("render")
        .arg(input.as_os_str())
        .args(["--top-level", "--nested"])
        .assert()
        .failure();
}

#[test]
fn output_file_format_is_detected() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "hi\n");
    let output = dir.path().join("tree.json");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg(input.as_os_str())
        .arg("--output")
        .arg(output.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"type\": \"element\""));
}

#[test]
fn nofollow_from_config_file() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "[a](https://x.test/page)\n");
    let config = write_doc(&dir, "custom.toml", "[render]\nnofollow = true\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg("render")
        .arg(input.as_os_str())
        .arg("--config")
        .arg(config.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("rel=\"nofollow\""));
}

#[test]
fn local_config_file_is_picked_up() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "[logo](https://x.test/logo.svg)\n");
    write_doc(&dir, "markview.toml", "[images]\nextensions = [\"svg\"]\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg(input.as_os_str())
        .args(["--to", "treeviz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("▣ https://x.test/logo.svg"));
}

#[test]
fn inspect_urls() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "[b](/b) [a](https://x.test/a.png) [b](/b)\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg("inspect")
        .arg(input.as_os_str())
        .arg("urls")
        .assert()
        .success()
        .stdout("/b\nhttps://x.test/a.png\n");
}

#[test]
fn inspect_uses_default_transform() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "hi @ann\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg("inspect")
        .arg(input.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("⧉ div.text"))
        .stdout(predicate::str::contains("⊕ /ann"));
}

#[test]
fn list_transforms() {
    cargo_bin_cmd!("markview")
        .arg("--list-transforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("render-treeviz"))
        .stdout(predicate::str::contains("treeviz"));
}

#[test]
fn list_themes() {
    cargo_bin_cmd!("markview")
        .arg("--list-themes")
        .assert()
        .success()
        .stdout(predicate::str::contains("base16-ocean.dark"));
}

#[test]
fn missing_input_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .args(["render", "nope.md"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error reading file 'nope.md'"));
}

#[test]
fn unknown_format_fails() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.md", "x\n");

    cargo_bin_cmd!("markview")
        .current_dir(dir.path())
        .arg(input.as_os_str())
        .args(["--to", "pdf"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Format 'pdf' not found"));
}
