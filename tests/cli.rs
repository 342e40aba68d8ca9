//! End-to-end tests driving the office2md binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CREDENTIAL: &str = "OPENAI_API_KEY";

/// Command running inside `workdir` with a clean credential environment.
fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("office2md").unwrap();
    cmd.current_dir(workdir).env_remove(CREDENTIAL).env_remove("RUST_LOG");
    cmd
}

fn run_dirs(base: &Path) -> Vec<PathBuf> {
    match fs::read_dir(base.join("data")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn test_help() {
    let workdir = TempDir::new().unwrap();

    cli(workdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input-dir"));
}

#[test]
fn test_missing_credential_stops_before_any_work() {
    let workdir = TempDir::new().unwrap();
    let input = workdir.path().join("target");

    cli(workdir.path())
        .arg("--input-dir")
        .arg(&input)
        .arg("--output-dir")
        .arg(workdir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(CREDENTIAL));

    assert!(!input.exists());
    assert!(!workdir.path().join("data").exists());
}

#[test]
fn test_generate_config_needs_no_credential() {
    let workdir = TempDir::new().unwrap();

    cli(workdir.path())
        .args(["--generate-config", "--config", "sample.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.toml"));

    let content = fs::read_to_string(workdir.path().join("sample.toml")).unwrap();
    assert!(content.contains("[service]"));
    assert!(content.contains("gpt-4o-mini"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let workdir = TempDir::new().unwrap();
    fs::write(workdir.path().join("office2md.toml"), "[service\nmodel = ").unwrap();

    cli(workdir.path())
        .env(CREDENTIAL, "sk-test")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_fresh_input_directory_is_created() {
    let workdir = TempDir::new().unwrap();
    let input = workdir.path().join("target");

    cli(workdir.path())
        .env(CREDENTIAL, "sk-test")
        .args(["--output-format", "plain"])
        .arg("--input-dir")
        .arg(&input)
        .arg("--output-dir")
        .arg(workdir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully converted 0/0 files."))
        .stderr(predicate::str::contains("No convertible files found"));

    assert!(input.is_dir());

    let runs = run_dirs(workdir.path());
    assert_eq!(runs.len(), 1);
    assert!(runs[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("converted_"));
    assert_eq!(fs::read_dir(&runs[0]).unwrap().count(), 0);
}

#[test]
fn test_dry_run_writes_nothing() {
    let workdir = TempDir::new().unwrap();
    let input = workdir.path().join("docs");
    fs::create_dir_all(input.join("sub")).unwrap();
    fs::write(input.join("a.pdf"), "pdf").unwrap();
    fs::write(input.join("sub/b.docx"), "docx").unwrap();

    cli(workdir.path())
        .env(CREDENTIAL, "sk-test")
        .args(["--dry-run", "--output-format", "plain"])
        .arg("--input-dir")
        .arg(&input)
        .arg("--output-dir")
        .arg(workdir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.pdf"))
        .stdout(predicate::str::contains("b.md"));

    assert!(!workdir.path().join("data").exists());
}

#[cfg(unix)]
mod with_converter {
    use super::*;

    // Stands in for the converter: writes "# <name>" to <output-dir>/<stem>.md,
    // failing for any file whose name starts with "bad".
    const SCRIPT: &str = r##"for a; do case "$prev" in --file) src="$a";; --output-dir) out="$a";; esac; prev="$a"; done; n=$(basename "$src"); case "$n" in bad*) echo "cannot read $n" >&2; exit 2;; esac; printf '# %s\n' "$n" > "$out/${n%.*}.md""##;

    fn write_config(workdir: &Path, input: &Path) {
        let config = format!(
            "[service]\ncommand = \"sh\"\nargs = [\"-c\", '''{}''', \"sh\"]\n\n[paths]\ninput_directory = '''{}'''\nbase_directory = '''{}'''\n",
            SCRIPT,
            input.display(),
            workdir.display()
        );
        fs::write(workdir.join("office2md.toml"), config).unwrap();
    }

    #[test]
    fn test_converts_example_tree() {
        let workdir = TempDir::new().unwrap();
        let input = workdir.path().join("target");
        fs::create_dir_all(input.join("sub")).unwrap();
        fs::write(input.join("a.pdf"), "pdf").unwrap();
        fs::write(input.join("sub/b.docx"), "docx").unwrap();
        fs::write(input.join("notes.txt"), "text").unwrap();
        write_config(workdir.path(), &input);

        cli(workdir.path())
            .env(CREDENTIAL, "sk-test")
            .args(["--output-format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Successfully converted 2/2 files."))
            .stderr(predicate::str::contains("Processing file 1/2"));

        let runs = run_dirs(workdir.path());
        assert_eq!(runs.len(), 1);
        assert_eq!(
            fs::read_to_string(runs[0].join("a.md")).unwrap(),
            "# a.pdf\n"
        );
        assert!(runs[0].join("sub/b.md").is_file());
        assert!(!runs[0].join("notes.md").exists());
    }

    #[test]
    fn test_failures_do_not_change_exit_code() {
        let workdir = TempDir::new().unwrap();
        let input = workdir.path().join("target");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.pdf"), "pdf").unwrap();
        fs::write(input.join("bad.xlsx"), "xlsx").unwrap();
        fs::write(input.join("c.doc"), "doc").unwrap();
        write_config(workdir.path(), &input);

        cli(workdir.path())
            .env(CREDENTIAL, "sk-test")
            .args(["--output-format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Successfully converted 2/3 files."))
            .stdout(predicate::str::contains("cannot read bad.xlsx"));

        let runs = run_dirs(workdir.path());
        assert!(runs[0].join("a.md").exists());
        assert!(runs[0].join("c.md").exists());
        assert!(!runs[0].join("bad.md").exists());
    }
}
