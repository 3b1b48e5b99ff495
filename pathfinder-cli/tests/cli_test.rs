use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

fn pathfinder(cwd: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("pathfinder")?;
    cmd.current_dir(cwd.path()).env_remove("RUST_LOG");
    Ok(cmd)
}

fn root_arg(dir: &TempDir) -> String {
    dir.path().to_string_lossy().into_owned()
}

#[test]
fn test_finds_by_name_and_content() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("notes.txt", "send the invoice today"),
            ("My Invoice.pdf", "%PDF\0"),
            ("holiday.txt", "beach"),
        ],
    )?;

    pathfinder(&dir)?
        .args(["invoice", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt"))
        .stdout(predicate::str::contains("My Invoice.pdf"))
        .stdout(predicate::str::contains("holiday.txt").not())
        .stderr(predicate::str::contains("Files found: 2"))
        .stderr(predicate::str::contains("stop=complete"));
    Ok(())
}

#[test]
fn test_no_content_only_matches_names() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[("notes.txt", "send the invoice today"), ("invoice-march.csv", "1,2")],
    )?;

    pathfinder(&dir)?
        .args(["invoice", "--no-content", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice-march.csv"))
        .stdout(predicate::str::contains("notes.txt").not());
    Ok(())
}

#[test]
fn test_limit_and_json_output() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[("log-1.txt", "a"), ("log-2.txt", "b"), ("log-3.txt", "c")],
    )?;

    let assert = pathfinder(&dir)?
        .args(["log", "--json", "--limit", "2", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stderr(predicate::str::contains("stop=limit"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line)?;
        assert!(value["path"].as_str().unwrap_or_default().contains("log-"));
    }
    Ok(())
}

#[test]
fn test_file_info_in_plain_output() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("dated.md", "x")])?;

    pathfinder(&dir)?
        .args(["dated", "--f-info", "--no-stream", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("[modified="));
    Ok(())
}

#[test]
fn test_no_match_prints_hint() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("a.txt", "alpha")])?;

    pathfinder(&dir)?
        .args(["zebra", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Files found: 0"))
        .stderr(predicate::str::contains("--expanded-search"));
    Ok(())
}

#[test]
fn test_missing_paths_fail() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("nowhere").to_string_lossy().into_owned();

    pathfinder(&dir)?
        .args(["anything", "--paths", &missing])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path does not exist"))
        .stderr(predicate::str::contains("No valid search roots"));
    Ok(())
}

#[test]
fn test_extension_filters() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("trip.jpg", "\u{FF}\u{D8}"),
            ("trip.txt", "packing list"),
            ("IMG_2041.jpg", "\u{FF}\u{D8}"),
        ],
    )?;

    pathfinder(&dir)?
        .args(["trip", "type:image", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("trip.jpg"))
        .stdout(predicate::str::contains("trip.txt").not())
        .stdout(predicate::str::contains("IMG_2041.jpg").not());

    pathfinder(&dir)?
        .args(["trip", "ext:jpg", "--ext-match-or", "--paths", &root_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("IMG_2041.jpg"))
        .stdout(predicate::str::contains("trip.jpg"));
    Ok(())
}

#[test]
fn test_config_file_sets_limit() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[("data/memo-1.txt", "a"), ("data/memo-2.txt", "b"), ("data/memo-3.txt", "c")],
    )?;
    let config = dir.path().join("custom.yaml");
    fs::write(&config, "limit: 1\nscan_content: false\n")?;

    let assert = pathfinder(&dir)?
        .args([
            "memo",
            "--config",
            &config.to_string_lossy(),
            "--paths",
            &dir.path().join("data").to_string_lossy(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("stop=limit"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert_eq!(stdout.lines().count(), 1);
    Ok(())
}

#[test]
fn test_missing_config_file_fails() -> Result<()> {
    let dir = tempdir()?;

    pathfinder(&dir)?
        .args(["memo", "--config", "absent.yaml", "--paths", &root_arg(&dir)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
    Ok(())
}
