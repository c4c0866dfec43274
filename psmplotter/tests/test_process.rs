use std::{error::Error, fs, path::PathBuf, process::Command};

use assert_cmd::prelude::*;
use predicates::prelude::*;

const FIXTURE: &str = "./tests/data/scan_30091.json";

fn output_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

#[test]
fn test_malformed_tolerance() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("psmplotter")?;

    cmd.arg("30091").args(["-t", "th:10"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tolerance unit"));

    let mut cmd = Command::cargo_bin("psmplotter")?;

    cmd.arg("30091").args(["-p", "da:1,-1"]);
    cmd.assert().failure().stderr(predicate::str::contains(
        "Tolerance lower bound 1 is greater than upper bound -1",
    ));
    Ok(())
}

#[test]
fn test_malformed_modification() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("psmplotter")?;

    cmd.arg("30091").args(["--mod", "C57"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must be written as residue=delta"));
    Ok(())
}

#[test]
fn test_render_fixture() -> Result<(), Box<dyn Error>> {
    let output = output_path("scan_30091.svg");
    let mut cmd = Command::cargo_bin("psmplotter")?;
    cmd.env("RUST_LOG", "info");
    cmd.arg("30091")
        .args(["-f", FIXTURE, "-n", "2"])
        .arg("-o")
        .arg(&output);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Scan 30091 has 2 candidates"))
        .stderr(predicate::str::contains("Drew 2 overlays"));

    let document = fs::read_to_string(&output)?;
    assert!(document.contains("<svg"));
    assert!(document.contains("y7+-H2O"));
    Ok(())
}

#[test]
fn test_render_without_candidates() -> Result<(), Box<dyn Error>> {
    let output = output_path("scan_30092.svg");
    let mut cmd = Command::cargo_bin("psmplotter")?;
    cmd.env("RUST_LOG", "info");
    cmd.arg("30092").args(["-f", FIXTURE]).arg("-o").arg(&output);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Drawing scan 30092 without annotations"))
        .stderr(predicate::str::contains("Drew 0 overlays"));
    assert!(output.exists());
    Ok(())
}

#[test]
fn test_missing_scan() -> Result<(), Box<dyn Error>> {
    let output = output_path("scan_99.svg");
    let mut cmd = Command::cargo_bin("psmplotter")?;
    cmd.arg("99").args(["-f", FIXTURE]).arg("-o").arg(&output);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Scan 99 was not found"));
    assert!(!output.exists());
    Ok(())
}
