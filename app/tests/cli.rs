use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn galleria_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("galleria")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Photo gallery server"))
        .stdout(predicate::str::contains("--drive-folder-id"))
        .stdout(predicate::str::contains("--watch-folder"));
    Ok(())
}

#[test]
fn galleria_rejects_bad_port() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("galleria")?;
    cmd.args(["--port", "not-a-number"]);
    cmd.assert().failure();
    Ok(())
}
