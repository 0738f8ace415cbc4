use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn test_cli_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = assert_cmd::cargo_bin_cmd!("delivery-forecast");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("portfolio"))
        .stdout(predicate::str::contains("check-dependency"));
    Ok(())
}

#[test]
fn missing_input_file_fails_with_message() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("delivery-forecast");
    cmd.args(["analyze", "-f", "does-not-exist.yaml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load throughput"));
}
