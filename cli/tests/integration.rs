// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::{error::Error, fs, path::PathBuf, process::Command};

// Add methods on commands
use assert_cmd::prelude::*;
use predicate::str;
use predicates::prelude::*;
use serde_json::Value;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);
    fs::canonicalize(path).expect("canonicalize")
}

fn validate() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("trustval")?;
    cmd.env_remove("TRUSTVAL_SETTINGS")
        .arg("validate")
        .arg("--facts")
        .arg(fixture_path("valid.json"))
        .arg("--policy")
        .arg(fixture_path("policy.toml"));
    Ok(cmd)
}

#[test]
fn tool_facts_not_found() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("trustval")?
        .arg("validate")
        .arg("--facts")
        .arg("test/file/notfound.json")
        .arg("--policy")
        .arg(fixture_path("policy.toml"))
        .assert()
        .failure()
        .stderr(str::contains("File not found"));
    Ok(())
}

#[test]
fn tool_validate_prints_report() -> Result<(), Box<dyn Error>> {
    let output = validate()?.output()?;
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["policy"], "basic");
    assert_eq!(report["validation_time"], "2024-01-10T00:00:00Z");
    assert_eq!(report["signatures"][0]["conclusion"]["indication"], "VALID");
    Ok(())
}

#[test]
fn tool_validate_pretty() -> Result<(), Box<dyn Error>> {
    validate()?
        .arg("--pretty")
        .assert()
        .success()
        .stdout(str::contains("\n  \"policy\": \"basic\""));
    Ok(())
}

#[test]
fn tool_invalid_signature() -> Result<(), Box<dyn Error>> {
    let tampered = || -> Result<Command, Box<dyn Error>> {
        let mut cmd = Command::cargo_bin("trustval")?;
        cmd.env_remove("TRUSTVAL_SETTINGS")
            .arg("validate")
            .arg("--facts")
            .arg(fixture_path("tampered.json"))
            .arg("--policy")
            .arg(fixture_path("policy.toml"));
        Ok(cmd)
    };

    // an INVALID signature is still a successful run
    tampered()?
        .assert()
        .success()
        .stdout(str::contains("HASH_FAILURE"));

    tampered()?
        .arg("--fail-on-invalid")
        .assert()
        .failure()
        .stderr(str::contains("Not every signature is VALID"));
    Ok(())
}

#[test]
fn tool_validation_time_override() -> Result<(), Box<dyn Error>> {
    validate()?
        .arg("--validation-time")
        .arg("2024-01-05T00:00:00Z")
        .assert()
        .success()
        .stdout(str::contains("\"validation_time\":\"2024-01-05T00:00:00Z\""));
    Ok(())
}

#[test]
fn tool_bad_validation_time() -> Result<(), Box<dyn Error>> {
    validate()?
        .arg("--validation-time")
        .arg("yesterday")
        .assert()
        .failure()
        .stderr(str::contains("invalid validation time"));
    Ok(())
}

#[test]
fn tool_settings_file() -> Result<(), Box<dyn Error>> {
    let output = validate()?
        .arg("--settings")
        .arg(fixture_path("settings.toml"))
        .output()?;
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["validation_time"], "2023-12-31T00:00:00Z");
    assert_eq!(
        report["signatures"][0]["conclusion"]["sub_indication"],
        "NO_POE"
    );
    Ok(())
}

#[test]
fn tool_output_file() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("reports/report.json");

    validate()?
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(str::is_empty());

    let report: Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(report["signatures"][0]["id"], "S-1");

    validate()?
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(str::contains("Output already exists"));

    validate()?
        .arg("--output")
        .arg(&output)
        .arg("--force")
        .assert()
        .success();
    Ok(())
}

#[test]
fn tool_show_policy() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("trustval")?
        .arg("show")
        .arg("policy")
        .arg(fixture_path("policy.toml"))
        .assert()
        .success()
        .stdout(str::contains("\"name\": \"basic\""))
        .stdout(str::contains("\"signature_intact\""));

    Command::cargo_bin("trustval")?
        .arg("show")
        .arg("policy")
        .arg(fixture_path("policy.toml"))
        .arg("--format")
        .arg("toml")
        .assert()
        .success()
        .stdout(str::contains("name = \"basic\""));
    Ok(())
}

#[test]
fn tool_show_settings() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("trustval")?
        .env("TRUSTVAL_SETTINGS", fixture_path("settings.toml"))
        .arg("show")
        .arg("settings")
        .arg("--record-revocation-poe")
        .assert()
        .success()
        .stdout(str::contains("record_revocation_poe = true"))
        .stdout(str::contains("strict_trust_service_status = true"))
        .stdout(str::contains("validation_time = \"2023-12-31T00:00:00Z\""));
    Ok(())
}

#[test]
fn tool_out_of_range_freshness_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let policy = dir.path().join("policy.toml");
    fs::write(
        &policy,
        "name = \"huge\"\n\n[revocation_freshness]\nvalue = 9223372036854775807\n",
    )?;

    Command::cargo_bin("trustval")?
        .env_remove("TRUSTVAL_SETTINGS")
        .arg("validate")
        .arg("--facts")
        .arg(fixture_path("valid.json"))
        .arg("--policy")
        .arg(&policy)
        .assert()
        .failure()
        .stderr(str::contains("invalid revocation freshness"));
    Ok(())
}
