use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

fn plugins_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../plugins")
}

/// A `mise` command with its own data directory, the bundled plugins and an
/// API address nothing listens on
fn mise(data_dir: &TempDir) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mise")?;
    cmd.arg("--data-dir")
        .arg(data_dir.path())
        .arg("--plugins")
        .arg(plugins_dir())
        .arg("--api")
        .arg("http://127.0.0.1:9");
    Ok(cmd)
}

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mise")?;
    cmd.arg("--ping");
    cmd.assert().success().stdout(predicate::str::contains("pong"));
    Ok(())
}

#[test]
fn test_no_args_prints_summary() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .assert()
        .success()
        .stdout(predicate::str::contains("0 plugins registered"))
        .stdout(predicate::str::contains("pong").not());
    Ok(())
}

#[test]
fn test_plugin_state_persists_between_invocations() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;

    mise(&data_dir)?
        .args(["plugin", "discover"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Discovered inventory"))
        .stdout(predicate::str::contains("Discovered reports"));

    mise(&data_dir)?
        .args(["plugin", "enable", "inventory"])
        .assert()
        .success();
    mise(&data_dir)?
        .args(["plugin", "enable", "reports"])
        .assert()
        .success();

    mise(&data_dir)?
        .args(["plugin", "routes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/inventory (exact)\n/inventory/suppliers\n/reports (exact)"));

    mise(&data_dir)?
        .args(["plugin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reports\tReports 0.3.0\tloaded, enabled"));
    Ok(())
}

#[test]
fn test_enabling_undiscovered_plugin_fails() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .args(["plugin", "enable", "inventory"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not registered"));
    Ok(())
}

#[test]
fn test_loading_plugin_without_its_dependency_fails() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .args(["plugin", "load", "reports"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inventory"));
    Ok(())
}

#[test]
fn test_unload_refused_while_dependents_loaded() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?.args(["plugin", "discover"]).assert().success();
    mise(&data_dir)?.args(["plugin", "enable", "inventory"]).assert().success();
    mise(&data_dir)?.args(["plugin", "enable", "reports"]).assert().success();

    mise(&data_dir)?
        .args(["plugin", "unload", "inventory"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reports"));
    Ok(())
}

#[test]
fn test_render_component_with_props() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?.args(["plugin", "discover"]).assert().success();
    mise(&data_dir)?.args(["plugin", "enable", "inventory"]).assert().success();

    mise(&data_dir)?
        .args(["plugin", "render", "inventory", "stock-badge", "--props", r#"{"item": "flour"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<span class="stock-badge">flour: 0</span>"#));

    mise(&data_dir)?.args(["plugin", "disable", "inventory"]).assert().success();
    mise(&data_dir)?
        .args(["plugin", "render", "inventory", "/inventory", "--route"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not enabled"));
    Ok(())
}

#[test]
fn test_queue_add_and_list() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .args(["queue", "add", "orders", "create", r#"{"table": 4}"#])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("orders_"));

    mise(&data_dir)?
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "create""#))
        .stdout(predicate::str::contains(r#""retryCount": 0"#));
    Ok(())
}

#[test]
fn test_queue_add_rejects_unknown_operation() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .args(["queue", "add", "orders", "upsert", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("upsert"));
    Ok(())
}

#[test]
fn test_replay_against_unreachable_api_requeues() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .args(["queue", "add", "orders", "create", "{}"])
        .assert()
        .success();

    mise(&data_dir)?
        .args(["queue", "replay"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""syncedCount": 0"#));

    mise(&data_dir)?
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""retryCount": 1"#));
    Ok(())
}

#[test]
fn test_cache_put_then_get() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempdir()?;
    mise(&data_dir)?
        .args(["cache", "put", "menu", "today", r#"["soup"]"#])
        .assert()
        .success();

    mise(&data_dir)?
        .args(["cache", "get", "menu", "today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("soup"));

    mise(&data_dir)?
        .args(["cache", "get", "menu", "tomorrow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing cached"));
    Ok(())
}
