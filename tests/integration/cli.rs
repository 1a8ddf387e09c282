use predicates::prelude::*;
use xfer_cli::persistence::PersistedState;
use xfer_cli::test_utils::TestEnvironment;
use xfer_cli::transfer::{TransferRecord, TransferStatus};

use super::xfer;

const URL: &str = "https://files.example.com/report.pdf";

fn state_with(env: &TestEnvironment, records: Vec<TransferRecord>) {
    env.write_state(&PersistedState {
        transfers: records,
        download_dir: Some(env.downloads_dir.clone()),
        ..PersistedState::default()
    })
    .unwrap();
}

#[test]
fn test_list_empty() {
    let env = TestEnvironment::new().unwrap();
    xfer(&env).arg("list").assert().success().stdout(predicate::str::contains("No transfers"));
}

#[test]
fn test_list_shows_persisted_transfers() {
    let env = TestEnvironment::new().unwrap();
    state_with(
        &env,
        vec![
            TransferRecord::new(URL, env.downloads_dir.join("report.pdf"))
                .with_status(TransferStatus::Downloaded)
                .with_sizes(2048, 2048),
        ],
    );

    xfer(&env)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("report.pdf"))
        .stdout(predicate::str::contains("DOWNLOADED"));

    let output = xfer(&env).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let records: Vec<TransferRecord> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, URL);
}

#[test]
fn test_dir_show_defaults_next_to_state() {
    let env = TestEnvironment::new().unwrap();
    xfer(&env)
        .args(["dir", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env.downloads_dir.display().to_string()));
}

#[test]
fn test_dir_set_existing_directory() {
    let env = TestEnvironment::new().unwrap();
    let target = env.path().join("elsewhere");
    std::fs::create_dir_all(&target).unwrap();

    xfer(&env)
        .args(["dir", "set"])
        .arg(&target)
        .assert()
        .success()
        .stderr(predicate::str::contains("download directory has been changed"));

    assert_eq!(env.read_state().unwrap().download_dir, Some(target.clone()));
    xfer(&env)
        .args(["dir", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(target.display().to_string()));
}

#[test]
fn test_dir_set_rejects_missing_path() {
    let env = TestEnvironment::new().unwrap();

    xfer(&env)
        .args(["dir", "set"])
        .arg(env.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_dir_ensure_recreates_directory() {
    let env = TestEnvironment::new().unwrap();
    std::fs::remove_dir_all(&env.downloads_dir).unwrap();
    state_with(&env, vec![]);

    // Startup recovery falls back to the default, which is the same path
    xfer(&env).args(["dir", "ensure"]).assert().success();
    assert!(env.downloads_dir.is_dir());
}

#[test]
fn test_delete_unknown_transfer_fails() {
    let env = TestEnvironment::new().unwrap();
    xfer(&env)
        .args(["delete", URL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transfer tracked"));
}

#[test]
fn test_delete_removes_file_and_record() {
    let env = TestEnvironment::new().unwrap();
    let file = env.downloads_dir.join("report.pdf");
    std::fs::write(&file, b"%PDF").unwrap();
    state_with(
        &env,
        vec![TransferRecord::new(URL, &file).with_status(TransferStatus::Downloaded).with_sizes(4, 4)],
    );

    xfer(&env).args(["delete", URL]).assert().success();

    assert!(!file.exists());
    assert!(env.read_state().unwrap().transfers.is_empty());
}

#[test]
fn test_delete_missing_file_marks_not_found() {
    let env = TestEnvironment::new().unwrap();
    state_with(
        &env,
        vec![
            TransferRecord::new(URL, env.downloads_dir.join("gone.pdf"))
                .with_status(TransferStatus::Downloaded),
        ],
    );

    xfer(&env)
        .args(["delete", URL])
        .assert()
        .success()
        .stderr(predicate::str::contains("no longer exists"));
    let state = env.read_state().unwrap();
    assert_eq!(state.transfers[0].status, TransferStatus::NotFound);

    // Second delete drops the stale record
    xfer(&env).args(["delete", URL]).assert().success();
    assert!(env.read_state().unwrap().transfers.is_empty());
}

#[test]
fn test_open_unfinished_transfer_is_ignored() {
    let env = TestEnvironment::new().unwrap();
    state_with(&env, vec![TransferRecord::new(URL, env.downloads_dir.join("report.pdf"))]);

    xfer(&env)
        .args(["open", URL])
        .assert()
        .success()
        .stdout(predicate::str::contains("still downloading"));
}

#[test]
fn test_ignored_list_and_clear() {
    let env = TestEnvironment::new().unwrap();
    env.write_state(&PersistedState {
        ignored_versions: ["2.0.0".to_string(), "2.1.0".to_string()].into_iter().collect(),
        ..PersistedState::default()
    })
    .unwrap();

    xfer(&env)
        .args(["ignored", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.0.0").and(predicate::str::contains("2.1.0")));

    xfer(&env)
        .args(["ignored", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 ignored version(s)"));
    assert!(env.read_state().unwrap().ignored_versions.is_empty());

    xfer(&env)
        .args(["ignored", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No ignored versions"));
}

#[test]
fn test_reset_clears_state() {
    let env = TestEnvironment::new().unwrap();
    env.write_state(&PersistedState {
        transfers: vec![TransferRecord::new(URL, env.downloads_dir.join("report.pdf"))],
        ignored_versions: ["2.0.0".to_string()].into_iter().collect(),
        download_dir: Some(env.downloads_dir.clone()),
    })
    .unwrap();

    xfer(&env)
        .args(["reset", "--no-relaunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 transfer(s) forgotten"));

    let state = env.read_state().unwrap();
    assert!(state.transfers.is_empty());
    assert!(state.ignored_versions.is_empty());
    assert_eq!(state.download_dir, Some(env.downloads_dir.clone()));
}

#[test]
fn test_invalid_config_reports_error() {
    let env = TestEnvironment::new().unwrap();
    std::fs::write(&env.config_path, "state_path = [").unwrap();

    xfer(&env).arg("list").assert().failure().stderr(predicate::str::contains("error"));
}
