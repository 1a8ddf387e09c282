use std::collections::BTreeSet;
use std::sync::Arc;

use tempfile::TempDir;
use xfer_cli::app::AppContext;
use xfer_cli::config::GlobalConfig;
use xfer_cli::persistence::{PersistedState, StateFile};
use xfer_cli::platform::{OsType, Platform};
use xfer_cli::test_utils::init_test_logging;
use xfer_cli::transfer::{LocalFs, TransferRecord, TransferStatus};

async fn open(temp: &TempDir) -> AppContext {
    init_test_logging(None);
    let config = GlobalConfig {
        state_path: Some(temp.path().join("state.json")),
        ..GlobalConfig::default()
    };
    AppContext::open_with(
        config,
        Platform::new(OsType::Linux),
        Arc::new(LocalFs),
        StateFile::new(temp.path().join("state.json")),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_fresh_start_uses_default_directory() {
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;

    assert!(app.store().is_empty());
    assert_eq!(app.download_dir().get(), Some(temp.path().join("downloads")));
    assert_eq!(app.session().snapshot().current_version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_missing_persisted_directory_is_replaced() {
    let temp = TempDir::new().unwrap();
    StateFile::new(temp.path().join("state.json"))
        .save(&PersistedState {
            download_dir: Some(temp.path().join("vanished")),
            ..PersistedState::default()
        })
        .unwrap();

    let app = open(&temp).await;

    assert_eq!(app.download_dir().get(), Some(temp.path().join("downloads")));
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("mine");
    std::fs::create_dir_all(&custom).unwrap();

    {
        let app = open(&temp).await;
        app.store().register(
            TransferRecord::new("https://a/file.bin", custom.join("file.bin"))
                .with_status(TransferStatus::Downloaded)
                .with_sizes(3, 3),
        );
        app.download_dir().set(&custom);
        app.session().modify(|s| {
            s.ignore("9.0.0");
            s.downloaded = 77;
        });
        app.save().unwrap();
    }

    let app = open(&temp).await;
    assert_eq!(app.download_dir().get(), Some(custom));
    assert_eq!(app.store().get("https://a/file.bin").unwrap().status, TransferStatus::Downloaded);
    let session = app.session().snapshot();
    assert_eq!(session.ignored_versions, BTreeSet::from(["9.0.0".to_string()]));
    assert_eq!(session.downloaded, 0);
}

#[tokio::test]
async fn test_corrupt_state_file_starts_fresh() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("state.json"), "[[[").unwrap();

    let app = open(&temp).await;

    assert!(app.store().is_empty());
    assert!(app.session().snapshot().ignored_versions.is_empty());
}
