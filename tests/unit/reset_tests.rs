use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use xfer_cli::persistence::{Persistence, StateFile};
use xfer_cli::platform::{OsType, Platform};
use xfer_cli::reset::{ResetCoordinator, RestartMode};
use xfer_cli::test_utils::{MemoryFs, RecordingAutostart, RecordingRelauncher, init_test_logging};
use xfer_cli::transfer::{DownloadDirectory, TransferRecord, TransferStatus, TransferStore};
use xfer_cli::upgrade::{SessionCell, UpdateSession};

const DEFAULT_DIR: &str = "/data/downloads";

struct Harness {
    store: Arc<TransferStore>,
    session: Arc<SessionCell>,
    dir: Arc<DownloadDirectory>,
    fs: Arc<MemoryFs>,
    autostart: Arc<RecordingAutostart>,
    relauncher: Arc<RecordingRelauncher>,
}

impl Harness {
    fn dirty() -> Self {
        init_test_logging(None);
        let store = Arc::new(TransferStore::new());
        store.register(TransferRecord::new("https://a/one.zip", "/custom/one.zip"));
        store.register(
            TransferRecord::new("https://a/two.pdf", "/custom/two.pdf")
                .with_status(TransferStatus::Downloaded)
                .with_sizes(5, 5),
        );

        let session = Arc::new(SessionCell::new(UpdateSession::new("1.0.0")));
        session.modify(|s| {
            s.ignore("1.5.0");
            s.is_update_available = true;
            s.latest_version = "2.0.0".into();
            s.downloaded = 42;
        });

        Self {
            store,
            session,
            dir: Arc::new(DownloadDirectory::new(Some(PathBuf::from("/custom")), DEFAULT_DIR)),
            fs: Arc::new(MemoryFs::new()),
            autostart: Arc::new(RecordingAutostart::new(true)),
            relauncher: Arc::new(RecordingRelauncher::default()),
        }
    }

    fn coordinator(&self, os: OsType) -> ResetCoordinator {
        ResetCoordinator::new(
            self.store.clone(),
            self.session.clone(),
            self.dir.clone(),
            self.fs.clone(),
            self.autostart.clone(),
            self.relauncher.clone(),
            Platform::new(os),
        )
        .with_relaunch_delay(Duration::ZERO)
    }

    fn assert_core_clean(&self) {
        assert!(self.store.is_empty());
        let session = self.session.snapshot();
        assert!(session.is_clean());
        assert!(session.ignored_versions.is_empty());
        assert_eq!(session.current_version, "1.0.0");
    }
}

#[tokio::test]
async fn test_desktop_reset_restores_defaults_and_relaunches() {
    let h = Harness::dirty();

    let report = h.coordinator(OsType::Linux).reset_all().await;

    h.assert_core_clean();
    assert_eq!(report.cleared_transfers, 2);
    assert_eq!(report.download_dir.as_deref(), Some(Path::new(DEFAULT_DIR)));
    assert_eq!(h.dir.get(), Some(PathBuf::from(DEFAULT_DIR)));
    assert!(h.fs.contains(Path::new(DEFAULT_DIR)));
    assert!(report.autostart_disabled);
    assert!(!h.autostart.enabled());
    assert_eq!(report.restart, RestartMode::Relaunched);
    assert_eq!(h.relauncher.relaunches(), 1);
    assert_eq!(h.relauncher.reloads(), 0);
}

#[tokio::test]
async fn test_web_reset_skips_provisioning_and_reloads() {
    let h = Harness::dirty();

    let report = h.coordinator(OsType::Web).reset_all().await;

    h.assert_core_clean();
    assert!(!h.dir.is_set());
    assert_eq!(report.download_dir, None);
    assert_eq!(h.fs.calls(), 0);
    assert!(!report.autostart_disabled);
    assert_eq!(h.autostart.disables(), 0);
    assert_eq!(report.restart, RestartMode::Reloaded);
    assert_eq!(h.relauncher.reloads(), 1);
}

#[tokio::test]
async fn test_mobile_reset_provisions_but_keeps_autostart() {
    let h = Harness::dirty();

    let report = h.coordinator(OsType::Android).reset_all().await;

    h.assert_core_clean();
    assert_eq!(h.dir.get(), Some(PathBuf::from(DEFAULT_DIR)));
    assert_eq!(h.autostart.disables(), 0);
    assert!(h.autostart.enabled());
    assert_eq!(report.restart, RestartMode::Reloaded);
}

#[tokio::test]
async fn test_reset_without_restart_and_disabled_autostart() {
    let mut h = Harness::dirty();
    h.autostart = Arc::new(RecordingAutostart::new(false));

    let report = h.coordinator(OsType::Macos).with_restart(false).reset_all().await;

    assert_eq!(report.restart, RestartMode::None);
    assert!(!report.autostart_disabled);
    assert_eq!(h.autostart.disables(), 0);
    assert_eq!(h.relauncher.relaunches(), 0);
}

#[tokio::test]
async fn test_reset_persists_clean_state() {
    let h = Harness::dirty();
    let temp = TempDir::new().unwrap();
    let persistence = Arc::new(Persistence::new(
        StateFile::new(temp.path().join("state.json")),
        h.store.clone(),
        h.dir.clone(),
        h.session.clone(),
    ));
    persistence.save().unwrap();
    assert_eq!(persistence.file().load().unwrap().transfers.len(), 2);

    h.coordinator(OsType::Linux).with_persistence(persistence.clone()).reset_all().await;

    let state = persistence.file().load().unwrap();
    assert!(state.transfers.is_empty());
    assert!(state.ignored_versions.is_empty());
    assert_eq!(state.download_dir.as_deref(), Some(Path::new(DEFAULT_DIR)));
}
