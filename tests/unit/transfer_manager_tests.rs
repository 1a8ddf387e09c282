use std::path::PathBuf;
use std::sync::Arc;

use xfer_cli::platform::{OsType, Platform};
use xfer_cli::surface::NoticeKind;
use xfer_cli::test_utils::{FixedPicker, MemoryFs, RecordingOpener, RecordingSurface, init_test_logging};
use xfer_cli::transfer::{
    DeleteOutcome, DownloadDirectory, OpenOutcome, TransferManager, TransferRecord,
    TransferStatus, TransferStore,
};

const URL: &str = "https://files.example.com/report.pdf";
const EXE_URL: &str = "https://files.example.com/setup.exe";

struct Harness {
    manager: TransferManager,
    store: Arc<TransferStore>,
    dir: Arc<DownloadDirectory>,
    fs: Arc<MemoryFs>,
    opener: Arc<RecordingOpener>,
    picker: Arc<FixedPicker>,
    surface: Arc<RecordingSurface>,
}

impl Harness {
    fn new() -> Self {
        Self::build(Platform::new(OsType::Linux), RecordingOpener::new(), None, Some("/dl"))
    }

    fn build(
        platform: Platform,
        opener: RecordingOpener,
        choice: Option<&str>,
        configured: Option<&str>,
    ) -> Self {
        init_test_logging(None);
        let store = Arc::new(TransferStore::new());
        let dir = Arc::new(DownloadDirectory::new(configured.map(PathBuf::from), "/data/downloads"));
        let fs = Arc::new(MemoryFs::new());
        let opener = Arc::new(opener);
        let picker = Arc::new(FixedPicker::new(choice.map(PathBuf::from)));
        let surface = Arc::new(RecordingSurface::default());
        let manager = TransferManager::new(
            store.clone(),
            dir.clone(),
            fs.clone(),
            opener.clone(),
            picker.clone(),
            surface.clone(),
            platform,
        );
        Self {
            manager,
            store,
            dir,
            fs,
            opener,
            picker,
            surface,
        }
    }

    fn finished(&self, url: &str, path: &str) {
        self.store.register(
            TransferRecord::new(url, path)
                .with_mime_type("application/octet-stream")
                .with_status(TransferStatus::Downloaded)
                .with_sizes(100, 100),
        );
    }

    fn status(&self, url: &str) -> Option<TransferStatus> {
        self.store.get(url).map(|r| r.status)
    }
}

#[tokio::test]
async fn test_delete_not_found_record_never_touches_filesystem() {
    let h = Harness::new();
    h.store.register(TransferRecord::new(URL, "/dl/report.pdf").with_status(TransferStatus::NotFound));

    let outcome = h.manager.delete_transfer(URL, true).await;

    assert_eq!(outcome, DeleteOutcome::Removed);
    assert!(!h.store.contains(URL));
    assert_eq!(h.fs.calls(), 0);
    assert!(h.surface.notices().is_empty());
}

#[tokio::test]
async fn test_delete_missing_file_marks_not_found_then_removes() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");

    let outcome = h.manager.delete_transfer(URL, true).await;
    assert_eq!(outcome, DeleteOutcome::MarkedNotFound);
    assert_eq!(h.status(URL), Some(TransferStatus::NotFound));
    assert_eq!(h.surface.kinds(), vec![NoticeKind::FileMissing]);

    let calls = h.fs.calls();
    let outcome = h.manager.delete_transfer(URL, true).await;
    assert_eq!(outcome, DeleteOutcome::Removed);
    assert!(!h.store.contains(URL));
    assert_eq!(h.fs.calls(), calls);
}

#[tokio::test]
async fn test_delete_removes_file_and_record() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");
    h.fs.add("/dl/report.pdf");

    assert_eq!(h.manager.delete_transfer(URL, true).await, DeleteOutcome::Removed);
    assert!(!h.fs.contains(std::path::Path::new("/dl/report.pdf")));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_delete_locked_file_keeps_record_unchanged() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");
    h.fs.add("/dl/report.pdf");
    h.fs.lock("/dl/report.pdf");
    let before = h.store.get(URL).unwrap();

    let outcome = h.manager.delete_transfer(URL, true).await;

    assert_eq!(outcome, DeleteOutcome::InUse);
    assert_eq!(h.store.get(URL).unwrap(), before);
    assert_eq!(h.surface.kinds(), vec![NoticeKind::FileInUse]);
}

#[tokio::test]
async fn test_delete_without_verify_tolerates_missing_file() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");

    let outcome = h.manager.delete_transfer(URL, false).await;

    assert_eq!(outcome, DeleteOutcome::Removed);
    assert!(h.store.is_empty());
    assert!(h.surface.notices().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_url() {
    let h = Harness::new();
    assert_eq!(h.manager.delete_transfer(URL, true).await, DeleteOutcome::Unknown);
    assert_eq!(h.fs.calls(), 0);
}

#[tokio::test]
async fn test_open_executable_reveals_folder_instead() {
    let h = Harness::new();
    h.finished(EXE_URL, "/dl/setup.exe");
    h.fs.add("/dl/setup.exe");

    let outcome = h.manager.open_transfer(EXE_URL).await;

    assert_eq!(outcome, OpenOutcome::RevealedFolder(PathBuf::from("/dl")));
    assert_eq!(h.opener.opened(), vec![PathBuf::from("/dl")]);
    assert_eq!(h.status(EXE_URL), Some(TransferStatus::Downloaded));
}

#[tokio::test]
async fn test_open_regular_file() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");
    h.fs.add("/dl/report.pdf");

    let outcome = h.manager.open_transfer(URL).await;

    assert_eq!(outcome, OpenOutcome::Opened(PathBuf::from("/dl/report.pdf")));
    assert_eq!(h.opener.opened(), vec![PathBuf::from("/dl/report.pdf")]);
}

#[tokio::test]
async fn test_open_ignores_unfinished_or_untyped_records() {
    let h = Harness::new();
    h.store.register(TransferRecord::new(URL, "/dl/report.pdf").with_mime_type("application/pdf"));
    h.store.register(
        TransferRecord::new(EXE_URL, "/dl/setup.exe").with_status(TransferStatus::Downloaded),
    );

    assert_eq!(h.manager.open_transfer(URL).await, OpenOutcome::Ignored);
    assert_eq!(h.manager.open_transfer(EXE_URL).await, OpenOutcome::Ignored);
    assert!(h.opener.opened().is_empty());
    assert_eq!(h.fs.calls(), 0);
}

#[tokio::test]
async fn test_open_missing_file_marks_not_found() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");

    assert_eq!(h.manager.open_transfer(URL).await, OpenOutcome::Missing);
    assert_eq!(h.status(URL), Some(TransferStatus::NotFound));
    assert_eq!(h.surface.kinds(), vec![NoticeKind::FileMissing]);
    assert!(h.opener.opened().is_empty());
}

#[tokio::test]
async fn test_open_failure_marks_error() {
    let h = Harness::build(
        Platform::new(OsType::Linux),
        RecordingOpener::failing(),
        None,
        Some("/dl"),
    );
    h.finished(URL, "/dl/report.pdf");
    h.fs.add("/dl/report.pdf");

    assert_eq!(h.manager.open_transfer(URL).await, OpenOutcome::Failed);
    assert_eq!(h.status(URL), Some(TransferStatus::Error));
    assert_eq!(h.surface.kinds(), vec![NoticeKind::OpenFailed]);
}

#[tokio::test]
async fn test_reveal_missing_folder_only_notifies() {
    let h = Harness::new();
    h.finished(URL, "/gone/report.pdf");

    let outcome = h.manager.open_containing_folder(URL).await;

    assert_eq!(outcome, OpenOutcome::FolderMissing(PathBuf::from("/gone")));
    assert_eq!(h.status(URL), Some(TransferStatus::Downloaded));
    assert_eq!(h.surface.kinds(), vec![NoticeKind::FolderMissing]);
}

#[tokio::test]
async fn test_reveal_without_path_marks_not_found() {
    let h = Harness::new();
    h.finished(URL, "");

    assert_eq!(h.manager.open_containing_folder(URL).await, OpenOutcome::Missing);
    assert_eq!(h.status(URL), Some(TransferStatus::NotFound));
}

#[tokio::test]
async fn test_reveal_opens_existing_folder() {
    let h = Harness::new();
    h.finished(URL, "/dl/report.pdf");
    h.fs.add("/dl");

    assert_eq!(
        h.manager.open_containing_folder(URL).await,
        OpenOutcome::RevealedFolder(PathBuf::from("/dl"))
    );
    assert_eq!(h.opener.opened(), vec![PathBuf::from("/dl")]);
}

#[tokio::test]
async fn test_ensure_recreates_missing_directory() {
    let h = Harness::new();

    assert!(h.manager.ensure_download_directory().await);
    assert!(h.fs.contains(std::path::Path::new("/dl")));
    assert!(h.surface.notices().is_empty());
}

#[tokio::test]
async fn test_ensure_reports_unusable_directory() {
    let h = Harness::new();
    h.fs.fail_mkdir();

    assert!(!h.manager.ensure_download_directory().await);
    assert_eq!(h.surface.kinds(), vec![NoticeKind::DownloadDirUnavailable]);
}

#[tokio::test]
async fn test_ensure_without_directory_asks_picker() {
    let h = Harness::build(Platform::new(OsType::Linux), RecordingOpener::new(), Some("/picked"), None);
    h.fs.add("/picked");

    assert!(h.manager.ensure_download_directory().await);
    assert_eq!(h.dir.get(), Some(PathBuf::from("/picked")));
    assert_eq!(h.picker.modes(), vec![true]);
    assert_eq!(h.surface.kinds(), vec![NoticeKind::DownloadDirChanged]);
}

#[tokio::test]
async fn test_change_dir_rejects_missing_path() {
    let h = Harness::build(Platform::new(OsType::Linux), RecordingOpener::new(), Some("/nope"), Some("/dl"));

    assert_eq!(h.manager.change_download_dir().await, None);
    assert_eq!(h.dir.get(), Some(PathBuf::from("/dl")));
    assert_eq!(h.surface.kinds(), vec![NoticeKind::PathMissing]);
}

#[tokio::test]
async fn test_change_dir_on_mobile_uses_parent_of_picked_file() {
    let h = Harness::build(
        Platform::new(OsType::Android),
        RecordingOpener::new(),
        Some("/sdcard/Download/any.txt"),
        None,
    );
    h.fs.add("/sdcard/Download");

    assert_eq!(h.manager.change_download_dir().await, Some(PathBuf::from("/sdcard/Download")));
    assert_eq!(h.picker.modes(), vec![false]);
}

#[tokio::test]
async fn test_cancelled_picker_leaves_directory_unset() {
    let h = Harness::build(Platform::new(OsType::Linux), RecordingOpener::new(), None, None);

    assert!(!h.manager.ensure_download_directory().await);
    assert!(!h.dir.is_set());
    assert!(h.surface.notices().is_empty());
}
