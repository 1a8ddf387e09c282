use std::sync::Arc;

use tempfile::TempDir;
use xfer_cli::app::AppContext;
use xfer_cli::config::GlobalConfig;
use xfer_cli::persistence::StateFile;
use xfer_cli::platform::{OsType, Platform};
use xfer_cli::core::XferError;
use xfer_cli::test_utils::{
    CannedResponse, FixedPicker, RecordingOpener, RecordingSurface, TestServer, init_test_logging,
};
use xfer_cli::transfer::{
    HttpFetcher, LocalFs, OpenOutcome, ProgressQueue, ProgressReporter, TransferRecord,
    TransferStatus,
};

async fn open(temp: &TempDir) -> AppContext {
    init_test_logging(None);
    AppContext::open_with(
        GlobalConfig::default(),
        Platform::new(OsType::Linux),
        Arc::new(LocalFs),
        StateFile::new(temp.path().join("state.json")),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_queued_progress_persists_and_reopens() {
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;
    let dir = app.download_dir().get().unwrap();
    std::fs::create_dir_all(&dir).unwrap();

    let url = "https://files.example.com/big.iso";
    let path = dir.join("big.iso");
    app.store().register(TransferRecord::new(url, &path).with_mime_type("application/x-iso9660-image"));
    // Reports for unregistered URLs are dropped
    let stray = "https://files.example.com/stray.bin";

    let target: Arc<dyn ProgressReporter> = app.store().clone();
    let (sender, queue) = ProgressQueue::spawn(target);
    let workers: Vec<_> = (0..4u64)
        .map(|i| {
            let sender = sender.clone();
            tokio::spawn(async move {
                sender.report_progress(stray, i, 10, TransferStatus::Downloading);
            })
        })
        .collect();
    for worker in workers {
        worker.await.unwrap();
    }
    for received in [256u64, 512, 768, 1024] {
        sender.report_progress(url, received, 1024, TransferStatus::Downloading);
    }
    drop(sender);
    assert_eq!(queue.join().await, 8);

    let record = app.store().get(url).unwrap();
    assert_eq!(record.status, TransferStatus::Downloaded);
    assert_eq!(record.current_size, 1024);
    assert!(!app.store().contains(stray));
    std::fs::write(&path, vec![0u8; 1024]).unwrap();
    app.save().unwrap();
    drop(app);

    // A later report cannot demote the finished record after reopening
    let app = open(&temp).await;
    app.store().report_progress(url, 10, 1024, TransferStatus::Error);
    assert_eq!(app.store().get(url).unwrap().status, TransferStatus::Downloaded);

    let opener = Arc::new(RecordingOpener::new());
    let manager = app.transfer_manager(
        opener.clone(),
        Arc::new(FixedPicker::default()),
        Arc::new(RecordingSurface::default()),
    );
    assert_eq!(manager.open_transfer(url).await, OpenOutcome::Opened(path.clone()));
    assert_eq!(opener.opened(), vec![path]);
}

/// A fetcher over `app` with the terminal bar disabled.
fn fetcher(app: &AppContext) -> HttpFetcher {
    let manager = Arc::new(app.transfer_manager(
        Arc::new(RecordingOpener::new()),
        Arc::new(FixedPicker::default()),
        Arc::new(RecordingSurface::default()),
    ));
    let reporter: Arc<dyn ProgressReporter> = app.store().clone();
    HttpFetcher::new(manager, reporter).unwrap().with_progress(false)
}

#[tokio::test]
async fn test_fetch_with_content_length_completes() {
    let body = vec![7u8; 4096];
    let server = TestServer::start(
        CannedResponse::ok(body.clone())
            .with_header("Content-Type", "application/octet-stream")
            .trickled(1024, std::time::Duration::from_millis(10)),
    )
    .await
    .unwrap();
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;
    let url = server.url("files/data.bin");

    let record = fetcher(&app).fetch(&url).await.unwrap();

    assert_eq!(record.status, TransferStatus::Downloaded);
    assert_eq!(record.current_size, 4096);
    assert_eq!(record.total_size, 4096);
    assert_eq!(record.mime_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(record.local_path, app.download_dir().get().unwrap().join("data.bin"));
    assert_eq!(std::fs::read(&record.local_path).unwrap(), body);
    assert_eq!(app.store().get(&url).unwrap(), record);
}

#[tokio::test]
async fn test_fetch_without_content_length_completes_on_end_of_body() {
    let server = TestServer::start(CannedResponse::unsized_body(b"no length here".to_vec()))
        .await
        .unwrap();
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;

    let record = fetcher(&app).fetch(&server.url("notes.txt")).await.unwrap();

    assert_eq!(record.status, TransferStatus::Downloaded);
    assert_eq!(record.current_size, 14);
    assert_eq!(record.total_size, 14);
}

#[tokio::test]
async fn test_fetch_http_error_marks_record_error() {
    let server = TestServer::start(CannedResponse::status(404)).await.unwrap();
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;
    let url = server.url("missing.zip");

    let err = fetcher(&app).fetch(&url).await.unwrap_err();

    assert!(matches!(err, XferError::TransportFailure { .. }));
    let record = app.store().get(&url).unwrap();
    assert_eq!(record.status, TransferStatus::Error);
    assert_eq!(record.current_size, 0);
}

#[tokio::test]
async fn test_fetch_strips_content_type_parameters() {
    let server = TestServer::start(
        CannedResponse::ok(b"plain text".to_vec())
            .with_header("Content-Type", "text/plain; charset=utf-8"),
    )
    .await
    .unwrap();
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;

    let record = fetcher(&app).fetch(&server.url("readme.txt")).await.unwrap();

    assert_eq!(record.mime_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn test_fetch_empty_body_is_downloaded() {
    let server = TestServer::start(CannedResponse::ok(Vec::new())).await.unwrap();
    let temp = TempDir::new().unwrap();
    let app = open(&temp).await;

    let record = fetcher(&app).fetch(&server.url("empty.log")).await.unwrap();

    assert_eq!(record.status, TransferStatus::Downloaded);
    assert_eq!(record.total_size, 0);
    assert!(record.local_path.exists());
}
