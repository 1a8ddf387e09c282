use std::sync::Arc;
use std::time::Duration;

use xfer_cli::platform::{OsType, Platform};
use xfer_cli::surface::{Decision, NoticeKind};
use xfer_cli::test_utils::{
    RecordingRelauncher, RecordingSurface, ScriptedStep, ScriptedTransport, init_test_logging,
};
use xfer_cli::upgrade::{
    CheckOutcome, DownloadEvent, ReleaseDescriptor, SessionCell, UpdateController, UpdateOutcome,
    UpdatePhase, UpdateSession,
};

const CURRENT: &str = "1.0.0";

fn controller(
    transport: &Arc<ScriptedTransport>,
    surface: &Arc<RecordingSurface>,
    platform: Platform,
) -> UpdateController {
    init_test_logging(None);
    let session = Arc::new(SessionCell::new(UpdateSession::new(CURRENT)));
    UpdateController::new(session, transport.clone(), surface.clone(), platform)
        .with_install_delay(Duration::ZERO)
}

fn desktop() -> Platform {
    Platform::new(OsType::Linux)
}

#[tokio::test]
async fn test_not_applicable_off_desktop() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 10));
    let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));

    for os in [OsType::Web, OsType::Android, OsType::Ios] {
        let c = controller(&transport, &surface, Platform::new(os));
        assert_eq!(c.check_for_update(true).await, CheckOutcome::NotApplicable);
    }
    assert_eq!(transport.checks(), 0);
    assert!(surface.notices().is_empty());
}

#[tokio::test]
async fn test_routine_up_to_date_is_silent_manual_notifies() {
    let transport = Arc::new(ScriptedTransport::up_to_date());
    let surface = Arc::new(RecordingSurface::default());
    let c = controller(&transport, &surface, desktop());

    assert_eq!(c.check_for_update(false).await, CheckOutcome::UpToDate);
    assert!(surface.notices().is_empty());
    assert_eq!(c.snapshot().phase, UpdatePhase::UpToDate);
    assert!(c.snapshot().is_clean());

    assert_eq!(c.check_for_update(true).await, CheckOutcome::UpToDate);
    assert_eq!(surface.kinds(), vec![NoticeKind::UpToDate]);
}

#[tokio::test]
async fn test_check_failure_resets_session() {
    let transport = Arc::new(ScriptedTransport::failing_check("offline"));
    let surface = Arc::new(RecordingSurface::default());
    let c = controller(&transport, &surface, desktop());

    assert_eq!(c.check_for_update(false).await, CheckOutcome::Failed);
    assert!(surface.notices().is_empty());
    assert!(c.snapshot().is_clean());

    assert_eq!(c.check_for_update(true).await, CheckOutcome::Failed);
    assert_eq!(surface.kinds(), vec![NoticeKind::CheckFailed]);
    assert!(c.snapshot().is_clean());
}

#[tokio::test]
async fn test_cancel_ignores_version_for_routine_checks_only() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 10));
    let surface = Arc::new(RecordingSurface::answering(Decision::Cancel));
    let c = controller(&transport, &surface, desktop());

    assert_eq!(c.check_for_update(false).await, CheckOutcome::Dismissed("2.0.0".into()));
    let session = c.snapshot();
    assert!(session.is_ignored("2.0.0"));
    assert_eq!(session.phase, UpdatePhase::Idle);
    assert!(session.is_update_available);
    assert_eq!(session.latest_version, "2.0.0");
    assert_eq!(surface.prompts().len(), 1);
    assert_eq!(surface.prompts()[0].title, "Version 2.0.0");

    // Routine check skips the ignored version without prompting
    assert_eq!(c.check_for_update(false).await, CheckOutcome::Ignored("2.0.0".into()));
    assert_eq!(surface.prompts().len(), 1);

    // Manual check prompts again; declining twice is idempotent
    assert_eq!(c.check_for_update(true).await, CheckOutcome::Dismissed("2.0.0".into()));
    assert_eq!(surface.prompts().len(), 2);
    assert_eq!(c.snapshot().ignored_versions.len(), 1);
    assert_eq!(transport.downloads(), 0);
}

#[tokio::test]
async fn test_confirmed_update_installs_and_relaunches() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 1000).with_steps(vec![
        ScriptedStep::Event(DownloadEvent::Started(1000)),
        ScriptedStep::Event(DownloadEvent::Progress(400)),
        ScriptedStep::Event(DownloadEvent::Progress(600)),
        ScriptedStep::Event(DownloadEvent::Finished),
    ]));
    let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));
    let relauncher = Arc::new(RecordingRelauncher::default());
    let c = controller(&transport, &surface, desktop()).with_relauncher(relauncher.clone());

    let outcome = c.check_for_update(false).await;

    assert_eq!(outcome, CheckOutcome::Updated(UpdateOutcome::Installed("2.0.0".into())));
    assert_eq!(transport.installs(), 1);
    assert_eq!(relauncher.relaunches(), 1);

    let session = c.snapshot();
    assert_eq!(session.phase, UpdatePhase::Terminal);
    assert!(!session.is_updating);
    assert!(!session.is_update_available);
    assert!(session.latest_version.is_empty());
    assert_eq!(session.downloaded, 0);
    assert!(surface.notices().is_empty());
}

#[tokio::test]
async fn test_download_counters_accumulate_chunks() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 1000).with_steps(vec![
        ScriptedStep::Event(DownloadEvent::Started(1000)),
        ScriptedStep::Event(DownloadEvent::Progress(400)),
        ScriptedStep::Event(DownloadEvent::Progress(600)),
        ScriptedStep::Event(DownloadEvent::Finished),
    ]));
    let surface = Arc::new(RecordingSurface::default());
    let c = Arc::new(
        controller(&transport, &surface, desktop()).with_install_delay(Duration::from_millis(300)),
    );

    let running = tokio::spawn({
        let c = c.clone();
        async move { c.handle_update(Some(ReleaseDescriptor::new("2.0.0", 1000))).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Paused in the install delay: counters hold the finished download
    let session = c.snapshot();
    assert_eq!(session.content_length, 1000);
    assert_eq!(session.downloaded, 1000);
    assert_eq!(session.downloaded_text, "Installing...");
    assert_eq!(session.phase, UpdatePhase::Installing);
    assert!(session.is_updating);
    assert!(!session.is_update_available);

    assert_eq!(running.await.unwrap(), UpdateOutcome::Installed("2.0.0".into()));
    assert_eq!(c.snapshot().downloaded, 0);
}

#[tokio::test]
async fn test_download_failure_resets_session() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 1000).with_steps(vec![
        ScriptedStep::Event(DownloadEvent::Started(1000)),
        ScriptedStep::Event(DownloadEvent::Progress(400)),
        ScriptedStep::Fail("connection reset".into()),
    ]));
    let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));
    let c = controller(&transport, &surface, desktop());

    let outcome = c.check_for_update(false).await;

    assert_eq!(outcome, CheckOutcome::Updated(UpdateOutcome::DownloadFailed));
    assert!(c.snapshot().is_clean());
    assert_eq!(c.snapshot().phase, UpdatePhase::Idle);
    assert_eq!(surface.kinds(), vec![NoticeKind::UpdateFailed]);
    assert_eq!(transport.installs(), 0);
}

#[tokio::test]
async fn test_stream_ending_without_finished_is_not_installed() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 1000).with_steps(vec![
        ScriptedStep::Event(DownloadEvent::Started(1000)),
        ScriptedStep::Event(DownloadEvent::Progress(400)),
    ]));
    let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));
    let c = controller(&transport, &surface, desktop());

    let outcome = c.check_for_update(true).await;

    assert_eq!(outcome, CheckOutcome::Updated(UpdateOutcome::DownloadFailed));
    assert_eq!(transport.installs(), 0);
    assert_eq!(surface.kinds(), vec![NoticeKind::UpdateFailed]);
    let session = c.snapshot();
    assert!(session.is_clean());
    assert_eq!(session.phase, UpdatePhase::Idle);
}

#[tokio::test]
async fn test_short_download_is_not_installed() {
    let transport = Arc::new(ScriptedTransport::offering("2.0.0", 1000).with_steps(vec![
        ScriptedStep::Event(DownloadEvent::Started(1000)),
        ScriptedStep::Event(DownloadEvent::Progress(400)),
        ScriptedStep::Event(DownloadEvent::Finished),
    ]));
    let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));
    let c = controller(&transport, &surface, desktop());

    let outcome = c.handle_update(Some(ReleaseDescriptor::new("2.0.0", 1000))).await;

    assert_eq!(outcome, UpdateOutcome::DownloadFailed);
    assert_eq!(transport.installs(), 0);
    assert_eq!(surface.kinds(), vec![NoticeKind::UpdateFailed]);
    assert!(c.snapshot().is_clean());
}

#[tokio::test]
async fn test_install_failure_resets_without_retry() {
    let transport =
        Arc::new(ScriptedTransport::offering("2.0.0", 10).with_install_error("read-only filesystem"));
    let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));
    let c = controller(&transport, &surface, desktop());

    let outcome = c.check_for_update(true).await;

    assert_eq!(outcome, CheckOutcome::Updated(UpdateOutcome::InstallFailed));
    assert_eq!(transport.installs(), 1);
    assert_eq!(surface.kinds(), vec![NoticeKind::InstallFailed]);
    let session = c.snapshot();
    assert!(session.is_clean());
    assert_eq!(session.phase, UpdatePhase::Idle);
    assert_eq!(session.current_version, CURRENT);
}

#[tokio::test]
async fn test_handle_update_without_descriptor_rechecks() {
    let transport = Arc::new(ScriptedTransport::up_to_date());
    let surface = Arc::new(RecordingSurface::default());
    let c = controller(&transport, &surface, desktop());

    assert_eq!(c.handle_update(None).await, UpdateOutcome::AlreadyLatest);
    assert_eq!(transport.checks(), 1);
    assert_eq!(transport.downloads(), 0);
    assert_eq!(surface.kinds(), vec![NoticeKind::AlreadyLatest]);
}

#[tokio::test]
async fn test_concurrent_checks_are_rejected() {
    let transport = Arc::new(
        ScriptedTransport::up_to_date().with_check_delay(Duration::from_millis(200)),
    );
    let surface = Arc::new(RecordingSurface::default());
    let c = Arc::new(controller(&transport, &surface, desktop()));

    let first = tokio::spawn({
        let c = c.clone();
        async move { c.check_for_update(false).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(c.check_for_update(true).await, CheckOutcome::AlreadyInProgress);
    assert_eq!(c.handle_update(None).await, UpdateOutcome::AlreadyInProgress);
    assert_eq!(first.await.unwrap(), CheckOutcome::UpToDate);
    assert_eq!(transport.checks(), 1);

    // The guard is released once the first sequence ends
    assert_eq!(c.check_for_update(false).await, CheckOutcome::UpToDate);
}
