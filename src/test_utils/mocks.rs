//! In-memory collaborators.
//!
//! Each mock records what it was asked to do so tests can assert on the
//! interaction as well as on the resulting state.

use crate::core::XferError;
use crate::surface::{Decision, Notice, NoticeKind, UpdatePrompt, UserSurface};
use crate::system::{Autostart, Relauncher};
use crate::transfer::{DirectoryPicker, FileSystem, Opener};
use crate::upgrade::{DownloadEvent, DownloadStream, ReleaseDescriptor, UpdateTransport};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Filesystem held in memory.
///
/// Paths are tracked individually: a file's parent directory only exists if
/// it was added too.
#[derive(Debug, Default)]
pub struct MemoryFs {
    entries: Mutex<BTreeSet<PathBuf>>,
    locked: Mutex<BTreeSet<PathBuf>>,
    calls: AtomicUsize,
    fail_mkdir: AtomicBool,
}

impl MemoryFs {
    /// Empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing path.
    pub fn add(&self, path: impl Into<PathBuf>) {
        self.entries.lock().unwrap().insert(path.into());
    }

    /// Mark `path` as held open by another process.
    pub fn lock(&self, path: impl Into<PathBuf>) {
        self.locked.lock().unwrap().insert(path.into());
    }

    /// Make every `mkdir` fail.
    pub fn fail_mkdir(&self) {
        self.fail_mkdir.store(true, Ordering::SeqCst);
    }

    /// Whether `path` is present, without counting a call.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains(path)
    }

    /// Number of trait calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn exists(&self, path: &Path) -> bool {
        self.touch();
        self.contains(path)
    }

    async fn remove(&self, path: &Path) -> Result<(), XferError> {
        self.touch();
        if self.locked.lock().unwrap().contains(path) {
            return Err(XferError::InUse {
                path: path.display().to_string(),
            });
        }
        if self.entries.lock().unwrap().remove(path) {
            Ok(())
        } else {
            Err(XferError::NotFound {
                path: path.display().to_string(),
            })
        }
    }

    async fn mkdir(&self, path: &Path) -> Result<(), XferError> {
        self.touch();
        if self.fail_mkdir.load(Ordering::SeqCst) {
            return Err(XferError::Other {
                message: format!("mkdir refused for {}", path.display()),
            });
        }
        self.add(path);
        Ok(())
    }
}

/// Surface that records notices and prompts and answers with a fixed decision.
#[derive(Debug)]
pub struct RecordingSurface {
    decision: Decision,
    notices: Mutex<Vec<Notice>>,
    prompts: Mutex<Vec<UpdatePrompt>>,
}

impl RecordingSurface {
    /// Surface answering every prompt with `decision`.
    #[must_use]
    pub fn answering(decision: Decision) -> Self {
        Self {
            decision,
            notices: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every notice shown so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    /// Kinds of every notice shown so far.
    #[must_use]
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices.lock().unwrap().iter().map(|n| n.kind).collect()
    }

    /// Every prompt shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<UpdatePrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::answering(Decision::Cancel)
    }
}

#[async_trait]
impl UserSurface for RecordingSurface {
    async fn confirm(&self, prompt: &UpdatePrompt) -> Decision {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.decision
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Opener that records targets and optionally fails.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<PathBuf>>,
    fail: AtomicBool,
}

impl RecordingOpener {
    /// Opener that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener whose every call fails.
    #[must_use]
    pub fn failing() -> Self {
        let opener = Self::default();
        opener.fail.store(true, Ordering::SeqCst);
        opener
    }

    /// Every path passed to `open`, including failed ones.
    #[must_use]
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Opener for RecordingOpener {
    async fn open(&self, path: &Path) -> Result<(), XferError> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        if self.fail.load(Ordering::SeqCst) {
            Err(XferError::OpenFailed {
                path: path.display().to_string(),
                reason: "scripted failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Picker returning a fixed answer and recording the requested mode.
#[derive(Debug, Default)]
pub struct FixedPicker {
    choice: Option<PathBuf>,
    modes: Mutex<Vec<bool>>,
}

impl FixedPicker {
    /// Picker answering `choice`.
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self {
            choice,
            modes: Mutex::new(Vec::new()),
        }
    }

    /// The `directory` flag of every call.
    #[must_use]
    pub fn modes(&self) -> Vec<bool> {
        self.modes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryPicker for FixedPicker {
    async fn pick(&self, directory: bool) -> Option<PathBuf> {
        self.modes.lock().unwrap().push(directory);
        self.choice.clone()
    }
}

/// One scripted step of a [`ScriptedTransport`] download.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Emit this event.
    Event(DownloadEvent),
    /// Fail the download with this reason.
    Fail(String),
}

/// Update transport driven by a script.
#[derive(Debug)]
pub struct ScriptedTransport {
    latest: Mutex<Result<Option<ReleaseDescriptor>, String>>,
    steps: Vec<ScriptedStep>,
    install_error: Option<String>,
    check_delay: Duration,
    checks: AtomicUsize,
    downloads: AtomicUsize,
    installs: AtomicUsize,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self {
            latest: Mutex::new(Ok(None)),
            steps: Vec::new(),
            install_error: None,
            check_delay: Duration::ZERO,
            checks: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            installs: AtomicUsize::new(0),
        }
    }
}

impl ScriptedTransport {
    /// Transport with no newer release.
    #[must_use]
    pub fn up_to_date() -> Self {
        Self::default()
    }

    /// Transport offering `version` with `content_length` bytes, downloaded
    /// in one `Started`/`Progress`/`Finished` sequence.
    #[must_use]
    pub fn offering(version: &str, content_length: u64) -> Self {
        Self {
            latest: Mutex::new(Ok(Some(ReleaseDescriptor::new(version, content_length)))),
            steps: vec![
                ScriptedStep::Event(DownloadEvent::Started(content_length)),
                ScriptedStep::Event(DownloadEvent::Progress(content_length)),
                ScriptedStep::Event(DownloadEvent::Finished),
            ],
            ..Self::default()
        }
    }

    /// Transport whose check fails.
    #[must_use]
    pub fn failing_check(reason: &str) -> Self {
        Self {
            latest: Mutex::new(Err(reason.to_string())),
            ..Self::default()
        }
    }

    /// Replace the download script.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<ScriptedStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Make `install` fail.
    #[must_use]
    pub fn with_install_error(mut self, reason: &str) -> Self {
        self.install_error = Some(reason.to_string());
        self
    }

    /// Delay every `check_latest`.
    #[must_use]
    pub fn with_check_delay(mut self, delay: Duration) -> Self {
        self.check_delay = delay;
        self
    }

    /// Number of `check_latest` calls.
    #[must_use]
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Number of `download` calls.
    #[must_use]
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Number of `install` calls.
    #[must_use]
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateTransport for ScriptedTransport {
    async fn check_latest(&self) -> Result<Option<ReleaseDescriptor>, XferError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        self.latest.lock().unwrap().clone().map_err(|reason| XferError::transport("update check", reason))
    }

    async fn download(&self, _release: &ReleaseDescriptor) -> Result<DownloadStream, XferError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<DownloadEvent, XferError>> = self
            .steps
            .iter()
            .map(|step| match step {
                ScriptedStep::Event(event) => Ok(*event),
                ScriptedStep::Fail(reason) => {
                    Err(XferError::transport("update download", reason.clone()))
                }
            })
            .collect();
        Ok(futures::stream::iter(items).boxed())
    }

    async fn install(&self, _release: &ReleaseDescriptor) -> Result<(), XferError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        match &self.install_error {
            Some(reason) => Err(XferError::InstallFailure {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Autostart registration held in memory.
#[derive(Debug, Default)]
pub struct RecordingAutostart {
    enabled: AtomicBool,
    disables: AtomicUsize,
}

impl RecordingAutostart {
    /// Registration starting `enabled`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            disables: AtomicUsize::new(0),
        }
    }

    /// Whether the registration is currently enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Number of `disable` calls.
    #[must_use]
    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Autostart for RecordingAutostart {
    async fn is_enabled(&self) -> Result<bool, XferError> {
        Ok(self.enabled())
    }

    async fn disable(&self) -> Result<(), XferError> {
        self.disables.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Relauncher that only counts calls.
#[derive(Debug, Default)]
pub struct RecordingRelauncher {
    relaunches: AtomicUsize,
    reloads: AtomicUsize,
}

impl RecordingRelauncher {
    /// Number of `relaunch` calls.
    #[must_use]
    pub fn relaunches(&self) -> usize {
        self.relaunches.load(Ordering::SeqCst)
    }

    /// Number of `reload` calls.
    #[must_use]
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Relauncher for RecordingRelauncher {
    async fn relaunch(&self) -> Result<(), XferError> {
        self.relaunches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reload(&self) -> Result<(), XferError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
