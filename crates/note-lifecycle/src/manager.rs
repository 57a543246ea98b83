//! The lifecycle manager.
//!
//! State machine: `Idle → Building → Validating → Swapping → Idle`, with any
//! failure recording its error and returning to `Idle` without touching the
//! active generation.
//!
//! The active-generation reference is the single piece of state shared with
//! the serving side. It is replaced with one store under a short write lock
//! after the new generation is fully validated, so a concurrent reader only
//! ever sees the fully-old or fully-new generation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use note_analysis::JapaneseAnalyzer;
use note_corpus::{note_files, to_plaintext, Note};
use note_index::{build_index, open_index, IndexHandle};
use note_types::{NoteRecord, SharedRuntimeConfig};

use crate::error::LifecycleError;
use crate::guard::{JobGuard, JobPermit};
use crate::job::{Phase, RebuildReason, TriggerOutcome};
use crate::layout::IndexLayout;
use crate::progress::ProgressTracker;

/// Everything a rebuild needs, injected once at startup.
pub struct RebuildContext {
    /// Root of the note corpus.
    pub corpus_root: PathBuf,
    /// Generation directory layout.
    pub layout: IndexLayout,
    /// Analyzer shared with the query side.
    pub analyzer: Arc<JapaneseAnalyzer>,
    /// Live-mutable knobs; the exclusion list is snapshotted per job.
    pub runtime: SharedRuntimeConfig,
}

/// One fully-built, immutable index generation.
pub struct Generation {
    pub handle: IndexHandle,
    pub built_at: DateTime<Utc>,
}

/// Status snapshot for the API surface.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleStatus {
    pub last_built_at: Option<DateTime<Utc>>,
    pub document_count: Option<u64>,
    pub rebuild_in_progress: bool,
    pub progress: Option<f64>,
    pub last_error: Option<String>,
}

struct LifecycleShared {
    ctx: RebuildContext,
    active: RwLock<Option<Arc<Generation>>>,
    swapping: AtomicBool,
    guard: JobGuard,
    phase: AtomicU8,
    progress: ProgressTracker,
    last_built_at: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
    shutdown: CancellationToken,
}

struct RebuildCommand {
    reason: RebuildReason,
    permit: JobPermit,
}

/// Cloneable handle to the lifecycle state and its rebuild worker.
#[derive(Clone)]
pub struct LifecycleManager {
    shared: Arc<LifecycleShared>,
    commands: mpsc::Sender<RebuildCommand>,
}

impl LifecycleManager {
    /// Create the manager and spawn its single rebuild worker task.
    ///
    /// `shutdown` is checked at file granularity during builds; cancelling
    /// it aborts the in-flight job without touching the active generation.
    pub fn new(ctx: RebuildContext, shutdown: CancellationToken) -> Self {
        let shared = Arc::new(LifecycleShared {
            ctx,
            active: RwLock::new(None),
            swapping: AtomicBool::new(false),
            guard: JobGuard::new(),
            phase: AtomicU8::new(Phase::Idle as u8),
            progress: ProgressTracker::new(),
            last_built_at: RwLock::new(None),
            last_error: RwLock::new(None),
            shutdown,
        });

        // The permit held by each command keeps this a single-consumer,
        // at-most-one-in-flight channel.
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(worker_loop(shared.clone(), rx));

        Self {
            shared,
            commands: tx,
        }
    }

    /// Open the active generation, or run a first build if none exists.
    ///
    /// Called once at startup, before serving; a first-build failure is
    /// fatal here rather than being deferred to the status endpoint.
    pub async fn open_or_bootstrap(&self) -> Result<(), LifecycleError> {
        let layout = &self.shared.ctx.layout;
        layout.ensure_root()?;

        if layout.has_active() {
            let active_dir = layout.active();
            let handle = open_index(&active_dir)?;
            let built_at = std::fs::metadata(&active_dir)
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            info!(
                documents = handle.document_count(),
                "Opened existing index generation"
            );

            *self.shared.active.write().unwrap() = Some(Arc::new(Generation { handle, built_at }));
            *self.shared.last_built_at.write().unwrap() = Some(built_at);
            Ok(())
        } else {
            info!("No index generation found; running initial build");
            self.rebuild_now(RebuildReason::Manual).await.map(|_| ())
        }
    }

    /// Trigger a rebuild without waiting for it.
    ///
    /// The single entry point for both the periodic timer and API requests:
    /// acquire the job guard, and hand the permit to the worker task over
    /// the channel. Losing the guard race means a job is already running —
    /// the trigger is dropped, never queued.
    pub fn trigger(&self, reason: RebuildReason) -> TriggerOutcome {
        let Some(permit) = self.shared.guard.try_acquire() else {
            debug!(%reason, "Rebuild already in progress; trigger dropped");
            return TriggerOutcome::AlreadyInProgress;
        };

        match self.commands.try_send(RebuildCommand { reason, permit }) {
            Ok(()) => TriggerOutcome::Accepted,
            Err(e) => {
                // Only possible once the worker is gone at shutdown; the
                // permit inside the failed send is dropped and released.
                warn!(error = %e, "Rebuild worker unavailable; trigger dropped");
                TriggerOutcome::AlreadyInProgress
            }
        }
    }

    /// Run a rebuild to completion on the caller's task.
    ///
    /// Funnels through the same guard as `trigger`; used by the startup
    /// bootstrap and tests that need the job result.
    pub async fn rebuild_now(&self, reason: RebuildReason) -> Result<u64, LifecycleError> {
        let Some(permit) = self.shared.guard.try_acquire() else {
            return Err(LifecycleError::AlreadyInProgress);
        };
        let result = run_job(self.shared.clone(), reason).await;
        drop(permit);
        result
    }

    /// Current generation for query execution.
    ///
    /// Returns a retryable error during the bounded swap window, so a query
    /// never observes a half-promoted generation.
    pub fn snapshot(&self) -> Result<Arc<Generation>, LifecycleError> {
        if self.shared.swapping.load(Ordering::SeqCst) {
            return Err(LifecycleError::SwapInProgress);
        }
        self.shared
            .active
            .read()
            .unwrap()
            .clone()
            .ok_or(LifecycleError::NoActiveGeneration)
    }

    /// Status snapshot for the API surface.
    pub fn status(&self) -> LifecycleStatus {
        let rebuild_in_progress = self.shared.guard.is_running();
        LifecycleStatus {
            last_built_at: *self.shared.last_built_at.read().unwrap(),
            document_count: self
                .shared
                .active
                .read()
                .unwrap()
                .as_ref()
                .map(|generation| generation.handle.document_count()),
            rebuild_in_progress,
            progress: if rebuild_in_progress {
                self.shared.progress.fraction()
            } else {
                None
            },
            last_error: self.shared.last_error.read().unwrap().clone(),
        }
    }

    /// Current lifecycle phase, for diagnostics and logs.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.shared.phase.load(Ordering::SeqCst))
    }

    /// Runtime config shared with the rebuild pipeline.
    pub fn runtime(&self) -> &SharedRuntimeConfig {
        &self.shared.ctx.runtime
    }
}

/// Single consumer of accepted rebuild commands.
async fn worker_loop(shared: Arc<LifecycleShared>, mut rx: mpsc::Receiver<RebuildCommand>) {
    while let Some(RebuildCommand { reason, permit }) = rx.recv().await {
        // Errors are recorded in status and logged inside run_job; a failed
        // job must not take the worker down with it.
        let _ = run_job(shared.clone(), reason).await;
        drop(permit);
    }
    debug!("Rebuild worker stopped");
}

/// Drive one job through Building → Validating → Swapping.
///
/// The caller must hold the job permit.
async fn run_job(shared: Arc<LifecycleShared>, reason: RebuildReason) -> Result<u64, LifecycleError> {
    info!(%reason, "Rebuild started");
    let started = std::time::Instant::now();

    shared.phase.store(Phase::Building as u8, Ordering::SeqCst);
    *shared.last_error.write().unwrap() = None;
    shared.progress.reset();

    let result = tokio::task::spawn_blocking({
        let shared = shared.clone();
        move || execute_job(&shared)
    })
    .await
    .unwrap_or_else(|e| Err(LifecycleError::Build(format!("rebuild task panicked: {}", e))));

    match &result {
        Ok(documents) => {
            info!(
                %reason,
                documents,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Rebuild complete"
            );
        }
        Err(LifecycleError::Cancelled) => {
            info!(%reason, "Rebuild cancelled; active generation untouched");
        }
        Err(e) => {
            shared.phase.store(Phase::Failed as u8, Ordering::SeqCst);
            *shared.last_error.write().unwrap() = Some(e.to_string());
            error!(%reason, error = %e, "Rebuild failed; active generation untouched");
        }
    }

    shared.phase.store(Phase::Idle as u8, Ordering::SeqCst);
    result
}

/// The blocking part of a job: read, normalize, analyze, build, validate,
/// swap.
fn execute_job(shared: &LifecycleShared) -> Result<u64, LifecycleError> {
    let ctx = &shared.ctx;

    // Snapshot the knobs once; a PATCH landing mid-job applies next time.
    let exclude_dirnames = ctx.runtime.read().unwrap().exclude_dirnames.clone();

    let files: Vec<PathBuf> = note_files(&ctx.corpus_root, &exclude_dirnames)?.collect();
    shared.progress.begin(files.len() as u64);
    debug!(total = files.len(), "Enumerated corpus");

    let staging = ctx.layout.staging();
    if staging.exists() {
        // Leftover from a failed or cancelled job; superseded by this build.
        std::fs::remove_dir_all(&staging)?;
    }

    let mut records = Vec::with_capacity(files.len());
    let mut skipped = 0usize;
    for (ordinal, path) in files.iter().enumerate() {
        if shared.shutdown.is_cancelled() {
            return Err(LifecycleError::Cancelled);
        }

        let note = match Note::load(&ctx.corpus_root, path) {
            Ok(note) => note,
            Err(e) => {
                warn!(path = ?path, error = %e, "Skipping unreadable note");
                skipped += 1;
                shared.progress.advance();
                continue;
            }
        };

        let body_plain = to_plaintext(&note.body);
        let searchable = if note.frontmatter_text.is_empty() {
            body_plain.clone()
        } else {
            format!("{} {}", body_plain, note.frontmatter_text)
        };

        let title_tokens = ctx.analyzer.analyze(&note.title_raw)?;
        let body_tokens = ctx.analyzer.analyze(&searchable)?;

        records.push(NoteRecord::new(
            ordinal.to_string(),
            note.link_path,
            title_tokens,
            note.title_raw,
            body_tokens,
            body_plain,
        ));
        shared.progress.advance();
    }

    if skipped > 0 {
        warn!(skipped, "Some notes were skipped during the build");
    }

    let written = build_index(&records, &staging)?;

    shared.phase.store(Phase::Validating as u8, Ordering::SeqCst);
    let staged = open_index(&staging).map_err(|e| LifecycleError::Validation(e.to_string()))?;
    let staged_count = staged.document_count();
    if staged_count != written {
        return Err(LifecycleError::Validation(format!(
            "staged generation holds {} documents, expected {}",
            staged_count, written
        )));
    }
    drop(staged);

    shared.phase.store(Phase::Swapping as u8, Ordering::SeqCst);
    promote_staging(shared)?;

    Ok(written)
}

/// Promote the staged generation: demote active to the single backup slot,
/// rename staging into place, and flip the shared reference.
///
/// The swap flag is up only across this bounded window; queries arriving
/// meanwhile get a retryable rejection instead of a half-swapped view.
fn promote_staging(shared: &LifecycleShared) -> Result<(), LifecycleError> {
    let layout = &shared.ctx.layout;
    let active = layout.active();
    let backup = layout.backup();
    let staging = layout.staging();

    shared.swapping.store(true, Ordering::SeqCst);
    let result = (|| -> Result<(), LifecycleError> {
        if backup.exists() {
            std::fs::remove_dir_all(&backup)?;
        }

        let had_active = active.exists();
        if had_active {
            std::fs::rename(&active, &backup)?;
        }

        if let Err(e) = std::fs::rename(&staging, &active) {
            // Operational alarm: without recovery there is no active
            // generation. Roll the demoted one back; staging stays intact
            // so promotion can be retried.
            if had_active {
                if let Err(restore) = std::fs::rename(&backup, &active) {
                    error!(error = %restore, "Failed to restore previous generation after swap failure");
                }
            }
            return Err(LifecycleError::Swap(e.to_string()));
        }

        let handle = open_index(&active).map_err(|e| LifecycleError::Swap(e.to_string()))?;
        let built_at = Utc::now();

        *shared.active.write().unwrap() = Some(Arc::new(Generation { handle, built_at }));
        *shared.last_built_at.write().unwrap() = Some(built_at);
        Ok(())
    })();
    shared.swapping.store(false, Ordering::SeqCst);

    if let Err(e) = &result {
        error!(error = %e, "Index swap failed; staging directory preserved for recovery");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn test_context(corpus: &TempDir, index_root: &TempDir) -> RebuildContext {
        let analyzer = JapaneseAnalyzer::with_stopwords(HashSet::new()).unwrap();
        RebuildContext {
            corpus_root: corpus.path().to_path_buf(),
            layout: IndexLayout::new(index_root.path().join("index")),
            analyzer: Arc::new(analyzer),
            runtime: note_types::shared_runtime(note_types::RuntimeConfig::default()),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_trigger_rejected_while_permit_held() {
        let corpus = TempDir::new().unwrap();
        let index_root = TempDir::new().unwrap();
        let manager = LifecycleManager::new(
            test_context(&corpus, &index_root),
            CancellationToken::new(),
        );

        let _permit = manager.shared.guard.try_acquire().unwrap();

        assert_eq!(
            manager.trigger(RebuildReason::Manual),
            TriggerOutcome::AlreadyInProgress
        );
        assert_eq!(
            manager.trigger(RebuildReason::Periodic),
            TriggerOutcome::AlreadyInProgress
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rebuild_now_rejected_while_permit_held() {
        let corpus = TempDir::new().unwrap();
        let index_root = TempDir::new().unwrap();
        let manager = LifecycleManager::new(
            test_context(&corpus, &index_root),
            CancellationToken::new(),
        );

        let _permit = manager.shared.guard.try_acquire().unwrap();

        let result = manager.rebuild_now(RebuildReason::Manual).await;
        assert!(matches!(result, Err(LifecycleError::AlreadyInProgress)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshot_rejected_during_swap_window() {
        let corpus = TempDir::new().unwrap();
        std::fs::write(corpus.path().join("a.md"), "hello world").unwrap();
        let index_root = TempDir::new().unwrap();
        let manager = LifecycleManager::new(
            test_context(&corpus, &index_root),
            CancellationToken::new(),
        );

        manager.rebuild_now(RebuildReason::Manual).await.unwrap();
        assert!(manager.snapshot().is_ok());

        manager.shared.swapping.store(true, Ordering::SeqCst);
        assert!(matches!(
            manager.snapshot(),
            Err(LifecycleError::SwapInProgress)
        ));

        manager.shared.swapping.store(false, Ordering::SeqCst);
        assert!(manager.snapshot().is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshot_before_any_build() {
        let corpus = TempDir::new().unwrap();
        let index_root = TempDir::new().unwrap();
        let manager = LifecycleManager::new(
            test_context(&corpus, &index_root),
            CancellationToken::new(),
        );

        assert!(matches!(
            manager.snapshot(),
            Err(LifecycleError::NoActiveGeneration)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_status_before_any_build() {
        let corpus = TempDir::new().unwrap();
        let index_root = TempDir::new().unwrap();
        let manager = LifecycleManager::new(
            test_context(&corpus, &index_root),
            CancellationToken::new(),
        );

        let status = manager.status();
        assert!(status.last_built_at.is_none());
        assert!(status.document_count.is_none());
        assert!(!status.rebuild_in_progress);
        assert!(status.progress.is_none());
        assert!(status.last_error.is_none());
    }
}
