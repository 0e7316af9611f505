//! Engine coordinator: project state, worker threads, and observer events.
//!
//! The coordinator owns all mutable engine state behind a [`Mutex`] and
//! serializes operations with a single busy flag. A second request while an
//! operation runs is rejected with [`EngineError::Busy`], never queued.
//! Each operation executes on a spawned worker thread; completion is
//! announced through registered [`EngineObserver`]s and reflected in the
//! status string. [`Coordinator::wait_idle`] blocks until the current
//! operation finishes, which is how the CLI drives the engine.
//!
//! Cancellation is cooperative and narrow: [`Coordinator::cancel`] only
//! suppresses event publication for the operation in flight. In-flight IO
//! runs to completion and state is still updated.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::analyzer::{self, AnalysisReport};
use crate::classify;
use crate::config::EngineConfig;
use crate::duplicates::{self, DetectMethod, DuplicateConfig, DuplicateReport};
use crate::error::EngineError;
use crate::scanner::{self, DiscoveredFile, ScanCounters, ScannerConfig};

/// Payload of an [`EngineEvent::AnalysisComplete`] notification.
#[derive(Debug, Clone)]
pub enum AnalysisPayload {
    /// A content-analysis report
    Analysis(Arc<AnalysisReport>),
    /// A duplicate-detection report
    Duplicates(Arc<DuplicateReport>),
}

/// Notifications published to observers when state changes.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A project was (re)loaded from disk.
    ProjectLoaded {
        /// The scan root
        root: PathBuf,
        /// Number of discovered files
        file_count: usize,
    },
    /// The include/other partition changed.
    FilesUpdated {
        /// Files matching the active extensions
        include: usize,
        /// Everything else
        other: usize,
    },
    /// An analysis or duplicate-detection run finished.
    AnalysisComplete(AnalysisPayload),
}

/// Receiver for engine notifications.
///
/// Callbacks run on the worker thread, while the busy flag is still held;
/// implementations must not call back into the coordinator's operations.
pub trait EngineObserver: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &EngineEvent);
}

/// Everything the engine knows about the current project.
#[derive(Debug, Default)]
pub struct ProjectState {
    /// Scan root of the loaded project, if any
    pub root: Option<PathBuf>,
    /// Files discovered by the most recent scan
    pub discovered: Vec<DiscoveredFile>,
    /// Counters from the most recent scan
    pub counters: ScanCounters,
    /// Paths matching the active extension set
    pub include: BTreeSet<PathBuf>,
    /// Paths not matching the active extension set
    pub other: BTreeSet<PathBuf>,
    /// Most recent analysis report
    pub last_analysis: Option<Arc<AnalysisReport>>,
    /// Most recent duplicate report
    pub last_duplicates: Option<Arc<DuplicateReport>>,
    /// Human-readable outcome of the last operation
    pub status: String,
}

struct Inner {
    busy: AtomicBool,
    cancelled: AtomicBool,
    state: Mutex<ProjectState>,
    observers: Mutex<Vec<Arc<dyn EngineObserver>>>,
    idle_lock: Mutex<()>,
    idle: Condvar,
    config: EngineConfig,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, ProjectState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `event` unless the in-flight operation was cancelled.
    fn publish(&self, event: &EngineEvent) {
        if self.cancelled.load(Ordering::SeqCst) {
            log::debug!("Cancelled: suppressing event publication");
            return;
        }
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_event(event);
        }
    }
}

/// Clears the busy flag and wakes `wait_idle` callers on every exit path.
struct BusyGuard {
    inner: Arc<Inner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.busy.store(false, Ordering::SeqCst);
        drop(
            self.inner
                .idle_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        self.inner.idle.notify_all();
    }
}

/// Front door of the engine.
///
/// Cheap to clone via the internal `Arc`; all clones share one state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    /// Create a coordinator with the given engine configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                busy: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
                state: Mutex::new(ProjectState::default()),
                observers: Mutex::new(Vec::new()),
                idle_lock: Mutex::new(()),
                idle: Condvar::new(),
                config,
            }),
        }
    }

    /// Register an observer for engine events.
    pub fn add_observer(&self, observer: Arc<dyn EngineObserver>) {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Scan `root` and replace the project state with the result.
    ///
    /// Publishes `ProjectLoaded` then `FilesUpdated` (the partition resets
    /// with the new file set). Scan failures land in the status string.
    /// `ignore_patterns`, when given, replace the ignore-file patterns.
    pub fn load_project(
        &self,
        root: PathBuf,
        ignore_patterns: Option<Vec<String>>,
    ) -> Result<(), EngineError> {
        let guard = self.begin()?;
        let inner = Arc::clone(&self.inner);

        thread::spawn(move || {
            let _guard = guard;
            let scanner_config = ScannerConfig::from_engine(&inner.config);
            match scanner::scan(&root, ignore_patterns, &scanner_config) {
                Ok(outcome) => {
                    let file_count = outcome.files.len();
                    {
                        let mut state = inner.state();
                        state.root = Some(root.clone());
                        state.discovered = outcome.files;
                        state.counters = outcome.counters;
                        state.include.clear();
                        state.other.clear();
                        state.last_analysis = None;
                        state.last_duplicates = None;
                        state.status = format!("Project loaded. Found {file_count} files");
                    }
                    inner.publish(&EngineEvent::ProjectLoaded { root, file_count });
                    inner.publish(&EngineEvent::FilesUpdated {
                        include: 0,
                        other: 0,
                    });
                }
                Err(e) => {
                    log::warn!("Project load failed: {e}");
                    inner.state().status = format!("Error loading project: {e}");
                }
            }
        });
        Ok(())
    }

    /// Partition the discovered files by the active extension set.
    pub fn classify(&self, active_extensions: HashSet<String>) -> Result<(), EngineError> {
        let guard = self.begin()?;
        self.require_project(&guard)?;
        let inner = Arc::clone(&self.inner);

        thread::spawn(move || {
            let _guard = guard;
            let discovered = inner.state().discovered.clone();
            let partition = classify::classify(&discovered, &active_extensions);
            let (include, other) = (partition.include.len(), partition.other.len());
            {
                let mut state = inner.state();
                state.include = partition.include;
                state.other = partition.other;
                state.status = format!("Files updated. {include} included, {other} other");
            }
            inner.publish(&EngineEvent::FilesUpdated { include, other });
        });
        Ok(())
    }

    /// Run content analysis over the discovered files.
    pub fn analyze(&self) -> Result<(), EngineError> {
        let guard = self.begin()?;
        self.require_project(&guard)?;
        let inner = Arc::clone(&self.inner);

        thread::spawn(move || {
            let _guard = guard;
            let (discovered, root) = {
                let state = inner.state();
                (state.discovered.clone(), state.root.clone())
            };
            let root = root.unwrap_or_default();
            let report = Arc::new(analyzer::analyze(&discovered, &root));
            {
                let mut state = inner.state();
                state.status = format!(
                    "Analysis complete. {} files, {}",
                    report.totals.total_files,
                    bytesize::ByteSize(report.totals.total_bytes)
                );
                state.last_analysis = Some(Arc::clone(&report));
            }
            inner.publish(&EngineEvent::AnalysisComplete(AnalysisPayload::Analysis(
                report,
            )));
        });
        Ok(())
    }

    /// Run duplicate detection over the discovered files.
    pub fn find_duplicates(&self, methods: Vec<DetectMethod>) -> Result<(), EngineError> {
        if methods.is_empty() {
            return Err(EngineError::InvalidArgument(
                "no detection methods selected".to_string(),
            ));
        }
        let guard = self.begin()?;
        self.require_project(&guard)?;
        let inner = Arc::clone(&self.inner);

        thread::spawn(move || {
            let _guard = guard;
            let (discovered, root) = {
                let state = inner.state();
                (state.discovered.clone(), state.root.clone())
            };
            let config = DuplicateConfig::from_engine(&inner.config);
            let report = Arc::new(duplicates::find_duplicates(
                &discovered,
                root.as_deref(),
                &methods,
                &config,
            ));
            {
                let mut state = inner.state();
                state.status = format!(
                    "Duplicate detection complete. {} group(s)",
                    report.summary.total_groups
                );
                state.last_duplicates = Some(Arc::clone(&report));
            }
            inner.publish(&EngineEvent::AnalysisComplete(
                AnalysisPayload::Duplicates(report),
            ));
        });
        Ok(())
    }

    /// Suppress event publication for the operation in flight.
    ///
    /// The operation itself runs to completion and still updates state.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Block until no operation is running.
    pub fn wait_idle(&self) {
        let mut held = self
            .inner
            .idle_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while self.inner.busy.load(Ordering::SeqCst) {
            held = self
                .inner
                .idle
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// The status string from the most recent operation.
    #[must_use]
    pub fn status(&self) -> String {
        self.inner.state().status.clone()
    }

    /// Snapshot of the discovered files.
    #[must_use]
    pub fn files(&self) -> Vec<DiscoveredFile> {
        self.inner.state().discovered.clone()
    }

    /// Counters from the most recent scan.
    #[must_use]
    pub fn counters(&self) -> ScanCounters {
        self.inner.state().counters.clone()
    }

    /// Sizes of the include/other partition.
    #[must_use]
    pub fn partition_counts(&self) -> (usize, usize) {
        let state = self.inner.state();
        (state.include.len(), state.other.len())
    }

    /// Most recent analysis report, if any.
    #[must_use]
    pub fn last_analysis(&self) -> Option<Arc<AnalysisReport>> {
        self.inner.state().last_analysis.clone()
    }

    /// Most recent duplicate report, if any.
    #[must_use]
    pub fn last_duplicates(&self) -> Option<Arc<DuplicateReport>> {
        self.inner.state().last_duplicates.clone()
    }

    /// Acquire the busy flag or reject with [`EngineError::Busy`].
    ///
    /// Acquisition also rearms cancellation for the new operation.
    fn begin(&self) -> Result<BusyGuard, EngineError> {
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::Busy);
        }
        self.inner.cancelled.store(false, Ordering::SeqCst);
        Ok(BusyGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Reject operations that need a loaded project.
    fn require_project(&self, _held: &BusyGuard) -> Result<(), EngineError> {
        if self.inner.state().root.is_none() {
            return Err(EngineError::NoProject);
        }
        Ok(())
    }
}
