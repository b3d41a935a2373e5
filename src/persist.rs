//! Persistence backends and the background save operation.
//!
//! A save ships a full snapshot to a backend on a worker thread; the
//! caller polls for the outcome. At most one save runs at a time, a
//! deadline turns a hung backend into a failure, and cancelling discards
//! whatever the worker eventually reports. A failed or abandoned save
//! never touches in-memory state.

use std::{
    fs, io,
    path::PathBuf,
    sync::{
        Arc,
        mpsc::{self, TryRecvError},
    },
    thread,
    time::{Duration, Instant},
};

use rand::Rng;

use crate::model::Snapshot;

/// Errors a backend can report for one snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot rejected: {0}")]
    Rejected(String),
}

/// Accepts whole snapshots. Implementations may block; callers run them
/// through [`SaveHandle`] to stay responsive.
pub trait PersistenceBackend: Send + Sync {
    fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// Writes each snapshot as pretty-printed JSON under the snapshot root:
/// `<root>/<uuid>.json`.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default snapshot root: `~/.roster/snapshots/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roster").join("snapshots"))
    }
}

impl PersistenceBackend for FileBackend {
    fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(self.root.join(format!("{}.json", snapshot.id)), json)?;
        Ok(())
    }
}

/// Wraps a backend with latency and a failure chance, standing in for the
/// network round-trip a deployed console would make.
pub struct FlakyBackend<B> {
    inner: B,
    latency: Duration,
    failure_chance: f64,
}

impl<B: PersistenceBackend> FlakyBackend<B> {
    pub fn new(inner: B, latency: Duration, failure_chance: f64) -> Self {
        Self {
            inner,
            latency,
            failure_chance,
        }
    }
}

impl<B: PersistenceBackend> PersistenceBackend for FlakyBackend<B> {
    fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let mut rng = rand::thread_rng();

        // Fixed latency plus up to the same again in jitter.
        let jitter = self.latency.mul_f64(rng.r#gen::<f64>());
        thread::sleep(self.latency + jitter);

        if rng.r#gen::<f64>() < self.failure_chance {
            return Err(PersistError::Rejected("simulated outage".to_string()));
        }
        self.inner.persist(snapshot)
    }
}

/// What a finished save reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Success,
    /// Retryable: the snapshot was not persisted and edits are kept.
    Failure(String),
}

/// One in-flight save: a worker thread plus a deadline.
pub struct SaveHandle {
    rx: mpsc::Receiver<Result<(), PersistError>>,
    deadline: Instant,
}

impl SaveHandle {
    /// Starts persisting a snapshot in the background.
    pub fn spawn(
        backend: Arc<dyn PersistenceBackend>,
        snapshot: Snapshot,
        timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // A send error means the handle was cancelled or timed out;
            // the result is simply discarded.
            let _ = tx.send(backend.persist(&snapshot));
        });
        Self {
            rx,
            deadline: Instant::now() + timeout,
        }
    }

    /// Non-blocking check. `None` while the worker is still running and
    /// the deadline has not passed.
    pub fn try_outcome(&mut self) -> Option<SaveOutcome> {
        match self.rx.try_recv() {
            Ok(Ok(())) => Some(SaveOutcome::Success),
            Ok(Err(e)) => Some(SaveOutcome::Failure(e.to_string())),
            Err(TryRecvError::Empty) => {
                if Instant::now() >= self.deadline {
                    Some(SaveOutcome::Failure("save timed out".to_string()))
                } else {
                    None
                }
            }
            Err(TryRecvError::Disconnected) => {
                Some(SaveOutcome::Failure("save worker exited".to_string()))
            }
        }
    }

    /// Abandons the save. Dropping the receiver detaches the worker; its
    /// eventual result goes nowhere.
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;
    use uuid::Uuid;

    use crate::directory::{FixtureDirectory, ResourceDirectory};
    use crate::model::SummaryMetrics;

    fn sample_snapshot() -> Snapshot {
        let seed = FixtureDirectory.load().unwrap();
        Snapshot {
            id: Uuid::new_v4(),
            saved_by: "jmills".to_string(),
            saved_at: Timestamp::now(),
            resources: seed.resources,
            gaps: seed.gaps,
            metrics: SummaryMetrics {
                total_resources_allocated: 11,
                headcount_conversion: 8.30,
                headcount_requirement: 10.0,
                aligned_outside_count: 2,
            },
        }
    }

    /// Backend that sleeps long enough to outlive any test deadline.
    struct StallingBackend;

    impl PersistenceBackend for StallingBackend {
        fn persist(&self, _snapshot: &Snapshot) -> Result<(), PersistError> {
            thread::sleep(Duration::from_secs(5));
            Ok(())
        }
    }

    fn wait_for_outcome(handle: &mut SaveHandle) -> SaveOutcome {
        for _ in 0..1000 {
            if let Some(outcome) = handle.try_outcome() {
                return outcome;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("save never finished");
    }

    #[test]
    fn file_backend_round_trips_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("snapshots")).unwrap();
        let snapshot = sample_snapshot();

        backend.persist(&snapshot).unwrap();

        let path = dir
            .path()
            .join("snapshots")
            .join(format!("{}.json", snapshot.id));
        let json = fs::read_to_string(path).unwrap();
        let loaded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.saved_by, "jmills");
        assert_eq!(loaded.resources.len(), 13);
    }

    #[test]
    fn flaky_backend_certain_failure() {
        let dir = TempDir::new().unwrap();
        let inner = FileBackend::new(dir.path().join("snapshots")).unwrap();
        let backend = FlakyBackend::new(inner, Duration::ZERO, 1.0);

        let err = backend.persist(&sample_snapshot()).unwrap_err();
        assert!(matches!(err, PersistError::Rejected(_)));
    }

    #[test]
    fn flaky_backend_zero_chance_passes_through() {
        let dir = TempDir::new().unwrap();
        let inner = FileBackend::new(dir.path().join("snapshots")).unwrap();
        let backend = FlakyBackend::new(inner, Duration::ZERO, 0.0);

        backend.persist(&sample_snapshot()).unwrap();
    }

    #[test]
    fn save_handle_reports_success() {
        let dir = TempDir::new().unwrap();
        let backend: Arc<dyn PersistenceBackend> =
            Arc::new(FileBackend::new(dir.path().join("snapshots")).unwrap());

        let mut handle =
            SaveHandle::spawn(backend, sample_snapshot(), Duration::from_secs(5));
        assert_eq!(wait_for_outcome(&mut handle), SaveOutcome::Success);
    }

    #[test]
    fn save_handle_times_out_on_a_stalled_backend() {
        let mut handle = SaveHandle::spawn(
            Arc::new(StallingBackend),
            sample_snapshot(),
            Duration::from_millis(20),
        );

        let outcome = wait_for_outcome(&mut handle);
        assert!(matches!(outcome, SaveOutcome::Failure(reason) if reason.contains("timed out")));
    }

    #[test]
    fn cancelled_save_discards_the_late_result() {
        let handle = SaveHandle::spawn(
            Arc::new(StallingBackend),
            sample_snapshot(),
            Duration::from_secs(5),
        );

        // No panic, no outcome delivered anywhere.
        handle.cancel();
    }
}
