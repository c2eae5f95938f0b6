use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use irrigation_api::Id;
use tokio::sync::mpsc;

use crate::configs::Storage;
use crate::models::{Limit, SensorSample};
use crate::repositories::{LimitRepository, SensorSampleRepository};

/// Write side of the sample store as seen by the relay.
#[async_trait]
pub trait SampleStore: Send + Sync {
    async fn append_sample(&self, sample: &SensorSample) -> anyhow::Result<Id>;

    async fn save_limit(&self, limit: &Limit) -> anyhow::Result<()>;
}

pub struct SqliteSampleStore {
    storage: Arc<Storage>,
    sample_repository: SensorSampleRepository,
    limit_repository: LimitRepository,
}

impl SqliteSampleStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            sample_repository: SensorSampleRepository::new(storage.clone()),
            limit_repository: LimitRepository::new(storage.clone()),
            storage,
        }
    }
}

#[async_trait]
impl SampleStore for SqliteSampleStore {
    async fn append_sample(&self, sample: &SensorSample) -> anyhow::Result<Id> {
        let mut transaction = self.storage.get_pool().begin().await?;
        let id = self
            .sample_repository
            .create(sample, &mut transaction)
            .await
            .context("insert sensor sample")?;
        transaction.commit().await?;

        Ok(id)
    }

    async fn save_limit(&self, limit: &Limit) -> anyhow::Result<()> {
        let mut transaction = self.storage.get_pool().begin().await?;
        self.limit_repository
            .upsert(limit, &mut transaction)
            .await
            .with_context(|| format!("upsert limit {}", limit.id))?;
        transaction.commit().await?;

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceKind {
    Sample,
    Limit,
}

impl fmt::Display for PersistenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceKind::Sample => write!(f, "sample"),
            PersistenceKind::Limit => write!(f, "limit"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceFailure {
    pub kind: PersistenceKind,
    pub device_id: Option<String>,
    pub error: String,
}

enum PersistenceJob {
    Sample(SensorSample),
    Limit(Limit),
}

/// Issues store writes without making the caller wait for them.
///
/// Writes are queued and applied by a single worker in submission order.
#[derive(Clone)]
pub struct SampleWriter {
    jobs: mpsc::UnboundedSender<PersistenceJob>,
}

impl SampleWriter {
    pub fn new(
        store: Arc<dyn SampleStore>,
        failures: mpsc::UnboundedSender<PersistenceFailure>,
    ) -> Self {
        let (jobs, receiver) = mpsc::unbounded_channel();
        tokio::spawn(Self::drain(store, receiver, failures));

        Self { jobs }
    }

    /// Builds a writer together with the monitor draining its failures.
    pub fn with_monitor(store: Arc<dyn SampleStore>) -> (Self, FailureMonitor) {
        let (failures, receiver) = mpsc::unbounded_channel();
        (Self::new(store, failures), FailureMonitor::start(receiver))
    }

    pub fn write_sample(&self, sample: SensorSample) {
        if self.jobs.send(PersistenceJob::Sample(sample)).is_err() {
            tracing::warn!("Persistence worker stopped, dropping sample");
        }
    }

    pub fn write_limit(&self, limit: Limit) {
        if self.jobs.send(PersistenceJob::Limit(limit)).is_err() {
            tracing::warn!("Persistence worker stopped, dropping limit");
        }
    }

    async fn drain(
        store: Arc<dyn SampleStore>,
        mut receiver: mpsc::UnboundedReceiver<PersistenceJob>,
        failures: mpsc::UnboundedSender<PersistenceFailure>,
    ) {
        while let Some(job) = receiver.recv().await {
            let failure = match job {
                PersistenceJob::Sample(sample) => match store.append_sample(&sample).await {
                    Ok(id) => {
                        tracing::debug!("Stored sample {} from device {}", id, sample.device_id);
                        None
                    }
                    Err(e) => Some(PersistenceFailure {
                        kind: PersistenceKind::Sample,
                        device_id: Some(sample.device_id),
                        error: format!("{e:#}"),
                    }),
                },
                PersistenceJob::Limit(limit) => match store.save_limit(&limit).await {
                    Ok(()) => {
                        tracing::debug!("Stored limit {}", limit.id);
                        None
                    }
                    Err(e) => Some(PersistenceFailure {
                        kind: PersistenceKind::Limit,
                        device_id: None,
                        error: format!("{e:#}"),
                    }),
                },
            };

            if let Some(failure) = failure {
                let _ = failures.send(failure);
            }
        }
    }
}

/// Logs persistence failures and counts them.
#[derive(Debug, Clone, Default)]
pub struct FailureMonitor {
    failures: Arc<AtomicU64>,
}

impl FailureMonitor {
    pub fn start(mut receiver: mpsc::UnboundedReceiver<PersistenceFailure>) -> Self {
        let monitor = Self::default();
        let failures = monitor.failures.clone();

        tokio::spawn(async move {
            while let Some(failure) = receiver.recv().await {
                let total = failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::error!(
                    kind = %failure.kind,
                    device_id = failure.device_id.as_deref().unwrap_or("-"),
                    total,
                    "Failed to persist {}: {}",
                    failure.kind,
                    failure.error
                );
            }
        });

        monitor
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
