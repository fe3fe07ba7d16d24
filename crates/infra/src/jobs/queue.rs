//! Typed job queue over the key-value store.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::types::{CertificateJob, JOBS_PREFIX};
use crate::properties::{PropertyError, PropertyStore};

/// Job queue error.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("property store error: {0}")]
    Property(#[from] PropertyError),
    #[error("descriptor codec error: {0}")]
    Codec(String),
}

/// A queued descriptor together with its storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub key: String,
    pub job: CertificateJob,
}

/// Unordered queue of job descriptors in the `jobs/` namespace.
///
/// Correctness depends on single-pass drain, not ordering: the processor
/// reconciles every descriptor against external state regardless of the
/// order descriptors come back in.
#[derive(Debug, Clone)]
pub struct JobQueue<P> {
    props: P,
}

impl<P: PropertyStore> JobQueue<P> {
    pub fn new(props: P) -> Self {
        Self { props }
    }

    /// Persist a descriptor; returns its storage key.
    pub fn push(
        &self,
        job: &CertificateJob,
        enqueued_at: DateTime<Utc>,
    ) -> Result<String, QueueError> {
        let key = job.storage_key(enqueued_at);
        let payload =
            serde_json::to_string(job).map_err(|e| QueueError::Codec(e.to_string()))?;
        self.props.set(&key, &payload)?;
        Ok(key)
    }

    /// Snapshot of all pending descriptors.
    ///
    /// Undecodable payloads are removed and logged: a descriptor that cannot
    /// be parsed can never be acted on, and leaving it queued would poison
    /// every future drain.
    pub fn pending(&self) -> Result<Vec<QueuedJob>, QueueError> {
        let mut jobs = Vec::new();
        for (key, value) in self.props.entries()? {
            if !key.starts_with(JOBS_PREFIX) {
                continue;
            }
            match serde_json::from_str::<CertificateJob>(&value) {
                Ok(job) => jobs.push(QueuedJob { key, job }),
                Err(e) => {
                    warn!(job_key = %key, error = %e, "dropping undecodable job descriptor");
                    self.props.delete(&key)?;
                }
            }
        }
        Ok(jobs)
    }

    /// Remove a descriptor by key. Removing a missing key is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), QueueError> {
        self.props.delete(key)?;
        Ok(())
    }
}
