//! Deferred certificate jobs.
//!
//! ## Design
//!
//! - A `CertificateJob` describes one pending certificate-creation request
//! - Descriptors are persisted in the key-value store under the `jobs/`
//!   namespace, keyed by (subject, category, enqueue time) so concurrent
//!   enqueues never overwrite each other
//! - Deduplication of *effects* is not the queue's job: the processor
//!   reconciles against the object store on every drain
//! - Descriptors are deleted unconditionally once processed, whether or not
//!   an artifact or notification resulted

pub mod queue;
pub mod types;

pub use queue::{JobQueue, QueueError, QueuedJob};
pub use types::{CertificateJob, JOBS_PREFIX, key_segment};
