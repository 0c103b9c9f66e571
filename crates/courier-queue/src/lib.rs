//! # Courier Queue
//!
//! The durable scheduling queue and its delivery worker.
//!
//! ## Design
//! - File-based persistence — the whole queue is one JSON document,
//!   replaced atomically (tmp file + rename) on every write
//! - Single logical worker, sequential dispatch — exact rate limiting,
//!   no interleaved writes
//! - Fixed-delay retry with a bounded attempt count
//! - Variant decisions are captured at enqueue time and ride on the job,
//!   so a retried send renders exactly what was promised
//!
//! ## Architecture
//! ```text
//! courier (schedule mode) ──► enqueue ──► queue.json
//!
//! courier-worker
//!   └── Worker::run (tick loop)
//!         ├── JobStore::load
//!         ├── validate + order (schedule)
//!         ├── MessageComposer::compose ──► DeliveryGateway::deliver
//!         ├── RetryPolicy::{on_success, on_failure}
//!         └── JobStore::replace (after every job)
//! ```

pub mod audit;
pub mod dispatch;
pub mod enqueue;
pub mod job;
pub mod retry;
pub mod schedule;
pub mod store;
pub mod variants;
pub mod worker;

pub use audit::AuditLog;
pub use dispatch::{SendSummary, send_now};
pub use enqueue::enqueue_from_config;
pub use job::{Job, JobStatus};
pub use retry::RetryPolicy;
pub use schedule::DueTime;
pub use store::JobStore;
pub use variants::{RotationState, RotationStore, VariantSelector};
pub use worker::Worker;
