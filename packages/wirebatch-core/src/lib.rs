//! Write batch codec and callback registry for an embedded key-value engine.
//!
//! Provides the engine-compatible batch record format with its streaming
//! decoder, and the copy-on-write registry that resolves integer handles to
//! user callbacks (comparators, merge operators, compaction filters, filter
//! policies) without locking on the lookup path.

pub mod batch;
pub mod config;
pub mod error;
pub mod registry;

pub use batch::{Batch, BatchIterator, Record, RecordType};
pub use config::BatchConfig;
pub use error::{BatchError, Result};
pub use registry::{CallbackRegistry, CowList};
