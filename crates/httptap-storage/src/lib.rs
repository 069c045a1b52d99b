//! httptap Storage - durable, namespace-partitioned exchange store
//!
//! Records live as one JSON file each in a single flat directory:
//!
//! ```text
//! ~/.config/httptap/logs/{namespace}_{id}.json
//! ```
//!
//! The file name only guarantees uniqueness. Namespace lookups read the
//! `namespace` field of each record, so overlapping names such as `svc` and
//! `svc_v2` never leak into each other.

pub mod error;
pub mod paths;
pub mod scan;
pub mod store;

pub use error::{DeleteFailure, Result, StoreError};
pub use paths::{HTTPTAP_DIR_ENV, LOGS_DIR, resolve_base_dir};
pub use scan::{NamespaceFilter, ScanReport, SkipReason, SkippedEntry};
pub use store::Store;
