//! httptap Models - exchange record shape and its persisted JSON contract
//!
//! Every captured HTTP exchange becomes one [`ExchangeRecord`]. The JSON
//! produced by [`ExchangeRecord::to_json`] is the on-disk format shared by the
//! recording client and any viewer reading the store.

pub mod error;
pub mod headers;
pub mod namespace_log;
pub mod record;

pub use error::RecordError;
pub use headers::{HeaderSnapshot, header_snapshot};
pub use namespace_log::NamespaceLog;
pub use record::{
    DEFAULT_NAMESPACE, ExchangeRecord, Outcome, PendingExchange, ResponseFacet, StatusClass,
};
