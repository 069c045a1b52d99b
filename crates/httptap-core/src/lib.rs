//! httptap Core - recording HTTP client
//!
//! [`RecordingClient`] wraps any [`HttpTransport`] (a `reqwest::Client` by
//! default). Each call is captured as an
//! [`ExchangeRecord`](httptap_models::ExchangeRecord) and saved to the
//! [`Store`](httptap_storage::Store) before the call returns. The caller gets
//! back the same response or error the transport produced, with bodies intact.
//!
//! ```ignore
//! use httptap_core::{ClientConfig, RecordingClient};
//!
//! let client = RecordingClient::new(ClientConfig::new("user-service").with_enabled(true))?;
//! let response = client.get("https://httpbin.org/get").await?;
//! ```

mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
mod http_client;
pub mod transport;

pub use client::RecordingClient;
pub use config::ClientConfig;
pub use error::{CoreError, Result};
pub use events::CaptureEvent;
pub use transport::HttpTransport;

pub use httptap_models::{ExchangeRecord, NamespaceLog, Outcome, ResponseFacet};
pub use httptap_storage::{NamespaceFilter, ScanReport, Store, StoreError};
