//! Recording client - captures every exchange made through it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use httptap_models::{ExchangeRecord, PendingExchange, header_snapshot};
use httptap_storage::{Store, resolve_base_dir};
use parking_lot::RwLock;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Method, Request, Response};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::capture::{buffer_request_body, buffer_response, describe_error};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::CaptureEvent;
use crate::http_client::build_http_client;
use crate::transport::HttpTransport;

const EVENT_BUFFER_CAPACITY: usize = 256;

struct RecorderState {
    namespace: String,
    enabled: bool,
    store: Option<Store>,
}

/// HTTP client wrapper that records each exchange into a [`Store`].
///
/// Namespace and enablement can change at runtime through `&self`; a change
/// applies to calls started afterwards.
pub struct RecordingClient {
    transport: Arc<dyn HttpTransport>,
    builder: reqwest::Client,
    storage_dir: Option<PathBuf>,
    state: RwLock<RecorderState>,
    events: broadcast::Sender<CaptureEvent>,
}

impl RecordingClient {
    /// Create a client backed by a fresh `reqwest::Client`.
    ///
    /// When `config.enabled` is set the store is opened immediately and any
    /// failure is returned.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client()?;
        Self::build(config, Arc::new(http.clone()), http)
    }

    /// Create a client that delegates to `transport`.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Self::build(config, transport, build_http_client()?)
    }

    fn build(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        builder: reqwest::Client,
    ) -> Result<Self> {
        let config = config.normalized();
        let store = if config.enabled {
            Some(open_store(config.storage_dir.as_ref())?)
        } else {
            None
        };
        let (events, _receiver) = broadcast::channel(EVENT_BUFFER_CAPACITY);

        Ok(Self {
            transport,
            builder,
            storage_dir: config.storage_dir,
            state: RwLock::new(RecorderState {
                namespace: config.namespace,
                enabled: config.enabled,
                store,
            }),
            events,
        })
    }

    /// Send `request`, recording the exchange when logging is enabled.
    ///
    /// The returned response or error is exactly what the transport produced;
    /// recording problems are only reported through [`subscribe`](Self::subscribe)
    /// and the log.
    pub async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        let target = {
            let state = self.state.read();
            match (&state.store, state.enabled) {
                (Some(store), true) => Some((store.clone(), state.namespace.clone())),
                _ => None,
            }
        };

        match target {
            Some((store, namespace)) => self.execute_recorded(request, store, namespace).await,
            None => self.transport.execute(request).await,
        }
    }

    async fn execute_recorded(
        &self,
        mut request: Request,
        store: Store,
        namespace: String,
    ) -> reqwest::Result<Response> {
        let pending = PendingExchange::new(
            new_record_id(),
            namespace,
            Utc::now(),
            request.method().as_str(),
            request.url().as_str(),
            header_snapshot(request.headers()),
        );

        let pending = match buffer_request_body(&mut request).await {
            Ok(Some(body)) => pending.with_body(&body),
            Ok(None) => pending,
            Err(err) => {
                self.persist(&store, pending.fail(describe_error(&err), Duration::ZERO));
                return Err(err);
            }
        };

        let started = Instant::now();
        let result = self.transport.execute(request).await;
        let elapsed = started.elapsed();

        let (record, result) = match result {
            Ok(response) => match buffer_response(response).await {
                Ok((facet, response)) => (pending.succeed(facet, elapsed), Ok(response)),
                Err(err) => (pending.fail(describe_error(&err), elapsed), Err(err)),
            },
            Err(err) => (pending.fail(describe_error(&err), elapsed), Err(err)),
        };

        self.persist(&store, record);
        result
    }

    fn persist(&self, store: &Store, record: ExchangeRecord) {
        let event = match store.save(&record) {
            Ok(_) => {
                debug!(id = %record.id, namespace = %record.namespace, "Recorded exchange");
                CaptureEvent::Recorded {
                    id: record.id,
                    namespace: record.namespace,
                }
            }
            Err(err) => {
                warn!(
                    id = %record.id,
                    namespace = %record.namespace,
                    error = %err,
                    "Failed to save request log"
                );
                CaptureEvent::PersistFailed {
                    id: record.id,
                    namespace: record.namespace,
                    error: err.to_string(),
                }
            }
        };
        let _ = self.events.send(event);
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        let request = self.builder.get(url).build()?;
        self.execute(request).await
    }

    /// POST `body`; an empty `content_type` sends no Content-Type header.
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> reqwest::Result<Response> {
        self.send_with_body(Method::POST, url, content_type, body.into())
            .await
    }

    /// PUT `body`; an empty `content_type` sends no Content-Type header.
    pub async fn put(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> reqwest::Result<Response> {
        self.send_with_body(Method::PUT, url, content_type, body.into())
            .await
    }

    pub async fn delete(&self, url: &str) -> reqwest::Result<Response> {
        let request = self.builder.delete(url).build()?;
        self.execute(request).await
    }

    async fn send_with_body(
        &self,
        method: Method,
        url: &str,
        content_type: &str,
        body: Body,
    ) -> reqwest::Result<Response> {
        let mut builder = self.builder.request(method, url).body(body);
        if !content_type.is_empty() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        self.execute(builder.build()?).await
    }

    /// Change the namespace for subsequent calls. Blank names fall back to
    /// the default namespace.
    pub fn set_namespace(&self, namespace: impl Into<String>) {
        let namespace = ClientConfig::new(namespace).normalized().namespace;
        self.state.write().namespace = namespace;
    }

    pub fn namespace(&self) -> String {
        self.state.read().namespace.clone()
    }

    /// Turn recording on or off.
    ///
    /// Enabling opens the store on first use; if that fails the client stays
    /// in its previous state and the error is returned.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let mut state = self.state.write();
        if enabled && state.store.is_none() {
            state.store = Some(open_store(self.storage_dir.as_ref())?);
        }
        state.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// The store records are written to, once it has been opened.
    pub fn store(&self) -> Option<Store> {
        self.state.read().store.clone()
    }

    /// Subscribe to capture notifications for calls made after this point.
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }
}

fn open_store(storage_dir: Option<&PathBuf>) -> Result<Store> {
    let base_dir = resolve_base_dir(storage_dir.map(PathBuf::as_path))?;
    Ok(Store::open(base_dir)?)
}

fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}
