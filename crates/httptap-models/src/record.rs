//! Exchange record - one captured HTTP request/response or request/error cycle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RecordError;
use crate::headers::HeaderSnapshot;

/// Namespace used when the caller does not supply one.
pub const DEFAULT_NAMESPACE: &str = "default";

const UNKNOWN_ERROR: &str = "unknown error";

/// Immutable capture of a single HTTP exchange.
///
/// After completion exactly one of `response` and `error` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: HeaderSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseFacet>,
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response side of a successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFacet {
    pub status_code: u16,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: HeaderSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl ResponseFacet {
    /// Build a facet from a fully buffered response body.
    pub fn new(status_code: u16, headers: HeaderSnapshot, body: &[u8]) -> Self {
        Self {
            status_code,
            headers,
            body: body_text(body),
            size: body.len() as u64,
        }
    }
}

/// How an exchange ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    Response(&'a ResponseFacet),
    Error(&'a str),
    /// Neither facet present; only seen for records written by other tools.
    Pending,
}

/// Coarse status bucket used by viewers to colour a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
    Failed,
    Pending,
}

impl ExchangeRecord {
    /// Serialize to the persisted JSON form.
    pub fn to_json(&self) -> Result<Vec<u8>, RecordError> {
        serde_json::to_vec(self).map_err(RecordError::Encode)
    }

    /// Parse the persisted JSON form.
    pub fn from_json(data: &[u8]) -> Result<Self, RecordError> {
        serde_json::from_slice(data).map_err(RecordError::Malformed)
    }

    pub fn outcome(&self) -> Outcome<'_> {
        match (&self.response, self.error.as_deref()) {
            (Some(response), _) => Outcome::Response(response),
            (None, Some(error)) if !error.is_empty() => Outcome::Error(error),
            _ => Outcome::Pending,
        }
    }

    /// Status code as text, or `ERROR` / `PENDING`.
    pub fn status_label(&self) -> String {
        match self.outcome() {
            Outcome::Response(response) => response.status_code.to_string(),
            Outcome::Error(_) => "ERROR".to_string(),
            Outcome::Pending => "PENDING".to_string(),
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self.outcome() {
            Outcome::Response(response) => match response.status_code {
                100..=199 => StatusClass::Informational,
                200..=299 => StatusClass::Success,
                300..=399 => StatusClass::Redirect,
                400..=499 => StatusClass::ClientError,
                _ => StatusClass::ServerError,
            },
            Outcome::Error(_) => StatusClass::Failed,
            Outcome::Pending => StatusClass::Pending,
        }
    }

    /// Text matched by list filtering in a viewer.
    pub fn filter_text(&self) -> String {
        format!("{} {} {}", self.method, self.url, self.namespace)
    }

    /// Duration truncated to whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

/// A record whose outcome is not known yet.
///
/// Finishing it through [`succeed`](Self::succeed) or [`fail`](Self::fail) is
/// the only way to obtain an [`ExchangeRecord`] from it, which keeps the
/// response/error facets mutually exclusive.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    record: ExchangeRecord,
}

impl PendingExchange {
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        timestamp: DateTime<Utc>,
        method: impl Into<String>,
        url: impl Into<String>,
        headers: HeaderSnapshot,
    ) -> Self {
        Self {
            record: ExchangeRecord {
                id: id.into(),
                timestamp,
                method: method.into(),
                url: url.into(),
                headers,
                body: None,
                response: None,
                duration: Duration::ZERO,
                namespace: normalize_namespace(namespace.into()),
                error: None,
            },
        }
    }

    /// Attach the captured request body. Empty bodies stay absent.
    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.record.body = body_text(body);
        self
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn namespace(&self) -> &str {
        &self.record.namespace
    }

    pub fn succeed(mut self, response: ResponseFacet, duration: Duration) -> ExchangeRecord {
        self.record.response = Some(response);
        self.record.duration = duration;
        self.record
    }

    pub fn fail(mut self, error: impl Into<String>, duration: Duration) -> ExchangeRecord {
        let error = error.into();
        self.record.error = Some(if error.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            error
        });
        self.record.duration = duration;
        self.record
    }
}

fn normalize_namespace(namespace: String) -> String {
    if namespace.trim().is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        namespace
    }
}

fn body_text(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(body).into_owned())
    }
}

/// Durations travel as integer nanoseconds.
/// Writers that leave headers unset emit `null`; read it as no headers.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HeaderSnapshot, D::Error> {
    Ok(Option::<HeaderSnapshot>::deserialize(deserializer)?.unwrap_or_default())
}

mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        // Negative values can appear from clock adjustments on other writers.
        let nanos = i64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
