use serde::{Deserialize, Serialize};

/// Side-channel notification about a captured exchange.
///
/// Persistence failures never reach the HTTP caller; subscribers are the
/// place to surface them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CaptureEvent {
    Recorded {
        id: String,
        namespace: String,
    },
    PersistFailed {
        id: String,
        namespace: String,
        error: String,
    },
}

impl CaptureEvent {
    pub fn id(&self) -> &str {
        match self {
            CaptureEvent::Recorded { id, .. } => id,
            CaptureEvent::PersistFailed { id, .. } => id,
        }
    }
}
