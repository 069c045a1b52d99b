use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::ExchangeRecord;

/// All records of one namespace, as shown by a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceLog {
    pub namespace: String,
    pub requests: Vec<ExchangeRecord>,
    /// Earliest record timestamp; `None` when the namespace is empty.
    pub created_at: Option<DateTime<Utc>>,
    /// Latest record timestamp; `None` when the namespace is empty.
    pub updated_at: Option<DateTime<Utc>>,
}

impl NamespaceLog {
    pub fn new(namespace: impl Into<String>, requests: Vec<ExchangeRecord>) -> Self {
        let created_at = requests.iter().map(|record| record.timestamp).min();
        let updated_at = requests.iter().map(|record| record.timestamp).max();
        Self {
            namespace: namespace.into(),
            requests,
            created_at,
            updated_at,
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
