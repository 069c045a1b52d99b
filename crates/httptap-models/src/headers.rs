use std::collections::BTreeMap;

use http::HeaderMap;

/// Header name to a single representative value.
pub type HeaderSnapshot = BTreeMap<String, String>;

/// Collapse a header map to one value per name.
///
/// Repeated headers keep the first value seen. Values that are not valid
/// UTF-8 are decoded lossily so the snapshot is always printable.
pub fn header_snapshot(headers: &HeaderMap) -> HeaderSnapshot {
    headers
        .keys()
        .filter_map(|name| {
            headers.get(name).map(|value| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
        })
        .collect()
}
