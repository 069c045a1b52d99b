//! Exchange store - one JSON file per record in a flat logs directory.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use httptap_models::{DEFAULT_NAMESPACE, ExchangeRecord, NamespaceLog};
use tracing::{debug, info, warn};

use crate::error::{DeleteFailure, Result, StoreError};
use crate::paths::{LOGS_DIR, resolve_base_dir};
use crate::scan::{NamespaceFilter, ScanReport, SkipReason, SkippedEntry};

const RECORD_SUFFIX: &str = ".json";
const TEMP_PREFIX: &str = ".tmp-";
const SEPARATOR: char = '_';

/// Namespace-partitioned record store.
///
/// The store holds no handles; every operation works directly against the
/// filesystem, so any number of clients and viewers may share a directory.
#[derive(Debug, Clone)]
pub struct Store {
    base_dir: PathBuf,
    logs_dir: PathBuf,
}

impl Store {
    /// Open the store at the default location, creating it if needed.
    pub fn initialize() -> Result<Self> {
        Self::open(resolve_base_dir(None)?)
    }

    /// Open the store rooted at `base_dir`, creating `base_dir/logs` if needed.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let logs_dir = base_dir.join(LOGS_DIR);
        fs::create_dir_all(&logs_dir).map_err(|source| StoreError::StorageUnavailable {
            path: logs_dir.clone(),
            source,
        })?;
        Ok(Self { base_dir, logs_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Persist a record. Never replaces an existing file.
    ///
    /// The bytes land in a temp file first and are moved into place with a
    /// no-clobber rename, so readers never observe a partial record.
    pub fn save(&self, record: &ExchangeRecord) -> Result<PathBuf> {
        let path = self
            .logs_dir
            .join(record_file_name(&record.namespace, &record.id));
        let data = record.to_json()?;

        let write_failed = |source| StoreError::WriteFailed {
            path: path.clone(),
            source,
        };

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.logs_dir)
            .map_err(write_failed)?;
        temp.write_all(&data).map_err(write_failed)?;
        temp.flush().map_err(write_failed)?;
        temp.persist_noclobber(&path)
            .map_err(|err| write_failed(err.error))?;

        debug!(
            id = %record.id,
            namespace = %record.namespace,
            path = %path.display(),
            "Saved exchange record"
        );
        Ok(path)
    }

    /// Records of one namespace, newest first. Unreadable files are skipped.
    pub fn load_by_namespace(&self, namespace: &str) -> Result<Vec<ExchangeRecord>> {
        Ok(self.scan_namespace(namespace)?.records)
    }

    /// Records of every namespace, newest first. Unreadable files are skipped.
    pub fn load_all(&self) -> Result<Vec<ExchangeRecord>> {
        Ok(self.scan_all()?.records)
    }

    /// Viewer entry point: `NamespaceFilter::All` or a single namespace.
    pub fn load(&self, filter: &NamespaceFilter) -> Result<Vec<ExchangeRecord>> {
        Ok(self.scan(filter)?.records)
    }

    pub fn scan_namespace(&self, namespace: &str) -> Result<ScanReport> {
        self.scan(&NamespaceFilter::Only(namespace.to_string()))
    }

    pub fn scan_all(&self) -> Result<ScanReport> {
        self.scan(&NamespaceFilter::All)
    }

    /// Fold every record file into valid records and skipped entries.
    pub fn scan(&self, filter: &NamespaceFilter) -> Result<ScanReport> {
        let mut found = Vec::new();
        let mut skipped = Vec::new();

        for path in self.record_files()? {
            match read_record(&path) {
                Ok(record) => {
                    if filter.matches(&record) {
                        found.push((path, record));
                    }
                }
                Err(reason) => {
                    warn!(path = %path.display(), ?reason, "Skipping unreadable record file");
                    skipped.push(SkippedEntry { path, reason });
                }
            }
        }

        found.sort_by(|(a_path, a), (b_path, b)| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a_path.cmp(b_path))
        });
        skipped.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(ScanReport {
            records: found.into_iter().map(|(_, record)| record).collect(),
            skipped,
        })
    }

    /// Distinct namespaces of all readable records, sorted.
    pub fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: BTreeSet<String> = self
            .scan_all()?
            .records
            .into_iter()
            .map(|record| record.namespace)
            .collect();
        Ok(namespaces.into_iter().collect())
    }

    /// Records of one namespace together with their time bounds.
    pub fn namespace_log(&self, namespace: &str) -> Result<NamespaceLog> {
        Ok(NamespaceLog::new(
            namespace,
            self.load_by_namespace(namespace)?,
        ))
    }

    /// Delete every record of `namespace`, returning how many were removed.
    ///
    /// All matching files are attempted even after a failure; failures are
    /// reported together as `DeleteFailed`. Files that no longer parse are
    /// matched on the namespace encoded in their file name, but only when
    /// that encoding is exact (no characters were replaced).
    pub fn clear_namespace(&self, namespace: &str) -> Result<usize> {
        self.clear_namespace_with(namespace, |path| fs::remove_file(path))
    }

    fn clear_namespace_with(
        &self,
        namespace: &str,
        mut remove: impl FnMut(&Path) -> std::io::Result<()>,
    ) -> Result<usize> {
        let file_prefix = Some(sanitize_component(namespace)).filter(|prefix| prefix == namespace);
        let mut deleted = 0;
        let mut failures = Vec::new();

        for path in self.record_files()? {
            let owned = match read_record(&path) {
                Ok(record) => record.namespace == namespace,
                Err(_) => file_prefix.is_some() && namespace_from_file_name(&path) == file_prefix,
            };
            if !owned {
                continue;
            }

            match remove(&path) {
                Ok(()) => deleted += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "Failed to delete record file");
                    failures.push(DeleteFailure { path, source });
                }
            }
        }

        if !failures.is_empty() {
            warn!(
                namespace,
                deleted,
                failed = failures.len(),
                "Cleared namespace with failures"
            );
            return Err(StoreError::DeleteFailed { failures });
        }

        info!(namespace, deleted, "Cleared namespace");
        Ok(deleted)
    }

    /// Paths of candidate record files. A missing directory yields none.
    fn record_files(&self) -> Result<Vec<PathBuf>> {
        let read_failed = |source| StoreError::ReadFailed {
            path: self.logs_dir.clone(),
            source,
        };

        let entries = match fs::read_dir(&self.logs_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(read_failed(err)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(read_failed)?;
            if entry.file_type().map(|kind| kind.is_dir()).unwrap_or(true) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with(TEMP_PREFIX) || !name.ends_with(RECORD_SUFFIX) {
                continue;
            }
            files.push(entry.path());
        }
        Ok(files)
    }
}

fn read_record(path: &Path) -> std::result::Result<ExchangeRecord, SkipReason> {
    let data = fs::read(path).map_err(|err| SkipReason::Unreadable(err.to_string()))?;
    ExchangeRecord::from_json(&data).map_err(|err| SkipReason::Malformed(err.to_string()))
}

/// `{namespace}_{id}.json` with both parts made filename-safe.
fn record_file_name(namespace: &str, id: &str) -> String {
    format!(
        "{}{SEPARATOR}{}{RECORD_SUFFIX}",
        sanitize_component(namespace),
        sanitize_component(id)
    )
}

fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        cleaned
    }
}

/// Prefix before the last separator of a record file name.
fn namespace_from_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(RECORD_SUFFIX)?;
    match stem.rsplit_once(SEPARATOR) {
        Some((namespace, _)) if !namespace.is_empty() => Some(namespace.to_string()),
        _ => None,
    }
}
