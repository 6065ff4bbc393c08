//! # Calculation History
//!
//! Saved calculations are kept in a JSON history log (`.rsh`). The log is
//! append-only: records are never edited or removed once written.
//!
//! Writes follow the same discipline everywhere:
//! - **Locking**: an OS lock via fs2 plus a `.lock` sidecar naming the holder
//! - **Atomic saves**: write `.tmp`, fsync, rename over the log
//! - **Version validation**: refuse logs written by a newer schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use rigspec_core::history::{append_record, load_history, CalculationRecord};
//! use rigspec_core::registry::TestId;
//! use std::path::Path;
//!
//! let definition = TestId::PanicBrakeFatigue.definition();
//! let inputs = definition.default_inputs();
//! let results = definition.evaluate(&inputs)?;
//!
//! let path = Path::new("history.rsh");
//! let record = CalculationRecord::new("PRJ-001", &definition.name, inputs, results);
//! let id = append_record(path, record, "engineer@example.com")?;
//!
//! let log = load_history(path)?;
//! assert!(log.get(&id).is_some());
//! # Ok::<(), rigspec_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::values::{InputValues, ResultValues};

/// Current schema version for history logs
pub const HISTORY_SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Records
// ============================================================================

/// One saved calculation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Project/job code the calculation belongs to
    pub project_code: String,
    pub test_name: String,
    pub input_values: InputValues,
    pub result_values: ResultValues,
}

impl CalculationRecord {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(
        project_code: impl Into<String>,
        test_name: impl Into<String>,
        input_values: InputValues,
        result_values: ResultValues,
    ) -> Self {
        CalculationRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            project_code: project_code.into(),
            test_name: test_name.into(),
            input_values,
            result_values,
        }
    }

    /// First eight hex digits of the id, for listings
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// The history log file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    records: Vec<CalculationRecord>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        HistoryLog::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        let now = Utc::now();
        HistoryLog {
            version: HISTORY_SCHEMA_VERSION.to_string(),
            created: now,
            modified: now,
            records: Vec::new(),
        }
    }

    /// Append a record, returning its id.
    pub fn append(&mut self, record: CalculationRecord) -> Uuid {
        let id = record.id;
        self.records.push(record);
        self.modified = Utc::now();
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&CalculationRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Resolve a full id or a unique hex prefix of one.
    ///
    /// # Errors
    ///
    /// * `CalcError::RecordNotFound` - nothing matches
    /// * `CalcError::InvalidInput` - the prefix matches several records
    pub fn find(&self, id_or_prefix: &str) -> CalcResult<&CalculationRecord> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return self.get(&id).ok_or_else(|| CalcError::record_not_found(id_or_prefix));
        }

        let prefix = id_or_prefix.trim().to_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Err(CalcError::record_not_found(id_or_prefix));
        }
        let mut matches = self
            .records
            .iter()
            .filter(|r| r.id.simple().to_string().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (None, _) => Err(CalcError::record_not_found(id_or_prefix)),
            (Some(_), Some(_)) => Err(CalcError::invalid_input(
                "id",
                id_or_prefix,
                "Prefix matches more than one record",
            )),
        }
    }

    /// Records saved under a project code, oldest first
    pub fn for_project<'a>(&'a self, project_code: &'a str) -> impl Iterator<Item = &'a CalculationRecord> + 'a {
        self.records.iter().filter(move |r| r.project_code == project_code)
    }

    /// All records, oldest first
    pub fn records(&self) -> &[CalculationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Locking
// ============================================================================

/// Lock sidecar metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a history log, released on drop.
///
/// The OS lock on the `.lock` file decides ownership. The JSON inside only
/// names the holder, so a sidecar left by a killed process is taken over.
pub struct FileLock {
    log_path: PathBuf,
    lock_path: PathBuf,
    // Holds the OS lock
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a history log.
    ///
    /// # Errors
    ///
    /// * `CalcError::FileLocked` - another process holds the OS lock
    /// * `CalcError::FileError` - the sidecar could not be opened or written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);

        // No truncate: the current holder's details must survive a failed attempt
        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("open lock", lock_path.display().to_string(), e.to_string()))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(locked_error(path, read_lock_info(&lock_path).ok()));
        }

        if let Ok(previous) = read_lock_info(&lock_path) {
            tracing::warn!(
                path = %path.display(),
                user = %previous.user_id,
                pid = previous.pid,
                "taking over abandoned history lock"
            );
        }

        let info = LockInfo::new(user_id);
        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| CalcError::serialization(e.to_string()))?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.seek(SeekFrom::Start(0)))
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %path.display(), user = %info.user_id, "acquired history lock");

        Ok(FileLock {
            log_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current lock holder, if the OS lock is held.
    ///
    /// A holder that wrote no readable sidecar yet is reported as unknown.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        let file = OpenOptions::new().read(true).write(true).open(&lock_path).ok()?;

        if file.try_lock_exclusive().is_ok() {
            let _ = file.unlock();
            return None;
        }

        Some(read_lock_info(&lock_path).unwrap_or_else(|_| LockInfo {
            user_id: "another process".to_string(),
            machine: "unknown".to_string(),
            pid: 0,
            locked_at: Utc::now(),
        }))
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        tracing::debug!(path = %self.log_path.display(), "released history lock");
    }
}

fn locked_error(path: &Path, holder: Option<LockInfo>) -> CalcError {
    match holder {
        Some(info) => CalcError::file_locked(
            path.display().to_string(),
            format!("{} ({}, pid {})", info.user_id, info.machine, info.pid),
            info.locked_at.to_rfc3339(),
        ),
        None => CalcError::file_locked(path.display().to_string(), "another process", "unknown"),
    }
}

fn lock_path_for(log_path: &Path) -> PathBuf {
    sibling_with_suffix(log_path, "lock")
}

/// `history.rsh` -> `history.rsh.<suffix>`
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = out
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path)
        .map_err(|e| CalcError::file_error("read lock", lock_path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CalcError::serialization(e.to_string()))
}

// ============================================================================
// Load / Save
// ============================================================================

/// Save a history log with atomic write semantics.
pub fn save_history(log: &HistoryLog, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(log).map_err(|e| CalcError::serialization(e.to_string()))?;

    let tmp_path = sibling_with_suffix(path, "tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), records = log.len(), "saved history");
    Ok(())
}

/// Load a history log.
///
/// # Errors
///
/// * `CalcError::FileError` - I/O error, including a missing file
/// * `CalcError::SerializationError` - invalid JSON
/// * `CalcError::VersionMismatch` - written by an incompatible schema
pub fn load_history(path: &Path) -> CalcResult<HistoryLog> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let log: HistoryLog = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&log.version)?;
    Ok(log)
}

/// Load a history log, or start an empty one if the file does not exist.
pub fn load_or_default(path: &Path) -> CalcResult<HistoryLog> {
    if path.exists() {
        load_history(path)
    } else {
        tracing::info!(path = %path.display(), "history log not found, starting a new one");
        Ok(HistoryLog::new())
    }
}

/// Lock the log, append one record and save it atomically.
pub fn append_record(path: &Path, record: CalculationRecord, user_id: &str) -> CalcResult<Uuid> {
    let _lock = FileLock::acquire(path, user_id)?;
    let mut log = load_or_default(path)?;
    let id = log.append(record);
    save_history(&log, path)?;
    tracing::info!(%id, path = %path.display(), "saved calculation");
    Ok(id)
}

/// Major versions must match; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(HISTORY_SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: HISTORY_SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TestId;
    use tempfile::TempDir;

    fn sample_record(project: &str) -> CalculationRecord {
        let definition = TestId::PanicBrakeFatigue.definition();
        let inputs = definition.default_inputs();
        let results = definition.evaluate(&inputs).unwrap();
        CalculationRecord::new(project, &definition.name, inputs, results)
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/data/history.rsh");
        assert_eq!(lock_path_for(path), Path::new("/data/history.rsh.lock"));
        assert_eq!(sibling_with_suffix(path, "tmp"), Path::new("/data/history.rsh.tmp"));
        assert_eq!(lock_path_for(Path::new("/data/history")), Path::new("/data/history.lock"));
    }

    #[test]
    fn test_append_and_lookup() {
        let mut log = HistoryLog::new();
        let a = log.append(sample_record("PRJ-A"));
        let b = log.append(sample_record("PRJ-B"));
        let c = log.append(sample_record("PRJ-A"));

        assert_eq!(log.len(), 3);
        assert_eq!(log.get(&b).unwrap().project_code, "PRJ-B");

        let project_a: Vec<Uuid> = log.for_project("PRJ-A").map(|r| r.id).collect();
        assert_eq!(project_a, vec![a, c]);
        assert_eq!(log.for_project("PRJ-Z").count(), 0);
    }

    #[test]
    fn test_find_by_prefix() {
        let mut log = HistoryLog::new();
        let id = log.append(sample_record("PRJ"));
        let record = log.find(&id.to_string()).unwrap();
        assert_eq!(record.id, id);

        let short = log.get(&id).unwrap().short_id();
        assert_eq!(log.find(&short).unwrap().id, id);

        assert_eq!(
            log.find("ffffffff-ffff-4fff-bfff-ffffffffffff").unwrap_err().error_code(),
            "RECORD_NOT_FOUND"
        );
        assert_eq!(log.find("").unwrap_err().error_code(), "RECORD_NOT_FOUND");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.rsh");

        let mut log = HistoryLog::new();
        let id = log.append(sample_record("PRJ-001"));
        save_history(&log, &path).unwrap();

        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let record = loaded.get(&id).unwrap();
        assert_eq!(record.test_name, "Panic Brake Fatigue");
        assert_eq!(record, log.get(&id).unwrap());
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.rsh");

        save_history(&HistoryLog::new(), &path).unwrap();
        assert!(path.exists());
        assert!(!sibling_with_suffix(&path, "tmp").exists());
    }

    #[test]
    fn test_append_record_creates_log_and_releases_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.rsh");

        let first = append_record(&path, sample_record("PRJ"), "tester").unwrap();
        let second = append_record(&path, sample_record("PRJ"), "tester").unwrap();
        assert_ne!(first, second);

        let log = load_history(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].id, first);
        assert!(!lock_path_for(&path).exists());
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.rsh");

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");
        assert!(lock_path_for(&path).exists());

        drop(lock);
        assert!(!lock_path_for(&path).exists());
    }

    #[test]
    fn test_abandoned_sidecar_is_taken_over() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.rsh");

        // Left behind by a killed process: no OS lock, no hostname
        let abandoned = LockInfo {
            user_id: "bench".to_string(),
            machine: "unknown".to_string(),
            pid: 4_000_000,
            locked_at: Utc::now(),
        };
        fs::write(lock_path_for(&path), serde_json::to_string(&abandoned).unwrap()).unwrap();
        assert!(FileLock::check(&path).is_none());

        let id = append_record(&path, sample_record("PRJ"), "tester").unwrap();
        assert!(load_history(&path).unwrap().get(&id).is_some());
        assert!(!lock_path_for(&path).exists());
    }

    #[test]
    fn test_held_lock_reports_holder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.rsh");

        let held = FileLock::acquire(&path, "first@example.com").unwrap();

        let holder = FileLock::check(&path).unwrap();
        assert_eq!(holder.user_id, "first@example.com");

        let err = FileLock::acquire(&path, "second@example.com").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.to_string().contains("first@example.com"));
        assert_eq!(
            append_record(&path, sample_record("PRJ"), "second@example.com")
                .unwrap_err()
                .error_code(),
            "FILE_LOCKED"
        );

        // A failed attempt leaves the holder's sidecar intact
        assert_eq!(read_lock_info(&lock_path_for(&path)).unwrap().user_id, "first@example.com");

        drop(held);
        assert!(FileLock::check(&path).is_none());
        assert!(FileLock::acquire(&path, "second@example.com").is_ok());
    }

    #[test]
    fn test_missing_log_is_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.rsh");
        assert_eq!(load_history(&path).unwrap_err().error_code(), "FILE_ERROR");
        assert!(load_or_default(&path).unwrap().is_empty());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(HISTORY_SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
