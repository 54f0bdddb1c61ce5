use std::{
    collections::HashMap,
    fs,
    io,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Keys written by the storefront.
pub mod keys {
    pub const CART: &str = "cart";
    pub const LANGUAGE: &str = "language";
    pub const ORDERS: &str = "orders";
    pub const CURRENT_USER: &str = "current_user";
    pub const USERS: &str = "users";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error")]
    Io(#[from] io::Error),

    #[error("store serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt data under key `{key}`")]
    Corrupt { key: String },

    #[error("version conflict on key `{key}`")]
    VersionConflict { key: String },

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored value together with the version it was written at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: String,
    pub version: u64,
}

/// Flat string key/value persistence.
///
/// Every write bumps the entry version. Callers that may race with other
/// writers read with [`Store::get`] and write back with
/// [`Store::compare_and_set`].
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<Entry>>;

    /// Unconditional write. Returns the new version.
    fn set(&self, key: &str, value: String) -> StoreResult<u64>;

    /// Writes only if the current version equals `expected`
    /// (`None` meaning the key must be absent).
    fn compare_and_set(&self, key: &str, expected: Option<u64>, value: String)
    -> StoreResult<u64>;

    fn remove(&self, key: &str) -> StoreResult<()>;
}

pub type SharedStore = Arc<dyn Store>;

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

/// Entries plus the version clock. Versions come from one counter that
/// never goes back, so a removed and re-created key cannot reuse a
/// version an earlier reader still holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Table {
    #[serde(default)]
    clock: u64,
    #[serde(default)]
    entries: HashMap<String, Entry>,
}

impl Table {
    fn write(&mut self, key: &str, expected: Option<Option<u64>>, value: String) -> StoreResult<u64> {
        let current = self.entries.get(key).map(|e| e.version);
        if let Some(expected) = expected {
            if current != expected {
                return Err(StoreError::VersionConflict {
                    key: key.to_string(),
                });
            }
        }
        self.clock = self.clock.max(current.unwrap_or(0)) + 1;
        let version = self.clock;
        self.entries.insert(key.to_string(), Entry { value, version });
        Ok(version)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
        Ok(lock(&self.table)?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StoreResult<u64> {
        lock(&self.table)?.write(key, None, value)
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        value: String,
    ) -> StoreResult<u64> {
        lock(&self.table)?.write(key, Some(expected), value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        lock(&self.table)?.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON document on disk.
///
/// The whole map is rewritten on every mutation through a temporary file
/// and a rename, so a crash leaves either the old or the new document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: Mutex<Table>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let table: Table = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Table::default(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|_| StoreError::Corrupt {
                key: path.display().to_string(),
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Table::default(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = table.entries.len(), "file store opened");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    fn flush(&self, table: &Table) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(table)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&self, f: F) -> StoreResult<u64>
    where
        F: FnOnce(&mut Table) -> StoreResult<u64>,
    {
        let mut table = lock(&self.table)?;
        let mut next = table.clone();
        let version = f(&mut next)?;
        self.flush(&next)?;
        *table = next;
        Ok(version)
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
        Ok(lock(&self.table)?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StoreResult<u64> {
        self.mutate(|table| table.write(key, None, value))
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        value: String,
    ) -> StoreResult<u64> {
        self.mutate(|table| table.write(key, Some(expected), value))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.mutate(|table| {
            table.entries.remove(key);
            Ok(table.clock)
        })
        .map(|_| ())
    }
}

/// Reads and decodes a single JSON value.
pub fn read_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(entry) => serde_json::from_str(&entry.value)
            .map(Some)
            .map_err(|_| StoreError::Corrupt {
                key: key.to_string(),
            }),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn Store,
    key: &str,
    value: &T,
) -> StoreResult<u64> {
    store.set(key, serde_json::to_string(value)?)
}

/// A decoded record list plus the version it was read at.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub version: Option<u64>,
}

/// Raw elements of a JSON array value, plus the version they were read at.
/// An absent key is an empty list; a value that is not an array is `Corrupt`.
fn read_records(store: &dyn Store, key: &str) -> StoreResult<(Vec<Value>, Option<u64>)> {
    let Some(entry) = store.get(key)? else {
        return Ok((Vec::new(), None));
    };

    let corrupt = || StoreError::Corrupt {
        key: key.to_string(),
    };
    match serde_json::from_str::<Value>(&entry.value).map_err(|_| corrupt())? {
        Value::Array(values) => Ok((values, Some(entry.version))),
        _ => Err(corrupt()),
    }
}

/// Reads a JSON array of records.
///
/// An absent key is an empty list. A value that is not an array is
/// `Corrupt`. Elements that fail to decode are skipped with a warning.
pub fn read_list<T: DeserializeOwned>(store: &dyn Store, key: &str) -> StoreResult<Snapshot<T>> {
    let (values, version) = read_records(store, key)?;

    let mut items = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => items.push(item),
            Err(err) => tracing::warn!(key, index, error = %err, "skipping malformed record"),
        }
    }

    Ok(Snapshot { items, version })
}

/// Number of attempts for a read-modify-write cycle before giving up.
pub const MAX_CAS_ATTEMPTS: usize = 3;

/// Read-modify-write over a record list with optimistic concurrency.
///
/// `f` sees the stored records as raw JSON, so every record it leaves alone
/// is written back as it was read, including ones no model type can decode.
/// `f` may run more than once if another writer gets in between. When `f`
/// fails nothing is written.
pub fn update_list<R, E, F>(store: &dyn Store, key: &str, mut f: F) -> Result<R, E>
where
    E: From<StoreError>,
    F: FnMut(&mut Vec<Value>) -> Result<R, E>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let (mut records, version) = read_records(store, key)?;
        let result = f(&mut records)?;
        let encoded = serde_json::to_string(&records).map_err(StoreError::from)?;
        match store.compare_and_set(key, version, encoded) {
            Ok(_) => return Ok(result),
            Err(StoreError::VersionConflict { .. }) if attempt < MAX_CAS_ATTEMPTS => {
                tracing::debug!(key, attempt, "version conflict, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// String field of a raw record, if present.
pub fn record_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}
