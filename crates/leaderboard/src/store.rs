//! Key-value storage with string values and sorted sets.
//!
//! `MemoryStore` keeps everything in process. `FileStore` keeps the same
//! data and writes a JSON snapshot to disk after every mutation.

use std::collections::HashMap;
use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Add `member` to the sorted set at `key`, or move it to `score` if it
    /// is already present. Returns true when the member is new.
    fn zadd(&self, key: &str, score: f64, member: String) -> Result<bool, StoreError>;

    /// Members ordered by ascending score, `start..stop` by rank.
    fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<(String, f64)>, StoreError>;

    /// Number of members whose score lies within `(min, max)` bounds.
    fn zcount(&self, key: &str, min: Bound<f64>, max: Bound<f64>) -> Result<usize, StoreError>;

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    strings: HashMap<String, String>,
    /// Kept ordered by (score, member)
    #[serde(default)]
    sorted_sets: HashMap<String, Vec<SetEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SetEntry {
    member: String,
    score: f64,
}

fn in_bounds(score: f64, min: Bound<f64>, max: Bound<f64>) -> bool {
    let above = match min {
        Bound::Included(m) => score >= m,
        Bound::Excluded(m) => score > m,
        Bound::Unbounded => true,
    };
    let below = match max {
        Bound::Included(m) => score <= m,
        Bound::Excluded(m) => score < m,
        Bound::Unbounded => true,
    };
    above && below
}

impl StoreData {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.sorted_sets.contains_key(key) {
            return Err(wrong_type(key));
        }
        Ok(self.strings.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) {
        self.sorted_sets.remove(key);
        self.strings.insert(key.to_string(), value);
    }

    fn zadd(&mut self, key: &str, score: f64, member: String) -> Result<bool, StoreError> {
        if self.strings.contains_key(key) {
            return Err(wrong_type(key));
        }
        let set = self.sorted_sets.entry(key.to_string()).or_default();
        let existing = set.iter().position(|e| e.member == member);
        if let Some(i) = existing {
            set.remove(i);
        }
        let at = set.partition_point(|e| {
            e.score
                .total_cmp(&score)
                .then_with(|| e.member.as_str().cmp(member.as_str()))
                .is_lt()
        });
        set.insert(at, SetEntry { member, score });
        Ok(existing.is_none())
    }

    fn sorted(&self, key: &str) -> Result<&[SetEntry], StoreError> {
        if self.strings.contains_key(key) {
            return Err(wrong_type(key));
        }
        Ok(self.sorted_sets.get(key).map(Vec::as_slice).unwrap_or(&[]))
    }

    fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        let set = self.sorted(key)?;
        let stop = stop.unwrap_or(set.len()).min(set.len());
        Ok(set
            .get(start.min(stop)..stop)
            .unwrap_or(&[])
            .iter()
            .map(|e| (e.member.clone(), e.score))
            .collect())
    }

    fn zcount(&self, key: &str, min: Bound<f64>, max: Bound<f64>) -> Result<usize, StoreError> {
        Ok(self
            .sorted(key)?
            .iter()
            .filter(|e| in_bounds(e.score, min, max))
            .count())
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
    }
}

fn lock(data: &Mutex<StoreData>) -> Result<MutexGuard<'_, StoreData>, StoreError> {
    data.lock().map_err(|_| StoreError::Poisoned)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        lock(&self.data)?.get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        lock(&self.data)?.set(key, value);
        Ok(())
    }

    fn zadd(&self, key: &str, score: f64, member: String) -> Result<bool, StoreError> {
        lock(&self.data)?.zadd(key, score, member)
    }

    fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        lock(&self.data)?.zrange(key, start, stop)
    }

    fn zcount(&self, key: &str, min: Bound<f64>, max: Bound<f64>) -> Result<usize, StoreError> {
        lock(&self.data)?.zcount(key, min, max)
    }
}

/// Store persisted as one JSON document at `path`
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => StoreData::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => return Err(e.into()),
        };
        log::debug!("opened file store at {}", path.display());
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write via a sibling temp file so a crash never leaves half a snapshot.
    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, serde_json::to_vec(data)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        lock(&self.data)?.get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut data = lock(&self.data)?;
        data.set(key, value);
        self.persist(&data)
    }

    fn zadd(&self, key: &str, score: f64, member: String) -> Result<bool, StoreError> {
        let mut data = lock(&self.data)?;
        let added = data.zadd(key, score, member)?;
        self.persist(&data)?;
        Ok(added)
    }

    fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        lock(&self.data)?.zrange(key, start, stop)
    }

    fn zcount(&self, key: &str, min: Bound<f64>, max: Bound<f64>) -> Result<usize, StoreError> {
        lock(&self.data)?.zcount(key, min, max)
    }

    fn flush(&self) -> Result<(), StoreError> {
        let data = lock(&self.data)?;
        self.persist(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_round_trip_and_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "a".into()).unwrap();
        store.set("k", "b".into()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn sorted_set_orders_by_score_then_member() {
        let store = MemoryStore::new();
        assert!(store.zadd("z", 3.0, "c".into()).unwrap());
        assert!(store.zadd("z", 1.0, "b".into()).unwrap());
        assert!(store.zadd("z", 1.0, "a".into()).unwrap());
        let all = store.zrange("z", 0, None).unwrap();
        let members: Vec<&str> = all.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(members, ["a", "b", "c"]);

        assert_eq!(store.zrange("z", 1, Some(2)).unwrap(), vec![("b".to_string(), 1.0)]);
        assert!(store.zrange("z", 5, Some(9)).unwrap().is_empty());
        assert!(store.zrange("missing", 0, None).unwrap().is_empty());
    }

    #[test]
    fn zadd_existing_member_moves_it() {
        let store = MemoryStore::new();
        store.zadd("z", 1.0, "a".into()).unwrap();
        store.zadd("z", 2.0, "b".into()).unwrap();
        assert!(!store.zadd("z", 5.0, "a".into()).unwrap());
        let all = store.zrange("z", 0, None).unwrap();
        assert_eq!(all, vec![("b".to_string(), 2.0), ("a".to_string(), 5.0)]);
    }

    #[test]
    fn zcount_honours_bounds() {
        let store = MemoryStore::new();
        for (i, s) in [10.0, 20.0, 20.0, 30.0].into_iter().enumerate() {
            store.zadd("z", s, i.to_string()).unwrap();
        }
        let count = |min, max| store.zcount("z", min, max).unwrap();
        assert_eq!(count(Bound::Unbounded, Bound::Excluded(20.0)), 1);
        assert_eq!(count(Bound::Unbounded, Bound::Included(20.0)), 3);
        assert_eq!(count(Bound::Excluded(10.0), Bound::Unbounded), 3);
        assert_eq!(count(Bound::Included(0.0), Bound::Unbounded), 4);
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let store = MemoryStore::new();
        store.set("k", "v".into()).unwrap();
        assert!(matches!(
            store.zadd("k", 1.0, "m".into()),
            Err(StoreError::WrongType { .. })
        ));
        store.zadd("z", 1.0, "m".into()).unwrap();
        assert!(matches!(store.get("z"), Err(StoreError::WrongType { .. })));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("k", "v".into()).unwrap();
            store.zadd("z", 2.0, "two".into()).unwrap();
            store.zadd("z", 1.0, "one".into()).unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        let members: Vec<String> = store
            .zrange("z", 0, None)
            .unwrap()
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        assert_eq!(members, ["one", "two"]);
    }

    #[test]
    fn file_store_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn empty_file_opens_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = FileStore::open(file.path()).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        store.flush().unwrap();
    }
}
