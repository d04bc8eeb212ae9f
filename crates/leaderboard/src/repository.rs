//! Score persistence on top of a [`KeyValueStore`].
//!
//! Two layouts are supported. `SortedSetScores` keeps one sorted-set member
//! per score, ranked by time, so listing and ranking are range queries.
//! `BlobScores` keeps every score in one JSON array under a single key and
//! sorts or counts in process.

use std::ops::Bound;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::score::{rank_of, sort_by_time, Score};
use crate::store::KeyValueStore;

pub const SORTED_SET_KEY: &str = "game:scores";
pub const BLOB_KEY: &str = "scores";

pub trait ScoreRepository: Send + Sync {
    fn save(&self, score: &Score) -> Result<(), StoreError>;

    /// Up to `limit` scores, fastest first
    fn top(&self, limit: usize) -> Result<Vec<Score>, StoreError>;

    /// 1 + number of stored scores strictly faster than `time`
    fn rank(&self, time: f64) -> Result<usize, StoreError>;

    fn flush(&self) -> Result<(), StoreError>;
}

pub struct SortedSetScores {
    store: Arc<dyn KeyValueStore>,
}

impl SortedSetScores {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl ScoreRepository for SortedSetScores {
    fn save(&self, score: &Score) -> Result<(), StoreError> {
        let member = serde_json::to_string(score)?;
        self.store.zadd(SORTED_SET_KEY, score.time, member)?;
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<Score>, StoreError> {
        let members = self.store.zrange(SORTED_SET_KEY, 0, Some(limit))?;
        Ok(members
            .into_iter()
            .filter_map(|(member, _)| match serde_json::from_str(&member) {
                Ok(score) => Some(score),
                Err(e) => {
                    log::warn!("skipping unreadable score entry: {e}");
                    None
                }
            })
            .collect())
    }

    fn rank(&self, time: f64) -> Result<usize, StoreError> {
        let faster = self
            .store
            .zcount(SORTED_SET_KEY, Bound::Unbounded, Bound::Excluded(time))?;
        Ok(faster + 1)
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.store.flush()
    }
}

pub struct BlobScores {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write of the blob
    write_lock: Mutex<()>,
}

impl BlobScores {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<Score>, StoreError> {
        match self.store.get(BLOB_KEY)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }
}

impl ScoreRepository for BlobScores {
    fn save(&self, score: &Score) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut scores = self.load()?;
        scores.push(score.clone());
        self.store.set(BLOB_KEY, serde_json::to_string(&scores)?)
    }

    fn top(&self, limit: usize) -> Result<Vec<Score>, StoreError> {
        let mut scores = self.load()?;
        sort_by_time(&mut scores);
        scores.truncate(limit);
        Ok(scores)
    }

    fn rank(&self, time: f64) -> Result<usize, StoreError> {
        Ok(rank_of(self.load()?.iter().map(|s| s.time), time))
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.store.flush()
    }
}
