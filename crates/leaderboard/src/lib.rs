//! Leaderboard service for Brain Box completion times.
//!
//! Scores are validated, stamped with an id, and kept in a key-value store
//! either as a time-ordered sorted set or as one JSON array. A small
//! HTTP/1.1 server exposes submit, list, rank and health endpoints, and
//! [`LeaderboardClient`] speaks the same protocol.

pub mod client;
pub mod error;
pub mod http;
pub mod protocol;
pub mod repository;
pub mod score;
pub mod server;
pub mod store;
pub mod timestamp;

pub use client::LeaderboardClient;
pub use error::{ClientError, HttpError, ScoreError, StoreError};
pub use protocol::{ErrorBody, Health, RankReply, SavedScore, ScoreList, SubmitScore};
pub use repository::{BlobScores, ScoreRepository, SortedSetScores};
pub use score::{NewScore, Score};
pub use server::{open_repository, run_server, Leaderboard, ServerConfig, StoreBackend};
pub use store::{FileStore, KeyValueStore, MemoryStore};
