//! Background score submission for the terminal game.
//!
//! The game loop is synchronous, so submissions run on a private tokio
//! runtime and report back over a channel the loop drains every frame.

use std::sync::mpsc;

use anyhow::Result;
use tokio::runtime::Runtime;

use crate::leaderboard::timestamp::{format_iso8601, now_millis};
use crate::leaderboard::{ClientError, LeaderboardClient, SubmitScore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; `rank` is 1-based among all stored times
    Ranked { rank: usize, time_ms: u64 },
    Failed(String),
}

/// Save a completion time and look up its rank.
pub async fn submit_score(
    client: &LeaderboardClient,
    player: &str,
    elapsed_ms: u64,
    date_ms: i64,
) -> Result<SubmitOutcome, ClientError> {
    let saved = client
        .submit(&SubmitScore {
            name: player.to_string(),
            time: elapsed_ms as f64,
            date: format_iso8601(date_ms),
        })
        .await?;
    log::info!("score {} saved for {}", saved.score.id, saved.score.name);
    let rank = client.rank(elapsed_ms as i64).await?;
    Ok(SubmitOutcome::Ranked {
        rank: rank.rank,
        time_ms: elapsed_ms,
    })
}

pub struct ScoreSubmitter {
    runtime: Runtime,
    client: LeaderboardClient,
    player: String,
    tx: mpsc::Sender<SubmitOutcome>,
    rx: mpsc::Receiver<SubmitOutcome>,
}

impl ScoreSubmitter {
    pub fn new(addr: impl Into<String>, player: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            runtime,
            client: LeaderboardClient::new(addr),
            player: player.into(),
            tx,
            rx,
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// Start submitting `elapsed_ms`; the outcome arrives via [`Self::poll`].
    pub fn submit(&self, elapsed_ms: u64) {
        let client = self.client.clone();
        let player = self.player.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = match submit_score(&client, &player, elapsed_ms, now_millis()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("score submission to {} failed: {e}", client.addr());
                    SubmitOutcome::Failed(e.to_string())
                }
            };
            let _ = tx.send(outcome);
        });
    }

    pub fn poll(&self) -> Option<SubmitOutcome> {
        self.rx.try_recv().ok()
    }
}
