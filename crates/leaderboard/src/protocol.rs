//! JSON bodies exchanged with the leaderboard API.

use serde::{Deserialize, Serialize};

use crate::score::Score;

pub const SERVICE_NAME: &str = "brain-box-password-api";
pub const SAVED_MESSAGE: &str = "Score saved successfully";
pub const NOT_FOUND: &str = "Not found";
pub const FAILED_SAVE: &str = "Failed to save score";
pub const FAILED_LIST: &str = "Failed to get scores";
pub const FAILED_RANK: &str = "Failed to get rank";

/// Body of `POST /api/scores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitScore {
    pub name: String,
    /// Elapsed milliseconds
    pub time: f64,
    /// ISO 8601 completion date
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScore {
    pub message: String,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreList {
    pub scores: Vec<Score>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankReply {
    pub rank: usize,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self {
            error: NOT_FOUND.to_string(),
            message: Some(format!(
                "The requested path {path} was not found on this server"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_body_omits_absent_message() {
        let v = serde_json::to_value(ErrorBody::new("Invalid time parameter")).unwrap();
        assert_eq!(v, json!({"error": "Invalid time parameter"}));
    }

    #[test]
    fn not_found_names_the_path() {
        let v = serde_json::to_value(ErrorBody::not_found("/nope")).unwrap();
        assert_eq!(
            v,
            json!({
                "error": "Not found",
                "message": "The requested path /nope was not found on this server"
            })
        );
    }
}
