//! Score records and validation of client input.

use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ScoreError;
use crate::timestamp::{format_iso8601, parse_iso8601};

/// Number of scores returned when the client does not ask for a limit
pub const DEFAULT_LIMIT: usize = 50;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A stored completion time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    pub name: String,
    /// Elapsed play time in milliseconds
    #[serde(serialize_with = "serialize_time")]
    pub time: f64,
    /// Completion date, ISO 8601 UTC with milliseconds
    pub date: String,
    /// `date` as epoch milliseconds
    pub timestamp: i64,
}

/// Integral times go out as JSON integers so `1234` does not become `1234.0`.
fn serialize_time<S: Serializer>(time: &f64, s: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if time.fract() == 0.0 && time.abs() < MAX_EXACT {
        s.serialize_i64(*time as i64)
    } else {
        s.serialize_f64(*time)
    }
}

/// A validated submission, before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub name: String,
    pub time: f64,
    pub date_ms: i64,
}

impl NewScore {
    /// Validate a `POST /api/scores` body.
    ///
    /// `name` must be a non-empty string, `time` a finite non-negative JSON
    /// number and `date` either an ISO 8601 string or non-zero epoch
    /// milliseconds.
    pub fn from_json(body: &Value) -> Result<Self, ScoreError> {
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(ScoreError::InvalidSubmission)?;

        let time = body
            .get("time")
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or(ScoreError::InvalidSubmission)?;

        let date_ms = match body.get("date") {
            Some(Value::String(s)) if !s.is_empty() => parse_iso8601(s),
            // Zero is the "no date" sentinel.
            Some(Value::Number(n)) => n
                .as_f64()
                .filter(|f| f.is_finite() && *f != 0.0)
                .and_then(|f| n.as_i64().or(Some(f.trunc() as i64))),
            _ => None,
        }
        .ok_or(ScoreError::InvalidSubmission)?;

        Ok(Self {
            name: name.to_string(),
            time,
            date_ms,
        })
    }

    pub fn into_score<R: Rng + ?Sized>(self, now_ms: i64, rng: &mut R) -> Score {
        Score {
            id: generate_id(now_ms, rng),
            name: self.name,
            time: self.time,
            date: format_iso8601(self.date_ms),
            timestamp: self.date_ms,
        }
    }
}

/// `<epoch ms><9 random base-36 chars>`
pub fn generate_id<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> String {
    let mut id = now_ms.to_string();
    id.extend((0..ID_SUFFIX_LEN).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char));
    id
}

/// Leading-integer parse: optional whitespace and sign, then digits. Anything
/// after the digits is ignored, so `"12.5"` is 12.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

pub fn parse_time_param(raw: Option<&str>) -> Result<i64, ScoreError> {
    raw.and_then(parse_int_prefix).ok_or(ScoreError::InvalidTime)
}

/// Page size for `GET /api/scores`; absent, unparsable and non-positive
/// values fall back to [`DEFAULT_LIMIT`].
pub fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(parse_int_prefix)
        .filter(|n| *n > 0)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .unwrap_or(DEFAULT_LIMIT)
}

/// 1 + number of times strictly below `time`
pub fn rank_of(times: impl IntoIterator<Item = f64>, time: f64) -> usize {
    1 + times.into_iter().filter(|t| *t < time).count()
}

/// Stable ascending sort by time
pub fn sort_by_time(scores: &mut [Score]) {
    scores.sort_by(|a, b| a.time.total_cmp(&b.time));
}
