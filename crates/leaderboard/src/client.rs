//! Async client for the leaderboard API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::ClientError;
use crate::http::{read_response, ClientResponse};
use crate::protocol::{ErrorBody, Health, RankReply, SavedScore, ScoreList, SubmitScore};

#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    /// `host:port` of the server
    addr: String,
    timeout: Duration,
}

impl LeaderboardClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub async fn submit(&self, score: &SubmitScore) -> Result<SavedScore, ClientError> {
        let body = serde_json::to_vec(score)?;
        let resp = self.request("POST", "/api/scores", Some(&body)).await?;
        decode(resp)
    }

    pub async fn top(&self, limit: Option<usize>) -> Result<ScoreList, ClientError> {
        let target = match limit {
            Some(n) => format!("/api/scores?limit={n}"),
            None => "/api/scores".to_string(),
        };
        decode(self.request("GET", &target, None).await?)
    }

    pub async fn rank(&self, time: i64) -> Result<RankReply, ClientError> {
        let target = format!("/api/scores/rank?time={time}");
        decode(self.request("GET", &target, None).await?)
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        decode(self.request("GET", "/health", None).await?)
    }

    /// Send one request and read the whole response, bounded by the timeout.
    pub async fn request(
        &self,
        method: &str,
        target: &str,
        body: Option<&[u8]>,
    ) -> Result<ClientResponse, ClientError> {
        let exchange = async {
            let stream = TcpStream::connect(&self.addr).await?;
            let (reader, mut writer) = stream.into_split();

            let body = body.unwrap_or_default();
            let mut head = format!(
                "{method} {target} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Length: {}\r\n",
                self.addr,
                body.len()
            );
            if !body.is_empty() {
                head.push_str("Content-Type: application/json\r\n");
            }
            head.push_str("\r\n");
            writer.write_all(head.as_bytes()).await?;
            writer.write_all(body).await?;
            writer.flush().await?;

            let mut reader = BufReader::new(reader);
            Ok::<_, ClientError>(read_response(&mut reader).await?)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout {
                addr: self.addr.clone(),
            })?
    }
}

fn decode<T: DeserializeOwned>(resp: ClientResponse) -> Result<T, ClientError> {
    if (200..300).contains(&resp.status) {
        return Ok(serde_json::from_slice(&resp.body)?);
    }
    let message = serde_json::from_slice::<ErrorBody>(&resp.body)
        .map(|e| e.error)
        .unwrap_or_else(|_| String::from_utf8_lossy(&resp.body).into_owned());
    Err(ClientError::Status {
        status: resp.status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_maps_error_bodies() {
        let resp = ClientResponse {
            status: 400,
            headers: Vec::new(),
            body: br#"{"error":"Invalid time parameter"}"#.to_vec(),
        };
        match decode::<RankReply>(resp) {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid time parameter");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decode_parses_success() {
        let resp = ClientResponse {
            status: 200,
            headers: Vec::new(),
            body: br#"{"rank":2,"time":50}"#.to_vec(),
        };
        assert_eq!(decode::<RankReply>(resp).unwrap(), RankReply { rank: 2, time: 50 });
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = LeaderboardClient::new(addr.to_string()).with_timeout(Duration::from_secs(2));
        assert!(client.health().await.is_err());
    }
}
