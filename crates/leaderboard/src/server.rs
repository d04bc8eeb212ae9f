//! HTTP server for the leaderboard.
//!
//! Each connection carries one request. Routing and storage run on the
//! blocking pool since stores may touch the filesystem.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::error::{HttpError, ScoreError, StoreError};
use crate::http::{read_request, write_response, Cors, Request, Response};
use crate::protocol::{
    ErrorBody, Health, RankReply, SavedScore, ScoreList, FAILED_LIST, FAILED_RANK, FAILED_SAVE,
    SAVED_MESSAGE, SERVICE_NAME,
};
use crate::repository::{BlobScores, ScoreRepository, SortedSetScores};
use crate::score::{parse_limit, parse_time_param, NewScore};
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::timestamp::{format_iso8601, now_millis};

/// Bytes discarded after rejecting a request
const DRAIN_LIMIT: u64 = 1024 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// How scores are laid out in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// One sorted-set member per score, keyed by time
    #[default]
    SortedSet,
    /// A single JSON array under one key
    Blob,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted-set" | "sortedset" | "zset" => Ok(Self::SortedSet),
            "blob" | "kv" => Ok(Self::Blob),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    /// JSON snapshot location; scores live in memory only when unset
    pub data_path: Option<PathBuf>,
    pub allowed_origin: String,
    pub max_body: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            backend: StoreBackend::SortedSet,
            data_path: None,
            allowed_origin: "*".to_string(),
            max_body: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create from `BRAINBOX_*` environment variables. `PORT` is honoured
    /// when `BRAINBOX_PORT` is unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let host = non_empty("BRAINBOX_HOST").unwrap_or(defaults.host);
        let port = non_empty("BRAINBOX_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let backend = non_empty("BRAINBOX_STORE")
            .and_then(|s| match s.parse() {
                Ok(b) => Some(b),
                Err(e) => {
                    log::warn!("{e}; using the default backend");
                    None
                }
            })
            .unwrap_or(defaults.backend);
        let data_path = non_empty("BRAINBOX_DATA_PATH").map(PathBuf::from);
        let allowed_origin = non_empty("BRAINBOX_ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin);
        let max_body = non_empty("BRAINBOX_MAX_BODY")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_body);

        Self {
            host,
            port,
            backend,
            data_path,
            allowed_origin,
            max_body,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the configured repository, loading any existing snapshot.
pub fn open_repository(config: &ServerConfig) -> Result<Arc<dyn ScoreRepository>, StoreError> {
    let store: Arc<dyn KeyValueStore> = match &config.data_path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    Ok(match config.backend {
        StoreBackend::SortedSet => Arc::new(SortedSetScores::new(store)),
        StoreBackend::Blob => Arc::new(BlobScores::new(store)),
    })
}

/// Request routing over a score repository
pub struct Leaderboard {
    repo: Arc<dyn ScoreRepository>,
}

impl Leaderboard {
    pub fn new(repo: Arc<dyn ScoreRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn ScoreRepository> {
        &self.repo
    }

    pub fn handle(&self, req: &Request) -> Response {
        if req.method == "OPTIONS" {
            return Response::empty(200);
        }

        let path = match req.path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match (req.method.as_str(), path) {
            (_, "/health") => Response::json(
                200,
                &Health {
                    status: "ok".to_string(),
                    timestamp: format_iso8601(now_millis()),
                    service: SERVICE_NAME.to_string(),
                },
            ),
            ("POST", "/api/scores") => self.save(&req.body),
            ("GET", "/api/scores") => self.list(req.query_param("limit")),
            ("GET", "/api/scores/rank") => self.rank(req.query_param("time")),
            ("GET", p) if p.starts_with("/api/scores/rank/") => {
                self.rank(p.strip_prefix("/api/scores/rank/"))
            }
            _ => Response::json(404, &ErrorBody::not_found(&req.path)),
        }
    }

    fn save(&self, body: &[u8]) -> Response {
        let parsed = serde_json::from_slice::<serde_json::Value>(body)
            .map_err(|_| ScoreError::InvalidSubmission)
            .and_then(|v| NewScore::from_json(&v));
        let new = match parsed {
            Ok(new) => new,
            Err(e) => return Response::json(400, &ErrorBody::new(e.to_string())),
        };

        let score = new.into_score(now_millis(), &mut rand::thread_rng());
        match self.repo.save(&score) {
            Ok(()) => {
                log::info!("saved score {} for {} ({} ms)", score.id, score.name, score.time);
                Response::json(
                    201,
                    &SavedScore {
                        message: SAVED_MESSAGE.to_string(),
                        score,
                    },
                )
            }
            Err(e) => {
                log::error!("saving score failed: {e}");
                Response::json(500, &ErrorBody::new(FAILED_SAVE))
            }
        }
    }

    fn list(&self, limit: Option<&str>) -> Response {
        match self.repo.top(parse_limit(limit)) {
            Ok(scores) => Response::json(
                200,
                &ScoreList {
                    total: scores.len(),
                    scores,
                },
            ),
            Err(e) => {
                log::error!("listing scores failed: {e}");
                Response::json(500, &ErrorBody::new(FAILED_LIST))
            }
        }
    }

    fn rank(&self, time: Option<&str>) -> Response {
        let time = match parse_time_param(time) {
            Ok(t) => t,
            Err(e) => return Response::json(400, &ErrorBody::new(e.to_string())),
        };
        match self.repo.rank(time as f64) {
            Ok(rank) => Response::json(200, &RankReply { rank, time }),
            Err(e) => {
                log::error!("ranking failed: {e}");
                Response::json(500, &ErrorBody::new(FAILED_RANK))
            }
        }
    }
}

/// Accept connections until `shutdown` resolves, then flush the store.
///
/// `ready_tx` receives the bound address once the listener is up, which
/// lets callers bind port 0.
pub async fn run_server<F>(
    config: ServerConfig,
    repo: Arc<dyn ScoreRepository>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(config.bind_addr()).await?;
    let bound = listener.local_addr()?;
    log::info!("leaderboard listening on http://{bound}");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let app = Arc::new(Leaderboard::new(repo));
    let cors = Arc::new(Cors {
        allow_origin: config.allowed_origin.clone(),
    });

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("shutdown requested");
                break;
            }
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        log::warn!("accept failed: {e}");
                        continue;
                    }
                };
                let app = Arc::clone(&app);
                let cors = Arc::clone(&cors);
                let max_body = config.max_body;
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, app, &cors, max_body).await {
                        log::warn!("connection from {peer} failed: {e}");
                    }
                });
            }
        }
    }

    let repo = Arc::clone(app.repository());
    tokio::task::spawn_blocking(move || repo.flush()).await??;
    Ok(())
}

async fn handle_connection(
    socket: TcpStream,
    app: Arc<Leaderboard>,
    cors: &Cors,
    max_body: usize,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (response, rejected) = match read_request(&mut reader, max_body).await {
        Ok(req) => {
            let (method, path) = (req.method.clone(), req.path.clone());
            let response = tokio::task::spawn_blocking(move || app.handle(&req)).await?;
            log::debug!("{method} {path} -> {}", response.status);
            (response, false)
        }
        // Peer went away before sending a full request
        Err(HttpError::Incomplete) => return Ok(()),
        Err(HttpError::Io(e)) => return Err(e.into()),
        Err(e) => {
            log::debug!("rejecting request: {e}");
            (Response::json(e.status(), &ErrorBody::new(e.to_string())), true)
        }
    };

    write_response(&mut writer, &response, cors).await?;
    writer.shutdown().await?;

    if rejected {
        // Unread input at close makes the kernel reset the connection, which
        // can discard the response before the peer reads it.
        let mut rest = (&mut reader).take(DRAIN_LIMIT);
        let _ = tokio::time::timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut rest, &mut tokio::io::sink()))
            .await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn request(method: &str, path: &str, query: &[(&str, &str)], body: &str) -> Request {
        Request {
            method: method.to_string(),
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn body(resp: &Response) -> Value {
        serde_json::from_slice(&resp.body).unwrap()
    }

    fn app(backend: StoreBackend) -> Leaderboard {
        let config = ServerConfig {
            backend,
            ..ServerConfig::default()
        };
        Leaderboard::new(open_repository(&config).unwrap())
    }

    fn submit(app: &Leaderboard, name: &str, time: u64) -> Response {
        let payload = json!({"name": name, "time": time, "date": "2024-03-01T09:30:00.000Z"});
        app.handle(&request("POST", "/api/scores", &[], &payload.to_string()))
    }

    #[test]
    fn config_from_lookup_reads_overrides_and_port_fallback() {
        let vars: HashMap<&str, &str> = [
            ("BRAINBOX_HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("BRAINBOX_STORE", "blob"),
            ("BRAINBOX_DATA_PATH", "/tmp/scores.json"),
            ("BRAINBOX_MAX_BODY", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, StoreBackend::Blob);
        assert_eq!(config.data_path, Some(PathBuf::from("/tmp/scores.json")));
        assert_eq!(config.allowed_origin, "*");
        assert_eq!(config.max_body, ServerConfig::default().max_body);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn brainbox_port_wins_over_port() {
        let config = ServerConfig::from_lookup(|k| match k {
            "BRAINBOX_PORT" => Some("4000".into()),
            "PORT" => Some("5000".into()),
            _ => None,
        });
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("sorted-set".parse(), Ok(StoreBackend::SortedSet));
        assert_eq!(" Blob ".parse(), Ok(StoreBackend::Blob));
        assert!("redis-cluster".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn submit_then_list_and_rank() {
        for backend in [StoreBackend::SortedSet, StoreBackend::Blob] {
            let app = app(backend);
            let created = submit(&app, "carol", 9000);
            assert_eq!(created.status, 201);
            let created = body(&created);
            assert_eq!(created["message"], "Score saved successfully");
            assert_eq!(created["score"]["name"], "carol");
            assert_eq!(created["score"]["time"], 9000);
            assert_eq!(created["score"]["date"], "2024-03-01T09:30:00.000Z");
            assert_eq!(created["score"]["timestamp"], 1_709_285_400_000i64);

            submit(&app, "dave", 4000);
            submit(&app, "erin", 12000);

            let list = app.handle(&request("GET", "/api/scores", &[("limit", "2")], ""));
            assert_eq!(list.status, 200);
            let list = body(&list);
            assert_eq!(list["total"], 2);
            let names: Vec<&str> = list["scores"]
                .as_array()
                .unwrap()
                .iter()
                .map(|s| s["name"].as_str().unwrap())
                .collect();
            assert_eq!(names, ["dave", "carol"], "{backend:?}");

            let rank = app.handle(&request("GET", "/api/scores/rank", &[("time", "10000")], ""));
            assert_eq!(body(&rank), json!({"rank": 3, "time": 10000}));

            let rank = app.handle(&request("GET", "/api/scores/rank/4000", &[], ""));
            assert_eq!(body(&rank), json!({"rank": 1, "time": 4000}));
        }
    }

    #[test]
    fn invalid_submissions_are_400() {
        let app = app(StoreBackend::SortedSet);
        for payload in [
            "not json",
            r#"{"name":"x","time":"12","date":"2024-01-01"}"#,
            r#"{"time":12,"date":"2024-01-01"}"#,
        ] {
            let resp = app.handle(&request("POST", "/api/scores", &[], payload));
            assert_eq!(resp.status, 400, "{payload}");
            assert_eq!(
                body(&resp)["error"],
                "Invalid data. Name, time (number), and date are required."
            );
        }
    }

    #[test]
    fn invalid_rank_time_is_400() {
        let app = app(StoreBackend::Blob);
        let resp = app.handle(&request("GET", "/api/scores/rank", &[("time", "soon")], ""));
        assert_eq!(resp.status, 400);
        assert_eq!(body(&resp), json!({"error": "Invalid time parameter"}));
        let resp = app.handle(&request("GET", "/api/scores/rank", &[], ""));
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn options_health_and_not_found() {
        let app = app(StoreBackend::SortedSet);
        let resp = app.handle(&request("OPTIONS", "/api/scores", &[], ""));
        assert_eq!(resp, Response::empty(200));

        let health = body(&app.handle(&request("GET", "/health", &[], "")));
        assert_eq!(health["status"], "ok");
        assert_eq!(health["service"], "brain-box-password-api");
        assert!(health["timestamp"].as_str().unwrap().ends_with('Z'));

        let resp = app.handle(&request("DELETE", "/api/scores", &[], ""));
        assert_eq!(resp.status, 404);
        assert_eq!(
            body(&resp)["message"],
            "The requested path /api/scores was not found on this server"
        );
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let app = app(StoreBackend::SortedSet);
        let resp = app.handle(&request("GET", "/api/scores/", &[], ""));
        assert_eq!(resp.status, 200);
        assert_eq!(body(&resp), json!({"scores": [], "total": 0}));
    }

    struct FailingRepo;

    impl ScoreRepository for FailingRepo {
        fn save(&self, _: &crate::score::Score) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
        fn top(&self, _: usize) -> Result<Vec<crate::score::Score>, StoreError> {
            Err(StoreError::Poisoned)
        }
        fn rank(&self, _: f64) -> Result<usize, StoreError> {
            Err(StoreError::Poisoned)
        }
        fn flush(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn store_failures_are_500_with_fixed_messages() {
        let app = Leaderboard::new(Arc::new(FailingRepo));
        let resp = submit(&app, "x", 1);
        assert_eq!((resp.status, body(&resp)), (500, json!({"error": "Failed to save score"})));
        let resp = app.handle(&request("GET", "/api/scores", &[], ""));
        assert_eq!((resp.status, body(&resp)), (500, json!({"error": "Failed to get scores"})));
        let resp = app.handle(&request("GET", "/api/scores/rank", &[("time", "1")], ""));
        assert_eq!((resp.status, body(&resp)), (500, json!({"error": "Failed to get rank"})));
    }
}
