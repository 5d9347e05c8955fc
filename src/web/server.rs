//! HTTP/JSON leaderboard server.

use super::http::{percent_decode, read_request, Request, Response};
use crate::build_info;
use crate::error::ScoreError;
use crate::scores::{ScoreService, DEFAULT_TOP_LIMIT, MAX_NAME_LEN, MAX_SCORE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

/// How long a client gets to deliver a complete request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// How long shutdown waits for in-flight connections before dropping them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started.
    pub uptime: f64,
    pub version: String,
}

/// Shared server state: the score service plus start time for `/health`.
///
/// Store calls may touch the disk, so they run on the blocking pool with the
/// service locked for the whole call. An insert and its rank query are
/// therefore atomic with respect to other requests.
pub struct ScoreServer {
    service: Arc<Mutex<ScoreService>>,
    started: Instant,
}

impl ScoreServer {
    pub fn new(service: ScoreService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            started: Instant::now(),
        }
    }

    async fn with_service<T, F>(&self, op: F) -> Result<T, ScoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ScoreService) -> Result<T, ScoreError> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || {
            let mut service = service
                .lock()
                .map_err(|_| ScoreError::Storage("score service lock poisoned".to_string()))?;
            op(&mut service)
        })
        .await
        .map_err(|e| ScoreError::Storage(format!("score task failed: {}", e)))?
    }

    /// Route a parsed request to its handler.
    pub async fn handle(&self, request: &Request) -> Response {
        let segments = request.segments();
        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["health"]) | ("GET", ["api", "health"]) => self.health(),
            ("GET", ["api", "scores"]) => self.top_scores(request).await,
            ("POST", ["api", "scores"]) => self.submit(request).await,
            ("DELETE", ["api", "scores"]) => self.delete_all().await,
            ("GET", ["api", "scores", "player", name]) => {
                self.player_best(percent_decode(name)).await
            }
            _ => Response::error(404, "Route not found"),
        }
    }

    fn health(&self) -> Response {
        Response::json(
            200,
            &HealthReport {
                status: "ok".to_string(),
                timestamp: Utc::now(),
                uptime: self.started.elapsed().as_secs_f64(),
                version: build_info::version_string(),
            },
        )
    }

    async fn top_scores(&self, request: &Request) -> Response {
        let limit = request
            .query_param("limit")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_LIMIT)
            .clamp(1, DEFAULT_TOP_LIMIT);

        match self.with_service(move |s| s.fetch_top_scores(limit)).await {
            Ok(rows) => Response::json(200, &rows),
            Err(e) => error_response(e, "Failed to fetch scores"),
        }
    }

    async fn submit(&self, request: &Request) -> Response {
        let (name, score) = match parse_submission(&request.body) {
            Ok(parsed) => parsed,
            Err(e) => return error_response(e, "Failed to save score"),
        };

        match self.with_service(move |s| s.submit_score(&name, score)).await {
            Ok(receipt) => Response::json(
                201,
                &serde_json::json!({
                    "success": true,
                    "rank": receipt.rank,
                    "score": receipt.stored,
                }),
            ),
            Err(e) => error_response(e, "Failed to save score"),
        }
    }

    async fn delete_all(&self) -> Response {
        match self.with_service(|s| s.delete_all_scores()).await {
            Ok(()) => Response::json(200, &serde_json::json!({ "success": true })),
            Err(e) => error_response(e, "Failed to delete scores"),
        }
    }

    async fn player_best(&self, name: String) -> Response {
        match self.with_service(move |s| s.fetch_player_best(&name)).await {
            Ok(entry) => Response::json(200, &entry),
            Err(e) => error_response(e, "Failed to fetch player score"),
        }
    }
}

/// Client-facing errors keep their message; storage details stay in the log.
fn error_response(err: ScoreError, failure_message: &str) -> Response {
    match &err {
        ScoreError::Validation(msg) | ScoreError::NotFound(msg) => {
            Response::error(err.status_code(), msg)
        }
        _ => {
            log::error!("{}: {}", failure_message, err);
            Response::error(err.status_code(), failure_message)
        }
    }
}

#[derive(Deserialize)]
struct SubmitBody {
    #[serde(alias = "playerName")]
    name: Option<serde_json::Value>,
    score: Option<serde_json::Value>,
}

/// Extract `(name, score)` from a submission body. `playerName` is accepted as
/// an alias for `name`. Scores must be integral JSON numbers.
pub fn parse_submission(body: &[u8]) -> Result<(String, i64), ScoreError> {
    let body: SubmitBody = serde_json::from_slice(body)
        .map_err(|_| ScoreError::Validation("Invalid input".to_string()))?;

    let name = match body.name {
        Some(serde_json::Value::String(name)) => name,
        _ => {
            return Err(ScoreError::Validation(format!(
                "Invalid name: must be 1-{} characters",
                MAX_NAME_LEN
            )))
        }
    };

    let invalid_score =
        || ScoreError::Validation(format!("Invalid score: must be 0-{}", MAX_SCORE));
    let score = match body.score {
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(s) => s,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
                _ => return Err(invalid_score()),
            },
        },
        _ => return Err(invalid_score()),
    };

    Ok((name, score))
}

/// A server bound to a socket but not yet accepting.
pub struct BoundServer {
    listener: TcpListener,
    server: Arc<ScoreServer>,
    read_timeout: Duration,
}

impl BoundServer {
    pub async fn bind(addr: SocketAddr, server: Arc<ScoreServer>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            server,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Override how long a connection may take to send its request.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves, then stop listening and
    /// wait up to [`SHUTDOWN_GRACE`] for open connections to finish.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) -> io::Result<()> {
        log::info!("Music Runner score server listening on http://{}", self.local_addr()?);
        let BoundServer {
            listener,
            server,
            read_timeout,
        } = self;
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    log_task_result(finished);
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let server = Arc::clone(&server);
                        connections.spawn(async move {
                            let result = handle_connection(stream, addr, server, read_timeout).await;
                            if let Err(e) = result {
                                log::warn!("Connection error from {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        log::error!("Accept error: {}", e);
                    }
                }
            }
        }

        drop(listener);
        log::info!("Shutdown requested: draining {} open connection(s)", connections.len());
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(finished) = connections.join_next().await {
                log_task_result(finished);
            }
        })
        .await;
        if drained.is_err() {
            log::warn!(
                "Dropping {} connection(s) still open after {:?}",
                connections.len(),
                SHUTDOWN_GRACE
            );
            connections.shutdown().await;
        }
        log::info!("Score server closed");
        Ok(())
    }
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        log::error!("Connection task failed: {}", e);
    }
}

/// Resolves on ctrl-c, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Bind and serve until the process receives ctrl-c or SIGTERM.
pub async fn start_score_server(addr: SocketAddr, server: Arc<ScoreServer>) -> io::Result<()> {
    let bound = BoundServer::bind(addr, server).await?;
    bound.run_until(shutdown_signal()).await
}

/// Serve a single request on one connection.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    server: Arc<ScoreServer>,
    read_timeout: Duration,
) -> io::Result<()> {
    let read = tokio::time::timeout(read_timeout, read_request(&mut stream)).await;
    let response = match read {
        Err(_) => {
            log::debug!("Request from {} timed out after {:?}", addr, read_timeout);
            Response::error(408, "Request timeout")
        }
        Ok(Ok(Some(request))) => {
            let response = server.handle(&request).await;
            log::debug!(
                "{} {} {} -> {}",
                addr,
                request.method,
                request.path,
                response.status
            );
            response
        }
        Ok(Ok(None)) => return Ok(()),
        Ok(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
            log::debug!("Malformed request from {}: {}", addr, e);
            Response::error(400, "Invalid request")
        }
        Ok(Err(e)) => return Err(e),
    };

    response.write_to(&mut stream).await
}
