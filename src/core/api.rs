//! HTTP + WebSocket API for Vaultgate
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session snapshot
//! - POST /session/{id}/transition - Begin ELEVATED transition
//! - POST /session/{id}/unlock - Terminal unlock notification
//! - POST /session/{id}/gate/click - Click the vault element
//! - POST /session/{id}/verify - Start the security check
//! - POST /session/{id}/advance - Step virtual time
//! - WS /ws/{id} - Live snapshots
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::config::Timings;
use crate::core::{Host, Pacer};
use crate::error::VaultError;
use crate::types::{GateOutcome, Notice, SessionSnapshot};

/// Session entry
#[derive(Debug)]
pub struct SessionEntry {
    pub host: Host,
    pub update_tx: broadcast::Sender<SessionSnapshot>,
}

impl SessionEntry {
    fn publish(&self) {
        let _ = self.update_tx.send(self.host.session().snapshot());
    }
}

/// App state
#[derive(Debug)]
pub struct AppState {
    pub sessions: RwLock<HashMap<String, SessionEntry>>,
    pub timings: Timings,
}

impl AppState {
    pub fn new(timings: Timings) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            timings,
        })
    }
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub restarts: u64,
    pub snapshot: SessionSnapshot,
}

/// Click response
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub outcome: GateOutcome,
    pub snapshot: SessionSnapshot,
}

/// Advance request
#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub ms: u64,
}

/// Response for any operation that may fire timers
#[derive(Debug, Serialize)]
pub struct NoticesResponse {
    pub notices: Vec<Notice>,
    pub restarted: bool,
    pub snapshot: SessionSnapshot,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(timings: Timings) -> Router {
    router_with_state(AppState::new(timings))
}

/// Create the API router over existing state (shared with the ticker)
pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/transition", post(begin_transition))
        .route("/session/:id/unlock", post(unlock))
        .route("/session/:id/gate/click", post(click_gate))
        .route("/session/:id/verify", post(start_verification))
        .route("/session/:id/advance", post(advance))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(State(state): State<Arc<AppState>>) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let entry = SessionEntry {
        host: Host::new(state.timings),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), entry);
    info!(session_id = %session_id, "session created");

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get session snapshot
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let entry = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(SessionStatusResponse {
        session_id: id,
        restarts: entry.host.restarts(),
        snapshot: entry.host.session().snapshot(),
    }))
}

/// Begin the ELEVATED transition
async fn begin_transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NoticesResponse>, StatusCode> {
    with_entry(&state, &id, |entry| {
        let notices = entry.host.session_mut().begin_transition();
        notices_response(entry, notices)
    })
    .await
}

/// Terminal unlock notification
async fn unlock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NoticesResponse>, StatusCode> {
    with_entry(&state, &id, |entry| {
        entry.host.session_mut().unlock();
        notices_response(entry, Vec::new())
    })
    .await
}

/// Click the vault element
async fn click_gate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClickResponse>, StatusCode> {
    with_entry(&state, &id, |entry| {
        let outcome = entry.host.session_mut().click_gate();
        entry.publish();
        ClickResponse {
            outcome,
            snapshot: entry.host.session().snapshot(),
        }
    })
    .await
}

/// Start the security check
async fn start_verification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NoticesResponse>, StatusCode> {
    with_entry(&state, &id, |entry| {
        let notices = entry.host.session_mut().start_verification();
        notices_response(entry, notices)
    })
    .await
}

/// Step virtual time
async fn advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<NoticesResponse>, StatusCode> {
    with_entry(&state, &id, |entry| {
        let notices = entry.host.advance(req.ms);
        notices_response(entry, notices)
    })
    .await
}

/// Run `f` against one session under the write lock
async fn with_entry<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut SessionEntry) -> T,
) -> Result<Json<T>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(f(entry)))
}

fn notices_response(entry: &SessionEntry, notices: Vec<Notice>) -> NoticesResponse {
    entry.publish();
    NoticesResponse {
        restarted: notices.contains(&Notice::RestartRequested),
        notices,
        snapshot: entry.host.session().snapshot(),
    }
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let entry = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = entry.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<SessionSnapshot>) {
    while let Ok(update) = rx.recv().await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Advance every session on real time
pub async fn drive_sessions(state: Arc<AppState>, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    let mut pacer = Pacer::new();
    loop {
        interval.tick().await;
        let elapsed = pacer.elapsed_ms();
        if elapsed == 0 {
            continue;
        }
        let mut sessions = state.sessions.write().await;
        for (id, entry) in sessions.iter_mut() {
            let notices = entry.host.advance(elapsed);
            if !notices.is_empty() {
                debug!(session_id = %id, count = notices.len(), "timers fired");
                entry.publish();
            }
        }
    }
}

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let n = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos, n)
}

/// Run the API server
pub async fn run_server(addr: &str, timings: Timings, tick: Duration) -> Result<(), VaultError> {
    let state = AppState::new(timings);
    tokio::spawn(drive_sessions(state.clone(), tick));

    let router = router_with_state(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "api listening");
    println!("Vaultgate API running on {}", addr);
    println!("  POST /session/new             - Create session");
    println!("  GET  /session/:id             - Get snapshot");
    println!("  POST /session/:id/transition  - Begin ELEVATED transition");
    println!("  POST /session/:id/unlock      - Terminal unlock");
    println!("  POST /session/:id/gate/click  - Click vault element");
    println!("  POST /session/:id/verify      - Start security check");
    println!("  POST /session/:id/advance     - Step virtual time");
    println!("  WS   /ws/:id                  - Live updates");
    println!("  GET  /health                  - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
