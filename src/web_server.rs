use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{Catalog, RecommendedItem};
use crate::config::PersonaConfig;
use crate::formatter::{format_reply, Block};
use crate::provider::CompletionProvider;
use crate::session::{Message, Sender, Session, SubmitOutcome};

// Shared application state. Session handles are cheap clones over shared
// state, so a snapshot request never waits on an in-flight turn.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    persona: Arc<PersonaConfig>,
    catalog: Arc<Catalog>,
    provider: Arc<dyn CompletionProvider>,
    recommend_cap: usize,
}

impl AppState {
    pub fn new(
        persona: Arc<PersonaConfig>,
        catalog: Arc<Catalog>,
        provider: Arc<dyn CompletionProvider>,
        recommend_cap: usize,
    ) -> Self {
        AppState {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            persona,
            catalog,
            provider,
            recommend_cap,
        }
    }

    fn new_session(&self) -> Session {
        Session::new(
            Arc::clone(&self.persona),
            Arc::clone(&self.catalog),
            Arc::clone(&self.provider),
            self.recommend_cap,
        )
    }

    async fn session(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }
}

#[derive(Deserialize, Default)]
pub struct CreateSessionRequest {
    /// Optional opening message carried over from the onboarding flow.
    pub handoff: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct MessageView {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub recommendations: Vec<RecommendedItem>,
    /// Display blocks, derived from `text` for assistant messages. The raw
    /// text stays canonical; a renderer escapes block text by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

impl MessageView {
    fn from_message(msg: &Message) -> Self {
        let blocks = match msg.sender {
            Sender::Assistant => Some(format_reply(&msg.text)),
            Sender::User => None,
        };
        MessageView {
            id: msg.id,
            sender: msg.sender,
            text: msg.text.clone(),
            timestamp: msg.timestamp,
            recommendations: msg.recommendations.clone(),
            blocks,
        }
    }
}

#[derive(Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub persona: String,
    pub busy: bool,
    pub messages: Vec<MessageView>,
}

impl SessionView {
    fn from_session(id: Uuid, session: &Session) -> Self {
        SessionView {
            id,
            persona: session.persona().name.clone(),
            busy: session.is_busy(),
            messages: session.messages().iter().map(MessageView::from_message).collect(),
        }
    }
}

async fn create_session_handler(
    State(state): State<AppState>,
    payload: Option<Json<CreateSessionRequest>>,
) -> impl IntoResponse {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let id = Uuid::new_v4();
    let session = state.new_session();
    // Register before the handoff turn so snapshots can watch it run.
    state.sessions.write().await.insert(id, session.clone());
    info!(%id, "Created chat session");
    if let Some(handoff) = request.handoff.as_deref() {
        // One awaited turn, same as a regular submit; failures degrade to
        // the apology message inside the session.
        session.bootstrap_from_handoff(handoff).await;
    }
    (StatusCode::CREATED, Json(SessionView::from_session(id, &session)))
}

async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, StatusCode> {
    let session = state.session(id).await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(SessionView::from_session(id, &session)))
}

async fn submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SessionView>, StatusCode> {
    let session = state.session(id).await.ok_or(StatusCode::NOT_FOUND)?;
    match session.submit(&request.text).await {
        SubmitOutcome::Completed => Ok(Json(SessionView::from_session(id, &session))),
        SubmitOutcome::RejectedEmpty => Err(StatusCode::UNPROCESSABLE_ENTITY),
        // The session's busy flag is the single source of truth for the
        // one-in-flight invariant; a concurrent submission lands here.
        SubmitOutcome::RejectedBusy => Err(StatusCode::CONFLICT),
        SubmitOutcome::AlreadyBootstrapped => Err(StatusCode::CONFLICT),
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/:id", get(get_session_handler))
        .route("/api/sessions/:id/messages", post(submit_handler))
        .with_state(state)
        .layer(CorsLayer::permissive()) // the chat widget runs on another origin
        .layer(TraceLayer::new_for_http()) // request logging
}

pub async fn start_web_server(port: u16, state: AppState) -> Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
