use crate::llm::chat::{ reply_for, ChatClient };
use crate::models::chat::{ ChatRequest, ChatResponse, ErrorResponse };
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ Html, IntoResponse },
    http::StatusCode,
};
use log::{ debug, info };
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

const MAX_BODY_SIZE: usize = 1024 * 1024;
const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub chat_client: Arc<dyn ChatClient>,
}

impl AppState {
    pub fn new(chat_client: Arc<dyn ChatClient>) -> Self {
        Self { chat_client }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let prompt = req.prompt.unwrap_or_default();
    debug!("Chat prompt received ({} bytes)", prompt.len());
    let result = state.chat_client.complete(&prompt).await;
    if let Err(e) = &result {
        info!("Ollama request failed: {}", e);
    }
    Json(ChatResponse { reply: reply_for(result) })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
        }),
    )
}
