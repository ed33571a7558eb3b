//! HTTP transport: MCP over `POST /mcp` plus a plain REST search endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::rpc::{self, JsonRpcRequest};
use crate::models::{SearchFilters, Source};
use crate::tools::{McpTool, ToolContext};

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub tools: Vec<Box<dyn McpTool>>,
    pub ctx: ToolContext,
}

/// Query parameters for `GET /search`.
///
/// List parameters are comma-separated (`fields=Medicine,Biology`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    year_from: Option<i32>,
    year_to: Option<i32>,
    min_citations: Option<u64>,
    fields: Option<String>,
    sources: Option<String>,
    limit: Option<usize>,
}

impl SearchQuery {
    fn filters(&self) -> Result<SearchFilters, String> {
        let sources = self
            .sources
            .as_deref()
            .map(|raw| split_list(raw).map(str::parse::<Source>).collect::<Result<Vec<_>, _>>())
            .transpose()?;

        Ok(SearchFilters {
            year_from: self.year_from,
            year_to: self.year_to,
            min_citations: self.min_citations,
            fields: self
                .fields
                .as_deref()
                .map(|raw| split_list(raw).map(str::to_string).collect())
                .unwrap_or_default(),
            sources,
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Create the HTTP router.
pub fn create_router(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> Router {
    let state = Arc::new(HttpState { tools, ctx });

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/mcp", post(handle_mcp_post))
        .route("/search", get(handle_search))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "paper-search",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<JsonRpcRequest>,
) -> Response {
    match rpc::handle_request(&req, &state.tools, &state.ctx).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle GET /search: run the pipeline and return the full result as JSON.
async fn handle_search(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let filters = match query.filters() {
        Ok(filters) => filters,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    match state.ctx.engine.search(&query.q, &filters).await {
        Ok(result) => {
            let result = match query.limit {
                Some(limit) => result.truncated(limit),
                None => result,
            };
            Json(result).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Search request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
