//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates input parameters
//! 2. Calls the search engine
//! 3. Formats results as Markdown or JSON

mod search;

pub use search::{ListSourcesTool, SearchPapersTool};

use std::sync::Arc;

use crate::config::Config;
use crate::error::ToolResult;
use crate::search::SearchEngine;

/// Tool execution context.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Shared search engine.
    pub engine: Arc<SearchEngine>,

    /// Configuration the engine was built from.
    pub config: Arc<Config>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub const fn new(engine: Arc<SearchEngine>, config: Arc<Config>) -> Self {
        Self { engine, config }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_papers").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![Box::new(SearchPapersTool), Box::new(ListSourcesTool)]
}
