//! Search tools: search_papers, list_sources.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{ResponseFormat, SearchPapersInput, Source};

/// Largest page a caller may request.
const MAX_LIMIT: usize = 200;

/// Multi-source paper search tool.
pub struct SearchPapersTool;

#[async_trait::async_trait]
impl McpTool for SearchPapersTool {
    fn name(&self) -> &'static str {
        "search_papers"
    }

    fn description(&self) -> &'static str {
        "Search academic papers across Semantic Scholar, arXiv, Crossref, PubMed, OpenAlex \
         and CORE at once. Results are deduplicated by DOI or title, filtered, and ranked \
         by relevance to the query."
    }

    fn input_schema(&self) -> serde_json::Value {
        let sources: Vec<&str> = Source::ALL.iter().map(|s| s.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., 'crispr off-target effects')"
                },
                "yearFrom": {
                    "type": "integer",
                    "description": "Minimum publication year (inclusive)"
                },
                "yearTo": {
                    "type": "integer",
                    "description": "Maximum publication year (inclusive)"
                },
                "minCitations": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Minimum citation count"
                },
                "fields": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Keep papers whose topics contain any of these (e.g., ['Medicine'])"
                },
                "sources": {
                    "type": "array",
                    "items": {"type": "string", "enum": sources},
                    "description": "Sources to search; defaults to every source that needs no API key"
                },
                "limit": {
                    "type": "integer",
                    "default": 20,
                    "minimum": 1,
                    "maximum": MAX_LIMIT,
                    "description": "Maximum papers to return"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchPapersInput = serde_json::from_value(input)?;

        if params.query.trim().is_empty() {
            return Err(ToolError::validation("query", "cannot be empty"));
        }
        if params.limit == 0 || params.limit > MAX_LIMIT {
            return Err(ToolError::validation("limit", format!("must be between 1 and {MAX_LIMIT}")));
        }
        if let (Some(from), Some(to)) = (params.year_from, params.year_to) {
            if from > to {
                return Err(ToolError::validation("yearFrom", "must not be after yearTo"));
            }
        }
        let filters = params.filters().map_err(|message| ToolError::validation("sources", message))?;

        let result = ctx.engine.search(&params.query, &filters).await?.truncated(params.limit);

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_search_result(&result)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_search_result(&result))?)
            }
        }
    }
}

/// Lists the supported sources and whether each is usable.
pub struct ListSourcesTool;

#[async_trait::async_trait]
impl McpTool for ListSourcesTool {
    fn name(&self) -> &'static str {
        "list_sources"
    }

    fn description(&self) -> &'static str {
        "List the bibliographic sources this server can search, which are searched by \
         default, and whether required API keys are configured."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let format: ResponseFormat = match input.get("responseFormat") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => ResponseFormat::default(),
        };

        let sources: Vec<(Source, bool)> = ctx
            .engine
            .sources()
            .into_iter()
            .map(|source| (source, ctx.config.has_credentials(source)))
            .collect();

        if format.is_json() {
            let list: Vec<_> = sources
                .iter()
                .map(|(source, configured)| {
                    json!({
                        "id": source,
                        "name": source.display_name(),
                        "default": !source.requires_credentials(),
                        "requiresCredentials": source.requires_credentials(),
                        "credentialsConfigured": configured,
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&json!({ "sources": list }))?)
        } else {
            Ok(formatters::format_sources_markdown(&sources))
        }
    }
}
