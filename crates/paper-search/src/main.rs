//! Paper search - Entry Point
//!
//! Runs a one-shot search from the command line, or serves the engine over
//! MCP (stdio for desktop clients, HTTP otherwise).

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paper_search::{
    config::Config,
    formatters,
    models::{ResponseFormat, SearchFilters, Source},
    search::SearchEngine,
    server::McpServer,
};

#[derive(Parser, Debug)]
#[command(name = "paper-search")]
#[command(about = "Search academic papers across several bibliographic APIs at once")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Semantic Scholar API key (optional, enables higher rate limits)
    #[arg(long, global = true, env = "SEMANTIC_SCHOLAR_API_KEY", hide_env_values = true)]
    semantic_scholar_api_key: Option<String>,

    /// CORE API key (required to search CORE)
    #[arg(long, global = true, env = "CORE_API_KEY", hide_env_values = true)]
    core_api_key: Option<String>,

    /// Contact address sent to Crossref and OpenAlex
    #[arg(long, global = true, env = "PAPER_SEARCH_CONTACT_EMAIL")]
    contact_email: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search and print the ranked results
    Search {
        /// Free-text query
        query: String,

        /// Minimum publication year (inclusive)
        #[arg(long)]
        year_from: Option<i32>,

        /// Maximum publication year (inclusive)
        #[arg(long)]
        year_to: Option<i32>,

        /// Minimum citation count
        #[arg(long)]
        min_citations: Option<u64>,

        /// Topical field to keep (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Source to search (repeatable); defaults to every keyless source
        #[arg(long = "source")]
        sources: Vec<Source>,

        /// Maximum papers to print
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(long, default_value = "markdown")]
        format: OutputFormat,
    },

    /// Serve the engine as an MCP server
    Serve {
        /// Transport mode: stdio or http
        #[arg(long, default_value = "stdio")]
        transport: Transport,

        /// HTTP server port (only used with --transport http)
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output (for desktop MCP clients)
    #[default]
    Stdio,
    /// HTTP JSON-RPC plus a REST search endpoint
    Http,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl From<OutputFormat> for ResponseFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => Self::Markdown,
            OutputFormat::Json => Self::Json,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries MCP frames and search output
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::new(cli.semantic_scholar_api_key, cli.core_api_key);
    if let Some(email) = cli.contact_email {
        config = config.with_contact_email(email);
    }
    let engine = SearchEngine::from_config(&config)?;

    match cli.command {
        Command::Search {
            query,
            year_from,
            year_to,
            min_citations,
            fields,
            sources,
            limit,
            format,
        } => {
            let filters = SearchFilters {
                year_from,
                year_to,
                min_citations,
                fields,
                sources: (!sources.is_empty()).then_some(sources),
            };

            let result = engine.search(&query, &filters).await?.truncated(limit);

            let output = match ResponseFormat::from(format) {
                ResponseFormat::Markdown => formatters::format_search_result(&result),
                ResponseFormat::Json => {
                    serde_json::to_string_pretty(&formatters::compact_search_result(&result))?
                }
            };
            println!("{output}");
        }
        Command::Serve { transport, port } => {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                transport = ?transport,
                "Starting paper search MCP server"
            );

            let server = McpServer::new(engine, config);
            match transport {
                Transport::Stdio => server.run_stdio().await?,
                Transport::Http => server.run_http(port).await?,
            }
        }
    }

    Ok(())
}
