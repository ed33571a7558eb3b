//! Configuration for the paper search engine.
//!
//! Everything here is built once at startup and shared read-only (behind an
//! `Arc`) by the HTTP client, the adapters and the ranker.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::Source;

/// HTTP and pipeline constants.
pub mod api {
    use std::time::Duration;

    /// Per-request timeout enforced by the HTTP client.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Upper bound for one adapter call, including two-phase requests and the
    /// single simplified-query retry.
    pub const ADAPTER_TIMEOUT: Duration = Duration::from_secs(20);

    /// Transport-level retries for transient failures (5xx, 429, connect errors).
    pub const MAX_TRANSIENT_RETRIES: u32 = 1;

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Papers requested from each source per query variant.
    pub const PER_SOURCE_LIMIT: u32 = 10;

    /// Maximum number of query variants dispatched per search.
    pub const MAX_VARIANTS: usize = 5;

    /// Contact address announced to Crossref and OpenAlex (polite pool).
    pub const DEFAULT_CONTACT_EMAIL: &str = "research@example.com";
}

/// Public endpoints of the supported bibliographic services.
pub mod endpoints {
    /// Semantic Scholar Graph API.
    pub const SEMANTIC_SCHOLAR: &str = "https://api.semanticscholar.org/graph/v1";

    /// Semantic Scholar paper landing pages.
    pub const SEMANTIC_SCHOLAR_PAPER: &str = "https://www.semanticscholar.org/paper";

    /// arXiv Atom query API.
    pub const ARXIV: &str = "https://export.arxiv.org/api/query";

    /// Crossref works API.
    pub const CROSSREF: &str = "https://api.crossref.org/works";

    /// NCBI E-utilities.
    pub const PUBMED: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// PubMed article landing pages.
    pub const PUBMED_ARTICLE: &str = "https://pubmed.ncbi.nlm.nih.gov";

    /// OpenAlex works API.
    pub const OPENALEX: &str = "https://api.openalex.org/works";

    /// CORE v3 works search.
    pub const CORE: &str = "https://api.core.ac.uk/v3/search/works";
}

/// Static vocabularies used by the query planner and the PubMed adapter.
pub mod vocabulary {
    /// Concept → substitute terms. Keys are matched case-insensitively on word
    /// boundaries.
    pub const SYNONYMS: &[(&str, &[&str])] = &[
        ("machine learning", &["deep learning", "statistical learning"]),
        ("deep learning", &["neural networks"]),
        ("artificial intelligence", &["machine intelligence"]),
        ("natural language processing", &["computational linguistics"]),
        ("computer vision", &["image recognition"]),
        ("reinforcement learning", &["sequential decision making"]),
        ("large language model", &["foundation model"]),
        ("heart disease", &["cardiovascular disease"]),
        ("cancer", &["oncology", "tumor"]),
        ("climate change", &["global warming"]),
        ("gene editing", &["crispr"]),
        ("covid", &["sars-cov-2"]),
    ];

    /// Words that classify a query as medical.
    pub const MEDICAL_KEYWORDS: &[&str] = &[
        "medical", "medicine", "clinical", "patient", "patients", "disease", "diseases",
        "cancer", "tumor", "therapy", "treatment", "drug", "diagnosis", "health", "covid",
        "diabetes", "vaccine", "infection", "alzheimer", "stroke", "obesity", "hypertension",
        "depression", "asthma", "cardiac", "surgery",
    ];

    /// Words that classify a query as technical.
    pub const TECHNICAL_KEYWORDS: &[&str] = &[
        "algorithm", "algorithms", "learning", "neural", "network", "networks", "software",
        "computing", "computer", "data", "model", "models", "optimization", "robotics",
        "transformer", "programming", "database", "distributed", "compiler", "quantum",
        "vision", "language",
    ];

    /// Suffixes appended to medical queries.
    pub const MEDICAL_SUFFIXES: &[&str] = &["clinical", "treatment"];

    /// Suffixes appended to technical queries.
    pub const TECHNICAL_SUFFIXES: &[&str] = &["algorithm", "model"];

    /// MeSH-style expansions OR-ed into PubMed queries.
    pub const MESH_TERMS: &[(&str, &[&str])] = &[
        ("cancer", &["neoplasms", "tumors", "carcinoma"]),
        ("heart disease", &["cardiovascular diseases", "heart failure", "myocardial infarction"]),
        ("diabetes", &["diabetes mellitus", "diabetic", "glucose"]),
        ("depression", &["depressive disorder", "mental health", "mood disorders"]),
        ("covid", &["COVID-19", "SARS-CoV-2", "coronavirus"]),
        ("alzheimer", &["Alzheimer disease", "dementia", "cognitive impairment"]),
        ("hypertension", &["high blood pressure", "blood pressure"]),
        ("obesity", &["overweight", "body mass index", "BMI"]),
        ("stroke", &["cerebrovascular accident", "brain attack"]),
        ("asthma", &["respiratory diseases", "bronchial asthma"]),
    ];
}

/// Base URLs for each source (overridable for mock servers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    /// Semantic Scholar Graph API base.
    pub semantic_scholar: String,
    /// arXiv query endpoint.
    pub arxiv: String,
    /// Crossref works endpoint.
    pub crossref: String,
    /// E-utilities base (esearch/esummary live under it).
    pub pubmed: String,
    /// OpenAlex works endpoint.
    pub openalex: String,
    /// CORE search endpoint.
    pub core: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            semantic_scholar: endpoints::SEMANTIC_SCHOLAR.to_string(),
            arxiv: endpoints::ARXIV.to_string(),
            crossref: endpoints::CROSSREF.to_string(),
            pubmed: endpoints::PUBMED.to_string(),
            openalex: endpoints::OPENALEX.to_string(),
            core: endpoints::CORE.to_string(),
        }
    }
}

/// Coefficients of the composite relevance score.
///
/// These are hand-tuned constants, not a validated ranking model.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingWeights {
    /// Points per query term found in the title.
    pub title_match: f64,
    /// Points per query term found in the abstract.
    pub abstract_match: f64,
    /// Multiplier for `ln(citations + 1)`.
    pub citation: f64,
    /// Bonus for papers published within `recency_window` years.
    pub recency_bonus: f64,
    /// Window (in years before the current year) that earns the recency bonus.
    pub recency_window: i32,
    /// Fixed per-source trust bonus. Unlisted sources get 0.
    pub source_bonus: BTreeMap<Source, f64>,
}

impl RankingWeights {
    /// Trust bonus for a source.
    #[must_use]
    pub fn source_bonus(&self, source: Source) -> f64 {
        self.source_bonus.get(&source).copied().unwrap_or(0.0)
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        let source_bonus = BTreeMap::from([
            (Source::SemanticScholar, 2.0),
            (Source::OpenAlex, 2.0),
            (Source::Crossref, 1.5),
            (Source::Pubmed, 1.5),
            (Source::Arxiv, 1.0),
            (Source::Core, 1.0),
        ]);

        Self {
            title_match: 10.0,
            abstract_match: 5.0,
            citation: 2.0,
            recency_bonus: 3.0,
            recency_window: 5,
            source_bonus,
        }
    }
}

/// Engine configuration.
#[derive(Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional, raises rate limits).
    pub semantic_scholar_api_key: Option<String>,

    /// CORE API key (required for the CORE source).
    pub core_api_key: Option<String>,

    /// Contact address sent in the `User-Agent` of polite-pool APIs.
    pub contact_email: String,

    /// Per-source base URLs.
    pub urls: SourceUrls,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Bound on one whole adapter call.
    pub adapter_timeout: Duration,

    /// Transport-level retries for transient failures.
    pub max_transient_retries: u32,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Papers requested per (source, variant) call.
    pub per_source_limit: u32,

    /// Cap on planned query variants.
    pub max_variants: usize,

    /// Relevance score coefficients.
    pub ranking: RankingWeights,
}

impl Config {
    /// Create a new configuration with optional API keys.
    #[must_use]
    pub fn new(semantic_scholar_api_key: Option<String>, core_api_key: Option<String>) -> Self {
        Self {
            semantic_scholar_api_key: semantic_scholar_api_key.filter(|k| !k.trim().is_empty()),
            core_api_key: core_api_key.filter(|k| !k.trim().is_empty()),
            contact_email: api::DEFAULT_CONTACT_EMAIL.to_string(),
            urls: SourceUrls::default(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            adapter_timeout: api::ADAPTER_TIMEOUT,
            max_transient_retries: api::MAX_TRANSIENT_RETRIES,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            per_source_limit: api::PER_SOURCE_LIMIT,
            max_variants: api::MAX_VARIANTS,
            ranking: RankingWeights::default(),
        }
    }

    /// Create a test configuration routing every source to one mock server.
    ///
    /// Each source lives under its own path prefix, e.g. `{base}/arxiv/api/query`.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            urls: SourceUrls {
                semantic_scholar: format!("{base}/semantic-scholar/graph/v1"),
                arxiv: format!("{base}/arxiv/api/query"),
                crossref: format!("{base}/crossref/works"),
                pubmed: format!("{base}/pubmed/eutils"),
                openalex: format!("{base}/openalex/works"),
                core: format!("{base}/core/v3/search/works"),
            },
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            adapter_timeout: Duration::from_secs(5),
            max_transient_retries: 0, // No retries in tests
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
            ..Self::new(None, None)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `SEMANTIC_SCHOLAR_API_KEY`, `CORE_API_KEY` and
    /// `PAPER_SEARCH_CONTACT_EMAIL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let semantic_scholar_api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok();
        let core_api_key = std::env::var("CORE_API_KEY").ok();
        let mut config = Self::new(semantic_scholar_api_key, core_api_key);

        if let Ok(email) = std::env::var("PAPER_SEARCH_CONTACT_EMAIL") {
            config = config.with_contact_email(email);
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace the polite-pool contact address.
    #[must_use]
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        if !email.trim().is_empty() {
            self.contact_email = email;
        }
        self
    }

    /// Check that every base URL parses and the limits are usable.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, raw) in [
            ("semantic_scholar", &self.urls.semantic_scholar),
            ("arxiv", &self.urls.arxiv),
            ("crossref", &self.urls.crossref),
            ("pubmed", &self.urls.pubmed),
            ("openalex", &self.urls.openalex),
            ("core", &self.urls.core),
        ] {
            url::Url::parse(raw)
                .map_err(|e| anyhow::anyhow!("invalid {name} base URL '{raw}': {e}"))?;
        }

        anyhow::ensure!(self.per_source_limit > 0, "per_source_limit must be positive");
        anyhow::ensure!(self.max_variants > 0, "max_variants must be positive");
        Ok(())
    }

    /// Check if a Semantic Scholar API key is configured.
    #[must_use]
    pub const fn has_semantic_scholar_key(&self) -> bool {
        self.semantic_scholar_api_key.is_some()
    }

    /// Whether the credentials a source needs are present.
    #[must_use]
    pub const fn has_credentials(&self, source: Source) -> bool {
        match source {
            Source::Core => self.core_api_key.is_some(),
            _ => true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_semantic_scholar_key", &self.has_semantic_scholar_key())
            .field("has_core_key", &self.core_api_key.is_some())
            .field("urls", &self.urls)
            .field("adapter_timeout", &self.adapter_timeout)
            .field("per_source_limit", &self.per_source_limit)
            .field("max_variants", &self.max_variants)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.has_semantic_scholar_key());
        assert!(!config.has_credentials(Source::Core));
        assert!(config.has_credentials(Source::Arxiv));
        assert_eq!(config.max_variants, 5);
    }

    #[test]
    fn test_blank_keys_are_ignored() {
        let config = Config::new(Some("  ".to_string()), Some(String::new()));
        assert!(!config.has_semantic_scholar_key());
        assert!(config.core_api_key.is_none());
    }

    #[test]
    fn test_for_testing_routes_sources() {
        let config = Config::for_testing("http://127.0.0.1:9999/");
        assert_eq!(config.urls.arxiv, "http://127.0.0.1:9999/arxiv/api/query");
        assert_eq!(config.max_transient_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.urls.crossref = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = Config::new(Some("s2-secret".to_string()), Some("core-secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("s2-secret"));
        assert!(!debug.contains("core-secret"));
        assert!(debug.contains("has_core_key"));
    }

    #[test]
    fn test_source_bonus_defaults() {
        let weights = RankingWeights::default();
        assert!((weights.source_bonus(Source::SemanticScholar) - 2.0).abs() < f64::EPSILON);
        assert!((weights.source_bonus(Source::Crossref) - 1.5).abs() < f64::EPSILON);

        let mut empty = RankingWeights::default();
        empty.source_bonus.clear();
        assert!(empty.source_bonus(Source::Arxiv).abs() < f64::EPSILON);
    }
}
