use serde::Deserialize;

/// Main configuration structure for Scoped-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub page: PageConfig,
    pub documents: DocumentConfig,
    pub relevance: RelevanceConfig,
    pub output: OutputConfig,
}

/// Crawl traversal limits and pacing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched in one crawl
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// Maximum number of documents scheduled in one crawl
    #[serde(rename = "document-limit")]
    pub document_limit: usize,

    /// Scope substring every crawled path must contain (defaults to the start path)
    #[serde(rename = "path-must-contain")]
    pub path_must_contain: Option<String>,

    /// Fixed pause between page fetches (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Pages whose extracted text is shorter than this are not aggregated
    #[serde(rename = "min-page-text-chars")]
    pub min_page_text_chars: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            page_limit: 20,
            document_limit: 20,
            path_must_contain: None,
            request_delay_ms: 250,
            min_page_text_chars: 20,
        }
    }
}

/// HTTP client behavior shared by page and document requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Browser-like User-Agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "page-timeout-ms")]
    pub page_timeout_ms: u64,

    #[serde(rename = "document-timeout-ms")]
    pub document_timeout_ms: u64,

    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// Redirect hop cap
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Attempts per URL before giving up on it
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Linear backoff unit: attempt `n` waits `n * retry-base-delay-ms`
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            page_timeout_ms: 15_000,
            document_timeout_ms: 15_000,
            connect_timeout_ms: 10_000,
            max_redirects: 5,
            max_attempts: 3,
            retry_base_delay_ms: 300,
        }
    }
}

/// HTML text extraction rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Main-content selectors, tried in order
    #[serde(rename = "content-selectors")]
    pub content_selectors: Vec<String>,

    /// A content selector wins only when its text is longer than this
    #[serde(rename = "min-content-chars")]
    pub min_content_chars: usize,

    /// Element names whose subtrees never contribute text
    #[serde(rename = "noise-tags")]
    pub noise_tags: Vec<String>,

    /// Substrings of class/id attributes marking banners, popups and the like
    #[serde(rename = "noise-markers")]
    pub noise_markers: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            content_selectors: to_strings(&[
                "main",
                "article",
                "[role='main']",
                "#main-content",
                ".main-content",
                "#content",
                ".content",
            ]),
            min_content_chars: 200,
            noise_tags: to_strings(&[
                "script", "style", "noscript", "nav", "header", "footer", "iframe", "svg", "form",
                "template",
            ]),
            noise_markers: to_strings(&["cookie", "popup", "modal", "banner", "overlay"]),
        }
    }
}

/// Document discovery, retrieval and extraction settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// File extensions classified as documents (without the dot)
    pub extensions: Vec<String>,

    /// Path/query substrings classifying a URL as a document
    pub markers: Vec<String>,

    /// Keep the query string of document URLs
    #[serde(rename = "keep-query")]
    pub keep_query: bool,

    /// Apply the crawl's path scope to document links as well
    #[serde(rename = "require-scope")]
    pub require_scope: bool,

    /// Documents downloaded at once
    pub concurrency: usize,

    /// Pause between document batches (milliseconds)
    #[serde(rename = "batch-pause-ms")]
    pub batch_pause_ms: u64,

    /// Pages extracted per document
    #[serde(rename = "page-cap")]
    pub page_cap: usize,

    /// Wall-clock budget for one isolated extraction (milliseconds)
    #[serde(rename = "extraction-timeout-ms")]
    pub extraction_timeout_ms: u64,

    /// Optional repository-style rewrite tried after a 404
    pub repository: Option<RepositoryRewrite>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            extensions: to_strings(&["pdf"]),
            markers: to_strings(&["pdf", "document", "brochure", "policy", "/repositories/"]),
            keep_query: true,
            require_scope: true,
            concurrency: 3,
            batch_pause_ms: 100,
            page_cap: 10,
            extraction_timeout_ms: 30_000,
            repository: None,
        }
    }
}

/// Rewrites a relative document path into a repository URL carrying the path
/// as a query parameter
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRewrite {
    /// Paths starting with this prefix are eligible
    #[serde(rename = "path-prefix")]
    pub path_prefix: String,

    /// Repository endpoint the path is appended to
    #[serde(rename = "repository-url")]
    pub repository_url: String,

    #[serde(rename = "query-param", default = "default_query_param")]
    pub query_param: String,
}

fn default_query_param() -> String {
    "path".to_string()
}

/// Link relevance heuristic terms
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    /// Terms accepted when found in the anchor text or URL
    pub keywords: Vec<String>,

    /// Terms that reject a link outright
    #[serde(rename = "reject-markers")]
    pub reject_markers: Vec<String>,

    /// Generic anchors accepted only together with a qualifying term
    pub compound: Vec<CompoundRule>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            keywords: to_strings(&[
                "know more",
                "terms",
                "conditions",
                "tnc",
                "benefits",
                "features",
                "offers",
                "lounge",
                "rewards",
                "fees",
                "product",
                "privilege",
            ]),
            reject_markers: to_strings(&[
                "javascript:",
                "tel:",
                "mailto:",
                "{{",
                "${",
                "%7b%7b",
                "void(0)",
            ]),
            compound: vec![CompoundRule {
                anchor: "click here".to_string(),
                any_of: to_strings(&["terms", "charges"]),
            }],
        }
    }
}

/// Anchor phrase plus the terms that must accompany it
#[derive(Debug, Clone, Deserialize)]
pub struct CompoundRule {
    pub anchor: String,

    #[serde(rename = "any-of")]
    pub any_of: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving aggregated text and the markdown summary
    #[serde(rename = "output-dir")]
    pub output_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "./data".to_string(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
