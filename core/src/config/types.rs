use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "dossier_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_generation_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Upper bound for one call, retries excluded.
    #[serde(default = "default_generation_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of generation calls per run (0 = unlimited).
    #[serde(default = "default_generation_max_calls")]
    pub max_calls: u32,
}

fn default_generation_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_generation_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_generation_timeout_ms() -> u64 {
    180_000
}

fn default_generation_max_calls() -> u32 {
    32
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            model: default_generation_model(),
            api_key_env: default_generation_api_key_env(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_ms: default_generation_timeout_ms(),
            max_calls: default_generation_max_calls(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryKind {
    None,
    ExponentialBackoff,
    Linear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_strategy")]
    pub strategy: RetryKind,

    /// Total attempts including the first one.
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_retry_strategy() -> RetryKind {
    RetryKind::None
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_retry_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: default_retry_strategy(),
            max_attempts: default_retry_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

/// What a research step does when a search or scrape call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFailureMode {
    Abort,
    Degrade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_search_timeout_ms")]
    pub timeout_ms: u64,

    /// Search plus scrape calls allowed per run (0 = unlimited).
    #[serde(default = "default_search_max_calls")]
    pub max_calls: u32,

    #[serde(default = "default_search_min_interval_ms")]
    pub min_interval_ms: u64,

    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// How many top hits to scrape for agents allowed to scrape.
    #[serde(default = "default_scrape_top")]
    pub scrape_top: usize,

    #[serde(default = "default_scrape_max_chars")]
    pub scrape_max_chars: usize,

    #[serde(default = "default_search_on_failure")]
    pub on_failure: SearchFailureMode,
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_search_api_key_env() -> String {
    "SERPER_API_KEY".to_string()
}

fn default_search_timeout_ms() -> u64 {
    20_000
}

fn default_search_max_calls() -> u32 {
    12
}

fn default_search_min_interval_ms() -> u64 {
    250
}

fn default_results_per_query() -> usize {
    5
}

fn default_scrape_top() -> usize {
    2
}

fn default_scrape_max_chars() -> usize {
    6_000
}

fn default_search_on_failure() -> SearchFailureMode {
    SearchFailureMode::Abort
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key_env: default_search_api_key_env(),
            timeout_ms: default_search_timeout_ms(),
            max_calls: default_search_max_calls(),
            min_interval_ms: default_search_min_interval_ms(),
            results_per_query: default_results_per_query(),
            scrape_top: default_scrape_top(),
            scrape_max_chars: default_scrape_max_chars(),
            on_failure: default_search_on_failure(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Save the final task's raw Markdown next to the document.
    #[serde(default = "default_markdown_mirror")]
    pub markdown_mirror: bool,

    /// Display width of embedded images.
    #[serde(default = "default_image_width_px")]
    pub image_width_px: u32,

    /// Emit horizontal rules instead of discarding them.
    #[serde(default)]
    pub keep_separators: bool,

    /// Where run-scoped chart files are created. Defaults to the OS temp dir.
    #[serde(default)]
    pub artifacts_dir: Option<String>,
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_markdown_mirror() -> bool {
    true
}

fn default_image_width_px() -> u32 {
    384
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            markdown_mirror: default_markdown_mirror(),
            image_width_px: default_image_width_px(),
            keep_separators: false,
            artifacts_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartAxis {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub title: String,

    /// File name stem; the run id is appended.
    pub name: String,

    #[serde(default = "default_chart_max")]
    pub max_value: f64,

    pub axes: Vec<ChartAxis>,
}

fn default_chart_max() -> f64 {
    10.0
}

impl ChartConfig {
    fn new(title: &str, name: &str, axes: &[(&str, f64)]) -> Self {
        Self {
            title: title.to_string(),
            name: name.to_string(),
            max_value: default_chart_max(),
            axes: axes
                .iter()
                .map(|(label, value)| ChartAxis {
                    label: label.to_string(),
                    value: *value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Language every agent writes in.
    #[serde(default = "default_report_language")]
    pub language: String,

    /// Subtitle of the document title block.
    #[serde(default)]
    pub prepared_by: Option<String>,

    #[serde(default = "default_min_pages")]
    pub min_pages: u32,

    #[serde(default = "default_word_count")]
    pub word_count: u32,

    #[serde(default = "default_report_sections")]
    pub sections: Vec<String>,

    #[serde(default = "default_report_charts")]
    pub charts: Vec<ChartConfig>,
}

fn default_report_language() -> String {
    "English".to_string()
}

fn default_min_pages() -> u32 {
    10
}

fn default_word_count() -> u32 {
    10_000
}

fn default_report_sections() -> Vec<String> {
    [
        "Executive summary",
        "Sector overview",
        "Market size and growth",
        "Competitive landscape",
        "Trends and innovation",
        "Regulatory environment",
        "SWOT analysis",
        "Porter's five forces",
        "Risks and opportunities",
        "Recommendations",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_report_charts() -> Vec<ChartConfig> {
    vec![
        ChartConfig::new(
            "SWOT analysis",
            "swot",
            &[
                ("Strengths", 8.0),
                ("Weaknesses", 5.0),
                ("Opportunities", 7.0),
                ("Threats", 6.0),
            ],
        ),
        ChartConfig::new(
            "Porter's five forces",
            "porter",
            &[
                ("Rivalry", 7.0),
                ("New entrants", 5.0),
                ("Substitutes", 6.0),
                ("Buyer power", 8.0),
                ("Supplier power", 4.0),
            ],
        ),
    ]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            language: default_report_language(),
            prepared_by: None,
            min_pages: default_min_pages(),
            word_count: default_word_count(),
            sections: default_report_sections(),
            charts: default_report_charts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_progress_bar")]
    pub progress_bar: bool,

    /// Run event stream: "text", "jsonl" or "none" (tracing only).
    #[serde(default = "default_stream_format")]
    pub stream_format: String,
}

fn default_progress_bar() -> bool {
    true
}

fn default_stream_format() -> String {
    "text".to_string()
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            progress_bar: default_progress_bar(),
            stream_format: default_stream_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.retry.strategy, RetryKind::None);
        assert_eq!(cfg.search.on_failure, SearchFailureMode::Abort);
        assert_eq!(cfg.report.charts.len(), 2);
        assert!(cfg.output.markdown_mirror);
    }

    #[test]
    fn test_partial_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [retry]
            strategy = "exponential-backoff"
            max_attempts = 4

            [search]
            on_failure = "degrade"

            [report]
            language = "Brazilian Portuguese"
            charts = []
            "#,
        )
        .unwrap();
        assert_eq!(cfg.retry.strategy, RetryKind::ExponentialBackoff);
        assert_eq!(cfg.retry.max_attempts, 4);
        assert_eq!(cfg.retry.base_delay_ms, 1_000);
        assert_eq!(cfg.search.on_failure, SearchFailureMode::Degrade);
        assert_eq!(cfg.report.language, "Brazilian Portuguese");
        assert!(cfg.report.charts.is_empty());
        assert_eq!(cfg.report.sections.len(), 10);
    }
}
