use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::api::RetryPolicy;
use crate::error::ConfigError;

pub const DEFAULT_SPONSOR_API: &str = "https://afdian.com/api/open/query-sponsor";
pub const DEFAULT_ORDER_API: &str = "https://afdian.com/api/open/query-order";
pub const DEFAULT_MARKER_START: &str = "<!-- AFDIAN_SPONSORS_START -->";
pub const DEFAULT_MARKER_END: &str = "<!-- AFDIAN_SPONSORS_END -->";

/// Account id and shared secret for request signing.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub user_id: String,
    pub token: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

// Keep the secret out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Remote API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub sponsor_endpoint: Url,
    pub order_endpoint: Url,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub max_pages: u32,
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            // Both are compile-time constants; parsing cannot fail
            sponsor_endpoint: Url::parse(DEFAULT_SPONSOR_API).expect("default sponsor endpoint is a valid URL"),
            order_endpoint: Url::parse(DEFAULT_ORDER_API).expect("default order endpoint is a valid URL"),
            request_timeout: Duration::from_secs(15),
            page_size: 50,
            max_pages: 2000,
            retry: RetryPolicy::default(),
        }
    }
}

/// The pair of literal lines delimiting the managed region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMarkers {
    pub start: String,
    pub end: String,
}

impl Default for RegionMarkers {
    fn default() -> Self {
        Self {
            start: DEFAULT_MARKER_START.to_string(),
            end: DEFAULT_MARKER_END.to_string(),
        }
    }
}

/// Presentation of the Markdown table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub title: String,
    pub updated_label: String,
    pub update_note: String,
    pub avatar_header: String,
    pub name_header: String,
    pub avatar_size: u32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            title: "## ❤️ 赞助者列表".to_string(),
            updated_label: "更新时间".to_string(),
            update_note: "每4小时更新一次".to_string(),
            avatar_header: "头像".to_string(),
            name_header: "昵称".to_string(),
            avatar_size: 50,
        }
    }
}

/// Where and how the two artifacts are written
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub readme_path: PathBuf,
    pub json_path: PathBuf,
    pub markers: RegionMarkers,
    pub table: TableStyle,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            readme_path: PathBuf::from("README.md"),
            json_path: PathBuf::from("sponsor.json"),
            markers: RegionMarkers::default(),
            table: TableStyle::default(),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub api: ApiConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Configuration with defaults for everything except the credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api: ApiConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` is this
    /// over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(key))
        };

        let credentials = Credentials::new(required("AFDIAN_USER_ID")?, required("AFDIAN_TOKEN")?);
        let mut config = Config::new(credentials);

        if let Some(raw) = lookup("AFDIAN_SPONSOR_API") {
            config.api.sponsor_endpoint = parse_endpoint("AFDIAN_SPONSOR_API", &raw)?;
        }
        if let Some(raw) = lookup("AFDIAN_ORDER_API") {
            config.api.order_endpoint = parse_endpoint("AFDIAN_ORDER_API", &raw)?;
        }
        if let Some(raw) = lookup("REQUEST_TIMEOUT_SECS") {
            config.api.request_timeout = Duration::from_secs(parse_positive("REQUEST_TIMEOUT_SECS", &raw)?.into());
        }
        if let Some(raw) = lookup("PAGE_SIZE") {
            config.api.page_size = parse_positive("PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("MAX_PAGES") {
            config.api.max_pages = parse_positive("MAX_PAGES", &raw)?;
        }
        if let Some(raw) = lookup("MAX_RETRIES") {
            config.api.retry.max_attempts = parse_positive("MAX_RETRIES", &raw)?;
        }
        if let Some(path) = lookup("SPONSOR_README_PATH") {
            config.output.readme_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SPONSOR_JSON_PATH") {
            config.output.json_path = PathBuf::from(path);
        }

        Ok(config)
    }
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidEndpoint { name, source })
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        })
}
