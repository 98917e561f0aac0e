use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Source-related constants
// =============================================================================

/// Default base URL for the GitHub API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable holding the GitHub API token
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Path of the support policy document inside each repository
pub const DEFAULT_POLICY_PATH: &str = ".github/support-policy.yml";

/// Releases requested per page of release history
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Build metadata identifier that routes a release to the variant track
pub const DEFAULT_VARIANT_TAG: &str = "fips";

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each fetch request to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub support: SupportConfig,
    pub fetch: FetchConfig,
}

/// GitHub-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    /// API base URL; GraphQL requests go to `{base_url}/graphql`
    pub base_url: String,
    /// Name of the environment variable holding the API token
    pub token_env: String,
    /// Path of the policy document inside each repository
    pub policy_path: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_API_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            policy_path: DEFAULT_POLICY_PATH.to_string(),
        }
    }
}

/// Support computation configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SupportConfig {
    /// Build metadata identifier of the variant track
    pub variant_tag: String,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            variant_tag: DEFAULT_VARIANT_TAG.to_string(),
        }
    }
}

/// Fetch-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    pub page_size: u32,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay between concurrent page requests in milliseconds
    pub stagger_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            timeout_ms: FETCH_TIMEOUT_MS,
            stagger_delay_ms: FETCH_STAGGER_DELAY_MS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl AppConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the path to the data directory for support-window.
/// Uses $XDG_DATA_HOME/support-window if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/support-window,
/// or ./support-window if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the directory log files are written to.
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("support-window")
}
