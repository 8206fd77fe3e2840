//! Backend configuration and factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examkit_core::traits::{ExamSource, ResultStore};

use crate::directory::{DirectoryExamSource, DirectoryResultStore};
use crate::file_cache::FileCache;
use crate::http::{HttpExamSource, HttpResultStore};

/// Name of the config file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "examkit.toml";

/// Where exams are loaded from.
///
/// Note: Custom Debug impl masks API tokens to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Directory {
        #[serde(default = "default_exam_dir")]
        path: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default)]
        api_token: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

/// Where submitted results are sent.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultsConfig {
    Directory {
        #[serde(default = "default_results_dir")]
        path: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default)]
        api_token: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

fn masked(token: &Option<String>) -> Option<&'static str> {
    token.as_ref().map(|_| "***")
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceConfig::Directory { path } => {
                f.debug_struct("Directory").field("path", path).finish()
            }
            SourceConfig::Http {
                base_url,
                api_token,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_token", &masked(api_token))
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

impl std::fmt::Debug for ResultsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultsConfig::Directory { path } => {
                f.debug_struct("Directory").field("path", path).finish()
            }
            ResultsConfig::Http {
                base_url,
                api_token,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_token", &masked(api_token))
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Directory {
            path: default_exam_dir(),
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        ResultsConfig::Directory {
            path: default_results_dir(),
        }
    }
}

fn default_exam_dir() -> PathBuf {
    PathBuf::from("./exams")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("./examkit-results")
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("./.examkit-cache")
}

/// Top-level examkit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamkitConfig {
    /// Directory holding the local key/value cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// User recorded on results when none is given on the command line.
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub results: ResultsConfig,
}

impl Default for ExamkitConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            default_user: None,
            source: SourceConfig::default(),
            results: ResultsConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

impl ExamkitConfig {
    /// Resolve `${VAR}` references and apply `EXAMKIT_*` overrides.
    fn resolve(mut self) -> Self {
        let token_override = std::env::var("EXAMKIT_API_TOKEN").ok();

        self.cache_dir = resolve_path(&self.cache_dir);
        self.default_user = self.default_user.as_deref().map(resolve_env_vars);
        if let Ok(user) = std::env::var("EXAMKIT_USER") {
            self.default_user = Some(user);
        }

        self.source = match self.source {
            SourceConfig::Directory { path } => SourceConfig::Directory {
                path: resolve_path(&path),
            },
            SourceConfig::Http {
                base_url,
                api_token,
                timeout_secs,
            } => SourceConfig::Http {
                base_url: resolve_env_vars(&base_url),
                api_token: token_override
                    .clone()
                    .or_else(|| api_token.as_deref().map(resolve_env_vars)),
                timeout_secs,
            },
        };

        self.results = match self.results {
            ResultsConfig::Directory { path } => ResultsConfig::Directory {
                path: resolve_path(&path),
            },
            ResultsConfig::Http {
                base_url,
                api_token,
                timeout_secs,
            } => ResultsConfig::Http {
                base_url: resolve_env_vars(&base_url),
                api_token: token_override.or_else(|| api_token.as_deref().map(resolve_env_vars)),
                timeout_secs,
            },
        };

        self
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examkit.toml` in the current directory
/// 2. `~/.config/examkit/config.toml`
///
/// Environment variable overrides: `EXAMKIT_API_TOKEN`, `EXAMKIT_USER`.
pub fn load_config() -> Result<ExamkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(&path)?
        }
        None => ExamkitConfig::default(),
    };

    Ok(config.resolve())
}

fn parse_config(path: &Path) -> Result<ExamkitConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ExamkitConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examkit"))
}

/// Create the exam source described by the config.
pub fn create_exam_source(config: &SourceConfig) -> Result<Arc<dyn ExamSource>> {
    match config {
        SourceConfig::Directory { path } => Ok(Arc::new(DirectoryExamSource::new(path))),
        SourceConfig::Http {
            base_url,
            api_token,
            timeout_secs,
        } => Ok(Arc::new(HttpExamSource::new(
            base_url,
            api_token.clone(),
            *timeout_secs,
        )?)),
    }
}

/// Create the result store described by the config.
pub fn create_result_store(config: &ResultsConfig) -> Result<Arc<dyn ResultStore>> {
    match config {
        ResultsConfig::Directory { path } => Ok(Arc::new(DirectoryResultStore::new(path))),
        ResultsConfig::Http {
            base_url,
            api_token,
            timeout_secs,
        } => Ok(Arc::new(HttpResultStore::new(
            base_url,
            api_token.clone(),
            *timeout_secs,
        )?)),
    }
}

/// Open the file cache at `config.cache_dir`.
pub fn open_cache(config: &ExamkitConfig) -> Result<FileCache> {
    FileCache::open(&config.cache_dir)
}
