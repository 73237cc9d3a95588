use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Looked up in the current directory when no config path is given.
pub const CONFIG_FILE_NAME: &str = "ebookgen.toml";
pub const CONFIG_ENV: &str = "EBOOKGEN_CONFIG";
pub const API_KEY_ENV: &str = "COHERE_API_KEY";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub renderer: RendererConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub k: u32,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.cohere.ai/v1/generate".to_string(),
            api_key: None,
            model: "command-r-plus".to_string(),
            max_tokens: 10000,
            temperature: 1.0,
            k: 0,
            timeout_secs: 600,
        }
    }
}

impl GeneratorConfig {
    /// The configured key, or the value of `COHERE_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        pick_api_key(self.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }
}

fn pick_api_key(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .map(str::to_string)
        .or(from_env)
        .filter(|key| !key.trim().is_empty())
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RendererConfig {
    pub path: Option<PathBuf>,
    /// Extra wkhtmltopdf arguments, e.g. `["--page-size", "A5"]`.
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TemplatesConfig {
    pub dir: Option<PathBuf>,
}

impl Config {
    /// The configuration bundled with the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. Missing and malformed files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading config {}", path.display()), e))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find the config: an explicit path, then `EBOOKGEN_CONFIG`, then
    /// `ebookgen.toml` in the current directory, then the bundled default.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_from(explicit, from_env.as_deref(), Path::new(CONFIG_FILE_NAME))
    }

    fn discover_from(explicit: Option<&Path>, from_env: Option<&Path>, local: &Path) -> Result<Self> {
        if let Some(path) = explicit.or(from_env) {
            tracing::debug!("loading config from {}", path.display());
            return Self::load(path);
        }

        match fs::read_to_string(local) {
            Ok(content) => {
                tracing::debug!("loading config from {}", local.display());
                Self::parse(&content, local)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(e) => Err(Error::io(format!("reading config {}", local.display()), e)),
        }
    }
}
