use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("template file '{name}' not found in '{}'", dir.display())]
    TemplateNotFound { name: String, dir: PathBuf },

    #[error("wkhtmltopdf not found at '{}': {source}", path.display())]
    RendererNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wkhtmltopdf exited with {status}: {stderr}")]
    RenderFailed { status: ExitStatus, stderr: String },

    #[error("no API key configured (set COHERE_API_KEY or generator.api_key)")]
    MissingApiKey,

    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed generation response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("generation API returned no completions")]
    EmptyCompletion,

    #[error("invalid config file '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("'{input}' is not a valid number")]
    InvalidNumber {
        input: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("the chapter count must be at least 1")]
    ZeroChapters,

    #[error("the topic must not be empty")]
    EmptyTopic,

    #[error("input closed before all answers were given")]
    InputClosed,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}
