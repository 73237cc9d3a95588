use std::num::NonZeroU64;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::pipeline::BookRequest;

/// Produces the Markdown text of a book.
pub trait Generate {
    fn generate(&self, request: &BookRequest) -> Result<String>;
}

/// The instruction sent to the model.
pub fn build_prompt(topic: &str, chapters: NonZeroU64) -> String {
    format!(
        "Write an eBook about {topic} with {chapters} chapters. Each chapter should have a title and content. Format the output in Markdown."
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    k: u32,
    stop_sequences: &'a [String],
    return_likelihoods: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

/// Client for Cohere's `/v1/generate` endpoint.
pub struct CohereClient {
    client: reqwest::blocking::Client,
    config: GeneratorConfig,
    api_key: String,
}

impl CohereClient {
    /// Fails with [`Error::MissingApiKey`] before any request is made.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or(Error::MissingApiKey)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(CohereClient {
            client,
            config,
            api_key,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.config.model,
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            k: self.config.k,
            stop_sequences: &[],
            return_likelihoods: "NONE",
        }
    }
}

impl Generate for CohereClient {
    fn generate(&self, request: &BookRequest) -> Result<String> {
        let prompt = build_prompt(&request.topic, request.chapters);
        tracing::debug!(model = %self.config.model, "requesting generation");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&prompt))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = completion_text(&body)?;
        tracing::debug!(bytes = text.len(), "generation finished");
        Ok(text)
    }
}

/// Text of the first completion, trimmed.
fn completion_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    response
        .generations
        .into_iter()
        .next()
        .map(|generation| generation.text.trim().to_string())
        .ok_or(Error::EmptyCompletion)
}
