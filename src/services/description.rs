use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Movie;
use crate::store::{MovieUpdate, Store};

/// A black-box text generator.
///
/// The only seam the service needs from the outside AI collaborator; swapped
/// for a stub in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Builds the generation prompt from the movie's own metadata.
pub fn build_prompt(movie: &Movie) -> String {
    format!(
        "Generate a compelling movie description for:\n\
         Title: {}\n\
         Year: {}\n\
         Genre: {}\n\
         Director: {}\n\
         Cast: {}\n\n\
         Write a 2-3 sentence description that would make someone want to watch this movie.",
        movie.title,
        movie.year,
        movie.genre.join(", "),
        movie.director,
        movie.cast.join(", "),
    )
}

/// Generates a description for the movie and persists it.
///
/// Two explicit steps: the external call happens first, with no store lock
/// held and bounded by the generator's own timeout; only a successful result
/// is written back through the regular movie-update path. A timeout or
/// generator failure therefore leaves the movie untouched.
pub async fn generate_description(
    store: &dyn Store,
    generator: &dyn TextGenerator,
    movie_id: Uuid,
) -> AppResult<String> {
    let movie = store.get_movie(movie_id).await?;
    let description = generator.generate(&build_prompt(&movie)).await?;

    store
        .update_movie(
            movie_id,
            MovieUpdate {
                description: Some(description.clone()),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(movie_id = %movie_id, chars = description.len(), "description generated");
    Ok(description)
}

// OpenAI-compatible chat completion wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Text generator backed by an OpenAI-compatible chat completion endpoint.
#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl OpenAiGenerator {
    const MODEL: &'static str = "gpt-3.5-turbo";

    /// Creates a generator whose every call is bounded by `timeout`.
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            http_client,
            api_key,
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::ExternalApi(
                "Text generation API key not configured".to_string(),
            ));
        }

        let request = ChatRequest {
            model: Self::MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/v1/chat/completions", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::ExternalTimeout("text generator".to_string())
                } else {
                    AppError::HttpClient(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Text generator returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::ExternalApi("Empty text generator response".to_string()))?;

        Ok(content)
    }
}
