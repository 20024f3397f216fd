//! Text-generation client for the supported LLM providers

use crate::config::{GenerationConfig, LLMProvider};
use crate::narrative::{clean_response, GenerationError, GenerationResult, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a warm, insightful cultural guide. Write in plain prose without markdown headings.";

pub struct GenerationClient {
    client: Client,
    config: GenerationConfig,
    api_base_url: String,
}

impl GenerationClient {
    pub fn new(config: &GenerationConfig) -> GenerationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::ConfigError(e.to_string()))?;

        let api_base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| config.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            config: config.clone(),
            api_base_url,
        })
    }

    pub fn provider(&self) -> LLMProvider {
        self.config.provider
    }

    fn system_prompt(&self) -> String {
        self.config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
    }

    fn require_key(&self, provider: &str) -> GenerationResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::ConfigError(format!("{} requires API key", provider)))
    }

    async fn openai_chat(&self, prompt: &str) -> GenerationResult<String> {
        #[derive(Serialize)]
        struct Message {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: String,
        }

        let api_key = self.require_key("OpenAI")?;

        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages: vec![
                    Message { role: "system".to_string(), content: self.system_prompt() },
                    Message { role: "user".to_string(), content: prompt.to_string() },
                ],
                temperature: self.config.temperature,
            })
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GenerationError::ApiError(format!("OpenAI error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenerationError::SerializationError(e.to_string()))?;
        Ok(result.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default())
    }

    async fn ollama_generate(&self, prompt: &str) -> GenerationResult<String> {
        #[derive(Serialize)]
        struct Options {
            temperature: f32,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: String,
            system: String,
            stream: bool,
            options: Options,
        }

        #[derive(Deserialize)]
        struct Response {
            response: String,
        }

        let url = format!("{}/api/generate", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .json(&Request {
                model: &self.config.model,
                prompt: prompt.to_string(),
                system: self.system_prompt(),
                stream: false,
                options: Options { temperature: self.config.temperature },
            })
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GenerationError::ApiError(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenerationError::SerializationError(e.to_string()))?;
        Ok(result.response)
    }

    async fn gemini_generate(&self, prompt: &str) -> GenerationResult<String> {
        #[derive(Serialize)]
        struct Request {
            contents: Vec<Content>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationParams,
        }

        #[derive(Serialize, Deserialize)]
        struct Content {
            role: Option<String>,
            parts: Vec<Part>,
        }

        #[derive(Serialize, Deserialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct GenerationParams {
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }

        let api_key = self.require_key("Gemini")?;

        // No system role on this endpoint; the instruction rides in front of the prompt
        let full_prompt = format!("{}\n\n{}", self.system_prompt(), prompt);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url, self.config.model, api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&Request {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: full_prompt }],
                }],
                generation_config: GenerationParams { temperature: self.config.temperature },
            })
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenerationError::SerializationError(e.to_string()))?;

        let text = result
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        debug!("Generating with {:?} ({} prompt chars)", self.config.provider, prompt.len());

        let raw = match self.config.provider {
            LLMProvider::OpenAI => self.openai_chat(prompt).await?,
            LLMProvider::Ollama => self.ollama_generate(prompt).await?,
            LLMProvider::Gemini => self.gemini_generate(prompt).await?,
        };

        let text = clean_response(&raw);
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}
