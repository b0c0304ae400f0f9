// src/services/openrouter.rs
//
// Gateway to the OpenRouter chat-completions API for the AI tutor. Every
// failure is masked into a canned answer with `model: "error"`; callers of
// the /api/ai/ask endpoint never see a hard error.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::Config;

const SYSTEM_PROMPT: &str = "You are DocDot AI, a medical education assistant specialized in anatomy, physiology, and other medical subjects. \
You provide accurate, detailed answers to medical questions based on established medical knowledge.\n\
\n\
- Use professional, academically appropriate language\n\
- Cite medical textbooks or journals when possible\n\
- Explain complex concepts clearly\n\
- When appropriate, organize information with bullet points or numbered lists\n\
- If you're unsure about something, admit it rather than providing inaccurate information\n\
- IMPORTANT: Always clarify that your information is for educational purposes only and not a substitute for professional medical advice";

const DEGRADED_ANSWER: &str = "I'm sorry, I couldn't generate a response at this time. Our AI service might be temporarily unavailable.";

const EMPTY_COMPLETION_ANSWER: &str = "I'm sorry, I couldn't generate a response at this time.";

/// Response body of the /api/ai/ask endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorAnswer {
    pub answer: String,
    pub model: String,
}

#[derive(Clone)]
pub struct OpenRouter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenRouter {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openrouter_base_url.clone(),
            config.openrouter_api_key.clone(),
            config.openrouter_model.clone(),
        )
    }

    /// Forwards a medical question to the completion API. Infallible from
    /// the caller's perspective: any upstream problem yields the canned
    /// degradation answer instead of an error.
    pub async fn ask(&self, question: &str) -> TutorAnswer {
        match self.request(question).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!("AI tutor request failed: {}", err);
                TutorAnswer {
                    answer: DEGRADED_ANSWER.to_string(),
                    model: "error".to_string(),
                }
            }
        }
    }

    async fn request(&self, question: &str) -> Result<TutorAnswer, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or("OPENROUTER_API_KEY is not configured")?;

        let url = format!("{}/chat/completions", self.base_url);
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: question.into(),
                },
            ],
            temperature: 0.7,
            max_tokens: 1024,
        };

        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .header("HTTP-Referer", "https://docdot.org")
            .json(&req)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("OpenRouter HTTP {}: {}", status, body));
        }

        let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
        let answer = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_else(|| EMPTY_COMPLETION_ANSWER.to_string());

        Ok(TutorAnswer {
            answer,
            model: body.model,
        })
    }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
