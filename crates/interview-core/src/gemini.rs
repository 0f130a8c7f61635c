use crate::feedback::FeedbackGenerator;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: String,
}

// This client contains the actual logic for calling the Gemini
// `generateContent` REST endpoint. Keeping it behind the
// `FeedbackGenerator` trait means the controller never learns which
// provider produced the review, so this can be swapped for a different
// backend without touching the session logic.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl FeedbackGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateContentResponse>()
            .await?;

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No candidates in Gemini response"))?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(anyhow::anyhow!("Gemini response contained no text"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::build_prompt;
    use crate::transcript::{Speaker, Turn};
    use std::env;

    #[test]
    fn response_parsing_joins_all_parts() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "**Technical Accuracy**: solid. " },
                            { "text": "**Verdict: Hire**" }
                        ]
                    }
                }
            ]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).expect("valid response");
        let text: String = resp.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "**Technical Accuracy**: solid. **Verdict: Hire**");
    }

    #[test]
    fn response_with_no_candidates_parses_to_empty() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").expect("valid response");
        assert!(resp.candidates.is_empty());
    }

    // This is an integration test that makes a live call to the Gemini
    // API. It is ignored by default so `cargo test` runs without an API
    // key. To run it, use `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_generate_review_live() {
        dotenvy::dotenv_override().ok();
        let api_key = env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY not set");
        let client = GeminiClient::new(api_key, "gemini-1.5-flash".to_string());

        let turns = vec![
            Turn::new(Speaker::Interviewer, "Tell me about yourself."),
            Turn::new(
                Speaker::Candidate,
                "I build backend systems in Rust, mostly networked services.",
            ),
        ];

        let result = client.generate(&build_prompt(&turns)).await;
        match result {
            Ok(review) => {
                println!("Review: {}", review);
                assert!(!review.trim().is_empty(), "Review should not be empty");
            }
            Err(e) => panic!("generate failed: {:?}", e),
        }
    }
}
