//! Challenge generation and answer judging via an external
//! generative-language API.
//!
//! The model's output is opaque text. The only structure this module relies
//! on is the judging contract: a reply beginning with the `CORRECT` marker
//! counts as a solve, anything else does not.

mod session;

pub use session::{ChallengeSession, SessionStore};

use std::time::Duration;

use serde_json::{json, Value};

use sensei_common::constants::CORRECT_MARKER;
use sensei_common::{Difficulty, SenseiError};

/// Client for a Gemini-style `generateContent` endpoint
pub struct ChallengeGenerator {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl ChallengeGenerator {
    pub fn new(
        api_url: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, SenseiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SenseiError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url,
            model,
            api_key,
        })
    }

    /// Generate a new challenge statement
    pub async fn generate_challenge(
        &self,
        difficulty: Difficulty,
        category: &str,
    ) -> Result<String, SenseiError> {
        self.generate_text(&generation_prompt(difficulty, category))
            .await
    }

    /// Generate hints for a challenge, one per line
    pub async fn hints_for(&self, challenge: &str) -> Result<Vec<String>, SenseiError> {
        let text = self.generate_text(&hints_prompt(challenge)).await?;
        Ok(split_hints(&text))
    }

    /// Generate the solution walkthrough for a challenge
    pub async fn solution_for(&self, challenge: &str) -> Result<String, SenseiError> {
        self.generate_text(&solution_prompt(challenge)).await
    }

    /// Ask the model for a correctness verdict on a submitted answer.
    ///
    /// Returns the raw verdict text; callers decide with
    /// [`verdict_is_correct`].
    pub async fn judge(&self, challenge: &str, answer: &str) -> Result<String, SenseiError> {
        self.generate_text(&judge_prompt(challenge, answer)).await
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, SenseiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SenseiError::Upstream(format!(
                "generator returned HTTP {status}"
            )));
        }

        let value: Value = response.json().await.map_err(request_err)?;

        extract_text(&value)
            .ok_or_else(|| SenseiError::Upstream("generator returned no usable text".into()))
    }
}

fn request_err(err: reqwest::Error) -> SenseiError {
    if err.is_timeout() {
        SenseiError::Timeout(format!("generator request: {err}"))
    } else {
        SenseiError::Upstream(format!("generator request: {err}"))
    }
}

/// Pull the first candidate's text out of a `generateContent` reply
fn extract_text(value: &Value) -> Option<String> {
    let text = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Whether a judge reply counts as a correct solve.
///
/// Case-insensitive check that the trimmed reply starts with the marker
/// token; any other shape is incorrect.
pub fn verdict_is_correct(verdict: &str) -> bool {
    verdict
        .trim_start()
        .to_uppercase()
        .starts_with(CORRECT_MARKER)
}

fn generation_prompt(difficulty: Difficulty, category: &str) -> String {
    format!(
        "Generate a {difficulty}-level {category} CTF challenge. \
         Provide only the problem statement and expected flag format \
         (without revealing the flag)."
    )
}

fn hints_prompt(challenge: &str) -> String {
    format!(
        "Provide helpful hints (without the solution) for the following \
         challenge:\n\n{challenge}"
    )
}

fn solution_prompt(challenge: &str) -> String {
    format!("Provide ONLY the solution for the following challenge:\n\n{challenge}")
}

fn judge_prompt(challenge: &str, answer: &str) -> String {
    format!(
        "For the following CTF challenge:\n\n{challenge}\n\n\
         Evaluate if this submitted answer is correct: \"{answer}\"\n\
         Respond with only \"CORRECT\" or \"INCORRECT\" and a brief explanation."
    )
}

fn split_hints(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_marker_detection() {
        assert!(verdict_is_correct("CORRECT - well done"));
        assert!(verdict_is_correct("  correct, the flag matches"));
        assert!(verdict_is_correct("Correct! Nicely spotted."));

        assert!(!verdict_is_correct("INCORRECT - try again"));
        assert!(!verdict_is_correct("The answer is CORRECT"));
        assert!(!verdict_is_correct(""));
        assert!(!verdict_is_correct("Unable to validate answer."));
    }

    #[test]
    fn test_extract_text_from_candidate_reply() {
        let value = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  a challenge  " }] }
            }]
        });
        assert_eq!(extract_text(&value), Some("a challenge".to_string()));
    }

    #[test]
    fn test_extract_text_rejects_empty_or_malformed() {
        assert_eq!(extract_text(&serde_json::json!({})), None);
        assert_eq!(extract_text(&serde_json::json!({"candidates": []})), None);

        let blank = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        });
        assert_eq!(extract_text(&blank), None);
    }

    #[test]
    fn test_prompts_carry_inputs() {
        let prompt = generation_prompt(Difficulty::Advanced, "Forensics");
        assert!(prompt.contains("Advanced"));
        assert!(prompt.contains("Forensics"));

        let judge = judge_prompt("find the flag", "flag{x}");
        assert!(judge.contains("find the flag"));
        assert!(judge.contains("flag{x}"));
        assert!(judge.contains("CORRECT"));
    }

    #[test]
    fn test_split_hints_drops_blank_lines() {
        let hints = split_hints("first hint\n\n  second hint  \n");
        assert_eq!(hints, vec!["first hint", "second hint"]);
    }
}
