//! Challenge sessions in Redis.
//!
//! Each generated challenge lives under a random token with a TTL, so
//! concurrent players never share state. The session accumulates hints and
//! the solution as they are fetched, and is deleted once the challenge is
//! solved.

use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use sensei_common::constants::redis_keys::SESSION_PREFIX;
use sensei_common::{Difficulty, SenseiError};

/// Per-player challenge state stored in Redis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSession {
    pub difficulty: Difficulty,
    pub category: String,
    pub challenge: String,

    /// Hints fetched so far (lazily generated, then cached here)
    #[serde(default)]
    pub hints: Vec<String>,

    /// Solution, once requested
    #[serde(default)]
    pub solution: Option<String>,

    /// Creation timestamp (Unix epoch seconds)
    pub created_at: i64,

    /// Expiry timestamp
    pub expires_at: i64,
}

/// Challenge session store
pub struct SessionStore {
    /// Session TTL in seconds
    ttl_secs: u64,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self { ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Open a new session for a freshly generated challenge.
    ///
    /// Returns the session token handed to the client.
    pub async fn create(
        &self,
        redis: &mut redis::aio::ConnectionManager,
        difficulty: Difficulty,
        category: String,
        challenge: String,
    ) -> Result<String, SenseiError> {
        let token = generate_token();
        let now = chrono::Utc::now().timestamp();

        let session = ChallengeSession {
            difficulty,
            category,
            challenge,
            hints: Vec::new(),
            solution: None,
            created_at: now,
            expires_at: now + self.ttl_secs as i64,
        };

        self.save(redis, &token, &session).await?;

        tracing::debug!(
            token = %token,
            difficulty = %difficulty,
            category = %session.category,
            "Challenge session opened"
        );

        Ok(token)
    }

    /// Fetch a live session. `None` when the token is unknown or expired.
    pub async fn fetch(
        &self,
        redis: &mut redis::aio::ConnectionManager,
        token: &str,
    ) -> Result<Option<ChallengeSession>, SenseiError> {
        let stored: Option<String> = redis
            .get(session_key(token))
            .await
            .map_err(session_storage_err)?;

        let Some(stored) = stored else {
            return Ok(None);
        };

        let session: ChallengeSession = serde_json::from_str(&stored)
            .map_err(|e| SenseiError::Internal(format!("corrupt session: {e}")))?;

        // TTL normally handles this; the timestamp check covers clock-frozen
        // Redis instances and keys rewritten by save()
        if chrono::Utc::now().timestamp() > session.expires_at {
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Write a session back (hints/solution caching) without extending
    /// its original expiry
    pub async fn save(
        &self,
        redis: &mut redis::aio::ConnectionManager,
        token: &str,
        session: &ChallengeSession,
    ) -> Result<(), SenseiError> {
        let value = serde_json::to_string(session)
            .map_err(|e| SenseiError::Internal(format!("serialize session: {e}")))?;

        let remaining = (session.expires_at - chrono::Utc::now().timestamp()).max(1) as u64;

        redis
            .set_ex::<_, _, ()>(session_key(token), value, remaining)
            .await
            .map_err(session_storage_err)?;

        Ok(())
    }

    /// Drop a session (after a correct submission)
    pub async fn remove(
        &self,
        redis: &mut redis::aio::ConnectionManager,
        token: &str,
    ) -> Result<(), SenseiError> {
        let _: () = redis
            .del(session_key(token))
            .await
            .map_err(session_storage_err)?;
        Ok(())
    }
}

fn session_key(token: &str) -> String {
    format!("{SESSION_PREFIX}{token}")
}

fn session_storage_err(err: redis::RedisError) -> SenseiError {
    SenseiError::Storage(format!("session store: {err}"))
}

/// Generate a cryptographically random session token
fn generate_token() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use rand::Rng;

    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        // 16 bytes, unpadded URL-safe base64
        assert_eq!(token.len(), 22);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_key_prefix() {
        assert_eq!(session_key("abc"), "session:abc");
    }

    #[test]
    fn test_session_roundtrips_through_json() {
        let session = ChallengeSession {
            difficulty: Difficulty::Intermediate,
            category: "Forensics".into(),
            challenge: "inspect the pcap".into(),
            hints: vec!["look at DNS".into()],
            solution: None,
            created_at: 100,
            expires_at: 1900,
        };

        let json = serde_json::to_string(&session).unwrap();
        let back: ChallengeSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.category, session.category);
        assert_eq!(back.hints, session.hints);
        assert_eq!(back.expires_at, session.expires_at);
    }
}
