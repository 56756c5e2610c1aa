use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Fallback token lifetime in hours, used when the token carries no `exp`
/// claim. The service issues tokens valid for 24 hours.
const TOKEN_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    pub name: Option<String>,
    pub dietary_preference: Option<String>,
    /// Expiry taken from the token's `exp` claim, when present
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        let expiry = self
            .expires_at
            .unwrap_or(self.created_at + Duration::hours(TOKEN_EXPIRY_HOURS));
        Utc::now() > expiry
    }

    /// Name to show in the title bar; falls back to the login email
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Persistent session storage. The token lives in a single file under the
/// cache directory; deleting that file is the logout.
pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns true only when a non-expired
    /// session was found; an expired or unreadable session leaves the
    /// client unauthenticated.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data and remove the stored token
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if a session is present
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session(created_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> SessionData {
        SessionData {
            token: "header.payload.sig".to_string(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            dietary_preference: None,
            expires_at,
            created_at,
        }
    }

    #[test]
    fn test_expiry_from_exp_claim() {
        let fresh = sample_session(Utc::now(), Some(Utc::now() + Duration::hours(1)));
        assert!(!fresh.is_expired());

        let stale = sample_session(Utc::now(), Some(Utc::now() - Duration::minutes(1)));
        assert!(stale.is_expired());
    }

    #[test]
    fn test_expiry_fallback_without_exp_claim() {
        let fresh = sample_session(Utc::now(), None);
        assert!(!fresh.is_expired());

        let stale = sample_session(Utc::now() - Duration::hours(25), None);
        assert!(stale.is_expired());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut session = sample_session(Utc::now(), None);
        assert_eq!(session.display_name(), "Ada");
        session.name = None;
        assert_eq!(session.display_name(), "ada@example.com");
    }

    #[test]
    fn test_clear_removes_stored_token() {
        let dir = std::env::temp_dir().join(format!("pantrychef-session-test-{}", std::process::id()));
        let mut session = Session::new(dir.clone());
        session.update(sample_session(Utc::now(), None));
        session.save().unwrap();
        assert!(dir.join(SESSION_FILE).exists());

        session.clear().unwrap();
        assert!(session.data.is_none());
        assert!(!dir.join(SESSION_FILE).exists());
        assert!(!session.is_valid());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_skips_expired_session() {
        let dir = std::env::temp_dir().join(format!("pantrychef-expired-test-{}", std::process::id()));
        let mut session = Session::new(dir.clone());
        session.update(sample_session(
            Utc::now() - Duration::hours(48),
            Some(Utc::now() - Duration::hours(24)),
        ));
        session.save().unwrap();

        let mut reloaded = Session::new(dir.clone());
        assert!(!reloaded.load().unwrap());
        assert!(reloaded.data.is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
