//! Session configuration and canonical URL construction.
//!
//! Configuration is an explicit struct handed to the session manager's
//! constructor — there is no process-wide options bag, so multiple
//! independently-configured sessions can coexist.
//!
//! The URL builders live here because cache identity is exact-URL-string
//! identity: two logically-equivalent URLs with different parameter ordering
//! are distinct cache entries. Building every page URL in one place is what
//! makes the cache keys canonical.
//!
//! ## Example configuration file
//!
//! ```toml
//! username = "you@example.com"
//! password = "hunter2"
//! refresh_age_secs = 60
//! url_prefix = "http://live.xbox.com"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::Result;

/// Default freshness window: data older than this is re-fetched on access.
const DEFAULT_REFRESH_AGE_SECS: u64 = 60;

/// Base URL of the live site.
const DEFAULT_URL_PREFIX: &str = "http://live.xbox.com";

/// Credentials and fetch policy for one authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sign-in username (a Windows Live email address).
    pub username: String,
    /// Sign-in password.
    pub password: String,
    /// Freshness window in seconds for the page cache.
    #[serde(default = "default_refresh_age")]
    pub refresh_age_secs: u64,
    /// Base URL all page URLs are built from, without a trailing slash.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

const fn default_refresh_age() -> u64 {
    DEFAULT_REFRESH_AGE_SECS
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

impl Config {
    /// Create a configuration with default refresh age and URL prefix.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            refresh_age_secs: DEFAULT_REFRESH_AGE_SECS,
            url_prefix: default_url_prefix(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// The freshness window as a [`Duration`].
    #[must_use]
    pub const fn refresh_age(&self) -> Duration {
        Duration::from_secs(self.refresh_age_secs)
    }

    /// URL of a player's profile page.
    #[must_use]
    pub fn profile_url(&self, gamertag: &str) -> String {
        format!(
            "{}/en-US/MyXbox/Profile?{}",
            self.url_prefix,
            query(&[("gamertag", gamertag)])
        )
    }

    /// URL of the compare-games page listing a player's games.
    #[must_use]
    pub fn games_url(&self, gamertag: &str) -> String {
        format!(
            "{}/en-US/GameCenter?{}",
            self.url_prefix,
            query(&[("compareTo", gamertag)])
        )
    }

    /// URL of the achievement-compare page for one game.
    #[must_use]
    pub fn achievements_url(&self, gamertag: &str, title_id: u64) -> String {
        format!(
            "{}/en-US/Activity/Details?{}",
            self.url_prefix,
            query(&[("titleId", &title_id.to_string()), ("compareTo", gamertag)])
        )
    }
}

fn query(pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
