//! High-level client: fetch a page, run its extractor, record the entity.
//!
//! `XblClient` is the convenience surface over the fetch engine: one
//! session manager (one identity, one cookie jar, one page cache) plus one
//! [`Registry`] holding the latest extracted entities. Each accessor builds
//! the canonical URL, fetches through the session — which reuses fresh
//! cached content and logs in transparently — runs the matching extractor,
//! and stores the result before returning it.

use tracing::debug;

use crate::pages;
use crate::registry::Registry;
use crate::session::SessionManager;
use crate::types::{GameAchievements, GameLibrary, Profile};
use crate::{Config, Result};

/// One authenticated identity and the entities extracted through it.
pub struct XblClient {
    session: SessionManager,
    registry: Registry,
}

impl XblClient {
    /// Create a client for one credential set.
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            session: SessionManager::new(config)?,
            registry: Registry::new(),
        })
    }

    /// Fetch and extract a player's profile.
    pub async fn profile(&mut self, gamertag: &str) -> Result<&Profile> {
        let url = self.session.config().profile_url(gamertag);
        let page = self.session.get_page(&url).await?;
        let profile = pages::profile::extract(gamertag, &page);
        debug!(gamertag, gamerscore = ?profile.gamerscore, "profile extracted");
        Ok(self.registry.insert_profile(profile))
    }

    /// Fetch and extract a player's game library.
    pub async fn games(&mut self, gamertag: &str) -> Result<&GameLibrary> {
        let url = self.session.config().games_url(gamertag);
        let page = self.session.get_page(&url).await?;
        let library = pages::games::extract(gamertag, &page);
        debug!(gamertag, games = library.games.len(), "game library extracted");
        Ok(self.registry.insert_library(library))
    }

    /// Fetch and extract a player's achievements in one game.
    pub async fn achievements(
        &mut self,
        gamertag: &str,
        title_id: u64,
    ) -> Result<&GameAchievements> {
        let url = self.session.config().achievements_url(gamertag, title_id);
        let page = self.session.get_page(&url).await?;
        let achievements = pages::achievements::extract(gamertag, title_id, &page)?;
        debug!(
            gamertag,
            title_id,
            count = achievements.achievements.len(),
            "achievements extracted"
        );
        Ok(self.registry.insert_achievements(achievements))
    }

    /// The latest extracted entities.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The underlying session manager.
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }
}
