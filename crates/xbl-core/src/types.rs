//! Domain entities extracted from fetched pages.
//!
//! Entities are recomputed in full from page content on every successful
//! refresh; they hold no identity across refreshes beyond their matching
//! key (gamertag, title id). All fields reflect what the corresponding page
//! actually exposes — anything the markup may legitimately omit is an
//! `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player's profile page data: gamerscore, motto, avatar, bio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Gamertag the profile was requested for.
    pub gamertag: String,
    /// Total gamerscore across all games.
    pub gamerscore: Option<u32>,
    /// Player motto.
    pub motto: Option<String>,
    /// URL of the full-body avatar image.
    pub avatar_url: Option<String>,
    /// URL of the small gamertile image.
    pub gamertile_small: Option<String>,
    /// Display nickname, if set.
    pub nickname: Option<String>,
    /// Free-form bio text.
    pub bio: Option<String>,
    /// Current presence or most recent activity line.
    pub activity: Option<String>,
}

/// A player's game list as shown on the compare-games page, together with
/// the page's header summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLibrary {
    /// Gamertag the list was requested for.
    pub gamertag: String,
    /// URL of the large gamertile shown in the page header.
    pub gamertile_large: Option<String>,
    /// Gamerscore as shown in the page header.
    pub gamerscore: Option<u32>,
    /// Progress label from the page header (e.g. "34% complete").
    pub progress: Option<String>,
    /// One entry per played game. Unplayed titles are not listed.
    pub games: Vec<Game>,
}

/// A player's progress in one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Site-assigned title id.
    pub id: u64,
    /// Game name.
    pub name: String,
    /// URL of the box-shot tile image.
    pub tile_url: Option<String>,
    /// Total points the game offers.
    pub total_points: Option<u32>,
    /// Points the player has earned so far.
    pub unlocked_points: Option<u32>,
    /// Total achievements the game offers.
    pub total_achievements: Option<u32>,
    /// Achievements the player has unlocked so far.
    pub unlocked_achievements: Option<u32>,
    /// When the player last played. The compare-games page does not expose
    /// this, so it stays `None` until some other source fills it in.
    pub last_played: Option<DateTime<Utc>>,
}

/// A single achievement in a game, locked or unlocked.
///
/// "Locked" is one atomic state: points and unlock time travel together in
/// [`UnlockedState`], so a half-populated achievement cannot be represented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// Site-assigned achievement id.
    pub id: u64,
    /// Title id of the game this achievement belongs to.
    pub game_id: u64,
    /// Achievement name.
    pub name: String,
    /// Achievement description.
    pub description: Option<String>,
    /// URL of the achievement tile image.
    pub tile_url: Option<String>,
    /// Present iff the player has unlocked this achievement.
    pub unlocked: Option<UnlockedState>,
}

/// Unlock details for an achievement the player has earned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedState {
    /// Points awarded for the unlock.
    pub points: u32,
    /// When the player unlocked the achievement.
    pub unlocked_at: DateTime<Utc>,
}

impl Achievement {
    /// Whether the player has unlocked this achievement.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked.is_some()
    }

    /// Points earned, if unlocked.
    #[must_use]
    pub fn points(&self) -> Option<u32> {
        self.unlocked.as_ref().map(|u| u.points)
    }

    /// Unlock timestamp, if unlocked.
    #[must_use]
    pub fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked.as_ref().map(|u| u.unlocked_at)
    }
}

/// The achievement list for one (player, game) pair, with the gamertag as
/// the site spells it (capitalization may differ from what was requested).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAchievements {
    /// Canonical gamertag from the payload's player list.
    pub gamertag: String,
    /// Title id of the game.
    pub game_id: u64,
    /// All achievements in the game, locked and unlocked.
    pub achievements: Vec<Achievement>,
}
