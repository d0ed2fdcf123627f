//! Achievement-compare page extractor.
//!
//! Unlike the other pages, the achievement data is not addressed through
//! markup: the page embeds a JSON payload in a script call, located by the
//! literal marker `(routes.activity.details.load,` and terminated by `);`.
//! That blob is parsed directly, bypassing HTML traversal entirely.
//!
//! The payload's `Players` list also carries the gamertag as the site
//! spells it; the requested tag is matched case-insensitively against it
//! and the canonical spelling is what keys the `EarnDates` lookups.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::agent::Page;
use crate::types::{Achievement, GameAchievements, UnlockedState};
use crate::{Error, Result};

static PAYLOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\(routes\.activity\.details\.load,(.*?)\);").unwrap());
/// Unlock timestamps arrive as `/Date(<millis>)/`.
static EARNED_ON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Date\((\d+)").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ActivityPayload {
    players: Vec<PlayerEntry>,
    achievements: Vec<AchievementEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlayerEntry {
    gamertag: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AchievementEntry {
    id: u64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tile_url: Option<String>,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default)]
    earn_dates: HashMap<String, EarnDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EarnDate {
    #[serde(default)]
    earned_on: Option<String>,
}

/// Extract the achievement list for one (player, game) pair.
///
/// Fails if the payload marker is absent, the payload does not parse, the
/// player is not in the payload's player list, or an earned achievement is
/// missing its score or unlock time — any of these means the extraction
/// contract is stale, and guessing would corrupt the records.
pub fn extract(gamertag: &str, title_id: u64, page: &Page) -> Result<GameAchievements> {
    let raw = PAYLOAD_RE
        .captures(&page.body)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| Error::Parse("activity payload marker not found in page body".to_string()))?;
    let payload: ActivityPayload = serde_json::from_str(raw.as_str())?;

    let canonical = payload
        .players
        .iter()
        .find(|player| player.gamertag.eq_ignore_ascii_case(gamertag))
        .map(|player| player.gamertag.clone())
        .ok_or_else(|| {
            Error::Parse(format!("player '{gamertag}' not present in activity payload"))
        })?;

    let achievements = payload
        .achievements
        .into_iter()
        .map(|entry| build_achievement(entry, &canonical, title_id))
        .collect::<Result<Vec<_>>>()?;

    Ok(GameAchievements {
        gamertag: canonical,
        game_id: title_id,
        achievements,
    })
}

fn build_achievement(
    entry: AchievementEntry,
    canonical_gamertag: &str,
    title_id: u64,
) -> Result<Achievement> {
    // An EarnDates entry for the player is what "unlocked" means; points and
    // unlock time must then both be present, or the record is rejected.
    let unlocked = match entry.earn_dates.get(canonical_gamertag) {
        Some(earn) => {
            let points = entry.score.ok_or_else(|| {
                Error::Parse(format!("unlocked achievement {} has no score", entry.id))
            })?;
            let unlocked_at = earn
                .earned_on
                .as_deref()
                .and_then(parse_earned_on)
                .ok_or_else(|| {
                    Error::Parse(format!(
                        "unlocked achievement {} has no parseable earn date",
                        entry.id
                    ))
                })?;
            Some(UnlockedState {
                points,
                unlocked_at,
            })
        },
        None => None,
    };

    Ok(Achievement {
        id: entry.id,
        game_id: title_id,
        name: entry.name,
        description: entry.description,
        tile_url: entry.tile_url,
        unlocked,
    })
}

fn parse_earned_on(raw: &str) -> Option<DateTime<Utc>> {
    let millis = EARNED_ON_RE.captures(raw)?[1].parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}
