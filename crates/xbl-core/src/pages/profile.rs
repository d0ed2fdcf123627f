//! Profile page extractor.
//!
//! Pulls a player's general information (gamerscore, motto, avatar, bio,
//! current activity) out of the profile page markup. Every field is
//! optional in the markup, so extraction never fails — missing blocks just
//! leave their field `None`.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::leading_u32;
use crate::agent::Page;
use crate::types::Profile;

static GAMERSCORE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.Gamerscore").unwrap());
static MOTTO: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div#Motto").unwrap());
static AVATAR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img.AvatarBody").unwrap());
static GAMERTILE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img.GamerTile").unwrap());
static NICKNAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#ProfileInfo h2").unwrap());
static BIO: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div#bio").unwrap());
static ACTIVITY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#CurrentActivity").unwrap());

/// Extract a [`Profile`] from a fetched profile page.
#[must_use]
pub fn extract(gamertag: &str, page: &Page) -> Profile {
    let document = Html::parse_document(&page.body);

    Profile {
        gamertag: gamertag.to_string(),
        gamerscore: first_text(&document, &GAMERSCORE).as_deref().and_then(leading_u32),
        motto: first_text(&document, &MOTTO),
        avatar_url: first_attr(&document, &AVATAR, "src"),
        gamertile_small: first_attr(&document, &GAMERTILE, "src"),
        nickname: first_text(&document, &NICKNAME),
        bio: first_text(&document, &BIO),
        activity: first_text(&document, &ACTIVITY),
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.inner_html().trim().to_string())
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(ToString::to_string)
}
