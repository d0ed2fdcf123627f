//! Compare-games page extractor.
//!
//! The compare-games page lists every title attached to the player's
//! account as a `div.LineItem` block, plus a header with the player's
//! large gamertile, gamerscore, and a progress label. Titles the player
//! never actually played carry a `div.NotPlayed` marker and are skipped —
//! the library only holds played games.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::leading_u32;
use crate::agent::Page;
use crate::types::{Game, GameLibrary};

static LINE_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.LineItem").unwrap());
static NOT_PLAYED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.grid-4 div.NotPlayed").unwrap());
static GAME_NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3 a").unwrap());
static BOX_SHOT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img.BoxShot").unwrap());
static ITEM_SCORE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.grid-4 div.GamerScore").unwrap());
static ITEM_ACHIEVEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.grid-4 div.Achievement").unwrap());
static HEADER_TILE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.HeaderArea div.grid-4 div.ScoreBlock img").unwrap());
static HEADER_SCORE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.HeaderArea div.ScoreBlock div.GamerScore").unwrap());
static HEADER_PROGRESS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.HeaderArea div.ProgressLabel").unwrap());

static TITLE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"titleId=(\d+)").unwrap());
/// Scores render as `"<unlocked> / <total>"`; this captures the total.
static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/ (\d+)").unwrap());

/// Extract a [`GameLibrary`] from a fetched compare-games page.
#[must_use]
pub fn extract(gamertag: &str, page: &Page) -> GameLibrary {
    let document = Html::parse_document(&page.body);

    let games = document
        .select(&LINE_ITEM)
        .filter_map(|item| extract_game(gamertag, item))
        .collect();

    GameLibrary {
        gamertag: gamertag.to_string(),
        gamertile_large: document
            .select(&HEADER_TILE)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(ToString::to_string),
        gamerscore: document
            .select(&HEADER_SCORE)
            .next()
            .and_then(|el| leading_u32(&el.inner_html())),
        progress: document
            .select(&HEADER_PROGRESS)
            .next()
            .map(|el| el.inner_html().trim().to_string()),
        games,
    }
}

fn extract_game(gamertag: &str, item: ElementRef<'_>) -> Option<Game> {
    if item.select(&NOT_PLAYED).next().is_some() {
        return None;
    }

    let name = item
        .select(&GAME_NAME)
        .next()
        .map(|el| el.inner_html().trim().to_string())?;

    // The comparison link carries the title id.
    let id = TITLE_ID_RE
        .captures(&item.html())
        .and_then(|captures| captures[1].parse::<u64>().ok());
    let Some(id) = id else {
        debug!(gamertag, game = %name, "line item without a titleId link, skipping");
        return None;
    };

    let score_text = item.select(&ITEM_SCORE).next().map(|el| el.inner_html());
    let achievement_text = item
        .select(&ITEM_ACHIEVEMENTS)
        .next()
        .map(|el| el.inner_html());

    Some(Game {
        id,
        name,
        tile_url: item
            .select(&BOX_SHOT)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(ToString::to_string),
        total_points: score_text.as_deref().and_then(total_of),
        unlocked_points: score_text.as_deref().and_then(leading_u32),
        total_achievements: achievement_text.as_deref().and_then(total_of),
        unlocked_achievements: achievement_text.as_deref().and_then(leading_u32),
        last_played: None,
    })
}

fn total_of(text: &str) -> Option<u32> {
    TOTAL_RE
        .captures(text)
        .and_then(|captures| captures[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAMES_BODY: &str = r#"<html><head><title>GameCenter</title></head><body>
      <div class="HeaderArea">
        <div class="grid-4">
          <div class="ScoreBlock">
            <img src="http://tiles.example/foo/large.png"/>
            <div class="GamerScore">8545</div>
          </div>
          <div class="ProgressLabel">34% complete</div>
        </div>
      </div>
      <div class="LineItem">
        <h3><a href="/en-US/Activity/Details?titleId=1161890128&compareTo=foo">Halo 3</a></h3>
        <img class="BoxShot" src="http://tiles.example/halo3.png"/>
        <div class="grid-4">
          <div class="GamerScore">980 / 1750</div>
          <div class="Achievement">45 / 79</div>
        </div>
      </div>
      <div class="LineItem">
        <h3><a href="/en-US/Activity/Details?titleId=1297287142&compareTo=foo">Forza 4</a></h3>
        <div class="grid-4">
          <div class="NotPlayed">Not played</div>
        </div>
      </div>
      <div class="LineItem">
        <h3><a href="/en-US/SomethingElse">No Id Game</a></h3>
        <div class="grid-4">
          <div class="GamerScore">10 / 200</div>
        </div>
      </div>
    </body></html>"#;

    fn page() -> Page {
        Page {
            final_url: "http://live.xbox.com/en-US/GameCenter?compareTo=foo".to_string(),
            title: "GameCenter".to_string(),
            body: GAMES_BODY.to_string(),
        }
    }

    #[test]
    fn extracts_header_summary() {
        let library = extract("foo", &page());

        assert_eq!(library.gamertag, "foo");
        assert_eq!(
            library.gamertile_large.as_deref(),
            Some("http://tiles.example/foo/large.png")
        );
        assert_eq!(library.gamerscore, Some(8545));
        assert_eq!(library.progress.as_deref(), Some("34% complete"));
    }

    #[test]
    fn extracts_played_games_with_scores_and_counts() {
        let library = extract("foo", &page());

        assert_eq!(library.games.len(), 1);
        let game = &library.games[0];
        assert_eq!(game.id, 1_161_890_128);
        assert_eq!(game.name, "Halo 3");
        assert_eq!(game.tile_url.as_deref(), Some("http://tiles.example/halo3.png"));
        assert_eq!(game.unlocked_points, Some(980));
        assert_eq!(game.total_points, Some(1750));
        assert_eq!(game.unlocked_achievements, Some(45));
        assert_eq!(game.total_achievements, Some(79));
        assert_eq!(game.last_played, None);
    }

    #[test]
    fn unplayed_and_unidentified_titles_are_skipped() {
        let library = extract("foo", &page());
        // Forza is marked NotPlayed; "No Id Game" has no titleId link.
        assert!(library.games.iter().all(|g| g.name == "Halo 3"));
    }

    #[test]
    fn empty_page_yields_an_empty_library() {
        let empty = Page {
            final_url: "http://live.xbox.com/en-US/GameCenter?compareTo=foo".to_string(),
            title: "GameCenter".to_string(),
            body: "<html><body></body></html>".to_string(),
        };
        let library = extract("foo", &empty);
        assert!(library.games.is_empty());
        assert_eq!(library.gamerscore, None);
    }
}
