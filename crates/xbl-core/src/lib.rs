//! # xbl-core
//!
//! Authenticated fetch engine and content extractors for the Xbox Live web
//! site, which offers no formal API. The crate manages a signed-in session
//! against the site, transparently re-authenticates when the session
//! lapses, caches fetched pages to bound request volume, and extracts
//! structured records (profile, game list, achievements) from page content.
//!
//! ## Architecture
//!
//! - **Session manager** ([`SessionManager`]): the core — fetch or reuse
//!   from cache, detect the sign-in wall by page title, drive the
//!   multi-step login protocol, retry the original request exactly once.
//! - **Page cache** ([`PageCache`]): URL-keyed in-memory store with TTL
//!   freshness; a URL is never re-fetched within the freshness window.
//! - **HTTP agent** ([`HttpAgent`]): cookie-jarred `reqwest` wrapper that
//!   follows redirects and exposes GET, form POST, and form submission.
//! - **Extractors** ([`pages`]): stateless functions turning raw page
//!   bodies into [`Profile`], [`GameLibrary`], and [`Achievement`] records.
//! - **Client facade** ([`XblClient`]): one session plus a [`Registry`] of
//!   the latest extracted entities.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use xbl_core::{Config, Result, XblClient};
//!
//! # async fn run() -> Result<()> {
//! let config = Config::new("you@example.com", "password");
//! let mut client = XblClient::new(config)?;
//!
//! let profile = client.profile("major nelson").await?;
//! println!("gamerscore: {:?}", profile.gamerscore);
//!
//! let library = client.games("major nelson").await?;
//! for game in &library.games {
//!     println!("{}: {:?}/{:?}", game.name, game.unlocked_points, game.total_points);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency model
//!
//! One session manager wraps one authenticated identity, one cookie jar,
//! and one cache, for sequential use (`get_page` takes `&mut self`). To
//! track several identities, create one manager per credential set;
//! nothing is shared between instances.

/// HTTP agent wrapping `reqwest` with a cookie jar and redirect following
pub mod agent;
/// URL-keyed in-memory page cache with TTL freshness
pub mod cache;
/// High-level client facade over session, extractors and registry
pub mod client;
/// Session configuration and canonical URL builders
pub mod config;
/// Error types and result alias
pub mod error;
mod login;
/// Content extractors for the profile, games and achievements pages
pub mod pages;
/// Explicit registry of extracted entities
pub mod registry;
/// The authenticated-fetch state machine
pub mod session;
/// Domain entities extracted from page content
pub mod types;

// Re-export commonly used types
pub use agent::{Form, HttpAgent, Page};
pub use cache::PageCache;
pub use client::XblClient;
pub use config::Config;
pub use error::{Error, LoginError, Result};
pub use registry::Registry;
pub use session::SessionManager;
pub use types::{Achievement, Game, GameAchievements, GameLibrary, Profile, UnlockedState};
