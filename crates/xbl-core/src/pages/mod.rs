//! Content extractors: raw [`Page`](crate::agent::Page) bodies in, domain
//! entities out.
//!
//! Extractors are stateless functions over page content. They carry no
//! refresh-age bookkeeping of their own — the session manager's page cache
//! is the single caching layer — and they never fetch; the body they get is
//! the body they work with.
//!
//! Two consumed formats exist: HTML addressed by CSS selectors (profile and
//! compare-games pages) and an embedded JSON payload located by a literal
//! marker string (achievement-compare page).

/// Achievement-compare page: embedded JSON payload
pub mod achievements;
/// Compare-games page: per-title line items plus header summary
pub mod games;
/// Profile page: general player information
pub mod profile;

/// Parse the leading decimal digits of `text`, ignoring anything after
/// them. The site renders scores as e.g. `"120 / 1000"`.
pub(crate) fn leading_u32(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
