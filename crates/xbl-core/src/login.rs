//! The multi-step Windows Live login protocol.
//!
//! The identity provider expects a browser that executes its scripts; this
//! module walks the documented non-script path instead:
//!
//! 1. Pull the POST target out of the sign-in page's `srf_uPost='…'`
//!    snippet, and the PPFT token out of the `value="…"` attribute embedded
//!    in the `srf_sFT='…'` snippet. Either missing means the provider
//!    changed its page layout — fatal, retrying blindly would not help.
//! 2. POST the credentials with the fixed protocol constants and the token.
//! 3. The response is an "enable scripting" interstitial carrying a hidden
//!    fallback form named `fmHF`; submit it unchanged to complete sign-in.
//!
//! No step is retried. The first failure aborts the whole attempt and the
//! session manager surfaces it as a single authentication error.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::agent::{HttpAgent, Page};
use crate::error::LoginError;
use crate::{Config, Result};

/// Title of the identity provider's sign-in page. This is the sole oracle
/// for "must log in" — see `SessionManager::is_login_page`.
pub(crate) const LOGIN_PAGE_TITLE: &str = "Welcome to Windows Live";

/// Name of the non-script fallback form on the interstitial page.
pub(crate) const FALLBACK_FORM_NAME: &str = "fmHF";

static POST_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"srf_uPost='([^']+)").unwrap());
static FT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"srf_sFT='([^']+)").unwrap());
static VALUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"value="([^"]+)"#).unwrap());

/// Run the full login protocol starting from a fetched sign-in page.
///
/// Returns the page the provider lands on after the fallback submission.
/// The session manager does not rely on that landing page being the
/// originally requested one — it re-fetches explicitly.
pub(crate) async fn login(agent: &HttpAgent, config: &Config, sign_in: &Page) -> Result<Page> {
    let (post_url, ppft) = extract_sign_in_form(&sign_in.body)?;
    debug!(post_url = %post_url, "posting credentials");

    // Protocol constants figured out against the live provider; they are
    // part of the wire contract, not tunables.
    let params = [
        ("login", config.username.as_str()),
        ("passwd", config.password.as_str()),
        ("type", "11"),
        ("LoginOptions", "3"),
        ("NewUser", "1"),
        ("PPSX", "Passpor"),
        ("PPFT", ppft.as_str()),
        ("idshbo", "1"),
    ];
    let interstitial = agent.post(&post_url, &params).await?;

    let fallback = interstitial
        .form(FALLBACK_FORM_NAME)
        .ok_or(LoginError::FallbackMissing(FALLBACK_FORM_NAME))?;
    info!("submitting non-script fallback form");
    agent.submit(&fallback).await
}

/// Extract the credential POST target and the PPFT token from the sign-in
/// page body.
fn extract_sign_in_form(body: &str) -> std::result::Result<(String, String), LoginError> {
    let post_url = POST_URL_RE
        .captures(body)
        .map(|captures| captures[1].to_string())
        .ok_or(LoginError::FormMissing("credential post target"))?;

    // The srf_sFT snippet holds an HTML fragment; the token is that
    // fragment's value attribute.
    let ppft = FT_RE
        .captures(body)
        .and_then(|captures| VALUE_RE.captures(&captures[1]).map(|v| v[1].to_string()))
        .ok_or(LoginError::FormMissing("form token"))?;

    Ok((post_url, ppft))
}
