//! Error types and result alias for xbl-core operations.
//!
//! The taxonomy mirrors the failure modes of scraping an authenticated site
//! that offers no formal API:
//!
//! - **Network**: transport failures (connect, timeout, TLS) — never retried
//!   by this crate; callers may retry `get_page` at a higher level.
//! - **Authentication**: the login protocol failed at some step. Every
//!   step-level failure is carried as a [`LoginError`] inside the single
//!   `Authentication` variant, so callers handle one variant while logs and
//!   matches can still distinguish which step broke.
//! - **UnexpectedRedirect**: the final response URL does not match the
//!   requested URL — the site served something other than what was asked
//!   for, and accepting it would corrupt downstream extraction.
//! - **Parse**: page markup or an embedded payload no longer matches the
//!   documented extraction contract.
//!
//! None of these are retried automatically. A login wall is a hard stop for
//! the request; blind retries against it risk account lockouts.

use thiserror::Error;

/// The main error type for xbl-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed (configuration file access).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers HTTP requests issued by the agent: connection failures,
    /// timeouts, TLS errors, and non-success status codes. The underlying
    /// `reqwest::Error` is preserved for detailed inspection.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The login protocol failed.
    ///
    /// Surfaced by `get_page` for any failure inside the multi-step login
    /// sequence. The wrapped [`LoginError`] says which step broke.
    #[error("Authentication failed: {0}")]
    Authentication(#[from] LoginError),

    /// The final fetched URL does not match the requested URL.
    ///
    /// The remote site redirected to something other than the requested
    /// page (an error page, a different locale, ...). Fatal for the call;
    /// the cache is never populated from a mismatched response.
    #[error("Unexpected redirect: requested '{requested}', received '{received}'")]
    UnexpectedRedirect {
        /// URL the caller asked for.
        requested: String,
        /// URL the response actually came from.
        received: String,
    },

    /// Page content does not match the documented extraction contract.
    ///
    /// Raised by the content extractors when a selector, marker string, or
    /// embedded payload field is missing or malformed. Signals that the
    /// extraction rules are stale relative to the live site.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failed (JSON payloads, TOML config).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// URL is malformed or cannot be resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Step-level failures of the login protocol.
///
/// These are always wrapped in [`Error::Authentication`] on the way out of
/// the session manager. They are kept distinct because each one means
/// something different operationally: `FormMissing` and `FallbackMissing`
/// mean the identity provider changed its page layout (the extraction rules
/// are stale), while `Rejected` means the protocol ran to completion and the
/// site still served the sign-in wall (bad credentials, most likely).
#[derive(Error, Debug)]
pub enum LoginError {
    /// The sign-in page does not contain the expected embedded field.
    #[error("sign-in page does not expose the {0}")]
    FormMissing(&'static str),

    /// The post-credentials response has no non-script fallback form.
    #[error("post-login response does not contain the '{0}' fallback form")]
    FallbackMissing(&'static str),

    /// The full protocol ran, yet the retried fetch still hit the sign-in
    /// page. Never retried: a second attempt would loop against the wall.
    #[error("still on the sign-in page after completing the login protocol")]
    Rejected,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry at a higher
    /// level.
    ///
    /// Transport-level failures (timeouts, connection resets) are typically
    /// transient. Everything else in this taxonomy is permanent for the
    /// current site state: stale extraction rules or bad credentials do not
    /// fix themselves on retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_timeout() || err.is_connect(),
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Stable category name for logging and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Authentication(_) => "authentication",
            Self::UnexpectedRedirect { .. } => "redirect",
            Self::Parse(_) => "parse",
            Self::Serialization(_) => "serialization",
            Self::InvalidUrl(_) => "url",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_wraps_login_error() {
        let err = Error::from(LoginError::FormMissing("form token"));
        assert!(matches!(
            err,
            Error::Authentication(LoginError::FormMissing("form token"))
        ));
        assert_eq!(err.category(), "authentication");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn redirect_error_reports_both_urls() {
        let err = Error::UnexpectedRedirect {
            requested: "http://example.com/a".to_string(),
            received: "http://example.com/error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/a"));
        assert!(msg.contains("/error"));
        assert_eq!(err.category(), "redirect");
    }

    #[test]
    fn io_timeout_is_recoverable() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"));
        assert!(err.is_recoverable());

        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn parse_errors_are_permanent() {
        let err = Error::Parse("missing div.Gamerscore".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), "parse");
    }
}
