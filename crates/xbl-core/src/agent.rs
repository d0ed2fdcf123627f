//! HTTP agent: a thin, retry-free wrapper over `reqwest`.
//!
//! The agent issues GET and POST requests, follows redirects transparently
//! (the live site routes unauthenticated requests to its login page via
//! redirects), and keeps a cookie jar so the authenticated session survives
//! across requests — the login protocol is entirely cookie-borne.
//!
//! Every operation resolves to a [`Page`]: the final URL after redirects,
//! the document title, and the raw body. Retry logic lives one layer up in
//! the session manager; transport failures surface as [`Error::Network`]
//! untouched.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").unwrap());
static INPUT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input").unwrap());

/// Input types that only submit when a user clicks them.
const NON_DATA_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image", "file"];

/// A fetched page: final URL after redirects, document title, raw body.
///
/// Immutable once produced; this is the unit the cache stores and the
/// content extractors consume.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL the response actually came from, after redirect following.
    pub final_url: String,
    /// Text of the document's `<title>`, trimmed; empty if absent.
    pub title: String,
    /// Raw response body.
    pub body: String,
}

impl Page {
    /// Find a named `<form>` in the page body.
    ///
    /// Returns the form's submit target (its `action`, resolved against the
    /// page URL when relative) and its data fields, unchanged and in
    /// document order. Click-only inputs (submit buttons and friends) are
    /// not data fields and are skipped. A form without an `action` submits
    /// back to the page URL.
    #[must_use]
    pub fn form(&self, name: &str) -> Option<Form> {
        let selector = Selector::parse(&format!("form[name=\"{name}\"]")).ok()?;
        let document = Html::parse_document(&self.body);
        let form = document.select(&selector).next()?;

        let action = match form.value().attr("action") {
            Some(action) if !action.is_empty() => Url::parse(&self.final_url)
                .and_then(|base| base.join(action))
                .map_or_else(|_| action.to_string(), |url| url.to_string()),
            _ => self.final_url.clone(),
        };

        let fields = form
            .select(&INPUT_SELECTOR)
            .filter(|input| {
                input
                    .value()
                    .attr("type")
                    .is_none_or(|t| !NON_DATA_INPUT_TYPES.contains(&t.to_ascii_lowercase().as_str()))
            })
            .filter_map(|input| {
                let field_name = input.value().attr("name")?;
                let value = input.value().attr("value").unwrap_or_default();
                Some((field_name.to_string(), value.to_string()))
            })
            .collect();

        Some(Form { name: name.to_string(), action, fields })
    }
}

/// A form lifted out of a [`Page`], ready to be submitted unchanged.
#[derive(Debug, Clone)]
pub struct Form {
    /// The `name` attribute the form was looked up by.
    pub name: String,
    /// Absolute submit target.
    pub action: String,
    /// Data fields in document order.
    pub fields: Vec<(String, String)>,
}

/// HTTP client with cookie jar and transparent redirect following.
pub struct HttpAgent {
    client: Client,
}

impl HttpAgent {
    /// Create an agent with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create an agent with a custom request timeout (primarily for tests).
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("xbl-core/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .gzip(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// GET `url`, following redirects.
    pub async fn get(&self, url: &str) -> Result<Page> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let page = Self::into_page(response).await?;
        info!(url, final_url = %page.final_url, title = %page.title, "fetched");
        Ok(page)
    }

    /// POST `fields` to `url` as an urlencoded form, following redirects.
    pub async fn post<T>(&self, url: &str, fields: &T) -> Result<Page>
    where
        T: Serialize + ?Sized,
    {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await?
            .error_for_status()?;
        Self::into_page(response).await
    }

    /// Submit a form with its fields unchanged.
    pub async fn submit(&self, form: &Form) -> Result<Page> {
        debug!(form = %form.name, action = %form.action, "submitting form");
        self.post(&form.action, &form.fields).await
    }

    async fn into_page(response: reqwest::Response) -> Result<Page> {
        let final_url = response.url().to_string();
        let body = response.text().await?;
        let title = extract_title(&body);
        Ok(Page {
            final_url,
            title,
            body,
        })
    }
}

fn extract_title(body: &str) -> String {
    let document = Html::parse_document(body);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
