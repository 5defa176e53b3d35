use crate::{DateCode, Error, Result};
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::LazyLock;

pub const APOD_BASE: &str = "https://apod.nasa.gov";

static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="([^"]*\.(?:jpg|gif|png))">"#).expect("image link pattern is valid")
});

/// Finds the picture a day's page links to.
pub trait ImageLinkExtractor {
    /// Absolute URL of the linked image, `None` when the page has no picture
    /// (video or applet days).
    fn extract(&self, base: &str, html: &str) -> Option<String>;
}

/// Matches the first `<a href="...">` anchor pointing at a jpg, gif or png,
/// written the way apod.nasa.gov writes it.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnchorExtractor;

impl ImageLinkExtractor for AnchorExtractor {
    fn extract(&self, base: &str, html: &str) -> Option<String> {
        let href = IMAGE_LINK.captures(html)?.get(1)?.as_str();
        Some(format!("{}/apod/{}", base.trim_end_matches('/'), href))
    }
}

pub struct ApodClient {
    client: Client,
    base: String,
    extractor: Box<dyn ImageLinkExtractor + Send + Sync>,
}

impl Default for ApodClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApodClient {
    pub fn new() -> Self {
        Self::with_base(APOD_BASE)
    }

    pub fn with_base(base: &str) -> Self {
        Self {
            client: Client::new(),
            base: base.trim_end_matches('/').to_string(),
            extractor: Box::new(AnchorExtractor),
        }
    }

    pub fn with_extractor(mut self, extractor: impl ImageLinkExtractor + Send + Sync + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn page_url(&self, date: DateCode) -> String {
        format!("{}/apod/ap{}.html", self.base, date)
    }

    pub async fn fetch_page(&self, date: DateCode) -> Result<Option<String>> {
        let url = self.page_url(date);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("No APOD page at {url}");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Http { url, status });
        }

        Ok(Some(response.text().await?))
    }

    pub async fn image_url(&self, date: DateCode) -> Result<Option<String>> {
        Ok(self
            .fetch_page(date)
            .await?
            .and_then(|html| self.extractor.extract(&self.base, &html)))
    }

    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
