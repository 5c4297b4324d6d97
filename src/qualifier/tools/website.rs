// SPDX-License-Identifier: MIT

//! Company website title lookup
//!
//! Fetches `https://{domain}` and returns the page `<title>`. Failures are
//! folded into descriptive strings so enrichment never fails.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::llm::error::Result;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

pub const NO_TITLE: &str = "No title tag found on homepage.";
pub const TIMED_OUT: &str = "Could not scrape website: The request timed out.";
const FAILURE_PREFIX: &str = "Could not scrape website:";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector is valid"));

/// Looks up a human-readable title for a company domain. Never fails.
#[async_trait]
pub trait TitleLookup: Send + Sync {
    async fn lookup_title(&self, domain: &str) -> String;
}

/// Extract the trimmed text of the first `<title>` element
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Title lookup over HTTPS using a browser-like client
pub struct HttpTitleLookup {
    client: Client,
}

impl HttpTitleLookup {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_html(&self, url: Url) -> std::result::Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl TitleLookup for HttpTitleLookup {
    async fn lookup_title(&self, domain: &str) -> String {
        let url = match Url::parse(&format!("https://{}", domain)) {
            Ok(url) => url,
            Err(e) => return format!("{} {}", FAILURE_PREFIX, e),
        };

        match self.fetch_html(url).await {
            Ok(html) => extract_title(&html).unwrap_or_else(|| NO_TITLE.to_string()),
            Err(e) if e.is_timeout() => {
                log::warn!("Website lookup for {} timed out", domain);
                TIMED_OUT.to_string()
            }
            Err(e) => {
                log::warn!("Website lookup for {} failed: {}", domain, e);
                format!("{} {}", FAILURE_PREFIX, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>\n  Acme Corp | AI Tools \n</title></head><body></body></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Acme Corp | AI Tools"));
    }

    #[test]
    fn test_extract_title_first_wins() {
        let html = "<html><head><title>First</title><title>Second</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("First"));
    }

    #[test]
    fn test_extract_title_missing_or_empty() {
        assert_eq!(extract_title("<html><body><h1>Hi</h1></body></html>"), None);
        assert_eq!(extract_title("<html><head><title>   </title></head></html>"), None);
        assert_eq!(extract_title(""), None);
    }

    #[tokio::test]
    async fn test_lookup_times_out_with_sentinel() {
        // Accept connections but never answer the TLS handshake
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let lookup = HttpTitleLookup::new(Duration::from_millis(300)).unwrap();
        let title = lookup.lookup_title(&addr.to_string()).await;
        assert_eq!(title, TIMED_OUT);
    }

    #[tokio::test]
    async fn test_lookup_connection_failure_is_described() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let lookup = HttpTitleLookup::new(Duration::from_secs(2)).unwrap();
        let title = lookup.lookup_title(&addr.to_string()).await;
        assert!(title.starts_with(FAILURE_PREFIX), "got: {}", title);
        assert_ne!(title, TIMED_OUT);
    }

    #[tokio::test]
    async fn test_lookup_invalid_domain_is_described() {
        let lookup = HttpTitleLookup::new(Duration::from_secs(1)).unwrap();
        let title = lookup.lookup_title("bad domain with spaces").await;
        assert!(title.starts_with(FAILURE_PREFIX), "got: {}", title);
    }
}
