use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Result of fetching a page and looking for a credential form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    LoginForm,
    NoMatch,
    /// The request itself failed; unreachable pages are scored like login pages
    FetchError,
}

impl ProbeOutcome {
    pub fn is_risky(&self) -> bool {
        matches!(self, ProbeOutcome::LoginForm | ProbeOutcome::FetchError)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbeOutcome::LoginForm => "login form",
            ProbeOutcome::NoMatch => "no match",
            ProbeOutcome::FetchError => "fetch error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        // Only successful pages are inspected, skip downloading the rest
        let body = if status.is_success() {
            response.text().await?
        } else {
            String::new()
        };

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}

/// True when the document has a `<form>` and its text mentions "login"
pub fn looks_like_login_page(html: &str) -> bool {
    let document = Html::parse_document(html);

    let has_form = match Selector::parse("form") {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    };
    if !has_form {
        return false;
    }

    let text: String = document.root_element().text().collect();
    text.to_lowercase().contains("login")
}

pub struct LiveContentProber {
    fetcher: Arc<dyn PageFetcher>,
}

impl LiveContentProber {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.fetcher.fetch(url).await {
            Ok(page) if page.is_success() && looks_like_login_page(&page.body) => {
                log::debug!("Login form found at {url}");
                ProbeOutcome::LoginForm
            }
            Ok(page) => {
                log::debug!("No login form at {url} (status {})", page.status);
                ProbeOutcome::NoMatch
            }
            Err(e) => {
                log::warn!("Content probe failed for {url}: {e}");
                ProbeOutcome::FetchError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct StaticFetcher {
        page: Option<FetchedPage>,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage> {
            self.page.clone().ok_or_else(|| anyhow!("operation timed out"))
        }
    }

    fn prober(status: u16, body: &str) -> LiveContentProber {
        LiveContentProber::new(Arc::new(StaticFetcher {
            page: Some(FetchedPage {
                status,
                body: body.to_string(),
            }),
        }))
    }

    const LOGIN_PAGE: &str = r#"<html><body><h1>Account LOGIN</h1>
        <form action="/auth"><input name="user"><input type="password"></form>
        </body></html>"#;

    #[test]
    fn test_looks_like_login_page() {
        assert!(looks_like_login_page(LOGIN_PAGE));
        assert!(looks_like_login_page(
            "<form><button>Log</button><span>in</span></form>"
        ));
        assert!(!looks_like_login_page("<p>Please login below</p>"));
        assert!(!looks_like_login_page("<form><input name='q'>Search</form>"));
        assert!(!looks_like_login_page(""));
    }

    #[tokio::test]
    async fn test_probe_outcomes() {
        assert_eq!(prober(200, LOGIN_PAGE).probe("https://x.io").await, ProbeOutcome::LoginForm);
        assert_eq!(prober(204, LOGIN_PAGE).probe("https://x.io").await, ProbeOutcome::LoginForm);
        assert_eq!(prober(200, "<p>hello</p>").probe("https://x.io").await, ProbeOutcome::NoMatch);
        // Error statuses are not failures, just no match
        assert_eq!(prober(404, LOGIN_PAGE).probe("https://x.io").await, ProbeOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_fetch_error_is_risky() {
        let prober = LiveContentProber::new(Arc::new(StaticFetcher { page: None }));
        let outcome = prober.probe("https://unreachable.invalid").await;

        assert_eq!(outcome, ProbeOutcome::FetchError);
        assert!(outcome.is_risky());
        assert!(ProbeOutcome::LoginForm.is_risky());
        assert!(!ProbeOutcome::NoMatch.is_risky());
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_scheme_less_url() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), "phishscan-test").unwrap();
        assert!(fetcher.fetch("paypal.com").await.is_err());
    }
}
