//! Headless Chrome session management via chromiumoxide

use anyhow::{anyhow, Context, Result};
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::auth::Cookie;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-session identity and authentication settings, applied to every page.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub user_agent: Option<String>,
    pub cookies: Vec<Cookie>,
    pub headers: HashMap<String, String>,
}

/// Navigation failure classes surfaced by Chrome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("DNS resolution failed")]
    DnsFailed,
    #[error("connection refused")]
    ConnectionRefused,
    #[error("connection timed out")]
    ConnectionTimedOut,
    #[error("TLS error")]
    Tls,
    #[error("navigation timeout after {0}ms")]
    NavigationTimeout(u64),
    #[error("network error: {0}")]
    Network(String),
}

impl NavError {
    fn classify(error: &str) -> Self {
        if error.contains("ERR_NAME_NOT_RESOLVED") {
            NavError::DnsFailed
        } else if error.contains("ERR_CONNECTION_REFUSED") {
            NavError::ConnectionRefused
        } else if error.contains("ERR_CONNECTION_TIMED_OUT") {
            NavError::ConnectionTimedOut
        } else if error.contains("ERR_CERT") || error.contains("SSL") {
            NavError::Tls
        } else {
            NavError::Network(error.to_string())
        }
    }
}

/// Result of a page navigation.
#[derive(Debug)]
pub struct Navigation {
    pub title: Option<String>,
    pub error: Option<NavError>,
}

/// Browser pool with a fixed tab concurrency limit.
pub struct BrowserPool {
    browser: Browser,
    semaphore: Arc<Semaphore>,
    session: SessionOptions,
}

impl BrowserPool {
    /// Launch a headless browser for the run.
    pub async fn new(concurrency: usize, session: SessionOptions) -> Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-setuid-sandbox")
            .arg("--no-first-run")
            .arg("--headless=new")
            .build()
            .map_err(|e| anyhow!("Browser config error: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch Chrome. Is Chrome/Chromium installed?")?;

        // Spawn handler in background
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self {
            browser,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            session,
        })
    }

    /// Get a new page with the session's identity settings applied.
    pub async fn new_page(&self) -> Result<BrowserPage> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        let page = self.browser.new_page("about:blank").await?;

        let user_agent = self
            .session
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);
        page.execute(SetUserAgentOverrideParams::new(user_agent))
            .await?;

        if !self.session.headers.is_empty() {
            let headers = serde_json::to_value(&self.session.headers)?;
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
                .await?;
        }

        Ok(BrowserPage {
            page,
            cookies: self.session.cookies.clone(),
            _permit: permit,
        })
    }

    /// Close the browser.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// A browser page with automatic permit release.
pub struct BrowserPage {
    page: Page,
    cookies: Vec<Cookie>,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl BrowserPage {
    /// Navigate to URL, applying session cookies first.
    pub async fn goto(&self, url: &str, timeout_ms: u64) -> Result<Navigation> {
        self.apply_cookies(url).await?;

        let nav_result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        match nav_result {
            Ok(Ok(_)) => {
                let title = self.page.get_title().await.ok().flatten();
                Ok(Navigation { title, error: None })
            }
            Ok(Err(e)) => Ok(Navigation {
                title: None,
                error: Some(NavError::classify(&e.to_string())),
            }),
            Err(_) => Ok(Navigation {
                title: None,
                error: Some(NavError::NavigationTimeout(timeout_ms)),
            }),
        }
    }

    /// Cookies without a domain are scoped to the target URL.
    async fn apply_cookies(&self, url: &str) -> Result<()> {
        if self.cookies.is_empty() {
            return Ok(());
        }

        let params = self
            .cookies
            .iter()
            .map(|cookie| {
                let mut builder = CookieParam::builder()
                    .name(&cookie.name)
                    .value(&cookie.value);
                if cookie.domain.is_empty() {
                    builder = builder.url(url);
                } else {
                    builder = builder.domain(&cookie.domain);
                }
                if !cookie.path.is_empty() {
                    builder = builder.path(&cookie.path);
                }
                builder
                    .build()
                    .map_err(|e| anyhow!("Invalid cookie {}: {}", cookie.name, e))
            })
            .collect::<Result<Vec<_>>>()?;

        self.page.set_cookies(params).await?;
        Ok(())
    }

    /// Get page content (for markdown generation).
    pub async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .context("Failed to get page content")
    }

    /// Execute custom JavaScript on the page.
    pub async fn evaluate(&self, js: &str) -> Result<()> {
        self.page
            .evaluate(js)
            .await
            .context("JavaScript evaluation failed")?;
        Ok(())
    }

    /// Poll for a selector until it appears or the deadline passes.
    /// Returns whether the selector was found.
    pub async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                debug!(selector, "wait-for selector never appeared");
                return false;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    /// Save a full-page PNG screenshot.
    pub async fn save_screenshot(&self, path: &Path) -> Result<()> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .with_context(|| format!("Failed to save screenshot {}", path.display()))?;
        Ok(())
    }
}
