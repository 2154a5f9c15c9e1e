//! Breadth-first documentation crawl over a browser session
//!
//! Fetches the start URL, discovers same-host links, and walks them in
//! breadth-first order until the depth or page budget is exhausted. Each
//! page yields an independent result; one bad page never aborts the batch.

use anyhow::Result;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::browser::BrowserPool;
use crate::markdown::{self, MarkdownOptions};

/// Crawl run configuration, built once from validated CLI input.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub max_depth: usize,
    pub max_pages: usize,
    pub timeout_ms: u64,
    pub js_code: Option<String>,
    pub wait_for: Option<String>,
    /// When set, each successful page is saved as `<prefix>-p<N>.png`.
    pub screenshot_prefix: Option<PathBuf>,
    pub markdown: MarkdownOptions,
    pub progress: bool,
}

/// Result of crawling a single page.
#[derive(Debug, Clone)]
pub struct PageCrawl {
    pub url: String,
    pub success: bool,
    pub markdown: String,
    pub error: Option<String>,
}

impl PageCrawl {
    fn failed(url: &Url, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            markdown: String::new(),
            error: Some(error),
        }
    }
}

/// Crawl a site breadth-first from `start`, producing one result per page.
pub async fn crawl_site(
    pool: &BrowserPool,
    start: &Url,
    config: &CrawlConfig,
) -> Result<Vec<PageCrawl>> {
    let mut results: Vec<PageCrawl> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(Url, usize)> = VecDeque::new();

    visited.insert(normalize_url(start));
    queue.push_back((start.clone(), 0));

    while let Some((url, depth)) = queue.pop_front() {
        if results.len() >= config.max_pages {
            break;
        }
        if config.progress {
            eprintln!("  -> {}", truncate(url.as_str(), 60));
        }
        debug!(url = %url, depth, "fetching page");

        let page = pool.new_page().await?;
        let nav = page.goto(url.as_str(), config.timeout_ms).await?;
        if let Some(err) = nav.error {
            results.push(PageCrawl::failed(&url, err.to_string()));
            continue;
        }
        if let Some(title) = &nav.title {
            debug!(url = %url, title = %title, "page loaded");
        }

        if let Some(selector) = &config.wait_for {
            page.wait_for_selector(selector, config.timeout_ms).await;
        }
        if let Some(js) = &config.js_code {
            if let Err(e) = page.evaluate(js).await {
                debug!(url = %url, error = %e, "custom script failed");
            }
        }

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                results.push(PageCrawl::failed(&url, e.to_string()));
                continue;
            }
        };

        if let Some(prefix) = &config.screenshot_prefix {
            let path = screenshot_path(prefix, results.len() + 1);
            if let Err(e) = page.save_screenshot(&path).await {
                debug!(url = %url, error = %e, "screenshot failed");
            }
        }

        if depth < config.max_depth {
            let links = extract_links(&html, &url);
            debug!(url = %url, count = links.len(), "discovered links");
            for link in links {
                if visited.insert(normalize_url(&link)) {
                    queue.push_back((link, depth + 1));
                }
            }
        }

        match markdown::render(&html, &config.markdown) {
            Ok(md) => results.push(PageCrawl {
                url: url.to_string(),
                success: true,
                markdown: md,
                error: None,
            }),
            Err(e) => results.push(PageCrawl::failed(&url, e.to_string())),
        }
    }

    debug!(pages = results.len(), "crawl finished");
    Ok(results)
}

/// Extract unique same-host http(s) links, fragments stripped.
fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if resolved.host_str() != base.host_str() {
            continue;
        }
        if seen.insert(resolved.to_string()) {
            links.push(resolved);
        }
    }

    links
}

fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

fn screenshot_path(prefix: &Path, index: usize) -> PathBuf {
    PathBuf::from(format!("{}-p{}.png", prefix.display(), index))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_same_host_only() {
        let base = Url::parse("https://docs.example.com/guide/").unwrap();
        let html = r##"
            <a href="https://docs.example.com/api">api</a>
            <a href="intro">relative</a>
            <a href="/reference#anchor">fragment</a>
            <a href="https://other.com/page">external</a>
            <a href="mailto:hi@example.com">mail</a>
        "##;

        let links = extract_links(html, &base);
        let as_strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();

        assert_eq!(
            as_strings,
            vec![
                "https://docs.example.com/api",
                "https://docs.example.com/guide/intro",
                "https://docs.example.com/reference",
            ]
        );
    }

    #[test]
    fn test_extract_links_dedup() {
        let base = Url::parse("https://docs.example.com/").unwrap();
        let html = r##"<a href="/page">one</a><a href="/page#top">two</a><a href="/page">three</a>"##;
        assert_eq!(extract_links(html, &base).len(), 1);
    }

    #[test]
    fn test_normalize_url_strips_fragment() {
        let url = Url::parse("https://docs.example.com/page#section").unwrap();
        assert_eq!(normalize_url(&url), "https://docs.example.com/page");
    }

    #[test]
    fn test_screenshot_path() {
        assert_eq!(
            screenshot_path(Path::new("docs-example-com"), 3),
            PathBuf::from("docs-example-com-p3.png")
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a very long string", 10), "this is...");
    }
}
