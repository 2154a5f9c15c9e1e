//! crawl command: Generate LLM-ready documentation from a website
//!
//! Sequences the run: translate CLI flags into browser and crawl
//! configuration, drive the crawl, post-process results (section filter,
//! metadata), write the output document, and report statistics.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use url::Url;

use crate::auth::{parse_auth_header, parse_cookies};
use crate::browser::{BrowserPool, SessionOptions};
use crate::crawler::{crawl_site, CrawlConfig};
use crate::markdown::MarkdownOptions;
use crate::output::{format_results, generate_output_filename, CrawlMetadata, RenderedPage};
use crate::sections::{filter_sections, parse_sections};
use crate::tokens::count_tokens;

#[derive(Args)]
pub struct CrawlArgs {
    /// URL to crawl
    pub url: String,

    /// Output file path (default: auto-generated from URL)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum depth to crawl
    #[arg(long, default_value_t = 3)]
    pub max_depth: usize,

    /// Maximum pages to crawl
    #[arg(long, default_value_t = 30)]
    pub max_pages: usize,

    /// Include only these sections (comma-separated, e.g. 'api,reference,guides')
    #[arg(long)]
    pub sections: Option<String>,

    /// Exclude these sections (comma-separated, e.g. 'blog,changelog,download')
    #[arg(long)]
    pub exclude_sections: Option<String>,

    /// Minimum words per content block
    #[arg(long, default_value_t = 200)]
    pub word_threshold: usize,

    /// Include image descriptions and alt text
    #[arg(long)]
    pub include_images: bool,

    /// Additional CSS selectors to exclude (comma-separated)
    #[arg(long)]
    pub custom_exclude_selectors: Option<String>,

    /// Custom authentication header (e.g. 'Authorization: Bearer token')
    #[arg(long)]
    pub auth_header: Option<String>,

    /// Cookie string or JSON cookie file path
    #[arg(long)]
    pub cookies: Option<String>,

    /// Custom user agent string
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Show detailed progress and debug information
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimal output (only errors and final result)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable progress indicators
    #[arg(long)]
    pub no_progress: bool,

    /// Include metadata in the output
    #[arg(long)]
    pub include_metadata: bool,

    /// Custom JavaScript code to execute on each page
    #[arg(long)]
    pub js_code: Option<String>,

    /// CSS selector to wait for before extracting content
    #[arg(long)]
    pub wait_for: Option<String>,

    /// Save screenshots of crawled pages
    #[arg(long)]
    pub screenshot: bool,

    /// Page load timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

/// Run summary, printed to stdout as compact JSON.
#[derive(Debug, Serialize)]
pub struct CrawlSummary {
    pub file: String,
    pub pages_crawled: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub words: usize,
    pub tokens: usize,
    pub bytes: usize,
    pub elapsed_s: f64,
}

/// Run the crawl command.
pub async fn run_crawl(args: CrawlArgs) -> Result<()> {
    let start_url =
        Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;

    let include_list = parse_sections(args.sections.as_deref());
    let exclude_list = parse_sections(args.exclude_sections.as_deref());

    let mut headers = HashMap::new();
    if let Some(raw) = &args.auth_header {
        if let Some((key, value)) = parse_auth_header(raw).surface() {
            headers.insert(key, value);
        }
    }
    let cookies = args
        .cookies
        .as_deref()
        .and_then(|raw| parse_cookies(raw).surface())
        .unwrap_or_default();

    let session = SessionOptions {
        user_agent: args.user_agent.clone(),
        cookies,
        headers,
    };

    let output_file = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(generate_output_filename(&args.url, "markdown")));

    let config = CrawlConfig {
        max_depth: args.max_depth,
        max_pages: args.max_pages,
        // Collaborator boundary works in milliseconds.
        timeout_ms: args.timeout * 1000,
        js_code: args.js_code.clone(),
        wait_for: args.wait_for.clone(),
        screenshot_prefix: args.screenshot.then(|| output_stem(&output_file)),
        markdown: MarkdownOptions {
            word_threshold: args.word_threshold,
            include_images: args.include_images,
            exclude_selectors: args
                .custom_exclude_selectors
                .as_deref()
                .map(parse_selector_list)
                .unwrap_or_default(),
        },
        progress: !args.quiet && !args.no_progress,
    };

    if !args.quiet {
        eprintln!("Starting crawl of {}", args.url);
        eprintln!("Page timeout: {}s", args.timeout);
        if let Some(sections) = &args.sections {
            eprintln!("Including sections: {sections}");
        }
        if let Some(sections) = &args.exclude_sections {
            eprintln!("Excluding sections: {sections}");
        }
    }

    let started = Instant::now();
    let pool = BrowserPool::new(1, session).await?;

    let outcome = tokio::select! {
        outcome = crawl_site(&pool, &start_url, &config) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    // Browser goes down before any error propagates.
    if let Err(e) = pool.close().await {
        debug!(error = %e, "browser close failed");
    }

    let results = match outcome {
        Some(results) => results?,
        None => bail!("Crawl interrupted by user"),
    };
    let elapsed = started.elapsed();

    let pages_crawled = results.len();
    let page_count = results.iter().filter(|r| r.success).count();
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let filtering = !include_list.is_empty() || !exclude_list.is_empty();

    let mut collected: Vec<RenderedPage> = Vec::with_capacity(page_count);
    let mut failed = 0usize;

    for result in results {
        if !result.success {
            failed += 1;
            eprintln!(
                "Crawl failed: {}",
                result.error.as_deref().unwrap_or("Unknown error")
            );
            continue;
        }

        let markdown = if filtering {
            filter_sections(&result.markdown, &include_list, &exclude_list)
        } else {
            result.markdown
        };

        collected.push(RenderedPage {
            markdown,
            metadata: CrawlMetadata {
                url: result.url,
                timestamp: timestamp.clone(),
                page_count,
                strategy: "bfs-deep-crawl".to_string(),
            },
        });
    }

    let words: usize = collected
        .iter()
        .map(|p| p.markdown.split_whitespace().count())
        .sum();

    if !args.quiet {
        eprintln!();
        eprintln!("Crawl completed: {} pages ({} failed)", collected.len(), failed);
        eprintln!("Stats: {} words in {:.1}s", words, elapsed.as_secs_f64());
    }

    let document = format_results(&collected, args.include_metadata);
    let token_count = count_tokens(&document)?;

    tokio::fs::write(&output_file, &document)
        .await
        .with_context(|| format!("Failed to write output to {}", output_file.display()))?;

    if !args.quiet {
        eprintln!("Output saved to: {}", output_file.display());
        eprintln!("File size: {} bytes", document.len());
        eprintln!("Token count: {}", token_count);
    }

    let summary = CrawlSummary {
        file: output_file.display().to_string(),
        pages_crawled,
        pages_ok: collected.len(),
        pages_failed: failed,
        words,
        tokens: token_count,
        bytes: document.len(),
        elapsed_s: elapsed.as_secs_f64(),
    };
    println!("{}", serde_json::to_string(&summary)?);

    Ok(())
}

fn parse_selector_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn output_stem(path: &Path) -> PathBuf {
    path.with_extension("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_list() {
        assert_eq!(
            parse_selector_list(".sidebar, .ad-banner ,"),
            vec![".sidebar".to_string(), ".ad-banner".to_string()]
        );
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(
            output_stem(Path::new("docs-example-com.md")),
            PathBuf::from("docs-example-com")
        );
    }
}
