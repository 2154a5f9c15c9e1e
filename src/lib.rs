//! deep-crawl: Generate LLM-ready documentation from websites
//!
//! Drives headless Chrome to crawl a documentation site breadth-first and
//! emit a single markdown document suitable for LLM context, with optional
//! section filtering and authentication.

pub mod auth;
pub mod browser;
pub mod crawl;
pub mod crawler;
pub mod markdown;
pub mod output;
pub mod sections;
pub mod tokens;

pub use auth::{parse_auth_header, parse_cookies, Cookie, CookieSource, ParseOutcome};
pub use crawler::{crawl_site, CrawlConfig, PageCrawl};
pub use output::{format_results, generate_output_filename, CrawlMetadata, RenderedPage};
pub use sections::{filter_sections, parse_sections};
