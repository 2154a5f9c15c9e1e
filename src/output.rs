//! Output document assembly and file naming

use url::Url;

/// Metadata attached to each successful crawl result.
#[derive(Debug, Clone)]
pub struct CrawlMetadata {
    pub url: String,
    pub timestamp: String,
    pub page_count: usize,
    pub strategy: String,
}

/// A crawled page ready for output.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub markdown: String,
    pub metadata: CrawlMetadata,
}

/// Concatenate results into a single document, each optionally prefixed
/// with its metadata header block. Results are joined by a blank line.
pub fn format_results(pages: &[RenderedPage], include_metadata: bool) -> String {
    pages
        .iter()
        .map(|page| {
            if include_metadata {
                let m = &page.metadata;
                format!(
                    "# Documentation Crawl Report\n\n\
                     **Source:** {}\n\
                     **Crawled:** {}\n\
                     **Pages:** {}\n\
                     **Strategy:** {}\n\n\
                     ---\n\n\
                     {}",
                    m.url, m.timestamp, m.page_count, m.strategy, page.markdown
                )
            } else {
                page.markdown.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Derive an output filename from the target URL: strip `www.`, turn dots
/// into hyphens, drop everything that is not a word character or hyphen,
/// and prefix `docs-` unless the domain already mentions docs.
pub fn generate_output_filename(url: &str, format: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "output".to_string());

    let domain: String = host
        .replace("www.", "")
        .replace('.', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    let domain = if domain.contains("docs") {
        domain
    } else {
        format!("docs-{domain}")
    };

    let extension = match format {
        "json" => "json",
        "xml" => "xml",
        _ => "md",
    };

    format!("{domain}.{extension}")
}
