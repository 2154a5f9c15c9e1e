//! Markdown generation: HTML cleaning, conversion, and pruning
//!
//! Pages go through three stages: boilerplate elements (and any custom
//! exclude selectors) are stripped from the HTML with a streaming rewrite,
//! the remainder is converted to markdown, and link-dominated blocks under
//! the word threshold are pruned.

use anyhow::{anyhow, Result};
use lol_html::{rewrite_str, ElementContentHandlers, RewriteStrSettings, Selector};
use regex::Regex;
use std::borrow::Cow;

/// Elements never worth keeping in documentation output.
const BOILERPLATE_SELECTORS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "nav", "header", "footer", "aside", "form",
];

/// Content pipeline configuration, built once from CLI input.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Minimum words per content block before the pruning gate applies.
    pub word_threshold: usize,
    pub include_images: bool,
    /// Additional CSS selectors to strip before conversion.
    pub exclude_selectors: Vec<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            word_threshold: 200,
            include_images: false,
            exclude_selectors: Vec::new(),
        }
    }
}

/// Render page HTML to pruned markdown.
pub fn render(html: &str, opts: &MarkdownOptions) -> Result<String> {
    let cleaned = clean_html(html, opts)?;
    let markdown = html2md::parse_html(&cleaned);
    Ok(prune(&markdown, opts.word_threshold))
}

/// Strip boilerplate, custom-selector, and (by default) image elements.
fn clean_html(html: &str, opts: &MarkdownOptions) -> Result<String> {
    let mut selectors: Vec<String> =
        BOILERPLATE_SELECTORS.iter().map(|s| s.to_string()).collect();
    if !opts.include_images {
        selectors.push("img".to_string());
        selectors.push("picture".to_string());
    }
    selectors.extend(opts.exclude_selectors.iter().cloned());

    let mut handlers: Vec<(Cow<'_, Selector>, ElementContentHandlers<'_>)> =
        Vec::with_capacity(selectors.len());
    for sel in &selectors {
        let parsed = sel
            .parse::<Selector>()
            .map_err(|e| anyhow!("Invalid CSS selector {sel:?}: {e}"))?;
        handlers.push((
            Cow::Owned(parsed),
            ElementContentHandlers::default().element(|el: &mut lol_html::html_content::Element| {
                el.remove();
                Ok(())
            }),
        ));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| anyhow!("HTML rewrite failed: {e}"))
}

/// Drop blank-line-separated blocks that are both under the word threshold
/// and link-dominated. Headers and code fences always survive.
fn prune(markdown: &str, word_threshold: usize) -> String {
    if word_threshold == 0 {
        return normalize(markdown);
    }

    let kept: Vec<&str> = markdown
        .split("\n\n")
        .filter(|block| keep_block(block, word_threshold))
        .collect();

    normalize(&kept.join("\n\n"))
}

fn keep_block(block: &str, word_threshold: usize) -> bool {
    let trimmed = block.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.lines().any(|l| l.trim_start().starts_with('#')) {
        return true;
    }
    if trimmed.contains("```") {
        return true;
    }
    if trimmed.split_whitespace().count() >= word_threshold {
        return true;
    }
    link_density(trimmed) <= 0.5
}

/// Fraction of a block's characters inside markdown link syntax.
fn link_density(block: &str) -> f64 {
    let link_re = Regex::new(r"\[[^\]]*\]\([^)]*\)").unwrap();
    let linked: usize = link_re.find_iter(block).map(|m| m.as_str().len()).sum();
    linked as f64 / block.len() as f64
}

fn normalize(markdown: &str) -> String {
    let squeeze_re = Regex::new(r"\n{3,}").unwrap();
    squeeze_re.replace_all(markdown.trim(), "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> MarkdownOptions {
        MarkdownOptions::default()
    }

    #[test]
    fn test_clean_removes_boilerplate() {
        let html = "<html><body><nav>Menu</nav><main><p>Real content</p></main>\
                    <script>var x = 1;</script><footer>Legal</footer></body></html>";
        let cleaned = clean_html(html, &opts()).unwrap();
        assert!(cleaned.contains("Real content"));
        assert!(!cleaned.contains("Menu"));
        assert!(!cleaned.contains("var x"));
        assert!(!cleaned.contains("Legal"));
    }

    #[test]
    fn test_clean_custom_selectors() {
        let html = r#"<div class="sidebar">Sidebar junk</div><p>Body text</p>"#;
        let options = MarkdownOptions {
            exclude_selectors: vec![".sidebar".to_string()],
            ..opts()
        };
        let cleaned = clean_html(html, &options).unwrap();
        assert!(cleaned.contains("Body text"));
        assert!(!cleaned.contains("Sidebar junk"));
    }

    #[test]
    fn test_clean_invalid_selector() {
        let options = MarkdownOptions {
            exclude_selectors: vec![":::bogus:::".to_string()],
            ..opts()
        };
        assert!(clean_html("<p>x</p>", &options).is_err());
    }

    #[test]
    fn test_images_stripped_by_default() {
        let html = r#"<p>Text</p><img src="pic.png" alt="a picture">"#;
        let cleaned = clean_html(html, &opts()).unwrap();
        assert!(!cleaned.contains("img"));

        let options = MarkdownOptions {
            include_images: true,
            ..opts()
        };
        let kept = clean_html(html, &options).unwrap();
        assert!(kept.contains("pic.png"));
    }

    #[test]
    fn test_prune_drops_link_farms_keeps_prose() {
        let nav_block = "[Home](/) [Guides](/guides) [API](/api) [Blog](/blog)";
        let prose = "Authentication requires an API key passed in the request header.";
        let markdown = format!("{nav_block}\n\n{prose}");

        let pruned = prune(&markdown, 200);
        assert!(pruned.contains("Authentication requires"));
        assert!(!pruned.contains("[Home](/)"));
    }

    #[test]
    fn test_prune_keeps_headers_and_code() {
        let markdown = "# Short Header\n\n```\nlet x = [a](b);\n```";
        assert_eq!(prune(markdown, 200), markdown);
    }

    #[test]
    fn test_prune_disabled_at_zero_threshold() {
        let nav_block = "[Home](/) [Guides](/guides)";
        assert_eq!(prune(nav_block, 0), nav_block);
    }

    #[test]
    fn test_render_produces_markdown_headers() {
        let html = "<html><body><h1>Getting Started</h1>\
                    <p>Install the package and configure your key.</p></body></html>";
        let markdown = render(html, &opts()).unwrap();
        assert!(markdown.contains("Getting Started"));
        assert!(markdown.contains("Install the package"));
        assert!(markdown.lines().next().unwrap().starts_with('#'));
    }

    #[test]
    fn test_normalize_squeezes_blank_runs() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
    }
}
