//! deep-crawl CLI
//!
//! Generate LLM-ready documentation from websites.
//! Built on headless Chrome with smart defaults for documentation sites.

use anyhow::Result;
use clap::Parser;

mod auth;
mod browser;
mod crawl;
mod crawler;
mod markdown;
mod output;
mod sections;
mod tokens;

use crawl::{run_crawl, CrawlArgs};

#[derive(Parser)]
#[command(name = "deep-crawl")]
#[command(version)]
#[command(about = "Generate LLM-ready documentation from websites")]
#[command(long_about = "Provide a URL and get clean, structured markdown suitable for LLM context.\n\nExamples:\n  deep-crawl https://docs.stripe.com\n  deep-crawl https://api.example.com --sections \"reference,guides\" --auth-header \"Authorization: Bearer token\"\n  deep-crawl https://docs.python.org --exclude-sections \"download,community\"\n  deep-crawl https://internal-docs.com --cookies \"session=abc123\"")]
struct Cli {
    #[command(flatten)]
    args: CrawlArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.args.quiet && cli.args.verbose {
        eprintln!("Error: Cannot use both --quiet and --verbose");
        std::process::exit(1);
    }

    init_tracing(cli.args.verbose);

    run_crawl(cli.args).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "deep_crawl=debug" } else { "deep_crawl=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
