//! mdharvest CLI - crawl a documentation site into a Markdown corpus

use clap::Parser;
use mdharvest::scrape::{DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES};
use mdharvest::{filename, ScrapeOptions, ScrapeSummary, Scraper};
use std::io::{self, IsTerminal as _, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// mdharvest - scrape a documentation site into size-bounded Markdown files
#[derive(Parser, Debug)]
#[command(name = "mdharvest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed URLs to crawl (same-domain links, one hop per seed)
    #[arg(required = true)]
    seeds: Vec<String>,

    /// Output directory (default: derived from the first seed's domain)
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Maximum pages to convert in one run
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Concurrent fetch/convert workers
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&cli.seeds[0]));

    let mut options = ScrapeOptions::new(output_dir)
        .max_pages(cli.max_pages)
        .concurrency(cli.concurrency);
    if let Some(ua) = cli.user_agent.clone() {
        options = options.user_agent(ua);
    }

    match Scraper::new(options).run(&cli.seeds).await {
        Ok(summary) => report(&summary, cli.json),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Output directory for a seed when none was given, like
/// `docs.example.org` for `https://docs.example.org/guide`
fn default_output_dir(seed: &str) -> PathBuf {
    Url::parse(seed)
        .map(|u| PathBuf::from(filename::dir_name_for_seed(&u)))
        .unwrap_or_else(|_| PathBuf::from("output"))
}

fn report(summary: &ScrapeSummary, json: bool) {
    if json {
        let out = serde_json::to_string_pretty(summary).unwrap_or_else(|e| {
            eprintln!("Error serializing summary: {e}");
            std::process::exit(1);
        });
        writeln_safe(&out);
        return;
    }

    if summary.nothing_extracted() {
        writeln_safe(&format!(
            "No content was extracted ({} page(s) failed)",
            summary.failed
        ));
        return;
    }

    writeln_safe(&format!(
        "Done: {} page(s) processed, {} failed\n{} batch file(s) and {} individual file(s) written to {}",
        summary.processed,
        summary.failed,
        summary.batches,
        summary.standalones,
        summary.output_dir.display()
    ));
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
