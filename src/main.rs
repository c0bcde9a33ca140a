//! scout-search CLI - web search aggregator command line interface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use scout_search::{
    validate_query, Aggregator, AggregatorConfig, Cache, EnhancedSearchOptions, NormalizedResult,
    SafeSearch, SearchDepth, SearchQuery,
};

/// scout-search - aggregate web search results from several engines
#[derive(Parser)]
#[command(name = "scout-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all engines and print ranked results
    Search(SearchArgs),

    /// Search and enrich the top results with page content
    Enhanced(EnhancedArgs),

    /// List available search engines
    Engines,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results to display
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Language code passed to engines that support it (e.g. "de")
    #[arg(long)]
    language: Option<String>,

    /// Safe search level
    #[arg(long, default_value = "moderate")]
    safesearch: SafeSearchArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct EnhancedArgs {
    /// Search query
    query: String,

    /// Number of top results to enrich
    #[arg(short, long, default_value = "3")]
    max_content: usize,

    /// Enrichment depth
    #[arg(short, long, default_value = "moderate")]
    depth: DepthArg,

    /// Skip fetching page content
    #[arg(long)]
    no_content: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[derive(Clone, Copy, ValueEnum)]
enum DepthArg {
    Shallow,
    Moderate,
    Deep,
}

impl From<DepthArg> for SearchDepth {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Shallow => SearchDepth::Shallow,
            DepthArg::Moderate => SearchDepth::Moderate,
            DepthArg::Deep => SearchDepth::Deep,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SafeSearchArg {
    Off,
    Moderate,
    Strict,
}

impl From<SafeSearchArg> for SafeSearch {
    fn from(arg: SafeSearchArg) -> Self {
        match arg {
            SafeSearchArg::Off => SafeSearch::Off,
            SafeSearchArg::Moderate => SafeSearch::Moderate,
            SafeSearchArg::Strict => SafeSearch::Strict,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search(args) => run_search(cli.config, args).await,
        Commands::Enhanced(args) => run_enhanced(cli.config, args).await,
        Commands::Engines => list_engines(),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AggregatorConfig> {
    match path {
        Some(path) => Ok(AggregatorConfig::from_file(&path)?),
        None => Ok(AggregatorConfig::default()),
    }
}

fn build_aggregator(path: Option<PathBuf>) -> Result<Aggregator> {
    let config = load_config(path)?;
    let cache = Arc::new(Cache::from_config(&config.cache));
    let _sweeper = cache.spawn_sweeper();
    Ok(Aggregator::with_default_engines(config, cache)?)
}

fn list_engines() -> Result<()> {
    println!("Available search engines:\n");
    println!("  ddg      - DuckDuckGo (fan-out, first fallback with retries)");
    println!("  bing     - Bing (fan-out, second fallback)");
    println!("  brave    - Brave Search (fan-out, third fallback)");
    println!("  wiki     - Wikipedia (fan-out)");
    println!();
    println!("Usage: scout-search search \"query\"");
    Ok(())
}

async fn run_search(config: Option<PathBuf>, args: SearchArgs) -> Result<()> {
    validate_query(&args.query)?;
    if args.limit == 0 {
        bail!("--limit must be at least 1");
    }
    let aggregator = build_aggregator(config)?;

    let mut query =
        SearchQuery::new(args.query.trim()).with_safesearch(args.safesearch.into());
    if let Some(language) = &args.language {
        query = query.with_language(language);
    }

    let results = aggregator.search_with(&query).await;
    let shown: Vec<_> = results.iter().take(args.limit).collect();

    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results):\n",
                args.query,
                results.len()
            );
            for (i, result) in shown.iter().enumerate() {
                print_result(i + 1, result);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Compact => {
            for result in shown {
                println!("{}\t{}", result.title, result.url);
            }
        }
    }

    Ok(())
}

async fn run_enhanced(config: Option<PathBuf>, args: EnhancedArgs) -> Result<()> {
    validate_query(&args.query)?;
    if args.max_content == 0 && !args.no_content {
        bail!("--max-content must be at least 1 (use --no-content to skip enrichment)");
    }
    let aggregator = build_aggregator(config)?;

    let options = EnhancedSearchOptions {
        fetch_content: !args.no_content,
        max_content_results: args.max_content,
        depth: args.depth.into(),
    };
    let enhanced = aggregator.enhanced_search(&args.query, options).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&enhanced)?),
        OutputFormat::Compact => {
            for result in &enhanced.results {
                println!("{}\t{}", result.title, result.url);
            }
        }
        OutputFormat::Text => {
            if let Some(error) = &enhanced.error {
                eprintln!("Warning: {}", error);
            }
            println!("\nSearch results for \"{}\":\n", args.query);
            for (i, result) in enhanced.results.iter().enumerate() {
                print_result(i + 1, result);
            }

            for enriched in &enhanced.enriched_results {
                println!("== {} ==", enriched.result.url);
                if let Some(summary) = &enriched.insights.summary {
                    println!("   Summary: {}", truncate(summary, 400));
                }
                for heading in &enriched.insights.headings {
                    println!("   {}{}", "  ".repeat(usize::from(heading.level).saturating_sub(1)), heading.text);
                }
                if !enriched.insights.extracted_dates.is_empty() {
                    println!("   Dates: {}", enriched.insights.extracted_dates.join(", "));
                }
                println!();
            }
        }
    }

    Ok(())
}

fn print_result(rank: usize, result: &NormalizedResult) {
    println!("{}. {}", rank, result.title);
    println!("   URL: {}", result.url);
    println!("   {}", truncate(&result.snippet, 150));
    println!(
        "   Source: {} | Category: {:?} | Score: {:.2}",
        result.source, result.category, result.relevance_score
    );
    println!();
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
