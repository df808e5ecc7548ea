use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, anyhow};
use apod_core::{
    ApodClient, ApodConfig, ApodResponse, ExtractConfig, HttpFetcher, JsonConfig, JsonFileStore, MarkdownConfig,
    OutputFormat, RecordCache, TextConfig, convert_to_json, convert_to_markdown, convert_to_text, fetch_file,
    fetch_stdin, parse_date, parse_page, resolve_current_date,
};
use chrono::Utc;
use chrono_tz::Tz;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{
    format_size, print_banner, print_info, print_record_summary, print_step, print_success, print_timing,
    print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch Astronomy Picture of the Day entries as structured records
#[derive(Parser, Debug)]
#[command(name = "apod")]
#[command(version)]
#[command(about = "Fetch Astronomy Picture of the Day entries as structured records", long_about = None)]
struct Args {
    /// Date to fetch (YYYY-MM-DD), or the first date of a range with --end.
    /// Defaults to the latest entry.
    #[arg(value_name = "DATE")]
    date: Option<String>,

    /// Last date of an inclusive range (requires DATE)
    #[arg(short, long, value_name = "DATE", requires = "date")]
    end: Option<String>,

    /// Parse a saved page instead of fetching: a file path or "-" for stdin
    #[arg(long, value_name = "FILE", conflicts_with = "end")]
    file: Option<String>,

    /// Output format (json, markdown, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Include TOML frontmatter (Markdown only)
    #[arg(long)]
    frontmatter: bool,

    /// Include a reference table of explanation links (Markdown only)
    #[arg(long)]
    references: bool,

    /// Wrap explanation text at this width, 0 to disable (text only)
    #[arg(long, default_value = "80", value_name = "COLS")]
    width: usize,

    /// Flatten explanation links to plain text
    #[arg(long)]
    no_links: bool,

    /// Cache file location (default: user cache directory)
    #[arg(long, value_name = "FILE", conflicts_with = "no_cache")]
    cache_file: Option<PathBuf>,

    /// Keep the cache in memory only
    #[arg(long)]
    no_cache: bool,

    /// Prefix prepended to every page URL (e.g. a CORS relay)
    #[arg(long, value_name = "URL")]
    relay: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Maximum concurrent requests per range group
    #[arg(long, default_value = "5", value_name = "NUM")]
    concurrency: usize,

    /// Timezone that decides which day is the latest
    #[arg(long, default_value = "America/Detroit", value_name = "TZ")]
    timezone: String,

    /// Local hour before which the latest entry is still yesterday's
    #[arg(long, default_value = "5", value_name = "HOUR")]
    rollover_hour: u32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,apod_core={level},apod={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("tracing setup failed: {e}"))
}

fn build_config(args: &Args) -> anyhow::Result<ApodConfig> {
    let timezone: Tz = args
        .timezone
        .parse()
        .map_err(|_| anyhow!("Unknown timezone: {}", args.timezone))?;

    let mut builder = ApodConfig::builder()
        .concurrency(args.concurrency)
        .timezone(timezone)
        .rollover_hour(args.rollover_hour)
        .timeout(args.timeout);

    if let Some(user_agent) = &args.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    if let Some(relay) = &args.relay {
        builder = builder.relay(relay.clone());
    }

    Ok(builder.build())
}

fn build_cache(args: &Args) -> RecordCache {
    if args.no_cache {
        return RecordCache::in_memory();
    }

    match args.cache_file.clone().or_else(JsonFileStore::default_path) {
        Some(path) => RecordCache::load(JsonFileStore::new(path)),
        None => RecordCache::in_memory(),
    }
}

fn read_saved_page(args: &Args, path: &str, config: &ApodConfig) -> anyhow::Result<ApodResponse> {
    let html = if path == "-" {
        fetch_stdin().context("Failed to read from stdin")?
    } else {
        fetch_file(path).with_context(|| format!("Failed to read file: {}", path))?
    };

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
    }

    let date = match args.date.as_deref() {
        Some(date) => parse_date(date).context("Invalid date")?,
        None => resolve_current_date(&Utc::now().with_timezone(&config.timezone), config.rollover_hour),
    };

    let extract = ExtractConfig { base_url: config.base_url.clone(), preserve_links: !args.no_links };
    let record = parse_page(&html, date, &extract).context("Failed to parse page")?;

    Ok(ApodResponse::Single(Some(record)))
}

async fn fetch_remote(args: &Args, config: ApodConfig) -> anyhow::Result<ApodResponse> {
    let start = args.date.as_deref().map(parse_date).transpose().context("Invalid date")?;
    let end = args.end.as_deref().map(parse_date).transpose().context("Invalid end date")?;

    let fetcher = HttpFetcher::new(config.fetch.clone()).context("Failed to build HTTP client")?;
    let client = ApodClient::with_parts(config, Arc::new(fetcher), Arc::new(build_cache(args)));

    client
        .fetch_apod(start, end, !args.no_links)
        .await
        .context("Failed to fetch APOD")
}

fn render(args: &Args, response: &ApodResponse) -> anyhow::Result<String> {
    let output = match args.format {
        OutputFormat::Json => {
            convert_to_json(response, &JsonConfig { pretty: args.pretty }).context("Failed to convert to JSON")?
        }
        OutputFormat::Markdown => {
            let config = MarkdownConfig { include_frontmatter: args.frontmatter, include_references: args.references };
            convert_to_markdown(response.records(), &config).context("Failed to convert to Markdown")?
        }
        OutputFormat::PlainText => {
            let config = TextConfig { line_width: args.width, include_links: true };
            convert_to_text(response.records(), &config).context("Failed to convert to text")?
        }
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "apod", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose)?;

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let config = build_config(&args)?;
    tracing::debug!(?config, "resolved configuration");
    let started = Instant::now();

    let response = match args.file.as_deref() {
        Some(path) => {
            if args.verbose {
                print_step(1, 3, &format!("Reading saved page {}", path.bright_white()));
            }
            read_saved_page(&args, path, &config)?
        }
        None => {
            if args.verbose {
                let target = match (&args.date, &args.end) {
                    (Some(start), Some(end)) => format!("Fetching {} to {}", start, end),
                    (Some(date), None) => format!("Fetching {}", date),
                    _ => "Fetching the latest entry".to_string(),
                };
                print_step(1, 3, &target);
            }
            fetch_remote(&args, config).await?
        }
    };

    if args.verbose {
        print_timing("Elapsed", started.elapsed());
        print_step(2, 3, "Formatting records");
        print_record_summary(response.records());
    }

    if response.is_empty() {
        print_warning("No entry found");
    }

    let output = render(&args, &response)?;

    if args.verbose {
        print_step(3, 3, "Writing output");
        eprintln!("  {} {}", "Format:".dimmed(), format!("{:?}", args.format).bright_white());
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
