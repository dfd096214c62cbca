use anyhow::{Context, Result};
use biomatch_core::{Corpus, QueryResult};
use biomatch_local::extract::{DEFAULT_BIO_TAG, DEFAULT_NAME_TAG};
use biomatch_local::{probe, rank, scrape, store, LocalFetcher, Stopwords, TagPair};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "biomatch")]
#[command(about = "Scrape staff bios and rank them by similarity to a text", long_about = None)]
struct Cli {
    /// Log filter (`RUST_LOG` syntax). Defaults to `RUST_LOG`, then `info`.
    #[arg(long, global = true, env = "BIOMATCH_LOG")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover bio links and show which tags the first bio page uses.
    Probe(ProbeCmd),
    /// Scrape every bio page and overwrite the corpus store.
    Scrape(ScrapeCmd),
    /// Rank the stored bios against a text.
    Query(QueryCmd),
    /// Load the store (scraping it first if absent), then rank against a text.
    Run(RunCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct SiteArgs {
    /// Staff directory page (the page linking to every bio).
    #[arg(long, env = "BIOMATCH_DIRECTORY")]
    directory: String,
    /// Prefix every bio link starts with (e.g. https://example.edu/staff/).
    #[arg(long, env = "BIOMATCH_SLUG")]
    slug: String,
    /// Per-request timeout (ms).
    #[arg(long, env = "BIOMATCH_TIMEOUT_MS", default_value_t = 20_000)]
    timeout_ms: u64,
}

#[derive(clap::Args, Debug)]
struct TagArgs {
    /// Tag (or CSS selector) holding the person's name.
    #[arg(long, env = "BIOMATCH_NAME_TAG", default_value = DEFAULT_NAME_TAG)]
    name_tag: String,
    /// Tag (or CSS selector) holding bio paragraphs.
    #[arg(long, env = "BIOMATCH_BIO_TAG", default_value = DEFAULT_BIO_TAG)]
    bio_tag: String,
}

#[derive(clap::Args, Debug)]
struct StoreArgs {
    /// Corpus store (JSON).
    #[arg(long, env = "BIOMATCH_DATA", default_value = "biomatch_bios.json")]
    data: PathBuf,
    /// Stopword file, one word per line (default: bundled English list).
    #[arg(long, env = "BIOMATCH_STOPWORDS")]
    stopwords: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Text to compare against (read from stdin when omitted).
    query: Option<String>,
    /// Number of ranked bios to show.
    #[arg(long, default_value_t = rank::DEFAULT_TOP_K)]
    top: usize,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct ProbeCmd {
    #[command(flatten)]
    site: SiteArgs,
}

#[derive(clap::Args, Debug)]
struct ScrapeCmd {
    #[command(flatten)]
    site: SiteArgs,
    #[command(flatten)]
    tags: TagArgs,
    #[command(flatten)]
    store: StoreArgs,
    /// Skip the tag probe of the first bio page.
    #[arg(long)]
    no_probe: bool,
}

#[derive(clap::Args, Debug)]
struct QueryCmd {
    #[command(flatten)]
    store: StoreArgs,
    #[command(flatten)]
    query: QueryArgs,
}

#[derive(clap::Args, Debug)]
struct RunCmd {
    #[command(flatten)]
    site: SiteArgs,
    #[command(flatten)]
    tags: TagArgs,
    #[command(flatten)]
    store: StoreArgs,
    #[command(flatten)]
    query: QueryArgs,
    /// Skip the tag probe when a scrape is needed.
    #[arg(long)]
    no_probe: bool,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn init_logging(level: Option<&str>) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    let filter = match level {
        Some(l) => EnvFilter::try_new(l).with_context(|| format!("invalid log filter: {l}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))
}

fn load_stopwords(args: &StoreArgs) -> Result<Stopwords> {
    match &args.stopwords {
        Some(p) => Ok(Stopwords::from_file(p)?),
        None => Ok(Stopwords::english()),
    }
}

fn check_output(output: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&output) {
        anyhow::bail!(
            "unknown output format: {output} (allowed: {})",
            allowed.join(", ")
        );
    }
    Ok(())
}

async fn probe_site(fetcher: &LocalFetcher, site: &SiteArgs, links: &[String]) -> Result<()> {
    let previews = scrape::probe_first(
        fetcher,
        &site.directory,
        links,
        &site.slug,
        Some(site.timeout_ms),
    )
    .await?;
    println!("Tags on {}:", links[0]);
    print!("{}", probe::format_probe(&previews));
    Ok(())
}

async fn scrape_site(site: &SiteArgs, tags: &TagArgs, store_args: &StoreArgs, run_probe: bool) -> Result<Corpus> {
    // Bad selectors and stopword files should fail before any network traffic.
    let tags = TagPair::new(&tags.name_tag, &tags.bio_tag)?;
    let stopwords = load_stopwords(store_args)?;
    let fetcher = LocalFetcher::new()?;

    let links = scrape::discover_links(&fetcher, &site.directory, &site.slug, Some(site.timeout_ms))
        .await
        .with_context(|| format!("staff directory unreachable: {}", site.directory))?;
    if run_probe {
        probe_site(&fetcher, site, &links).await?;
    } else if links.is_empty() {
        tracing::warn!(slug = %site.slug, "no bio links found; the corpus will be empty");
    }

    let report = scrape::build_corpus(
        &fetcher,
        &site.directory,
        &links,
        &tags,
        &stopwords,
        Some(site.timeout_ms),
    )
    .await?;
    if !report.skipped.is_empty() {
        tracing::warn!(
            skipped = report.skipped.len(),
            name_tag = tags.name_tag(),
            "some pages had no name element; try `biomatch probe` to pick tags"
        );
    }

    store::save(&store_args.data, &report.corpus)?;
    tracing::info!(
        path = %store_args.data.display(),
        records = report.corpus.len(),
        "saved corpus"
    );
    Ok(report.corpus)
}

fn read_query(arg: Option<&str>) -> Result<String> {
    if let Some(q) = arg {
        return Ok(q.to_string());
    }
    eprintln!("What is your text?");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read query from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_result(args: &QueryArgs, query: &str, stopwords: &Stopwords, result: &QueryResult) -> Result<()> {
    if args.output == "json" {
        let results: Vec<serde_json::Value> = result
            .top(args.top)
            .enumerate()
            .map(|(pos, (i, name, score))| {
                serde_json::json!({
                    "rank": pos + 1,
                    "name": name,
                    "url": result.urls[i],
                    "score": score,
                })
            })
            .collect();
        let v = serde_json::json!({
            "schema_version": 1,
            "kind": "biomatch_query",
            "query": query,
            "normalized_query": biomatch_local::textprep::normalize_query(query, stopwords),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        print!("{}", rank::format_top(result, args.top));
    }
    Ok(())
}

fn query_corpus(corpus: &Corpus, store_args: &StoreArgs, args: &QueryArgs) -> Result<()> {
    let stopwords = load_stopwords(store_args)?;
    let query = read_query(args.query.as_deref())?;
    tracing::info!(records = corpus.len(), "calculating cosine similarity");
    let result = rank::rank(corpus, &query, &stopwords)?;
    print_result(args, &query, &stopwords, &result)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Probe(args) => {
            let fetcher = LocalFetcher::new()?;
            let links = scrape::discover_links(
                &fetcher,
                &args.site.directory,
                &args.site.slug,
                Some(args.site.timeout_ms),
            )
            .await
            .with_context(|| format!("staff directory unreachable: {}", args.site.directory))?;
            probe_site(&fetcher, &args.site, &links).await?;
        }
        Commands::Scrape(args) => {
            scrape_site(&args.site, &args.tags, &args.store, !args.no_probe).await?;
        }
        Commands::Query(args) => {
            check_output(&args.query.output, &["text", "json"])?;
            let corpus = store::load(&args.store.data)?.ok_or_else(|| {
                anyhow::anyhow!(
                    "no corpus at {}; run `biomatch scrape` first",
                    args.store.data.display()
                )
            })?;
            query_corpus(&corpus, &args.store, &args.query)?;
        }
        Commands::Run(args) => {
            check_output(&args.query.output, &["text", "json"])?;
            let corpus = match store::load(&args.store.data)? {
                Some(c) => {
                    tracing::info!(path = %args.store.data.display(), "loading corpus");
                    c
                }
                None => scrape_site(&args.site, &args.tags, &args.store, !args.no_probe).await?,
            };
            query_corpus(&corpus, &args.store, &args.query)?;
        }
        Commands::Version(args) => {
            check_output(&args.output, &["json", "text"])?;
            let name = env!("CARGO_PKG_NAME");
            let version = env!("CARGO_PKG_VERSION");
            if args.output == "text" {
                println!("{name} {version}");
            } else {
                let v = serde_json::json!({
                    "schema_version": 1,
                    "name": name,
                    "version": version,
                });
                println!("{}", serde_json::to_string(&v)?);
            }
        }
    }
    Ok(())
}
