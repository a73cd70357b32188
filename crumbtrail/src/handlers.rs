use crate::config::Settings;
use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use crumbtrail_core::breadcrumbs::{Classification, classify};
use crumbtrail_core::merge::merge_trees;
use crumbtrail_core::report::{self, IaReport, ReportFormat, render_chain};
use crumbtrail_core::{
    CancelHandle, CrawlContext, ProgressCallback, ProgressSnapshot, SearchTerms, SeedUrl,
    TreeCrawler, build_context_tree, collect_page_records, crawl_from_roots,
};
use crumbtrail_scanner::{HostMode, HttpFetcher};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

// Helper functions for seed intake

/// Load seeds from either a file or the `--url` arguments
pub fn load_seeds_from_source(
    urls: &[Url],
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<SeedUrl>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_seeds_from_file(hosts_file_path)
    } else if !urls.is_empty() {
        Ok(urls.iter().map(|u| SeedUrl::new(u.as_str())).collect())
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse seeds from a file, one per line
pub fn load_seeds_from_file(path: &PathBuf) -> Result<Vec<SeedUrl>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let seeds: Vec<SeedUrl> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_seed_line)
        .collect();

    if seeds.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(seeds)
}

/// Parse `URL [PROTOTYPE_URL]`, separated by whitespace or a comma
pub fn parse_seed_line(line: &str) -> Option<SeedUrl> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty());

    let seed = SeedUrl::new(parse_url_line(parts.next()?)?);
    match parts.next().and_then(parse_url_line) {
        Some(prototype) => Some(seed.with_prototype(prototype)),
        None => Some(seed),
    }
}

/// Parse a single URL, trying to add https:// if needed. The result is
/// normalised the same way `--url` values are.
pub fn parse_url_line(line: &str) -> Option<String> {
    // Try to parse as-is
    if let Ok(url) = Url::parse(line) {
        return Some(url.to_string());
    }

    // Try adding https://
    if let Ok(url) = Url::parse(&format!("https://{}", line)) {
        return Some(url.to_string());
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "crumbtrail".bright_blue().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!("{}", "breadcrumb-driven information architecture mapper".bright_black());
    eprintln!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Apply command line overrides on top of the loaded settings
pub fn apply_overrides(args: &ArgMatches, mut settings: Settings) -> Settings {
    if let Some(threads) = args.get_one::<usize>("threads") {
        settings.concurrency = *threads;
    }
    if let Some(mode) = args
        .get_one::<String>("host-mode")
        .and_then(|m| HostMode::from_str(m))
    {
        settings.host_mode = mode;
    }
    if let Some(retries) = args.get_one::<u32>("retries") {
        settings.retry.retries = *retries;
    }
    settings
}

fn build_fetcher(settings: &Settings) -> Result<Arc<HttpFetcher>> {
    let fetcher = HttpFetcher::with_timeout(
        settings.hosts.clone(),
        settings.host_mode,
        settings.timeout_secs,
    )
    .context("Failed to build HTTP client")?
    .with_retry(settings.retry);
    Ok(Arc::new(fetcher))
}

fn build_crawler(fetcher: Arc<HttpFetcher>, settings: &Settings) -> TreeCrawler<HttpFetcher> {
    TreeCrawler::new(fetcher)
        .with_fan_out(settings.fan_out.clone())
        .with_concurrency(settings.concurrency)
}

fn seeds_from_args(args: &ArgMatches) -> Result<Vec<SeedUrl>> {
    let urls: Vec<Url> = args
        .get_many::<Url>("url")
        .map(|u| u.cloned().collect())
        .unwrap_or_default();
    let hosts_file = args.get_one::<PathBuf>("hosts-file");
    load_seeds_from_source(&urls, hosts_file).map_err(anyhow::Error::msg)
}

/// Percentage bar fed by the crawl progress callback
pub fn progress_bar(hidden: bool) -> (ProgressBar, ProgressCallback) {
    let bar = if hidden {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let handle = bar.clone();
    let callback: ProgressCallback = Arc::new(move |snapshot: ProgressSnapshot| {
        handle.set_position(u64::from(snapshot.percent));
        handle.set_message(format!("{}/{} pages", snapshot.processed, snapshot.total));
    });
    (bar, callback)
}

/// Cancel the crawl on Ctrl-C; whatever was built so far is still reported
fn cancel_on_ctrl_c(cancel: CancelHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} Cancelling crawl, partial results follow",
                "⚠".yellow().bold()
            );
            cancel.cancel();
        }
    });
}

fn crawl_context(args: &ArgMatches, callback: ProgressCallback) -> CrawlContext {
    let cancel = CancelHandle::new();
    cancel_on_ctrl_c(cancel.clone());

    let mut ctx = CrawlContext::new()
        .with_progress_callback(callback)
        .with_cancel(cancel);
    if let Some(raw) = args.get_one::<String>("search") {
        let terms = SearchTerms::parse(raw);
        info!("Searching for {} term(s)", terms.len());
        ctx = ctx.with_search(terms);
    }
    ctx
}

/// Console chatter stays off stdout when the JSON report is written there
fn chatty(args: &ArgMatches, quiet: bool) -> bool {
    let json = args
        .get_one::<String>("format")
        .is_some_and(|f| ReportFormat::from_str(f) == Some(ReportFormat::Json));
    !quiet && (!json || args.get_one::<PathBuf>("output").is_some())
}

fn emit_report(report: &IaReport, args: &ArgMatches) -> Result<()> {
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            report::save_report(report, format, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", report.render(format)?),
    }
    Ok(())
}

fn print_classification(classification: &Classification) {
    print_divider();
    println!("{}", "  ROOTS".bright_white().bold());
    print_divider();
    for root in &classification.roots {
        println!(
            "{} {}  {}",
            "★".green().bold(),
            root.h1.bright_white(),
            root.url.bright_black()
        );
        println!(
            "  {} {} descendant(s), crawl depth {}",
            "→".blue(),
            root.descendants.len().to_string().cyan(),
            root.min_depth.to_string().cyan()
        );
    }
    println!();

    println!("{}", "BREADCRUMBS".bright_blue().bold());
    for chain in &classification.chains {
        println!("  {}", render_chain(chain));
    }
    println!();

    if classification.has_break_before_root {
        println!(
            "{} {}",
            "⚠".yellow().bold(),
            "Breadcrumb break before a root: context pages may be misplaced".yellow()
        );
    }
    if classification.has_break_after_root {
        println!(
            "{} {}",
            "⚠".yellow().bold(),
            "Breadcrumb break after a root: some pages will not be reached by the crawl".yellow()
        );
    }
}

pub async fn handle_roots(args: &ArgMatches, settings: Settings) -> Result<()> {
    let settings = apply_overrides(args, settings);
    let seeds = seeds_from_args(args)?;
    let fetcher = build_fetcher(&settings)?;

    println!("\n{} Reading breadcrumbs from {} seed(s)", "→".blue(), seeds.len());
    let records = collect_page_records(&*fetcher, &seeds).await;
    if records.is_empty() {
        anyhow::bail!("None of the seed pages could be fetched");
    }

    let classification = classify(&*fetcher, &records).await;
    print_classification(&classification);
    Ok(())
}

pub async fn handle_crawl(args: &ArgMatches, settings: Settings, quiet: bool) -> Result<()> {
    let settings = apply_overrides(args, settings);
    let seeds = seeds_from_args(args)?;
    let fetcher = build_fetcher(&settings)?;

    let show = chatty(args, quiet);
    if show {
        println!("\n🕷️  Mapping from {} seed(s)", seeds.len());
        println!("Workers: {}", settings.concurrency);
        println!("Hosts: {:?}\n", settings.host_mode);
    }

    let records = collect_page_records(&*fetcher, &seeds).await;
    if records.is_empty() {
        anyhow::bail!("None of the seed pages could be fetched");
    }
    let classification = classify(&*fetcher, &records).await;
    if show {
        print_classification(&classification);
    }

    let mut tree = build_context_tree(&classification.chains, &classification.roots);
    let crawler = build_crawler(fetcher, &settings);
    let (bar, callback) = progress_bar(quiet);
    let ctx = crawl_context(args, callback);

    let crawled = crawl_from_roots(&crawler, &mut tree, &ctx).await;
    bar.finish_and_clear();
    if show {
        println!("\n✓ Crawled from {} root(s)\n", crawled);
    }

    let (broken_links, search_matches) = ctx.take_results().await;
    let report =
        IaReport::new(tree, broken_links, search_matches).with_classification(&classification);
    emit_report(&report, args)
}

pub async fn handle_tree(args: &ArgMatches, settings: Settings, quiet: bool) -> Result<()> {
    let settings = apply_overrides(args, settings);
    let urls: Vec<String> = args
        .get_many::<Url>("url")
        .map(|u| u.map(|u| u.as_str().to_string()).collect())
        .unwrap_or_default();
    let depth = *args.get_one::<usize>("depth").unwrap_or(&2);
    let parent = args.get_one::<String>("parent").cloned();

    let crawler = build_crawler(build_fetcher(&settings)?, &settings);
    let (bar, callback) = progress_bar(quiet);
    let ctx = crawl_context(args, callback);

    let show = chatty(args, quiet);
    if show {
        println!("\n🕷️  Crawling {} url(s), depth {}", urls.len(), depth);
    }
    let mut tree = match parent {
        Some(parent) => crawler.crawl_under(&urls, depth, &parent, &ctx).await,
        None => crawler.crawl(&urls, depth, &ctx).await,
    };
    bar.finish_and_clear();

    if let Some(snapshot) = args.get_one::<PathBuf>("merge-into") {
        let existing = if snapshot.exists() {
            report::load_tree_snapshot(snapshot)
                .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?
        } else {
            Vec::new()
        };
        tree = merge_trees(existing, tree);
        report::save_tree_snapshot(&tree, snapshot)
            .with_context(|| format!("Failed to write snapshot {}", snapshot.display()))?;
        if show {
            println!(
                "{} Merged into {}",
                "✓".green().bold(),
                snapshot.display().to_string().bright_white()
            );
        }
    }

    let (broken_links, search_matches) = ctx.take_results().await;
    let report = IaReport::new(tree, broken_links, search_matches);
    emit_report(&report, args)
}
