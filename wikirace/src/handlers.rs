use anyhow::{Context, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use wikirace_core::report::{format_path, render_report};
use wikirace_core::{
    PathResult, ReportFormat, RetryPolicy, SearchOptions, SearchReport, SearchRequest, SourceKind,
    Strategy, execute_search,
};
use wikirace_scanner::{ApiLinkSource, LinkSource, ParseLinkSource, build_client, parse_endpoint};

pub const EXIT_FOUND: i32 = 0;
pub const EXIT_NOT_FOUND: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Installs the stderr log subscriber; stdout is reserved for results.
pub fn init_tracing(debug: bool, quiet: bool) {
    let level = if debug {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    // A second init (tests, repeated handler calls) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Turns `search` arguments into a request for the core library
pub fn build_search_request(args: &ArgMatches, quiet: bool) -> anyhow::Result<SearchRequest> {
    let start = required_string(args, "start")?;
    let target = required_string(args, "end")?;

    let strategy_name = args
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("concurrent");
    let strategy = Strategy::from_str(strategy_name)
        .ok_or_else(|| anyhow!("unknown strategy '{}'", strategy_name))?;

    let source = match args.get_one::<String>("source") {
        Some(name) => {
            SourceKind::from_str(name).ok_or_else(|| anyhow!("unknown link source '{}'", name))?
        }
        None => SourceKind::default_for(strategy),
    };

    let endpoint_arg = required_string(args, "endpoint")?;
    let endpoint = parse_endpoint(&endpoint_arg)
        .with_context(|| format!("invalid endpoint '{}'", endpoint_arg))?;

    let retries = args.get_one::<u32>("retries").copied().unwrap_or(3);
    let timeout = Duration::from_secs(args.get_one::<u64>("timeout").copied().unwrap_or(10));

    let options = SearchOptions::default()
        .with_max_depth(args.get_one::<usize>("depth").copied())
        .with_strategy(strategy)
        .with_max_in_flight(args.get_one::<usize>("max-in-flight").copied().unwrap_or(256))
        .with_retry(RetryPolicy::default().with_max_retries(retries))
        .with_lookup_timeout(timeout);

    let json = args.get_flag("json");

    Ok(SearchRequest {
        start,
        target,
        endpoint,
        source,
        max_rate: args.get_one::<u32>("rate").copied().unwrap_or(150),
        window: Duration::from_millis(args.get_one::<u64>("window-ms").copied().unwrap_or(1000)),
        max_continuations: args
            .get_one::<usize>("max-continuations")
            .copied()
            .unwrap_or(20),
        options,
        show_progress: !quiet && !json,
    })
}

fn required_string(args: &ArgMatches, id: &str) -> anyhow::Result<String> {
    args.get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument '{}'", id))
}

/// Process exit code for a finished search
pub fn exit_code(report: &SearchReport) -> i32 {
    match report.result {
        PathResult::Found(_) => EXIT_FOUND,
        PathResult::NotFound => EXIT_NOT_FOUND,
    }
}

pub async fn handle_search(sub_matches: &ArgMatches, quiet: bool) -> i32 {
    let json = sub_matches.get_flag("json");
    init_tracing(sub_matches.get_flag("debug"), quiet || json);

    let request = match build_search_request(sub_matches, quiet) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return EXIT_ERROR;
        }
    };

    if !quiet && !json {
        eprintln!(
            "\n{} '{}' -> '{}'",
            "Searching".bright_cyan().bold(),
            request.start,
            request.target
        );
        eprintln!(
            "Strategy: {}, max depth: {}",
            request.options.strategy.as_str(),
            request
                .options
                .max_depth
                .map_or_else(|| "unbounded".to_string(), |d| d.to_string())
        );
        eprintln!(
            "Rate limit: {} lookups per {:?}\n",
            request.max_rate, request.window
        );
    }

    let report = match execute_search(request).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Search failed: {}", "✗".red().bold(), e);
            return EXIT_ERROR;
        }
    };

    if json {
        match render_report(&report, ReportFormat::Json) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("{} Could not render report: {}", "✗".red().bold(), e);
                return EXIT_ERROR;
            }
        }
    } else {
        print_result(&report, quiet);
    }

    exit_code(&report)
}

fn print_result(report: &SearchReport, quiet: bool) {
    match &report.result {
        PathResult::Found(path) => println!("{}", format_path(path).green().bold()),
        PathResult::NotFound => println!("{}", "Path not found".yellow().bold()),
    }

    if !quiet && let Ok(rendered) = render_report(report, ReportFormat::Text) {
        println!("\n{}", rendered);
    }
}

/// Builds the single-page link source used by `links`.
pub fn build_links_source(args: &ArgMatches) -> anyhow::Result<Arc<dyn LinkSource>> {
    let source_name = args
        .get_one::<String>("source")
        .map(String::as_str)
        .unwrap_or("api");
    let source = SourceKind::from_str(source_name)
        .ok_or_else(|| anyhow!("unknown link source '{}'", source_name))?;

    let endpoint_arg = required_string(args, "endpoint")?;
    let endpoint = parse_endpoint(&endpoint_arg)
        .with_context(|| format!("invalid endpoint '{}'", endpoint_arg))?;
    let timeout = Duration::from_secs(args.get_one::<u64>("timeout").copied().unwrap_or(10));
    let client = build_client(timeout).context("failed to build HTTP client")?;

    Ok(match source {
        SourceKind::Api => Arc::new(ApiLinkSource::new(client, endpoint)),
        SourceKind::Parse => Arc::new(ParseLinkSource::new(client, endpoint)),
    })
}

pub async fn handle_links(sub_matches: &ArgMatches, quiet: bool) -> i32 {
    init_tracing(false, quiet);

    let page = match required_string(sub_matches, "PAGE") {
        Ok(page) => page,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return EXIT_ERROR;
        }
    };
    let source = match build_links_source(sub_matches) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return EXIT_ERROR;
        }
    };

    match source.fetch_links(&page).await {
        Ok(links) => {
            for link in &links {
                println!("{}", link);
            }
            if !quiet {
                eprintln!(
                    "\n{} {} links on '{}' ({} source)",
                    "✓".green().bold(),
                    links.len(),
                    page,
                    source.name()
                );
            }
            EXIT_FOUND
        }
        Err(e) => {
            eprintln!("{} Lookup of '{}' failed: {}", "✗".red().bold(), page, e);
            EXIT_ERROR
        }
    }
}
