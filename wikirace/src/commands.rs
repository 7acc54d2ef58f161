use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikirace")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikirace")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("search")
                .about(
                    "Find a short chain of links from one page to another, exploring outgoing \
                links breadth-first.",
                )
                .arg(
                    arg!(-s --"start" <PAGE>)
                        .required(true)
                        .help("Title of the page to start from"),
                )
                .arg(
                    arg!(-e --"end" <PAGE>)
                        .required(true)
                        .help("Title of the page to reach"),
                )
                .arg(
                    arg!(-d --"depth" <N>)
                        .required(false)
                        .help("Maximum search depth (default: unbounded)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"strategy" <STRATEGY>)
                        .required(false)
                        .help(
                            "sequential: one lookup at a time; concurrent: many overlapping \
                        lookups",
                        )
                        .value_parser(["sequential", "concurrent", "dumb", "async"])
                        .default_value("concurrent"),
                )
                .arg(
                    arg!(--"source" <SOURCE>)
                        .required(false)
                        .help("Link source: api (prop=links query) or parse (rendered HTML). \
                        Defaults to api for concurrent and parse for sequential searches")
                        .value_parser(["api", "parse"]),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint")
                        .default_value(wikirace_scanner::DEFAULT_ENDPOINT),
                )
                .arg(
                    arg!(--"rate" <REQUESTS>)
                        .required(false)
                        .help("Maximum lookups started per window")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("150"),
                )
                .arg(
                    arg!(--"window-ms" <MILLISECONDS>)
                        .required(false)
                        .help("Length of the rate limit window")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1000"),
                )
                .arg(
                    arg!(--"max-in-flight" <N>)
                        .required(false)
                        .help("Upper bound on outstanding lookups (forced to 1 when sequential)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("256"),
                )
                .arg(
                    arg!(--"retries" <N>)
                        .required(false)
                        .help("Retries for a lookup that fails transiently")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-lookup timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"max-continuations" <N>)
                        .required(false)
                        .help("Continuation requests followed per page by the api source")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the report as JSON")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"debug")
                        .required(false)
                        .help("Log every lookup")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("links")
                .about("List the outgoing page links of a single page")
                .arg(arg!(<PAGE>).required(true).help("Title of the page"))
                .arg(
                    arg!(--"source" <SOURCE>)
                        .required(false)
                        .help("Link source: api or parse")
                        .value_parser(["api", "parse"])
                        .default_value("api"),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint")
                        .default_value(wikirace_scanner::DEFAULT_ENDPOINT),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                ),
        )
}
