use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

fn seed_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-u --"url" <URL>)
            .required(false)
            .help("A seed URL. Repeat to pass several")
            .value_parser(clap::value_parser!(Url))
            .action(clap::ArgAction::Append)
            .conflicts_with("hosts-file"),
    )
    .arg(
        arg!(-H --"hosts-file" <PATH>)
            .required(false)
            .help(
                "Path to a newline-delimited file of seed URLs. A second URL on the same line \
            is taken as the prototype of the first",
            )
            .value_parser(clap::value_parser!(std::path::PathBuf))
            .conflicts_with("url"),
    )
}

fn fetch_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-t --"threads" <NUM_WORKERS>)
            .required(false)
            .help("Maximum number of pages fetched at once (default: from config, 4)")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(--"host-mode" <MODE>)
            .required(false)
            .help("Which allowlisted hosts may be fetched: prod, proto, both, none")
            .value_parser(["prod", "proto", "both", "none"]),
    )
    .arg(
        arg!(--"retries" <COUNT>)
            .required(false)
            .help("Attempts per page before it is reported broken")
            .value_parser(clap::value_parser!(u32)),
    )
}

fn output_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save report to file (default: display to screen)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    )
    .arg(
        arg!(-s --"search" <TERMS>)
            .required(false)
            .help("Search terms separated by ';'. Prefix a term with 'regex:' for a pattern"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("crumbtrail")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("crumbtrail")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .required(false)
                .action(clap::ArgAction::Count),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Path to a JSON settings file (default: ~/.config/crumbtrail/config.json)"),
        )
        .subcommand_required(false)
        .subcommand(seed_args(fetch_args(
            command!("roots")
                .about("Find crawl roots among the seed pages and validate their breadcrumbs"),
        )))
        .subcommand(output_args(seed_args(fetch_args(
            command!("crawl").about(
                "Map the information architecture below the seed pages. Detects roots, \
            validates breadcrumbs and crawls from every root.",
            ),
        ))))
        .subcommand(
            output_args(fetch_args(
                command!("tree")
                    .about("Crawl a breadcrumb-confirmed tree from the given URLs")
                    .arg(
                        arg!(-u --"url" <URL>)
                            .required(true)
                            .help("A starting URL. Repeat to pass several")
                            .value_parser(clap::value_parser!(Url))
                            .action(clap::ArgAction::Append),
                    ),
            ))
            .arg(
                arg!(-d --"depth" <DEPTH>)
                    .required(false)
                    .help("Number of levels to crawl, including the starting pages")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("2"),
            )
            .arg(
                arg!(-p --"parent" <URL>)
                    .required(false)
                    .help("Only keep starting pages whose breadcrumb ends at this URL"),
            )
            .arg(
                arg!(-m --"merge-into" <SNAPSHOT>)
                    .required(false)
                    .help("Merge the result into this JSON tree snapshot and write it back")
                    .value_parser(clap::value_parser!(std::path::PathBuf)),
            ),
        )
}
