use colored::Colorize;
use commands::command_argument_builder;
use crumbtrail::config::load_settings;
use crumbtrail::handlers::{handle_crawl, handle_roots, handle_tree, print_banner};
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_logging(quiet, chosen_command.get_count("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let Some((name, sub_matches)) = chosen_command.subcommand() else {
        // No subcommand provided, just show the banner
        return;
    };

    let config_path = sub_matches.get_one::<String>("config").map(String::as_str);
    let result = match load_settings(config_path) {
        Ok(settings) => match name {
            "roots" => handle_roots(sub_matches, settings).await,
            "crawl" => handle_crawl(sub_matches, settings, quiet).await,
            "tree" => handle_tree(sub_matches, settings, quiet).await,
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so reports on stdout stay clean
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
