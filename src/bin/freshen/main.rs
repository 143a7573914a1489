//! freshen CLI - configuration migration and release lookup

use anyhow::Result;
use clap::Parser;
use miette::{GraphicalReportHandler, GraphicalTheme};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use freshen::util::diagnostic::ConfigParseError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ConfigParseError>() {
            Some(parse) => report_parse_error(parse, color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("freshen=debug")
    } else {
        EnvFilter::new("freshen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;

    // Execute command
    match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args, cli.verbose, color),
        Commands::Releases(args) => commands::releases::execute(args, cli.verbose, color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Render a parse error with the offending source line.
fn report_parse_error(err: &ConfigParseError, color: bool) {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let mut out = String::new();
    match GraphicalReportHandler::new_themed(theme).render_report(&mut out, err) {
        Ok(()) => eprint!("{}", out),
        Err(_) => eprintln!("error: {}: {}", err, err.reason),
    }
}
