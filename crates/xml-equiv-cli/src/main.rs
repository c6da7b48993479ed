//! Compare two XML documents from the command line
//!
//! Exits with 0 when they match, 1 when they do not, and 2 when either
//! document could not be read or parsed.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use xml_equivalence::{xml_at, xml_file, MatchOutcome, XmlEquivalenceMatcher, XmlValue};

mod cli;

use cli::{Cli, OutputFormat};

#[derive(Serialize)]
struct Report<'a> {
    matched: bool,
    settings: &'a xml_equivalence::Settings,
    #[serde(skip_serializing_if = "Option::is_none")]
    mismatch: Option<&'a str>,
}

fn load(location: &str) -> anyhow::Result<XmlValue> {
    let value = if location.contains("://") || location.starts_with("file:") {
        xml_at(location)
    } else {
        xml_file(location)
    };
    value.with_context(|| format!("unable to load XML from {}", location))
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let settings = cli.settings();
    tracing::debug!(%settings, "comparing {} to {}", cli.expected, cli.actual);

    let expected = load(&cli.expected)?;
    let actual = load(&cli.actual)?;
    let matcher = XmlEquivalenceMatcher::new(expected, settings);
    let outcome = matcher.matches(&actual).context("comparison failed")?;

    let mismatch = match &outcome {
        MatchOutcome::Matched => None,
        MatchOutcome::Mismatched(why) => Some(why.as_str()),
    };
    match cli.format {
        OutputFormat::Text => match mismatch {
            None => println!("documents match"),
            Some(why) => println!("Expected: {}\n     but: {}", matcher.describe(), why),
        },
        OutputFormat::Json => {
            let report = Report {
                matched: outcome.is_match(),
                settings: matcher.settings(),
                mismatch,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(outcome.is_match())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
