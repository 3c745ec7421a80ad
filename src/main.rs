use abtest::analyzer::{Analyzer, ControlSelection};
use abtest::cli::{Cli, OutputFormat};
use abtest::config::AnalysisConfig;
use abtest::events;
use abtest::significance::StatsCapability;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
///
/// `--debug` enables everything at trace level; otherwise logging is only
/// installed when RUST_LOG is set.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path),
        None => Ok(AnalysisConfig::default()),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;

    let capability = StatsCapability::detect();
    if !capability.is_available() {
        eprintln!(
            "Warning: statistics support not available. \
             Significance tests will be reported as unavailable."
        );
    }

    eprintln!("Loading data from {}...", args.input.display());
    let events = events::load_events(&args.input)
        .with_context(|| format!("Failed to load events from {}", args.input.display()))?;
    eprintln!("Loaded {} events", events.len());

    let analyzer = Analyzer::new(&events, config, capability)?;
    let control = ControlSelection::from_option(args.control);

    let experiments: Vec<String> = match args.experiment {
        Some(id) => vec![id],
        None => analyzer.experiment_ids().to_vec(),
    };

    let json_to_stdout = args.format == OutputFormat::Json && args.output.is_none();

    let mut reports = Vec::with_capacity(experiments.len());
    for experiment_id in &experiments {
        eprintln!("\nAnalyzing experiment: {}", experiment_id);
        let report = analyzer.generate_report(experiment_id, &control)?;
        if !json_to_stdout {
            println!("{}", report);
        }
        reports.push(report);
    }

    let json = match args.format {
        OutputFormat::Json => Some(analyzer.json_report(&experiments, &control)?.to_json()?),
        OutputFormat::Text => None,
    };

    match (&args.output, json) {
        (Some(path), json) => {
            let contents = json.unwrap_or_else(|| reports.join("\n\n"));
            fs::write(path, contents)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("\nReport saved to {}", path.display());
        }
        (None, Some(json)) => println!("{}", json),
        (None, None) => {}
    }

    Ok(())
}
