//! CLI argument parsing for abtest

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for experiment reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON document for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "abtest")]
#[command(version)]
#[command(about = "Analyze A/B test results from an analytics event log", long_about = None)]
pub struct Cli {
    /// Input JSON file with analytics events
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Analyze only this experiment (default: every experiment in the log)
    #[arg(short, long, value_name = "ID")]
    pub experiment: Option<String>,

    /// Write the report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json without --output prints the JSON document to stdout
    /// instead of the text report)
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Variant id to treat as control (default: first variant assigned in the log)
    #[arg(short, long, value_name = "VARIANT")]
    pub control: Option<String>,

    /// TOML file with analysis thresholds
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output on stderr
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(line: &str) -> Cli {
        Cli::parse_from(line.split_whitespace())
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["abtest"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["abtest", "--input", "events.json"]);
        assert_eq!(cli.input, PathBuf::from("events.json"));
        assert_eq!(cli.experiment, None);
        assert_eq!(cli.output, None);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.control, None);
        assert_eq!(cli.config, None);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = parse("abtest -i events.json -e hero -o out.json -f json -c b");
        assert_eq!(cli.experiment.as_deref(), Some("hero"));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.control.as_deref(), Some("b"));
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let args = "abtest -i events.json -f csv".split_whitespace();
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_config_and_debug() {
        let cli = parse("abtest -i e.json --config abtest.toml --debug");
        assert_eq!(cli.config, Some(PathBuf::from("abtest.toml")));
        assert!(cli.debug);
    }

    #[test]
    fn test_format_help_mentions_stdout_json() {
        let command = Cli::command();
        let format = command.get_arguments().find(|a| a.get_id() == "format");
        let help = format.and_then(|a| a.get_help()).map(ToString::to_string);
        assert!(help.is_some_and(|h| h.contains("prints the JSON document to stdout")));
    }
}
