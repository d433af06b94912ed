use aire_core::{MetricKind, WindowRange};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Air quality evaluation and reporting", long_about = None)]
pub struct Args {
    /// Directory containing aire.toml
    #[arg(short, long, global = true, default_value = "./config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default aire.toml into the config directory
    Init,

    /// Classify the latest reading of every metric
    Status,

    /// Aggregate a metric over a window
    Summary {
        #[arg(short, long)]
        metric: Option<MetricKind>,

        #[arg(short, long)]
        window: Option<WindowRange>,
    },

    /// Derive alerts from the 24h prediction series
    Alerts {
        #[arg(short, long)]
        metric: Option<MetricKind>,

        /// Print alerts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export history to the configured output directory
    Export {
        #[arg(short, long)]
        metric: Option<MetricKind>,

        #[arg(short, long)]
        window: Option<WindowRange>,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Refresh periodically until Ctrl-C
    Watch {
        #[arg(short, long)]
        metric: Option<MetricKind>,

        #[arg(short, long)]
        window: Option<WindowRange>,

        /// Stop after N refreshes
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Fecha,<metric> per sample
    Csv,
    /// One column per metric
    Wide,
    /// Paginated text report
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Wide => "wide.csv",
            ExportFormat::Text => "txt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary() {
        let args = Args::parse_from(["aire", "summary", "--metric", "pm25", "--window", "month"]);
        match args.command {
            Command::Summary { metric, window } => {
                assert_eq!(metric, Some(MetricKind::Pm25));
                assert_eq!(window, Some(WindowRange::Month));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.config_dir, PathBuf::from("./config"));
    }

    #[test]
    fn test_parse_global_config_dir() {
        let args = Args::parse_from(["aire", "status", "--config-dir", "/etc/aire"]);
        assert!(matches!(args.command, Command::Status));
        assert_eq!(args.config_dir, PathBuf::from("/etc/aire"));
    }

    #[test]
    fn test_parse_export_format() {
        let args = Args::parse_from(["aire", "export", "-m", "co2", "--format", "text"]);
        match args.command {
            Command::Export { metric, window, format } => {
                assert_eq!(metric, Some(MetricKind::Co2));
                assert_eq!(window, None);
                assert_eq!(format, ExportFormat::Text);
                assert_eq!(format.extension(), "txt");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_watch_ticks() {
        let args = Args::parse_from(["aire", "watch", "--ticks", "3"]);
        assert!(matches!(args.command, Command::Watch { ticks: Some(3), .. }));
    }

    #[test]
    fn test_reject_unknown_metric() {
        assert!(Args::try_parse_from(["aire", "alerts", "--metric", "ozone"]).is_err());
        assert!(Args::try_parse_from(["aire", "summary", "--window", "decade"]).is_err());
    }
}
