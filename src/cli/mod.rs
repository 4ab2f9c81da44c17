//! Command-line interface for the normalisation toolkit.

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "rcx-tk")]
#[command(about = "Normalise instrument metadata and MS-DIAL alignment tables to TSV", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Kind of table in the input file
    #[arg(value_enum)]
    method: Method,

    /// Input file (.csv, .tsv, .txt, .xls or .xlsx)
    file_path: PathBuf,

    /// Output file (.tsv)
    out_path: PathBuf,
}

/// Table kinds the toolkit can normalise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Batch specification: select and rename sample columns
    Metadata,
    /// Alkane retention-index table
    Alkanes,
    /// Sequence file with identifiers derived from file names
    Sequence,
    /// MS-DIAL alignment export with duplicate alignments merged
    Msdial,
}

impl Method {
    fn label(self) -> &'static str {
        match self {
            Method::Metadata => "Metadata",
            Method::Alkanes => "Alkanes",
            Method::Sequence => "Sequence",
            Method::Msdial => "MS-DIAL",
        }
    }
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 38 {
            let head: String = value.chars().take(35).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<19}: {:<38} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Run the processor selected by `method` and return the number of rows written.
pub fn dispatch(
    method: Method,
    file_path: &Path,
    out_path: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<usize> {
    use crate::processors::{alkanes, metadata, msdial, sequence};

    match method {
        Method::Metadata => metadata::process_metadata_file(file_path, out_path, &config.metadata.columns),
        Method::Alkanes => alkanes::process_alkanes_file(file_path, out_path, &config.alkanes.columns),
        Method::Sequence => sequence::process_sequence_file(file_path, out_path),
        Method::Msdial => msdial::process_msdial_file(file_path, out_path, &config.msdial),
    }
}

/// Load the pipeline config; defaults apply only when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let config = PipelineConfig::from_yaml(path)
        .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e))?;
    info!("Loaded config from: {}", path.display());
    Ok(config)
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let spinner = create_spinner(&format!("Processing {} file...", cli.method.label()));

    match dispatch(cli.method, &cli.file_path, &cli.out_path, &config) {
        Ok(rows) => {
            spinner.finish_and_clear();
            print_summary(
                &format!("{} done!", cli.method.label()),
                &[
                    ("Input file", cli.file_path.display().to_string()),
                    ("Output file", cli.out_path.display().to_string()),
                    ("Rows written", rows.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("{} processing failed: {:#}", cli.method.label(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, Builder};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_method_and_paths() {
        let cli = Cli::try_parse_from(["rcx-tk", "-vv", "msdial", "in.txt", "out.tsv"]).unwrap();
        assert_eq!(cli.method, Method::Msdial);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.out_path, PathBuf::from("out.tsv"));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!(Cli::try_parse_from(["rcx-tk", "spectra", "in.txt", "out.tsv"]).is_err());
    }

    #[test]
    fn test_load_config_defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_load_config_rejects_missing_or_invalid_file() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("absent.yaml").as_path())).is_err());

        let invalid = dir.path().join("invalid.yaml");
        fs::write(&invalid, "msdial:\n  skip_rows: three\n").unwrap();
        let err = load_config(Some(invalid.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_load_config_reads_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rcx.yaml");
        fs::write(&path, "msdial:\n  skip_rows: 0\n  metadata_cols: 3\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.msdial.skip_rows, 0);
        assert_eq!(config.msdial.metadata_cols, 3);
        assert_eq!(config.msdial.index_col, "Alignment ID");
    }

    #[test]
    fn test_dispatch_alkanes() {
        let mut input = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(input, "Carbon number,RT (min)").unwrap();
        writeln!(input, "12,2.8").unwrap();
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let output = dir.path().join("alkanes.tsv");

        let rows = dispatch(Method::Alkanes, input.path(), &output, &PipelineConfig::default()).unwrap();

        assert_eq!(rows, 1);
        assert_eq!(fs::read_to_string(&output).unwrap(), "carbon_number\trt\n12\t2.8\n");
    }

    #[test]
    fn test_dispatch_unsupported_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("batch_specification1.prn");
        fs::write(&input, "a,b\n1,2\n").unwrap();

        let err = dispatch(
            Method::Metadata,
            &input,
            &dir.path().join("out.tsv"),
            &PipelineConfig::default(),
        )
        .unwrap_err();

        assert!(format!("{:#}", err).contains("Unsupported file format"));
    }
}
