use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use shared::errors::ConvertError;
use shared::models::dbf::{AcceptedVersions, parse_version_byte};
use shared::models::pipeline::{ConversionReport, ConvertConfig, convert};

/// Copy the live records of a dBase III table into a new SQLite table
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// DBF file to read
    #[arg(long)]
    infile: PathBuf,

    /// SQLite database to write, created if missing
    #[arg(long)]
    outfile: PathBuf,

    /// Name of the table to create
    #[arg(long)]
    tablename: String,

    /// Trim leading/trailing spaces from text fields
    #[arg(long, default_value_t = false)]
    stripstrings: bool,

    /// Scan only the first N records (0 = all)
    #[arg(long, default_value_t = 0)]
    max_records: u32,

    /// Rows buffered between reader and writer
    #[arg(long, default_value_t = shared::models::source::DEFAULT_CHANNEL_CAPACITY)]
    channel_capacity: usize,

    /// Extra version byte to accept, hex (0x83) or decimal; repeatable
    #[arg(long = "accept-version", value_parser = parse_version_byte)]
    accept_version: Vec<u8>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Print the conversion report as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(ConvertConfig, bool)> {
        if self.channel_capacity == 0 {
            bail!("--channel-capacity must be at least 1");
        }

        let accepted_versions = self
            .accept_version
            .iter()
            .fold(AcceptedVersions::default(), |versions, v| versions.with(*v));

        let config = ConvertConfig {
            strip_strings: self.stripstrings,
            max_records: self.max_records,
            channel_capacity: self.channel_capacity,
            accepted_versions,
            show_progress: !self.quiet,
            ..ConvertConfig::new(self.infile, self.outfile, self.tablename)
        };
        Ok((config, self.json))
    }
}

fn context_for(err: &ConvertError, config: &ConvertConfig) -> String {
    match err {
        ConvertError::UnknownTypeCode { .. }
        | ConvertError::ColumnCountMismatch { .. }
        | ConvertError::EmptySchema => "problem translating sqlite column types".to_string(),
        ConvertError::DestinationOpenFailed { .. }
        | ConvertError::SchemaCreationFailed { .. }
        | ConvertError::StatementPrepareFailed { .. }
        | ConvertError::RowInsertFailed { .. }
        | ConvertError::Transaction(_) => {
            format!("problem writing outdb {}", config.outfile.display())
        }
        _ => format!("problem reading {}", config.infile.display()),
    }
}

fn print_report(report: &ConversionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "Wrote {} rows into {} ({} deleted, {} undecodable records skipped)",
            report.rows_written, report.table_name, report.scan.deleted, report.scan.undecodable
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, json) = Args::parse().into_config()?;
    log::debug!("{:?}", config);

    let report = match convert(&config).await {
        Ok(report) => report,
        Err(e) => {
            let context = context_for(&e, &config);
            return Err(anyhow::Error::new(e).context(context));
        }
    };

    print_report(&report, json)
}
