use std::path::PathBuf;

use serde::Serialize;

use crate::errors::{ConvertError, ConvertResult};
use crate::models::dbf::AcceptedVersions;
use crate::models::mappings::{ColumnDescriptor, build_schema};
use crate::models::normalize::strip_rows;
use crate::models::sink::write_sqlite;
use crate::models::source::{DEFAULT_CHANNEL_CAPACITY, RecordSource, ScanOptions, ScanSummary};
use crate::models::statements::validate_identifier;

/// Configuration for one DBF to SQLite conversion
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Source DBF file
    pub infile: PathBuf,
    /// Destination SQLite file, created if missing
    pub outfile: PathBuf,
    /// Table to create in the destination
    pub table_name: String,
    /// Trim leading/trailing spaces from text fields
    pub strip_strings: bool,
    /// Records to scan; 0 scans the whole file
    pub max_records: u32,
    /// Bound of every row channel
    pub channel_capacity: usize,
    /// Version bytes the source may start with
    pub accepted_versions: AcceptedVersions,
    /// Whether to draw a progress bar while scanning
    pub show_progress: bool,
}

impl ConvertConfig {
    pub fn new<I, O, T>(infile: I, outfile: O, table_name: T) -> Self
    where
        I: Into<PathBuf>,
        O: Into<PathBuf>,
        T: Into<String>,
    {
        Self {
            infile: infile.into(),
            outfile: outfile.into(),
            table_name: table_name.into(),
            strip_strings: false,
            max_records: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            accepted_versions: AcceptedVersions::default(),
            show_progress: true,
        }
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_records: self.max_records,
            channel_capacity: self.channel_capacity,
            show_progress: self.show_progress,
        }
    }
}

/// What a finished conversion produced
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows_written: u64,
    pub scan: ScanSummary,
}

/// Convert `config.infile` into a fresh table in `config.outfile`.
///
/// Must run inside a multi-purpose tokio runtime: the scan and the SQLite writer use
/// blocking tasks, the optional strip stage an async one.
pub async fn convert(config: &ConvertConfig) -> ConvertResult<ConversionReport> {
    let source = RecordSource::open(&config.infile, &config.accepted_versions)?;

    let columns = build_schema(source.fields())?;
    validate_identifier(&config.table_name)?;
    for column in &columns {
        validate_identifier(&column.name)?;
    }
    log::debug!(
        "Mapped {} columns from {}",
        columns.len(),
        config.infile.display()
    );

    let mut stream = source.into_stream(config.scan_options());
    if config.strip_strings {
        stream = strip_rows(stream, config.channel_capacity);
    }
    let (mut rows, completion) = stream.into_parts();

    let table = config.table_name.clone();
    let outfile = config.outfile.clone();
    let sink_columns = columns.clone();
    let written = tokio::task::spawn_blocking(move || {
        write_sqlite(&table, &outfile, &sink_columns, &mut rows)
    })
    .await
    .map_err(ConvertError::from)
    .and_then(|result| result);

    // The writer dropped its receiver either way, so the scan is winding down
    let scan = completion.await.map_err(ConvertError::from).and_then(|result| result);

    let written = written?;
    let scan = scan?;
    Ok(ConversionReport {
        table_name: config.table_name.clone(),
        columns,
        rows_written: written.rows_written,
        scan,
    })
}
