use std::path::Path;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::ConvertResult;
use crate::models::dbf::{DbfField, DbfFile, Row, VersionValidator};
use crate::models::progress::ProgressIndicator;

/// Default bound of every row channel in the pipeline
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;

/// Counters reported once a scan has finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Record indexes visited
    pub scanned: u32,
    /// Rows handed to the consumer
    pub emitted: u32,
    pub deleted: u32,
    pub undecodable: u32,
}

/// Options for a background scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Records to visit; 0 means the header's record count
    pub max_records: u32,
    pub channel_capacity: usize,
    pub show_progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_records: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            show_progress: false,
        }
    }
}

/// Bounded stream of decoded rows plus the future that resolves when its producer is done
pub struct RowStream {
    pub rows: mpsc::Receiver<Row>,
    pub completion: JoinHandle<ConvertResult<ScanSummary>>,
}

impl RowStream {
    pub fn into_parts(self) -> (mpsc::Receiver<Row>, JoinHandle<ConvertResult<ScanSummary>>) {
        (self.rows, self.completion)
    }

    /// Drain every row; mostly useful for tests and small files
    pub async fn collect(self) -> ConvertResult<(Vec<Row>, ScanSummary)> {
        let (mut rows, completion) = self.into_parts();
        let mut collected = Vec::new();
        while let Some(row) = rows.recv().await {
            collected.push(row);
        }
        let summary = completion.await??;
        Ok((collected, summary))
    }
}

/// An opened DBF table whose records have not been read yet
#[derive(Debug)]
pub struct RecordSource {
    dbf: DbfFile,
}

impl RecordSource {
    /// Open `path`, rejecting it when the version byte fails `validator`
    pub fn open<P: AsRef<Path>>(
        path: P,
        validator: &dyn VersionValidator,
    ) -> ConvertResult<Self> {
        let dbf = DbfFile::open(path, validator)?;
        Ok(Self { dbf })
    }

    pub fn fields(&self) -> &[DbfField] {
        self.dbf.fields()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.dbf.field_names()
    }

    pub fn type_codes(&self) -> Vec<u8> {
        self.dbf.field_types()
    }

    pub fn num_records(&self) -> u32 {
        self.dbf.num_records()
    }

    /// Start scanning on a blocking task that owns the file and the sending half.
    ///
    /// Must be called from within a tokio runtime.
    pub fn into_stream(self, options: ScanOptions) -> RowStream {
        let capacity = options.channel_capacity.max(1);
        let (sender, rows) = mpsc::channel(capacity);
        let completion = tokio::task::spawn_blocking(move || ConvertResult::Ok(scan(self.dbf, sender, &options)));
        RowStream { rows, completion }
    }
}

fn scan(mut dbf: DbfFile, output: mpsc::Sender<Row>, options: &ScanOptions) -> ScanSummary {
    let max = if options.max_records > 0 {
        options.max_records
    } else {
        dbf.num_records()
    };

    let mut progress = ProgressIndicator::new(max as usize, !options.show_progress);
    let mut summary = ScanSummary::default();

    for index in 0..max {
        progress.increment();
        summary.scanned += 1;

        let record = match dbf.record_at(index) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping record: {}", e);
                summary.undecodable += 1;
                continue;
            }
        };
        if record.deleted {
            summary.deleted += 1;
            continue;
        }

        if output.blocking_send(record.values).is_err() {
            log::debug!("Row consumer hung up after {} rows", summary.emitted);
            break;
        }
        summary.emitted += 1;
    }
    progress.finish();

    log::info!(
        "Scanned {} records from {}: {} rows, {} deleted, {} undecodable",
        summary.scanned,
        dbf.path().display(),
        summary.emitted,
        summary.deleted,
        summary.undecodable
    );
    summary
}
