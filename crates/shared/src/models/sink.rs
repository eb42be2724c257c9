use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::errors::{ConvertError, ConvertResult};
use crate::models::dbf::Row;
use crate::models::mappings::ColumnDescriptor;
use crate::models::statements::{build_create, build_insert};

/// Result of draining a row stream into the destination table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub rows_written: u64,
}

/// SQLite destination file
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open or create the destination database
    pub fn open<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| ConvertError::DestinationOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Opened db {}", path.display());
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run the `CREATE TABLE` for `columns`; an existing table is an error
    pub fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> ConvertResult<()> {
        let (names, types) = split_columns(columns);
        let statement = build_create(table, &names, &types)?;

        self.conn
            .execute(&statement, [])
            .map_err(|source| ConvertError::SchemaCreationFailed {
                statement: statement.clone(),
                source,
            })?;
        log::info!("Created table {} with {} columns", table, columns.len());
        Ok(())
    }

    /// Insert every row from `rows` inside one transaction.
    ///
    /// Blocks on the channel, so call it from a blocking context. The transaction is
    /// committed only after the stream closes; any failure rolls it back.
    pub fn insert_rows(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        rows: &mut mpsc::Receiver<Row>,
    ) -> ConvertResult<WriteSummary> {
        let (names, _) = split_columns(columns);
        let statement = build_insert(table, &names)?;

        let mut insert = self
            .conn
            .prepare(&statement)
            .map_err(|source| ConvertError::StatementPrepareFailed {
                statement: statement.clone(),
                source,
            })?;

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(ConvertError::Transaction)?;

        let mut summary = WriteSummary::default();
        while let Some(row) = rows.blocking_recv() {
            insert
                .execute(params_from_iter(row.iter()))
                .map_err(|source| ConvertError::RowInsertFailed {
                    row_index: summary.rows_written,
                    source,
                })?;
            summary.rows_written += 1;
        }

        tx.commit().map_err(ConvertError::Transaction)?;
        if let Err(e) = insert.finalize() {
            log::warn!("Failed to finalize insert statement: {}", e);
        }

        log::info!("Wrote {} rows into {}", summary.rows_written, table);
        Ok(summary)
    }
}

fn split_columns(columns: &[ColumnDescriptor]) -> (Vec<&str>, Vec<&str>) {
    columns
        .iter()
        .map(|c| (c.name.as_str(), c.destination_type.as_str()))
        .unzip()
}

/// Open `out_path`, create `table` and drain `rows` into it
pub fn write_sqlite<P: AsRef<Path>>(
    table: &str,
    out_path: P,
    columns: &[ColumnDescriptor],
    rows: &mut mpsc::Receiver<Row>,
) -> ConvertResult<WriteSummary> {
    let sink = SqliteSink::open(out_path)?;
    sink.create_table(table, columns)?;
    sink.insert_rows(table, columns, rows)
}
