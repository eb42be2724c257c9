pub mod dbf;
pub mod mappings;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod source;
pub mod statements;

pub use dbf::{AcceptedVersions, FieldValue, Number, Row, VersionValidator, parse_version_byte};
pub use mappings::{ColumnDescriptor, SqliteType, build_schema, sqlite_columns_from_dbf};
pub use normalize::{strip_row, strip_rows};
pub use pipeline::{ConversionReport, ConvertConfig, convert};
pub use progress::ProgressIndicator;
pub use sink::{SqliteSink, WriteSummary, write_sqlite};
pub use source::{DEFAULT_CHANNEL_CAPACITY, RecordSource, RowStream, ScanOptions, ScanSummary};
pub use statements::{build_create, build_insert, validate_identifier};
