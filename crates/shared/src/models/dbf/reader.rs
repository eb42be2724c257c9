use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use dbase::{BufReadWriteFile, FieldIndex, FieldInfo, ReadingOptions, TrimOption};

use crate::errors::{ConvertError, ConvertResult};
use crate::models::dbf::value::{FieldValue, Row};
use crate::models::dbf::version::VersionValidator;

const HEADER_SIZE: usize = 32;
/// Header plus the 0x0D descriptor terminator, with no descriptors at all
const MIN_HEADER_LENGTH: u16 = HEADER_SIZE as u16 + 1;
/// Visual FoxPro tables carry a database container backlink after the descriptors
const FOXPRO_BACKLINK_LENGTH: u16 = 263;

/// Column layout taken from a field descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    pub type_code: u8,
    pub length: u8,
}

impl From<&FieldInfo> for DbfField {
    fn from(info: &FieldInfo) -> Self {
        Self {
            name: info.name().to_string(),
            type_code: u8::from(info.field_type()),
            length: info.length(),
        }
    }
}

/// One record read by index; deleted records carry no values
#[derive(Debug, Clone, PartialEq)]
pub struct DbfRecord {
    pub deleted: bool,
    pub values: Row,
}

/// Random-access reader over a dBase III style table
pub struct DbfFile {
    path: PathBuf,
    version: u8,
    inner: dbase::File<BufReadWriteFile>,
    fields: Vec<DbfField>,
}

impl std::fmt::Debug for DbfFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbfFile")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("records", &self.inner.num_records())
            .field("fields", &self.fields)
            .finish()
    }
}

impl DbfFile {
    /// Open a file, check its version byte and read the field descriptors
    pub fn open<P: AsRef<Path>>(path: P, validator: &dyn VersionValidator) -> ConvertResult<Self> {
        let path = path.as_ref().to_path_buf();
        let version = check_leading_header(&path, validator)?;

        let mut inner = dbase::File::open_read_only(&path)
            .map_err(|e| ConvertError::invalid_header(&path, e.to_string()))?;
        // Trailing pad goes, leading spaces are left for the strip stage
        inner.set_options(ReadingOptions::default().character_trim(TrimOption::End));

        let fields: Vec<DbfField> = inner.fields().iter().map(DbfField::from).collect();
        if fields.is_empty() {
            return Err(ConvertError::invalid_header(&path, "no field descriptors"));
        }

        log::debug!(
            "Opened {} (version {:#04x}, {} records, {} fields)",
            path.display(),
            version,
            inner.num_records(),
            fields.len()
        );

        Ok(Self {
            path,
            version,
            inner,
            fields,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn field_types(&self) -> Vec<u8> {
        self.fields.iter().map(|f| f.type_code).collect()
    }

    pub fn num_records(&self) -> u32 {
        u32::try_from(self.inner.num_records()).unwrap_or(u32::MAX)
    }

    /// Read and decode the record at `index`.
    ///
    /// Deleted records are reported without decoding their fields.
    pub fn record_at(&mut self, index: u32) -> ConvertResult<DbfRecord> {
        let mut record = self
            .inner
            .record(index as usize)
            .ok_or_else(|| ConvertError::record_decode(index, "past the last record"))?;

        let deleted = record
            .is_deleted()
            .map_err(|e| ConvertError::record_decode(index, e.to_string()))?;
        if deleted {
            return Ok(DbfRecord {
                deleted,
                values: Row::new(),
            });
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for (position, field) in self.fields.iter().enumerate() {
            let raw = record
                .read_field(FieldIndex(position))
                .map_err(|e| ConvertError::record_decode(index, e.to_string()))?;
            let value = FieldValue::try_from(raw).map_err(|msg| {
                ConvertError::record_decode(index, format!("field {}: {msg}", field.name))
            })?;
            values.push(value);
        }

        Ok(DbfRecord { deleted, values })
    }
}

/// Validate the version byte and the declared header length before `dbase` parses the rest
fn check_leading_header(path: &Path, validator: &dyn VersionValidator) -> ConvertResult<u8> {
    let mut file = File::open(path)?;
    let mut header = [0u8; HEADER_SIZE];

    file.read_exact(&mut header[..1])
        .map_err(|_| ConvertError::invalid_header(path, "empty file"))?;
    let version = header[0];
    validator
        .validate(version)
        .map_err(|reason| ConvertError::InvalidSourceVersion { version, reason })?;

    file.read_exact(&mut header[1..])
        .map_err(|e| ConvertError::invalid_header(path, format!("truncated header: {e}")))?;

    let header_length = u16::from_le_bytes([header[8], header[9]]);
    let minimum = if (0x30..=0x32).contains(&version) {
        MIN_HEADER_LENGTH + FOXPRO_BACKLINK_LENGTH
    } else {
        MIN_HEADER_LENGTH
    };
    if header_length < minimum {
        return Err(ConvertError::invalid_header(
            path,
            format!("header length {header_length} is below {minimum}"),
        ));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dbf::fixture::{FixtureRecord, write_fixture};
    use crate::models::dbf::value::Number;
    use crate::models::dbf::version::AcceptedVersions;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_open_reads_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.dbf");
        write_fixture(
            &path,
            0x03,
            &[("NAME", b'C', 8, 0), ("AMT", b'N', 5, 0)],
            &[FixtureRecord::live(&["Ann", "12"])],
        );

        let dbf = DbfFile::open(&path, &AcceptedVersions::default()).unwrap();
        assert_eq!(dbf.field_names(), vec!["NAME", "AMT"]);
        assert_eq!(dbf.field_types(), vec![b'C', b'N']);
        assert_eq!(dbf.fields()[0].length, 8);
        assert_eq!(dbf.num_records(), 1);
        assert_eq!(dbf.version(), 0x03);
    }

    #[test]
    fn test_open_rejects_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memo.dbf");
        write_fixture(&path, 0x83, &[("NAME", b'C', 4, 0)], &[]);

        let err = DbfFile::open(&path, &AcceptedVersions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSourceVersion { version: 0x83, .. }));

        let lenient = AcceptedVersions::default().with(0x83);
        assert!(DbfFile::open(&path, &lenient).is_ok());
    }

    #[test]
    fn test_open_accepts_variant_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("variant.dbf");
        write_fixture(
            &path,
            0x74,
            &[("NAME", b'C', 4, 0)],
            &[FixtureRecord::live(&["Ann"])],
        );

        let mut dbf = DbfFile::open(&path, &AcceptedVersions::default()).unwrap();
        assert_eq!(dbf.version(), 0x74);
        assert_eq!(
            dbf.record_at(0).unwrap().values,
            vec![FieldValue::Character("Ann".to_string())]
        );
        assert!(DbfFile::open(&path, &AcceptedVersions::strict()).is_err());
    }

    #[test]
    fn test_open_rejects_bad_headers() {
        let dir = tempdir().unwrap();

        let path = dir.path().join("short.dbf");
        std::fs::write(&path, [0x03u8, 0x7c, 0x01]).unwrap();
        let err = DbfFile::open(&path, &AcceptedVersions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSourceHeader { .. }));

        let path = dir.path().join("empty.dbf");
        std::fs::write(&path, []).unwrap();
        let err = DbfFile::open(&path, &AcceptedVersions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSourceHeader { .. }));

        // A FoxPro table whose header has no room for the backlink
        let path = dir.path().join("foxpro.dbf");
        write_fixture(&path, 0x30, &[("NAME", b'C', 4, 0)], &[]);
        let lenient = AcceptedVersions::default().with(0x30);
        let err = DbfFile::open(&path, &lenient).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSourceHeader { .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let err = DbfFile::open("/definitely/not/here.dbf", &AcceptedVersions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }

    #[test]
    fn test_record_at_flags_and_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.dbf");
        write_fixture(
            &path,
            0x03,
            &[("NAME", b'C', 6, 0), ("AMT", b'N', 6, 2), ("BORN", b'D', 8, 0)],
            &[
                FixtureRecord::live(&[" Ann", "1.50", "19800102"]),
                FixtureRecord::deleted(&["Bob", "2.00", "19900101"]),
                FixtureRecord::live(&["Cy", "oops", "19900101"]),
            ],
        );

        let mut dbf = DbfFile::open(&path, &AcceptedVersions::default()).unwrap();

        let first = dbf.record_at(0).unwrap();
        assert!(!first.deleted);
        assert_eq!(first.values[0], FieldValue::Character(" Ann".to_string()));
        assert_eq!(first.values[1], FieldValue::Numeric(Some(Number::Decimal(1.5))));
        assert_eq!(first.values[2], FieldValue::Date(NaiveDate::from_ymd_opt(1980, 1, 2)));

        let second = dbf.record_at(1).unwrap();
        assert!(second.deleted);
        assert!(second.values.is_empty());

        let err = dbf.record_at(2).unwrap_err();
        assert!(matches!(err, ConvertError::RecordDecodeFailed { index: 2, .. }));

        // Past the end of the body
        assert!(dbf.record_at(3).is_err());
        // Going back still works after a failure
        assert!(!dbf.record_at(0).unwrap().deleted);
    }

    #[test]
    fn test_undefined_code_page_reads_as_windows_1252() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accents.dbf");
        write_fixture(
            &path,
            0x03,
            &[("CITY", b'C', 4, 0)],
            &[FixtureRecord::raw(b' ', vec![0x8A, b'a', b'r', b'y'])],
        );

        let mut dbf = DbfFile::open(&path, &AcceptedVersions::default()).unwrap();
        let record = dbf.record_at(0).unwrap();
        assert_eq!(record.values[0], FieldValue::Character("Šary".to_string()));
    }
}
