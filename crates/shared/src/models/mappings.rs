use serde::Serialize;
use std::fmt;

use crate::errors::{ConvertError, ConvertResult};
use crate::models::dbf::DbfField;

/// Destination column types a DBF column can be declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqliteType {
    Date,
    Float,
    Numeric,
    Character,
}

impl SqliteType {
    /// Look up the destination type for a single DBF type code (case-sensitive)
    pub fn from_dbf_code(code: u8) -> Option<Self> {
        match code {
            b'D' => Some(SqliteType::Date),
            b'F' => Some(SqliteType::Float),
            b'N' => Some(SqliteType::Numeric),
            b'C' => Some(SqliteType::Character),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SqliteType::Date => "DATE",
            SqliteType::Float => "FLOAT",
            SqliteType::Numeric => "NUMERIC",
            SqliteType::Character => "CHARACTER",
        }
    }
}

impl AsRef<str> for SqliteType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SqliteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map every type code to its destination type, failing on the first unknown one
pub fn sqlite_columns_from_dbf(type_codes: &[u8]) -> ConvertResult<Vec<SqliteType>> {
    type_codes
        .iter()
        .enumerate()
        .map(|(index, &code)| {
            SqliteType::from_dbf_code(code).ok_or(ConvertError::UnknownTypeCode { code, index })
        })
        .collect()
}

/// Name, source type code and destination type of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(serialize_with = "serialize_type_code")]
    pub source_type_code: u8,
    pub destination_type: SqliteType,
}

fn serialize_type_code<S: serde::Serializer>(code: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_char(*code as char)
}

/// Build the full destination schema from the source field headers
pub fn build_schema(fields: &[DbfField]) -> ConvertResult<Vec<ColumnDescriptor>> {
    let codes: Vec<u8> = fields.iter().map(|f| f.type_code).collect();
    let types = sqlite_columns_from_dbf(&codes)?;
    Ok(fields
        .iter()
        .zip(types)
        .map(|(field, destination_type)| ColumnDescriptor {
            name: field.name.clone(),
            source_type_code: field.type_code,
            destination_type,
        })
        .collect())
}
