//! dBase III table decoding
//!
//! Wraps `dbase::File` for header, descriptor and record access, and converts its values
//! into the column types the SQLite side binds.
//! Records are addressed by index so a caller can skip deleted or undecodable
//! ones without losing its place in the file.

pub mod reader;
pub mod value;
pub mod version;

#[cfg(test)]
pub(crate) mod fixture;

pub use reader::{DbfField, DbfFile, DbfRecord};
pub use value::{FieldValue, Number, Row};
pub use version::{AcceptedVersions, VersionValidator, parse_version_byte};
