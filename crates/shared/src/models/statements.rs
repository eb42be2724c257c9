//! SQL text for the destination table.
//!
//! Identifiers are interpolated verbatim; callers are expected to run
//! [`validate_identifier`] on anything that came out of a source file first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ConvertError, ConvertResult};

/// Plain unquoted SQL identifier
pub static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex pattern for identifiers")
});

/// Reject names that would need quoting to be used in a statement
pub fn validate_identifier(name: &str) -> ConvertResult<()> {
    if IDENTIFIER_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ConvertError::InvalidIdentifier(name.to_string()))
    }
}

/// `CREATE TABLE <table> (<name_0> <type_0>, ...)`
pub fn build_create<N, T>(table: &str, names: &[N], types: &[T]) -> ConvertResult<String>
where
    N: AsRef<str>,
    T: AsRef<str>,
{
    if names.len() != types.len() {
        return Err(ConvertError::ColumnCountMismatch {
            names: names.len(),
            types: types.len(),
        });
    }
    if names.is_empty() {
        return Err(ConvertError::EmptySchema);
    }

    let columns: Vec<String> = names
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", name.as_ref(), ty.as_ref()))
        .collect();

    Ok(format!("CREATE TABLE {} ({})", table, columns.join(", ")))
}

/// `INSERT INTO <table> (<name_0>, ...) VALUES (?, ...)`
pub fn build_insert<N: AsRef<str>>(table: &str, names: &[N]) -> ConvertResult<String> {
    if names.is_empty() {
        return Err(ConvertError::EmptySchema);
    }

    let columns: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    let placeholders = vec!["?"; names.len()].join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    ))
}
