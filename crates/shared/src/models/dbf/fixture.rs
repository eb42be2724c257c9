//! Test helper that writes small dBase III tables

use std::path::Path;

/// Record body for a fixture table
pub struct FixtureRecord {
    pub flag: u8,
    pub bytes: Option<Vec<u8>>,
    pub fields: Vec<String>,
}

impl FixtureRecord {
    pub fn live(fields: &[&str]) -> Self {
        Self {
            flag: b' ',
            bytes: None,
            fields: fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn deleted(fields: &[&str]) -> Self {
        Self {
            flag: b'*',
            ..Self::live(fields)
        }
    }

    /// Pre-encoded record body, written as-is after the flag byte
    pub fn raw(flag: u8, bytes: Vec<u8>) -> Self {
        Self {
            flag,
            bytes: Some(bytes),
            fields: Vec::new(),
        }
    }
}

/// Write a table with `(name, type, length, decimals)` columns.
///
/// Character values are left aligned, everything else right aligned, like dBase does.
pub fn write_fixture<P: AsRef<Path>>(
    path: P,
    version: u8,
    columns: &[(&str, u8, u8, u8)],
    records: &[FixtureRecord],
) {
    let record_length: usize = 1 + columns.iter().map(|c| c.2 as usize).sum::<usize>();
    let header_length = 32 + columns.len() * 32 + 1;

    let mut out = Vec::new();
    out.push(version);
    out.extend_from_slice(&[124, 6, 15]);
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_length as u16).to_le_bytes());
    out.extend_from_slice(&(record_length as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for (name, type_code, length, decimals) in columns {
        let mut descriptor = [0u8; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = *type_code;
        descriptor[16] = *length;
        descriptor[17] = *decimals;
        out.extend_from_slice(&descriptor);
    }
    out.push(0x0D);

    for record in records {
        out.push(record.flag);
        match &record.bytes {
            Some(bytes) => {
                let mut body = bytes.clone();
                body.resize(record_length - 1, b' ');
                out.extend_from_slice(&body);
            }
            None => {
                for ((_, type_code, length, _), value) in columns.iter().zip(&record.fields) {
                    let width = *length as usize;
                    let cell = if *type_code == b'C' {
                        format!("{value:<width$}")
                    } else {
                        format!("{value:>width$}")
                    };
                    out.extend_from_slice(&cell.as_bytes()[..width]);
                }
            }
        }
    }
    out.push(0x1A);

    std::fs::write(path, out).expect("write dbf fixture");
}
