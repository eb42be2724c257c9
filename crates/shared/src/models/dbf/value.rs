use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};

/// Integral magnitudes below this convert to `i64` without rounding
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Numeric column payload; integral values are kept as integers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
            Number::Integer(value as i64)
        } else {
            Number::Decimal(value)
        }
    }
}

/// One decoded DBF field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Character(String),
    Numeric(Option<Number>),
    Float(Option<f64>),
    Date(Option<NaiveDate>),
}

/// A decoded record, one value per column in header order
pub type Row = Vec<FieldValue>;

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            FieldValue::Numeric(None) | FieldValue::Float(None) | FieldValue::Date(None)
        )
    }
}

impl TryFrom<dbase::FieldValue> for FieldValue {
    type Error = String;

    fn try_from(value: dbase::FieldValue) -> Result<Self, Self::Error> {
        match value {
            // A blank character field is an empty string, never NULL
            dbase::FieldValue::Character(text) => Ok(FieldValue::Character(text.unwrap_or_default())),
            dbase::FieldValue::Numeric(n) => Ok(FieldValue::Numeric(n.map(Number::from))),
            dbase::FieldValue::Float(f) => Ok(FieldValue::Float(f.map(widen_float))),
            dbase::FieldValue::Date(d) => date_from_dbase(d).map(FieldValue::Date),
            other => Err(format!("unsupported field type '{}'", other.field_type())),
        }
    }
}

/// `F` columns come back as `f32`; go through the shortest decimal form so 0.1 stays 0.1
fn widen_float(value: f32) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::from(value))
}

fn date_from_dbase(date: Option<dbase::Date>) -> Result<Option<NaiveDate>, String> {
    let Some(date) = date else {
        return Ok(None);
    };
    if date.year() == 0 && date.month() == 0 && date.day() == 0 {
        return Ok(None);
    }
    i32::try_from(date.year())
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, date.month(), date.day()))
        .map(Some)
        .ok_or_else(|| format!("invalid date '{date}'"))
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            FieldValue::Character(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            FieldValue::Numeric(Some(Number::Integer(n))) => ToSqlOutput::Owned(Value::Integer(*n)),
            FieldValue::Numeric(Some(Number::Decimal(n))) => ToSqlOutput::Owned(Value::Real(*n)),
            FieldValue::Float(Some(n)) => ToSqlOutput::Owned(Value::Real(*n)),
            FieldValue::Date(Some(d)) => {
                ToSqlOutput::Owned(Value::Text(d.format("%Y-%m-%d").to_string()))
            }
            FieldValue::Numeric(None) | FieldValue::Float(None) | FieldValue::Date(None) => {
                ToSqlOutput::Owned(Value::Null)
            }
        };
        Ok(output)
    }
}
