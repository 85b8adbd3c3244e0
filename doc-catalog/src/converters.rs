//! The mapping between document values and backend columns.
//!
//! Every dialect owns a [`TypeRegistry`] deciding the native column type of
//! each [`KvType`] and converting values to statement parameters and back.
//! Arrays and documents are stored whole, as JSON built by the [`array`]
//! converter.

pub mod array;
mod postgres;
mod sqlite;

pub use postgres::PostgresTypes;
pub use sqlite::SqliteTypes;

use crate::{ast::Value, error::Error, meta::FieldType};
use kv_value::{ConversionFailure, KvType, KvValue};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// The SQL type family of a native column type, in JDBC terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlTypeFamily {
    Boolean,
    Integer,
    BigInt,
    Double,
    Numeric,
    Varchar,
    Date,
    Time,
    Timestamp,
    Binary,
    Json,
}

/// The column chosen for a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataTypeForKv {
    pub kv_type: KvType,
    /// The type as written in DDL.
    pub native: &'static str,
    pub family: SqlTypeFamily,
}

impl DataTypeForKv {
    pub(crate) const fn new(kv_type: KvType, native: &'static str, family: SqlTypeFamily) -> Self {
        DataTypeForKv {
            kv_type,
            native,
            family,
        }
    }
}

/// Conversions between document values and one backend's columns.
///
/// Null and undefined carry no data. Both are stored as a `BOOLEAN` column
/// holding `true`, and reading any boolean back from such a column gives
/// the constant again.
pub trait TypeRegistry: Send + Sync {
    fn data_type(&self, kv_type: KvType) -> DataTypeForKv;

    /// The native column type of a catalog field. Child markers hold a
    /// boolean.
    fn column_type(&self, field_type: FieldType) -> &'static str {
        let kv_type = field_type.kv_type().unwrap_or(KvType::Boolean);
        self.data_type(kv_type).native
    }

    /// The parameter to bind when writing the value.
    fn to_sql(&self, value: &KvValue) -> crate::Result<Value<'static>>;

    /// Reads back a value of the given type from a result column.
    fn from_sql(&self, kv_type: KvType, value: Value<'_>) -> crate::Result<KvValue>;
}

pub(crate) fn mismatch(kv_type: KvType, value: &Value<'_>) -> Error {
    ConversionFailure::new(format!("{value:?}"), kv_type.as_str()).into()
}

/// Integers of both widths narrowed to `i32`, failing on overflow.
pub(crate) fn to_i32(kv_type: KvType, value: &Value<'_>) -> crate::Result<i32> {
    value
        .as_i64()
        .and_then(|i| i32::try_from(i).ok())
        .ok_or_else(|| mismatch(kv_type, value))
}

pub(crate) fn to_i64(kv_type: KvType, value: &Value<'_>) -> crate::Result<i64> {
    value.as_i64().ok_or_else(|| mismatch(kv_type, value))
}

/// Decodes the constant stored for null and undefined.
pub(crate) fn constant(kv_type: KvType, value: &Value<'_>) -> crate::Result<KvValue> {
    match (kv_type, value.as_bool()) {
        (KvType::Null, Some(_)) => Ok(KvValue::Null),
        (KvType::Undefined, Some(_)) => Ok(KvValue::Undefined),
        _ => Err(mismatch(kv_type, value)),
    }
}

/// Reads a container back from its JSON form, checking it is the expected
/// kind of container.
pub(crate) fn container(kv_type: KvType, json: &serde_json::Value) -> crate::Result<KvValue> {
    let value = array::from_json_element(json)?;

    if value.kv_type() != kv_type {
        return Err(ConversionFailure::new(format!("json `{json}`"), kv_type.as_str()).into());
    }

    Ok(value)
}

#[cfg(test)]
pub(crate) mod samples {
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use kv_value::{KvDocument, KvTimestamp, KvValue, ObjectId};
    use std::str::FromStr;

    /// One or more values of every type, boundaries included.
    pub(crate) fn values() -> Vec<KvValue> {
        vec![
            KvValue::Null,
            KvValue::Undefined,
            KvValue::Boolean(false),
            KvValue::Boolean(true),
            KvValue::Integer(0),
            KvValue::Integer(i32::MIN),
            KvValue::Integer(i32::MAX),
            KvValue::Long(7),
            KvValue::Long(i64::MIN),
            KvValue::Long(i64::MAX),
            KvValue::Double(0.0),
            KvValue::Double(-0.5),
            KvValue::Double(f64::MAX),
            KvValue::Double(f64::INFINITY),
            KvValue::Double(f64::NEG_INFINITY),
            KvValue::Double(f64::NAN),
            KvValue::Decimal128(BigDecimal::from_str("-12.340").unwrap()),
            KvValue::Decimal128(BigDecimal::from(0)),
            KvValue::String(String::new()),
            KvValue::String("$long".into()),
            KvValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            KvValue::Time(NaiveTime::from_hms_milli_opt(23, 59, 59, 250).unwrap()),
            KvValue::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
            KvValue::Instant(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()),
            KvValue::Instant(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()),
            KvValue::Binary(Vec::new()),
            KvValue::Binary(vec![0, 1, 254, 255]),
            KvValue::ObjectId(ObjectId::from_bytes([7; 12])),
            KvValue::Timestamp(KvTimestamp::new(u32::MAX, 3)),
            KvValue::Timestamp(KvTimestamp::new(0, 0)),
            KvValue::Array(Vec::new()),
            KvValue::Array(vec![KvValue::Integer(1), KvValue::Array(vec![KvValue::Long(1)])]),
            KvValue::Document(KvDocument::new()),
            KvValue::Document(KvDocument::new().with("a", 1).with("b", "x")),
        ]
    }

    /// Equality where a NaN double equals NaN.
    pub(crate) fn assert_same(expected: &KvValue, actual: &KvValue) {
        match (expected, actual) {
            (KvValue::Double(a), KvValue::Double(b)) if a.is_nan() => assert!(b.is_nan(), "expected NaN, got {b}"),
            _ => pretty_assertions::assert_eq!(expected, actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_type_has_a_column() {
        let registries: [&dyn TypeRegistry; 2] = [&PostgresTypes, &SqliteTypes];

        for registry in registries {
            for field_type in FieldType::ALL {
                assert!(!registry.column_type(field_type).is_empty());
            }

            assert_eq!("BOOLEAN", registry.column_type(FieldType::Child));
        }
    }

    #[test]
    fn undefined_is_one_value_in_every_encoding() {
        let registries: [&dyn TypeRegistry; 2] = [&PostgresTypes, &SqliteTypes];

        for registry in registries {
            let stored = registry.to_sql(&KvValue::Undefined).unwrap();
            assert_eq!(Value::Boolean(true), stored);

            for raw in [Value::Boolean(true), Value::Boolean(false), Value::Int64(0)] {
                assert_eq!(KvValue::Undefined, registry.from_sql(KvType::Undefined, raw).unwrap());
            }

            assert_eq!(KvValue::Null, registry.from_sql(KvType::Null, Value::Boolean(false)).unwrap());
        }
    }
}
