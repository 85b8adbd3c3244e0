use super::{
    array, constant, container, mismatch, to_i32, to_i64, DataTypeForKv, SqlTypeFamily, TypeRegistry, DATE_FORMAT,
    TIME_FORMAT,
};
use crate::ast::Value;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use kv_value::{KvTimestamp, KvType, KvValue, ObjectId};
use std::{borrow::Cow, str::FromStr};

const NAN: &str = "NaN";

/// Column types and conversions for SQLite.
///
/// SQLite only stores integers, reals, text and blobs. Declared types are
/// kept close to the PostgreSQL ones so the declared type tells what a
/// column holds; decimals, dates and times are text in a fixed format and
/// containers are JSON text. SQLite turns a NaN real into NULL, so NaN is
/// stored as the text `NaN` instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypes;

impl TypeRegistry for SqliteTypes {
    fn data_type(&self, kv_type: KvType) -> DataTypeForKv {
        use SqlTypeFamily as F;

        let (native, family) = match kv_type {
            KvType::Null | KvType::Undefined | KvType::Boolean => ("BOOLEAN", F::Boolean),
            KvType::Integer => ("INTEGER", F::Integer),
            KvType::Long | KvType::Timestamp => ("BIGINT", F::BigInt),
            KvType::Double => ("REAL", F::Double),
            KvType::Decimal128 => ("TEXT", F::Numeric),
            KvType::String => ("TEXT", F::Varchar),
            KvType::Date => ("DATE", F::Date),
            KvType::Time => ("TIME", F::Time),
            KvType::Instant => ("TIMESTAMP", F::Timestamp),
            KvType::Binary | KvType::ObjectId => ("BLOB", F::Binary),
            KvType::Array | KvType::Document => ("TEXT", F::Json),
        };

        DataTypeForKv::new(kv_type, native, family)
    }

    fn to_sql(&self, value: &KvValue) -> crate::Result<Value<'static>> {
        let value = match value {
            KvValue::Null | KvValue::Undefined => Value::Boolean(true),
            KvValue::Boolean(b) => Value::Boolean(*b),
            KvValue::Integer(i) => Value::Int32(*i),
            KvValue::Long(l) => Value::Int64(*l),
            KvValue::Double(d) if d.is_nan() => Value::Text(Cow::Borrowed(NAN)),
            KvValue::Double(d) => Value::Double(*d),
            KvValue::Decimal128(d) => Value::Text(Cow::Owned(d.to_string())),
            KvValue::String(s) => Value::Text(Cow::Owned(s.clone())),
            KvValue::Date(d) => Value::Text(Cow::Owned(d.format(DATE_FORMAT).to_string())),
            KvValue::Time(t) => Value::Text(Cow::Owned(t.format(TIME_FORMAT).to_string())),
            KvValue::Instant(i) => Value::Text(Cow::Owned(i.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
            KvValue::Binary(b) => Value::Bytes(Cow::Owned(b.clone())),
            KvValue::ObjectId(oid) => Value::Bytes(Cow::Owned(oid.bytes().to_vec())),
            KvValue::Timestamp(ts) => Value::Int64(ts.pack()),
            KvValue::Array(_) | KvValue::Document(_) => {
                Value::Text(Cow::Owned(serde_json::to_string(&array::to_json_element(value))?))
            }
        };

        Ok(value)
    }

    fn from_sql(&self, kv_type: KvType, value: Value<'_>) -> crate::Result<KvValue> {
        let parse_failed = |_| mismatch(kv_type, &value);

        let kv_value = match (kv_type, &value) {
            (KvType::Null | KvType::Undefined, _) => constant(kv_type, &value)?,
            (KvType::Boolean, _) => KvValue::Boolean(value.as_bool().ok_or_else(|| mismatch(kv_type, &value))?),
            (KvType::Integer, _) => KvValue::Integer(to_i32(kv_type, &value)?),
            (KvType::Long, _) => KvValue::Long(to_i64(kv_type, &value)?),
            (KvType::Double, Value::Double(d)) => KvValue::Double(*d),
            // Integral reals written into a REAL column stay reals, but
            // values from expressions may come back as integers.
            (KvType::Double, Value::Int64(i)) => KvValue::Double(*i as f64),
            (KvType::Double, Value::Text(s)) if s == NAN => KvValue::Double(f64::NAN),
            (KvType::Decimal128, Value::Text(s)) => {
                KvValue::Decimal128(BigDecimal::from_str(s).map_err(|_| mismatch(kv_type, &value))?)
            }
            (KvType::String, Value::Text(s)) => KvValue::String(s.to_string()),
            (KvType::Date, Value::Text(s)) => KvValue::Date(NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(parse_failed)?),
            (KvType::Time, Value::Text(s)) => KvValue::Time(NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(parse_failed)?),
            (KvType::Instant, Value::Text(s)) => {
                KvValue::Instant(DateTime::parse_from_rfc3339(s).map_err(parse_failed)?.with_timezone(&Utc))
            }
            (KvType::Binary, Value::Bytes(b)) => KvValue::Binary(b.to_vec()),
            (KvType::ObjectId, Value::Bytes(b)) => KvValue::ObjectId(ObjectId::try_from(&b[..])?),
            (KvType::Timestamp, _) => KvValue::Timestamp(KvTimestamp::unpack(to_i64(kv_type, &value)?)),
            (KvType::Array | KvType::Document, Value::Text(s)) => container(kv_type, &serde_json::from_str(s)?)?,
            _ => return Err(mismatch(kv_type, &value)),
        };

        Ok(kv_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::samples;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_round_trip() {
        for value in samples::values() {
            let stored = SqliteTypes.to_sql(&value).unwrap();
            let read = SqliteTypes.from_sql(value.kv_type(), stored).unwrap();

            samples::assert_same(&value, &read);
        }
    }

    #[test]
    fn nan_is_stored_as_text() {
        assert_eq!(Value::from("NaN"), SqliteTypes.to_sql(&KvValue::Double(f64::NAN)).unwrap());
        assert_eq!(
            Value::Double(f64::INFINITY),
            SqliteTypes.to_sql(&KvValue::Double(f64::INFINITY)).unwrap()
        );
        assert!(SqliteTypes.from_sql(KvType::Double, Value::from("1.5")).is_err());
        assert!(SqliteTypes.from_sql(KvType::Double, Value::Null).is_err());
    }

    #[test]
    fn text_formats() {
        let date = NaiveDate::from_ymd_opt(2001, 9, 9).unwrap();
        let time = NaiveTime::from_hms_micro_opt(1, 46, 40, 5).unwrap();

        assert_eq!(Value::from("2001-09-09"), SqliteTypes.to_sql(&KvValue::Date(date)).unwrap());
        assert_eq!(Value::from("01:46:40.000005"), SqliteTypes.to_sql(&KvValue::Time(time)).unwrap());
        assert_eq!(
            Value::from(r#"{"a":[1,{"$long":2}]}"#),
            SqliteTypes
                .to_sql(&KvValue::Document(kv_value::KvDocument::new().with(
                    "a",
                    KvValue::Array(vec![KvValue::Integer(1), KvValue::Long(2)])
                )))
                .unwrap()
        );
    }

    #[test]
    fn booleans_read_from_integers() {
        assert_eq!(KvValue::Boolean(true), SqliteTypes.from_sql(KvType::Boolean, Value::Int64(1)).unwrap());
        assert_eq!(KvValue::Boolean(false), SqliteTypes.from_sql(KvType::Boolean, Value::Int64(0)).unwrap());
    }

    #[test]
    fn unparsable_text_is_an_error() {
        assert!(SqliteTypes.from_sql(KvType::Date, Value::from("yesterday")).is_err());
        assert!(SqliteTypes.from_sql(KvType::Decimal128, Value::from("1,5")).is_err());
        assert!(SqliteTypes.from_sql(KvType::Array, Value::from("[1,")).is_err());
    }
}
