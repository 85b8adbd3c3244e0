use super::{array, constant, container, mismatch, to_i32, to_i64, DataTypeForKv, SqlTypeFamily, TypeRegistry};
use crate::ast::Value;
use kv_value::{KvTimestamp, KvType, KvValue, ObjectId};
use std::borrow::Cow;

/// Column types and conversions for PostgreSQL. Most types have a native
/// counterpart; timestamps are packed into a `BIGINT`, containers go to
/// `JSONB`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTypes;

impl TypeRegistry for PostgresTypes {
    fn data_type(&self, kv_type: KvType) -> DataTypeForKv {
        use SqlTypeFamily as F;

        let (native, family) = match kv_type {
            KvType::Null | KvType::Undefined | KvType::Boolean => ("BOOLEAN", F::Boolean),
            KvType::Integer => ("INTEGER", F::Integer),
            KvType::Long | KvType::Timestamp => ("BIGINT", F::BigInt),
            KvType::Double => ("DOUBLE PRECISION", F::Double),
            KvType::Decimal128 => ("NUMERIC", F::Numeric),
            KvType::String => ("VARCHAR", F::Varchar),
            KvType::Date => ("DATE", F::Date),
            KvType::Time => ("TIME", F::Time),
            KvType::Instant => ("TIMESTAMPTZ", F::Timestamp),
            KvType::Binary | KvType::ObjectId => ("BYTEA", F::Binary),
            KvType::Array | KvType::Document => ("JSONB", F::Json),
        };

        DataTypeForKv::new(kv_type, native, family)
    }

    fn to_sql(&self, value: &KvValue) -> crate::Result<Value<'static>> {
        let value = match value {
            KvValue::Null | KvValue::Undefined => Value::Boolean(true),
            KvValue::Boolean(b) => Value::Boolean(*b),
            KvValue::Integer(i) => Value::Int32(*i),
            KvValue::Long(l) => Value::Int64(*l),
            KvValue::Double(d) => Value::Double(*d),
            KvValue::Decimal128(d) => Value::Numeric(d.clone()),
            KvValue::String(s) => Value::Text(Cow::Owned(s.clone())),
            KvValue::Date(d) => Value::Date(*d),
            KvValue::Time(t) => Value::Time(*t),
            KvValue::Instant(i) => Value::DateTime(*i),
            KvValue::Binary(b) => Value::Bytes(Cow::Owned(b.clone())),
            KvValue::ObjectId(oid) => Value::Bytes(Cow::Owned(oid.bytes().to_vec())),
            KvValue::Timestamp(ts) => Value::Int64(ts.pack()),
            KvValue::Array(_) | KvValue::Document(_) => Value::Json(array::to_json_element(value)),
        };

        Ok(value)
    }

    fn from_sql(&self, kv_type: KvType, value: Value<'_>) -> crate::Result<KvValue> {
        let kv_value = match (kv_type, &value) {
            (KvType::Null | KvType::Undefined, _) => constant(kv_type, &value)?,
            (KvType::Boolean, Value::Boolean(b)) => KvValue::Boolean(*b),
            (KvType::Integer, _) => KvValue::Integer(to_i32(kv_type, &value)?),
            (KvType::Long, _) => KvValue::Long(to_i64(kv_type, &value)?),
            (KvType::Double, Value::Double(d)) => KvValue::Double(*d),
            (KvType::Decimal128, Value::Numeric(d)) => KvValue::Decimal128(d.clone()),
            (KvType::String, Value::Text(s)) => KvValue::String(s.to_string()),
            (KvType::Date, Value::Date(d)) => KvValue::Date(*d),
            (KvType::Time, Value::Time(t)) => KvValue::Time(*t),
            (KvType::Instant, Value::DateTime(i)) => KvValue::Instant(*i),
            (KvType::Binary, Value::Bytes(b)) => KvValue::Binary(b.to_vec()),
            (KvType::ObjectId, Value::Bytes(b)) => KvValue::ObjectId(ObjectId::try_from(&b[..])?),
            (KvType::Timestamp, _) => KvValue::Timestamp(KvTimestamp::unpack(to_i64(kv_type, &value)?)),
            (KvType::Array | KvType::Document, Value::Json(json)) => container(kv_type, json)?,
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
            let stored = PostgresTypes.to_sql(&value).unwrap();
            let read = PostgresTypes.from_sql(value.kv_type(), stored).unwrap();

            samples::assert_same(&value, &read);
        }
    }

    #[test]
    fn containers_are_jsonb() {
        let stored = PostgresTypes.to_sql(&KvValue::Array(vec![KvValue::Long(3)])).unwrap();

        assert_eq!(Value::Json(serde_json::json!([{ "$long": 3 }])), stored);
        assert_eq!("JSONB", PostgresTypes.data_type(KvType::Document).native);
    }

    #[test]
    fn narrowing_overflow_is_an_error() {
        assert!(PostgresTypes.from_sql(KvType::Integer, Value::Int64(i64::MAX)).is_err());
        assert!(PostgresTypes.from_sql(KvType::ObjectId, Value::bytes(vec![1, 2, 3])).is_err());
        assert!(PostgresTypes
            .from_sql(KvType::Array, Value::Json(serde_json::json!({ "a": 1 })))
            .is_err());
    }
}
