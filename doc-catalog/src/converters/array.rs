//! Values as elements of a JSON array.
//!
//! Array and document values are stored as one JSON value. JSON has no
//! types for most of the value model, so those are written as single-key
//! objects whose key names the type:
//!
//! | type        | element                                   |
//! |-------------|-------------------------------------------|
//! | null        | `null`                                    |
//! | boolean     | `true`                                    |
//! | integer     | `42`                                      |
//! | long        | `{"$long": 42}`, or a plain number outside the integer range |
//! | double      | `1.5`, or `{"$double": "NaN"}` when not finite |
//! | decimal128  | `{"$decimal": "1.10"}`                    |
//! | string      | `"text"`                                  |
//! | date        | `{"$date": "2024-02-29"}`                 |
//! | time        | `{"$time": "12:30:00.5"}`                 |
//! | instant     | `{"$instant": "2024-02-29T12:30:00Z"}`    |
//! | binary      | `{"$binary": "<base64>"}`                 |
//! | objectId    | `{"$oid": "<hex>"}`                       |
//! | timestamp   | `{"$timestamp": {"t": 1, "i": 2}}`        |
//! | undefined   | `{"$undefined": true}`                    |
//! | array       | `[...]`                                   |
//! | document    | `{...}`, or `{"$document": {...}}` when its only key is one of the above |

use super::{DATE_FORMAT, TIME_FORMAT};
use crate::error::Error;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use kv_value::{ConversionFailure, KvDocument, KvTimestamp, KvType, KvValue, ObjectId};
use serde_json::{json, Map, Value as Json};
use std::str::FromStr;

const LONG: &str = "$long";
const DOUBLE: &str = "$double";
const DECIMAL: &str = "$decimal";
const DATE: &str = "$date";
const TIME: &str = "$time";
const INSTANT: &str = "$instant";
const BINARY: &str = "$binary";
const OID: &str = "$oid";
const TIMESTAMP: &str = "$timestamp";
const UNDEFINED: &str = "$undefined";
const DOCUMENT: &str = "$document";

const TAGS: [(&str, KvType); 11] = [
    (LONG, KvType::Long),
    (DOUBLE, KvType::Double),
    (DECIMAL, KvType::Decimal128),
    (DATE, KvType::Date),
    (TIME, KvType::Time),
    (INSTANT, KvType::Instant),
    (BINARY, KvType::Binary),
    (OID, KvType::ObjectId),
    (TIMESTAMP, KvType::Timestamp),
    (UNDEFINED, KvType::Undefined),
    (DOCUMENT, KvType::Document),
];

fn tagged(tag: &str, value: Json) -> Json {
    let mut map = Map::with_capacity(1);
    map.insert(tag.to_owned(), value);

    Json::Object(map)
}

/// The single key of a tagged object, if it is one.
fn tag_of(map: &Map<String, Json>) -> Option<(&'static str, KvType, &Json)> {
    if map.len() != 1 {
        return None;
    }

    let (key, value) = map.iter().next()?;

    TAGS.iter()
        .find(|(tag, _)| *tag == key.as_str())
        .map(|(tag, kv_type)| (*tag, *kv_type, value))
}

pub fn to_json_element(value: &KvValue) -> Json {
    match value {
        KvValue::Null => Json::Null,
        KvValue::Undefined => tagged(UNDEFINED, Json::Bool(true)),
        KvValue::Boolean(b) => Json::Bool(*b),
        KvValue::Integer(i) => Json::from(*i),
        KvValue::Long(l) if i32::try_from(*l).is_ok() => tagged(LONG, Json::from(*l)),
        KvValue::Long(l) => Json::from(*l),
        KvValue::Double(d) if d.is_finite() => Json::from(*d),
        KvValue::Double(d) => {
            let repr = if d.is_nan() {
                "NaN"
            } else if d.is_sign_positive() {
                "Infinity"
            } else {
                "-Infinity"
            };

            tagged(DOUBLE, Json::from(repr))
        }
        KvValue::Decimal128(d) => tagged(DECIMAL, Json::String(d.to_string())),
        KvValue::String(s) => Json::String(s.clone()),
        KvValue::Date(d) => tagged(DATE, Json::String(d.format(DATE_FORMAT).to_string())),
        KvValue::Time(t) => tagged(TIME, Json::String(t.format(TIME_FORMAT).to_string())),
        KvValue::Instant(i) => tagged(INSTANT, Json::String(i.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        KvValue::Binary(b) => tagged(BINARY, Json::String(STANDARD.encode(b))),
        KvValue::ObjectId(oid) => tagged(OID, Json::String(oid.to_hex())),
        KvValue::Timestamp(ts) => tagged(TIMESTAMP, json!({ "t": ts.seconds, "i": ts.ordinal })),
        KvValue::Array(values) => Json::Array(values.iter().map(to_json_element).collect()),
        KvValue::Document(doc) => {
            let map: Map<String, Json> = doc.iter().map(|(k, v)| (k.to_owned(), to_json_element(v))).collect();

            if tag_of(&map).is_some() {
                tagged(DOCUMENT, Json::Object(map))
            } else {
                Json::Object(map)
            }
        }
    }
}

/// Recovers the type of a raw array element.
pub fn element_type(json: &Json) -> crate::Result<KvType> {
    let kv_type = match json {
        Json::Null => KvType::Null,
        Json::Bool(_) => KvType::Boolean,
        Json::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => KvType::Integer,
            Some(_) => KvType::Long,
            None if n.is_u64() => return Err(malformed(json, "integral number out of range")),
            None => KvType::Double,
        },
        Json::String(_) => KvType::String,
        Json::Array(_) => KvType::Array,
        Json::Object(map) => tag_of(map).map(|(_, kv_type, _)| kv_type).unwrap_or(KvType::Document),
    };

    Ok(kv_type)
}

pub fn from_json_element(json: &Json) -> crate::Result<KvValue> {
    let value = match json {
        Json::Null => KvValue::Null,
        Json::Bool(b) => KvValue::Boolean(*b),
        Json::Number(n) => match element_type(json)? {
            KvType::Integer => KvValue::Integer(n.as_i64().and_then(|i| i32::try_from(i).ok()).unwrap_or_default()),
            KvType::Long => KvValue::Long(n.as_i64().unwrap_or_default()),
            _ => KvValue::Double(n.as_f64().ok_or_else(|| malformed(json, "number"))?),
        },
        Json::String(s) => KvValue::String(s.clone()),
        Json::Array(elements) => KvValue::Array(elements.iter().map(from_json_element).collect::<crate::Result<_>>()?),
        Json::Object(map) => match tag_of(map) {
            Some((_, kv_type, inner)) => from_tagged(kv_type, inner)?,
            None => KvValue::Document(document_from(map)?),
        },
    };

    Ok(value)
}

fn document_from(map: &Map<String, Json>) -> crate::Result<KvDocument> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), from_json_element(v)?)))
        .collect()
}

fn from_tagged(kv_type: KvType, inner: &Json) -> crate::Result<KvValue> {
    let text = || inner.as_str().ok_or_else(|| malformed(inner, kv_type.as_str()));
    let failed = |_| malformed(inner, kv_type.as_str());

    let value = match kv_type {
        KvType::Long => KvValue::Long(inner.as_i64().ok_or_else(|| malformed(inner, "long"))?),
        KvType::Double => match text()? {
            "NaN" => KvValue::Double(f64::NAN),
            "Infinity" => KvValue::Double(f64::INFINITY),
            "-Infinity" => KvValue::Double(f64::NEG_INFINITY),
            _ => return Err(malformed(inner, "double")),
        },
        KvType::Decimal128 => KvValue::Decimal128(BigDecimal::from_str(text()?).map_err(|_| malformed(inner, "decimal128"))?),
        KvType::Date => KvValue::Date(NaiveDate::parse_from_str(text()?, DATE_FORMAT).map_err(failed)?),
        KvType::Time => KvValue::Time(NaiveTime::parse_from_str(text()?, TIME_FORMAT).map_err(failed)?),
        KvType::Instant => KvValue::Instant(
            DateTime::parse_from_rfc3339(text()?)
                .map_err(failed)?
                .with_timezone(&Utc),
        ),
        KvType::Binary => KvValue::Binary(STANDARD.decode(text()?).map_err(|_| malformed(inner, "binary"))?),
        KvType::ObjectId => KvValue::ObjectId(ObjectId::parse_hex(text()?)?),
        KvType::Timestamp => {
            let part = |key: &str| {
                inner
                    .get(key)
                    .and_then(Json::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| malformed(inner, "timestamp"))
            };

            KvValue::Timestamp(KvTimestamp::new(part("t")?, part("i")?))
        }
        KvType::Undefined => KvValue::Undefined,
        KvType::Document => match inner {
            Json::Object(map) => KvValue::Document(document_from(map)?),
            _ => return Err(malformed(inner, "document")),
        },
        KvType::Null
        | KvType::Boolean
        | KvType::Integer
        | KvType::String
        | KvType::Array => return Err(malformed(inner, kv_type.as_str())),
    };

    Ok(value)
}

fn malformed(json: &Json, to: &str) -> Error {
    ConversionFailure::new(format!("array element `{json}`"), to).into()
}
