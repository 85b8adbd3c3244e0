//! The value model of stored documents.
//!
//! Documents are made of key-value pairs whose values belong to a closed set
//! of types. [`KvType`] names those types and [`KvValue`] carries a value of
//! one of them. Every other layer (the catalog, the type registries) matches
//! exhaustively on these enums, so adding a type is a compile error until
//! every layer handles it.

mod document;
mod error;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::{fmt, str::FromStr};

pub use document::KvDocument;
pub use error::ConversionFailure;

pub type KvValueResult<T> = std::result::Result<T, ConversionFailure>;

#[derive(Debug, Clone, PartialEq)]
pub enum KvValue {
    Null,
    /// Carries no information. Every undefined value is the same value.
    Undefined,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    Decimal128(BigDecimal),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Instant(DateTime<Utc>),
    Binary(Vec<u8>),
    ObjectId(ObjectId),
    Timestamp(KvTimestamp),
    Array(Vec<KvValue>),
    Document(KvDocument),
}

impl KvValue {
    pub fn kv_type(&self) -> KvType {
        match self {
            KvValue::Null => KvType::Null,
            KvValue::Undefined => KvType::Undefined,
            KvValue::Boolean(_) => KvType::Boolean,
            KvValue::Integer(_) => KvType::Integer,
            KvValue::Long(_) => KvType::Long,
            KvValue::Double(_) => KvType::Double,
            KvValue::Decimal128(_) => KvType::Decimal128,
            KvValue::String(_) => KvType::String,
            KvValue::Date(_) => KvType::Date,
            KvValue::Time(_) => KvType::Time,
            KvValue::Instant(_) => KvType::Instant,
            KvValue::Binary(_) => KvType::Binary,
            KvValue::ObjectId(_) => KvType::ObjectId,
            KvValue::Timestamp(_) => KvType::Timestamp,
            KvValue::Array(_) => KvType::Array,
            KvValue::Document(_) => KvType::Document,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, KvValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KvValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for KvValue {
    fn from(b: bool) -> Self {
        KvValue::Boolean(b)
    }
}

impl From<i32> for KvValue {
    fn from(i: i32) -> Self {
        KvValue::Integer(i)
    }
}

impl From<i64> for KvValue {
    fn from(i: i64) -> Self {
        KvValue::Long(i)
    }
}

impl From<f64> for KvValue {
    fn from(f: f64) -> Self {
        KvValue::Double(f)
    }
}

impl From<&str> for KvValue {
    fn from(s: &str) -> Self {
        KvValue::String(s.to_owned())
    }
}

impl From<String> for KvValue {
    fn from(s: String) -> Self {
        KvValue::String(s)
    }
}

impl From<KvDocument> for KvValue {
    fn from(doc: KvDocument) -> Self {
        KvValue::Document(doc)
    }
}

impl From<Vec<KvValue>> for KvValue {
    fn from(values: Vec<KvValue>) -> Self {
        KvValue::Array(values)
    }
}

/// The type tag of a [`KvValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KvType {
    Null,
    Undefined,
    Boolean,
    Integer,
    Long,
    Double,
    Decimal128,
    String,
    Date,
    Time,
    Instant,
    Binary,
    ObjectId,
    Timestamp,
    Array,
    Document,
}

impl KvType {
    pub const ALL: [KvType; 16] = [
        KvType::Null,
        KvType::Undefined,
        KvType::Boolean,
        KvType::Integer,
        KvType::Long,
        KvType::Double,
        KvType::Decimal128,
        KvType::String,
        KvType::Date,
        KvType::Time,
        KvType::Instant,
        KvType::Binary,
        KvType::ObjectId,
        KvType::Timestamp,
        KvType::Array,
        KvType::Document,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KvType::Null => "null",
            KvType::Undefined => "undefined",
            KvType::Boolean => "boolean",
            KvType::Integer => "integer",
            KvType::Long => "long",
            KvType::Double => "double",
            KvType::Decimal128 => "decimal128",
            KvType::String => "string",
            KvType::Date => "date",
            KvType::Time => "time",
            KvType::Instant => "instant",
            KvType::Binary => "binary",
            KvType::ObjectId => "objectId",
            KvType::Timestamp => "timestamp",
            KvType::Array => "array",
            KvType::Document => "document",
        }
    }

    /// Types whose values nest other values.
    pub fn is_container(self) -> bool {
        matches!(self, KvType::Array | KvType::Document)
    }
}

impl fmt::Display for KvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KvType {
    type Err = ConversionFailure;

    fn from_str(s: &str) -> KvValueResult<Self> {
        KvType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConversionFailure::new(format!("type tag `{s}`"), "KvType"))
    }
}

/// A 12-byte object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn parse_hex(s: &str) -> KvValueResult<Self> {
        let mut bytes = [0u8; 12];

        hex::decode_to_slice(s, &mut bytes).map_err(|_| ConversionFailure::new(format!("hex `{s}`"), "ObjectId"))?;

        Ok(ObjectId(bytes))
    }
}

impl TryFrom<&[u8]> for ObjectId {
    type Error = ConversionFailure;

    fn try_from(bytes: &[u8]) -> KvValueResult<Self> {
        let bytes: [u8; 12] = bytes
            .try_into()
            .map_err(|_| ConversionFailure::new(format!("{} bytes", bytes.len()), "ObjectId"))?;

        Ok(ObjectId(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An internal replication timestamp: seconds since the epoch plus an
/// ordinal for operations within the same second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KvTimestamp {
    pub seconds: u32,
    pub ordinal: u32,
}

impl KvTimestamp {
    pub const fn new(seconds: u32, ordinal: u32) -> Self {
        KvTimestamp { seconds, ordinal }
    }

    /// Packs the timestamp into a single 64-bit value, seconds in the high
    /// half. The result may be negative; unpacking restores both halves.
    pub fn pack(&self) -> i64 {
        (((self.seconds as u64) << 32) | self.ordinal as u64) as i64
    }

    pub fn unpack(packed: i64) -> Self {
        let bits = packed as u64;

        KvTimestamp {
            seconds: (bits >> 32) as u32,
            ordinal: bits as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn type_tags_parse_back() {
        for t in KvType::ALL {
            assert_eq!(t, t.as_str().parse::<KvType>().unwrap());
        }
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        assert!("regex".parse::<KvType>().is_err());
    }

    #[test]
    fn timestamp_packing_keeps_both_halves() {
        let ts = KvTimestamp::new(u32::MAX, 7);

        assert!(ts.pack() < 0);
        assert_eq!(ts, KvTimestamp::unpack(ts.pack()));
        assert_eq!(KvTimestamp::new(0, 0), KvTimestamp::unpack(0));
    }

    #[test]
    fn object_id_hex() {
        let oid = ObjectId::parse_hex("5f1d7a3e9c1b2a0d4e6f8a9b").unwrap();

        assert_eq!("5f1d7a3e9c1b2a0d4e6f8a9b", oid.to_string());
        assert!(ObjectId::parse_hex("5f1d").is_err());
        assert!(ObjectId::try_from(&[1u8, 2, 3][..]).is_err());
    }

    #[test]
    fn values_know_their_type() {
        assert_eq!(KvType::Undefined, KvValue::Undefined.kv_type());
        assert_eq!(KvType::Long, KvValue::from(1i64).kv_type());
        assert_eq!(KvType::Array, KvValue::from(Vec::new()).kv_type());
        assert!(KvType::Document.is_container());
        assert!(!KvType::String.is_container());
    }
}
