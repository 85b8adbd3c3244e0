//! The catalog entities.
//!
//! Entities are plain values. Changing the catalog means inserting or
//! deleting their rows through the [writer](crate::write::MetaDataWriter),
//! never mutating them in place.

use crate::error::{Error, ErrorKind};
use kv_value::{ConversionFailure, KvType};
use std::{fmt, str::FromStr};

/// The location of a document part inside a collection's document tree, as
/// the ordered path segments from the root. No segments means the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    segments: Vec<String>,
}

impl TableRef {
    pub fn root() -> Self {
        TableRef::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableRef {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The part of an embedded document or of the first array level under
    /// a field.
    pub fn child(&self, name: impl Into<String>) -> TableRef {
        let mut segments = self.segments.clone();
        segments.push(name.into());

        TableRef { segments }
    }

    /// The part of an array nested directly inside another array, at the
    /// given nesting depth.
    ///
    /// ```rust
    /// # use doc_catalog::meta::TableRef;
    /// let nested = TableRef::root().child("matrix").array_child(2);
    /// assert_eq!(&["matrix".to_string(), "$2".to_string()], nested.segments());
    /// ```
    pub fn array_child(&self, depth: u32) -> TableRef {
        self.child(format!("${depth}"))
    }

    /// `None` for the root.
    pub fn parent(&self) -> Option<TableRef> {
        let (_, init) = self.segments.split_last()?;

        Some(TableRef {
            segments: init.to_vec(),
        })
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Checks the reference can be encoded by every dialect.
    pub fn validate(&self) -> crate::Result<()> {
        let reason = if self.segments.iter().any(String::is_empty) {
            Some("empty path segment")
        } else if self.segments.iter().any(|s| s.contains('\0')) {
            Some("path segment contains a NUL character")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::builder(ErrorKind::MalformedTableRef {
                table_ref: self.to_string(),
                reason,
            })
            .build()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }

        f.write_str(&self.segments.join("."))
    }
}

/// The type tag stored with every field, scalar and field index row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    Binary,
    Boolean,
    /// The value lives in a child document part.
    Child,
    Date,
    Decimal128,
    Double,
    Instant,
    Integer,
    Long,
    MongoObjectId,
    MongoTimeStamp,
    Null,
    String,
    Time,
    Undefined,
}

impl FieldType {
    pub const ALL: [FieldType; 15] = [
        FieldType::Binary,
        FieldType::Boolean,
        FieldType::Child,
        FieldType::Date,
        FieldType::Decimal128,
        FieldType::Double,
        FieldType::Instant,
        FieldType::Integer,
        FieldType::Long,
        FieldType::MongoObjectId,
        FieldType::MongoTimeStamp,
        FieldType::Null,
        FieldType::String,
        FieldType::Time,
        FieldType::Undefined,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Binary => "BINARY",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Child => "CHILD",
            FieldType::Date => "DATE",
            FieldType::Decimal128 => "DECIMAL128",
            FieldType::Double => "DOUBLE",
            FieldType::Instant => "INSTANT",
            FieldType::Integer => "INTEGER",
            FieldType::Long => "LONG",
            FieldType::MongoObjectId => "MONGO_OBJECT_ID",
            FieldType::MongoTimeStamp => "MONGO_TIME_STAMP",
            FieldType::Null => "NULL",
            FieldType::String => "STRING",
            FieldType::Time => "TIME",
            FieldType::Undefined => "UNDEFINED",
        }
    }

    /// Containers are stored as child parts.
    pub fn from_kv_type(kv_type: KvType) -> FieldType {
        match kv_type {
            KvType::Null => FieldType::Null,
            KvType::Undefined => FieldType::Undefined,
            KvType::Boolean => FieldType::Boolean,
            KvType::Integer => FieldType::Integer,
            KvType::Long => FieldType::Long,
            KvType::Double => FieldType::Double,
            KvType::Decimal128 => FieldType::Decimal128,
            KvType::String => FieldType::String,
            KvType::Date => FieldType::Date,
            KvType::Time => FieldType::Time,
            KvType::Instant => FieldType::Instant,
            KvType::Binary => FieldType::Binary,
            KvType::ObjectId => FieldType::MongoObjectId,
            KvType::Timestamp => FieldType::MongoTimeStamp,
            KvType::Array | KvType::Document => FieldType::Child,
        }
    }

    /// The value type of the column, `None` for child markers.
    pub fn kv_type(self) -> Option<KvType> {
        let kv_type = match self {
            FieldType::Binary => KvType::Binary,
            FieldType::Boolean => KvType::Boolean,
            FieldType::Child => return None,
            FieldType::Date => KvType::Date,
            FieldType::Decimal128 => KvType::Decimal128,
            FieldType::Double => KvType::Double,
            FieldType::Instant => KvType::Instant,
            FieldType::Integer => KvType::Integer,
            FieldType::Long => KvType::Long,
            FieldType::MongoObjectId => KvType::ObjectId,
            FieldType::MongoTimeStamp => KvType::Timestamp,
            FieldType::Null => KvType::Null,
            FieldType::String => KvType::String,
            FieldType::Time => KvType::Time,
            FieldType::Undefined => KvType::Undefined,
        };

        Some(kv_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConversionFailure::new(format!("type tag `{s}`"), "FieldType").into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldIndexOrdering {
    #[default]
    Asc,
    Desc,
}

impl FieldIndexOrdering {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldIndexOrdering::Asc => "ASC",
            FieldIndexOrdering::Desc => "DESC",
        }
    }

    pub fn is_ascending(self) -> bool {
        self == FieldIndexOrdering::Asc
    }
}

impl fmt::Display for FieldIndexOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldIndexOrdering {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "ASC" => Ok(FieldIndexOrdering::Asc),
            "DESC" => Ok(FieldIndexOrdering::Desc),
            _ => Err(ConversionFailure::new(format!("ordering `{s}`"), "FieldIndexOrdering").into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaDatabase {
    pub name: String,
    /// The backend schema holding the database's tables.
    pub identifier: String,
}

impl MetaDatabase {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        MetaDatabase {
            name: name.into(),
            identifier: identifier.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaCollection {
    pub name: String,
    pub identifier: String,
}

impl MetaCollection {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        MetaCollection {
            name: name.into(),
            identifier: identifier.into(),
        }
    }
}

/// A table-mapped node of the document structure. The RID counter is not
/// part of the value; it only lives in the catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaDocPart {
    pub table_ref: TableRef,
    /// The backend table name.
    pub identifier: String,
}

impl MetaDocPart {
    pub fn new(table_ref: TableRef, identifier: impl Into<String>) -> Self {
        MetaDocPart {
            table_ref,
            identifier: identifier.into(),
        }
    }
}

/// A typed column of a document part. The same name may appear once per
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaField {
    pub name: String,
    /// The backend column name.
    pub identifier: String,
    pub field_type: FieldType,
}

impl MetaField {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>, field_type: FieldType) -> Self {
        MetaField {
            name: name.into(),
            identifier: identifier.into(),
            field_type,
        }
    }
}

/// A typed column holding the scalar elements of an array part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaScalar {
    pub identifier: String,
    pub field_type: FieldType,
}

impl MetaScalar {
    pub fn new(identifier: impl Into<String>, field_type: FieldType) -> Self {
        MetaScalar {
            identifier: identifier.into(),
            field_type,
        }
    }
}

/// A logical index of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaIndex {
    pub name: String,
    pub unique: bool,
    pub fields: Vec<MetaIndexField>,
}

impl MetaIndex {
    pub fn new(name: impl Into<String>, unique: bool) -> Self {
        MetaIndex {
            name: name.into(),
            unique,
            fields: Vec::new(),
        }
    }

    /// Appends a field at the next position.
    pub fn with_field(mut self, table_ref: TableRef, name: impl Into<String>, ordering: FieldIndexOrdering) -> Self {
        let position = next_position(self.fields.len());

        self.fields.push(MetaIndexField {
            position,
            table_ref,
            name: name.into(),
            ordering,
        });

        self
    }
}

/// The position of the entry appended after `len` others. Positions stop at
/// `i32::MAX`, where the repeated position is rejected by the catalog's key.
fn next_position(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaIndexField {
    pub position: i32,
    pub table_ref: TableRef,
    pub name: String,
    pub ordering: FieldIndexOrdering,
}

/// The physical index realizing a logical index on one document part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaDocPartIndex {
    /// The backend index name.
    pub identifier: String,
    pub unique: bool,
    pub fields: Vec<MetaFieldIndex>,
}

impl MetaDocPartIndex {
    pub fn new(identifier: impl Into<String>, unique: bool) -> Self {
        MetaDocPartIndex {
            identifier: identifier.into(),
            unique,
            fields: Vec::new(),
        }
    }

    /// Appends a column at the next position.
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType, ordering: FieldIndexOrdering) -> Self {
        let position = next_position(self.fields.len());

        self.fields.push(MetaFieldIndex {
            position,
            name: name.into(),
            field_type,
            ordering,
        });

        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaFieldIndex {
    pub position: i32,
    pub name: String,
    pub field_type: FieldType,
    pub ordering: FieldIndexOrdering,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_ref_navigation() {
        let root = TableRef::root();
        let tags = root.child("tags");
        let nested = tags.array_child(2);

        assert!(root.is_root());
        assert_eq!(None, root.parent());
        assert_eq!(Some(tags.clone()), nested.parent());
        assert_eq!(Some(root), tags.parent());
        assert_eq!(2, nested.depth());
        assert_eq!(Some("$2"), nested.name());
        assert_eq!("tags.$2", nested.to_string());
    }

    #[test]
    fn malformed_table_refs_are_build_errors() {
        let empty = TableRef::from_segments(["a", ""]);
        let nul = TableRef::from_segments(["a\0b"]);

        for table_ref in [empty, nul] {
            let err = table_ref.validate().unwrap_err();

            assert!(err.is_build_error());
            assert!(matches!(err.kind(), ErrorKind::MalformedTableRef { .. }));
        }

        TableRef::from_segments(["a", "$2"]).validate().unwrap();
        TableRef::root().validate().unwrap();
    }

    #[test]
    fn field_type_tags() {
        for t in FieldType::ALL {
            assert_eq!(t, t.as_str().parse::<FieldType>().unwrap());
        }

        assert!("VARCHAR".parse::<FieldType>().is_err());
    }

    #[test]
    fn containers_map_to_child() {
        assert_eq!(FieldType::Child, FieldType::from_kv_type(KvType::Array));
        assert_eq!(FieldType::Child, FieldType::from_kv_type(KvType::Document));
        assert_eq!(None, FieldType::Child.kv_type());

        for t in KvType::ALL.into_iter().filter(|t| !t.is_container()) {
            assert_eq!(Some(t), FieldType::from_kv_type(t).kv_type());
        }
    }

    #[test]
    fn index_builders_number_positions() {
        let index = MetaIndex::new("by_name", true)
            .with_field(TableRef::root(), "name", FieldIndexOrdering::Asc)
            .with_field(TableRef::root(), "age", FieldIndexOrdering::Desc);

        let positions: Vec<i32> = index.fields.iter().map(|f| f.position).collect();
        assert_eq!(vec![0, 1], positions);
    }

    #[test]
    fn positions_stop_at_the_largest_integer() {
        assert_eq!(3, next_position(3));
        assert_eq!(i32::MAX, next_position(i32::MAX as usize));
        assert_eq!(i32::MAX, next_position(i32::MAX as usize + 1));
        assert_eq!(i32::MAX, next_position(usize::MAX));
    }
}
