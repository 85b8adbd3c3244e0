//! Descriptions of the nine catalog tables.
//!
//! The table names, the column order and the keys are an on-disk contract
//! shared with existing catalogs. Dialects render the DDL from these
//! layouts; the writer and the reader build their statements from the
//! column constants.

use crate::ast::Table;
use std::fmt;

/// The catalog tables, in creation order. Parents come before children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaTableKind {
    Database,
    Collection,
    DocPart,
    Field,
    Scalar,
    Index,
    IndexField,
    DocPartIndex,
    FieldIndex,
}

impl MetaTableKind {
    pub const ALL: [MetaTableKind; 9] = [
        MetaTableKind::Database,
        MetaTableKind::Collection,
        MetaTableKind::DocPart,
        MetaTableKind::Field,
        MetaTableKind::Scalar,
        MetaTableKind::Index,
        MetaTableKind::IndexField,
        MetaTableKind::DocPartIndex,
        MetaTableKind::FieldIndex,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            MetaTableKind::Database => "database",
            MetaTableKind::Collection => "collection",
            MetaTableKind::DocPart => "doc_part",
            MetaTableKind::Field => "field",
            MetaTableKind::Scalar => "scalar",
            MetaTableKind::Index => "index",
            MetaTableKind::IndexField => "index_field",
            MetaTableKind::DocPartIndex => "doc_part_index",
            MetaTableKind::FieldIndex => "field_index",
        }
    }

    pub fn layout(self) -> &'static MetaTableLayout {
        match self {
            MetaTableKind::Database => &DATABASE_LAYOUT,
            MetaTableKind::Collection => &COLLECTION_LAYOUT,
            MetaTableKind::DocPart => &DOC_PART_LAYOUT,
            MetaTableKind::Field => &FIELD_LAYOUT,
            MetaTableKind::Scalar => &SCALAR_LAYOUT,
            MetaTableKind::Index => &INDEX_LAYOUT,
            MetaTableKind::IndexField => &INDEX_FIELD_LAYOUT,
            MetaTableKind::DocPartIndex => &DOC_PART_INDEX_LAYOUT,
            MetaTableKind::FieldIndex => &FIELD_INDEX_LAYOUT,
        }
    }
}

impl fmt::Display for MetaTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// What a catalog column holds. Each dialect picks the native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaColumnType {
    /// Names, identifiers and type tags.
    Name,
    /// A path reference, in the dialect's encoding.
    TableRef,
    Integer,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaColumn {
    pub name: &'static str,
    pub column_type: MetaColumnType,
    /// Literal default, also making the column optional on insert.
    pub default: Option<&'static str>,
}

const fn column(name: &'static str, column_type: MetaColumnType) -> MetaColumn {
    MetaColumn {
        name,
        column_type,
        default: None,
    }
}

/// A foreign key from a catalog table to its parent. Never cascading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaForeignKey {
    pub columns: &'static [&'static str],
    pub references: MetaTableKind,
    pub referenced_columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaTableLayout {
    pub kind: MetaTableKind,
    /// Every column is `NOT NULL`.
    pub columns: &'static [MetaColumn],
    pub primary_key: &'static [&'static str],
    pub unique: &'static [&'static [&'static str]],
    pub foreign_key: Option<MetaForeignKey>,
}

impl MetaTableLayout {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|c| c.name)
    }
}

macro_rules! meta_table {
    ($(#[$doc:meta])* $name:ident => $kind:ident { $($konst:ident = $column:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl $name {
            pub const KIND: MetaTableKind = MetaTableKind::$kind;
            $(pub const $konst: &'static str = $column;)+
        }
    };
}

meta_table!(
    /// `database`: one row per user database.
    DatabaseTable => Database {
        NAME = "name",
        IDENTIFIER = "identifier",
    }
);

meta_table!(
    CollectionTable => Collection {
        DATABASE = "database",
        NAME = "name",
        IDENTIFIER = "identifier",
    }
);

meta_table!(
    /// `doc_part`: one row per document part, holding its RID counter.
    DocPartTable => DocPart {
        DATABASE = "database",
        COLLECTION = "collection",
        TABLE_REF = "table_ref",
        IDENTIFIER = "identifier",
        LAST_RID = "last_rid",
    }
);

meta_table!(
    FieldTable => Field {
        DATABASE = "database",
        COLLECTION = "collection",
        TABLE_REF = "table_ref",
        NAME = "name",
        TYPE = "type",
        IDENTIFIER = "identifier",
    }
);

meta_table!(
    ScalarTable => Scalar {
        DATABASE = "database",
        COLLECTION = "collection",
        TABLE_REF = "table_ref",
        TYPE = "type",
        IDENTIFIER = "identifier",
    }
);

meta_table!(
    IndexTable => Index {
        DATABASE = "database",
        COLLECTION = "collection",
        NAME = "name",
        UNIQUE = "unique",
    }
);

meta_table!(
    IndexFieldTable => IndexField {
        DATABASE = "database",
        COLLECTION = "collection",
        INDEX = "index",
        POSITION = "position",
        TABLE_REF = "table_ref",
        NAME = "name",
        ORDERING = "ordering",
    }
);

meta_table!(
    DocPartIndexTable => DocPartIndex {
        DATABASE = "database",
        IDENTIFIER = "identifier",
        COLLECTION = "collection",
        TABLE_REF = "table_ref",
        UNIQUE = "unique",
    }
);

meta_table!(
    FieldIndexTable => FieldIndex {
        DATABASE = "database",
        IDENTIFIER = "identifier",
        POSITION = "position",
        COLLECTION = "collection",
        TABLE_REF = "table_ref",
        NAME = "name",
        TYPE = "type",
        ORDERING = "ordering",
    }
);

use MetaColumnType::*;

static DATABASE_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::Database,
    columns: &[
        column(DatabaseTable::NAME, Name),
        column(DatabaseTable::IDENTIFIER, Name),
    ],
    primary_key: &[DatabaseTable::NAME],
    unique: &[&[DatabaseTable::IDENTIFIER]],
    foreign_key: None,
};

static COLLECTION_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::Collection,
    columns: &[
        column(CollectionTable::DATABASE, Name),
        column(CollectionTable::NAME, Name),
        column(CollectionTable::IDENTIFIER, Name),
    ],
    primary_key: &[CollectionTable::DATABASE, CollectionTable::NAME],
    unique: &[&[CollectionTable::DATABASE, CollectionTable::IDENTIFIER]],
    foreign_key: Some(MetaForeignKey {
        columns: &[CollectionTable::DATABASE],
        references: MetaTableKind::Database,
        referenced_columns: &[DatabaseTable::NAME],
    }),
};

static DOC_PART_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::DocPart,
    columns: &[
        column(DocPartTable::DATABASE, Name),
        column(DocPartTable::COLLECTION, Name),
        column(DocPartTable::TABLE_REF, TableRef),
        column(DocPartTable::IDENTIFIER, Name),
        MetaColumn {
            name: DocPartTable::LAST_RID,
            column_type: Integer,
            default: Some("0"),
        },
    ],
    primary_key: &[DocPartTable::DATABASE, DocPartTable::COLLECTION, DocPartTable::TABLE_REF],
    unique: &[&[DocPartTable::DATABASE, DocPartTable::IDENTIFIER]],
    foreign_key: Some(MetaForeignKey {
        columns: &[DocPartTable::DATABASE, DocPartTable::COLLECTION],
        references: MetaTableKind::Collection,
        referenced_columns: &[CollectionTable::DATABASE, CollectionTable::NAME],
    }),
};

static FIELD_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::Field,
    columns: &[
        column(FieldTable::DATABASE, Name),
        column(FieldTable::COLLECTION, Name),
        column(FieldTable::TABLE_REF, TableRef),
        column(FieldTable::NAME, Name),
        column(FieldTable::TYPE, Name),
        column(FieldTable::IDENTIFIER, Name),
    ],
    primary_key: &[
        FieldTable::DATABASE,
        FieldTable::COLLECTION,
        FieldTable::TABLE_REF,
        FieldTable::NAME,
        FieldTable::TYPE,
    ],
    unique: &[],
    foreign_key: Some(DOC_PART_PARENT),
};

static SCALAR_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::Scalar,
    columns: &[
        column(ScalarTable::DATABASE, Name),
        column(ScalarTable::COLLECTION, Name),
        column(ScalarTable::TABLE_REF, TableRef),
        column(ScalarTable::TYPE, Name),
        column(ScalarTable::IDENTIFIER, Name),
    ],
    primary_key: &[
        ScalarTable::DATABASE,
        ScalarTable::COLLECTION,
        ScalarTable::TABLE_REF,
        ScalarTable::TYPE,
    ],
    unique: &[],
    foreign_key: Some(DOC_PART_PARENT),
};

static INDEX_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::Index,
    columns: &[
        column(IndexTable::DATABASE, Name),
        column(IndexTable::COLLECTION, Name),
        column(IndexTable::NAME, Name),
        column(IndexTable::UNIQUE, Boolean),
    ],
    primary_key: &[IndexTable::DATABASE, IndexTable::COLLECTION, IndexTable::NAME],
    unique: &[],
    foreign_key: Some(MetaForeignKey {
        columns: &[IndexTable::DATABASE, IndexTable::COLLECTION],
        references: MetaTableKind::Collection,
        referenced_columns: &[CollectionTable::DATABASE, CollectionTable::NAME],
    }),
};

static INDEX_FIELD_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::IndexField,
    columns: &[
        column(IndexFieldTable::DATABASE, Name),
        column(IndexFieldTable::COLLECTION, Name),
        column(IndexFieldTable::INDEX, Name),
        column(IndexFieldTable::POSITION, Integer),
        column(IndexFieldTable::TABLE_REF, TableRef),
        column(IndexFieldTable::NAME, Name),
        column(IndexFieldTable::ORDERING, Name),
    ],
    primary_key: &[
        IndexFieldTable::DATABASE,
        IndexFieldTable::COLLECTION,
        IndexFieldTable::INDEX,
        IndexFieldTable::POSITION,
    ],
    unique: &[],
    foreign_key: Some(MetaForeignKey {
        columns: &[IndexFieldTable::DATABASE, IndexFieldTable::COLLECTION, IndexFieldTable::INDEX],
        references: MetaTableKind::Index,
        referenced_columns: &[IndexTable::DATABASE, IndexTable::COLLECTION, IndexTable::NAME],
    }),
};

static DOC_PART_INDEX_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::DocPartIndex,
    columns: &[
        column(DocPartIndexTable::DATABASE, Name),
        column(DocPartIndexTable::IDENTIFIER, Name),
        column(DocPartIndexTable::COLLECTION, Name),
        column(DocPartIndexTable::TABLE_REF, TableRef),
        column(DocPartIndexTable::UNIQUE, Boolean),
    ],
    primary_key: &[DocPartIndexTable::DATABASE, DocPartIndexTable::IDENTIFIER],
    unique: &[],
    foreign_key: Some(DOC_PART_PARENT),
};

static FIELD_INDEX_LAYOUT: MetaTableLayout = MetaTableLayout {
    kind: MetaTableKind::FieldIndex,
    columns: &[
        column(FieldIndexTable::DATABASE, Name),
        column(FieldIndexTable::IDENTIFIER, Name),
        column(FieldIndexTable::POSITION, Integer),
        column(FieldIndexTable::COLLECTION, Name),
        column(FieldIndexTable::TABLE_REF, TableRef),
        column(FieldIndexTable::NAME, Name),
        column(FieldIndexTable::TYPE, Name),
        column(FieldIndexTable::ORDERING, Name),
    ],
    primary_key: &[
        FieldIndexTable::DATABASE,
        FieldIndexTable::IDENTIFIER,
        FieldIndexTable::POSITION,
    ],
    unique: &[],
    foreign_key: Some(MetaForeignKey {
        columns: &[FieldIndexTable::DATABASE, FieldIndexTable::IDENTIFIER],
        references: MetaTableKind::DocPartIndex,
        referenced_columns: &[DocPartIndexTable::DATABASE, DocPartIndexTable::IDENTIFIER],
    }),
};

/// Field, scalar and doc part index rows all hang off a document part,
/// keyed by the same leading columns.
const DOC_PART_PARENT: MetaForeignKey = MetaForeignKey {
    columns: &["database", "collection", "table_ref"],
    references: MetaTableKind::DocPart,
    referenced_columns: &[DocPartTable::DATABASE, DocPartTable::COLLECTION, DocPartTable::TABLE_REF],
};

/// Where the catalog tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTables {
    schema: String,
}

impl Default for MetaTables {
    fn default() -> Self {
        MetaTables::new(MetaTables::DEFAULT_SCHEMA)
    }
}

impl MetaTables {
    pub const DEFAULT_SCHEMA: &'static str = "doc_catalog";

    pub fn new(schema: impl Into<String>) -> Self {
        MetaTables { schema: schema.into() }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The schema qualified table, for statement builders.
    ///
    /// ```rust
    /// # use doc_catalog::{tables::{MetaTables, MetaTableKind}, ast::Table};
    /// let tables = MetaTables::default();
    /// assert_eq!(Table::from(("doc_catalog", "doc_part")), tables.table(MetaTableKind::DocPart));
    /// ```
    pub fn table(&self, kind: MetaTableKind) -> Table<'_> {
        Table::from(kind.table_name()).database(self.schema.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn layouts_match_their_kind() {
        for kind in MetaTableKind::ALL {
            assert_eq!(kind, kind.layout().kind);
        }
    }

    #[test]
    fn keys_name_existing_columns() {
        for kind in MetaTableKind::ALL {
            let layout = kind.layout();
            let names: Vec<_> = layout.column_names().collect();

            let keys = layout.primary_key.iter().chain(layout.unique.iter().flat_map(|u| u.iter()));

            for key in keys {
                assert!(names.contains(key), "{kind}: no column {key}");
            }

            if let Some(fk) = layout.foreign_key {
                let parent: Vec<_> = fk.references.layout().column_names().collect();

                assert_eq!(fk.columns.len(), fk.referenced_columns.len());
                assert!(fk.columns.iter().all(|c| names.contains(c)));
                assert!(fk.referenced_columns.iter().all(|c| parent.contains(c)));
            }
        }
    }

    #[test]
    fn parents_are_created_first() {
        for (position, kind) in MetaTableKind::ALL.into_iter().enumerate() {
            if let Some(fk) = kind.layout().foreign_key {
                let parent_position = MetaTableKind::ALL.iter().position(|k| *k == fk.references).unwrap();
                assert!(parent_position < position);
            }
        }
    }

    #[test]
    fn fixed_column_order() {
        let columns: Vec<_> = MetaTableKind::FieldIndex.layout().column_names().collect();

        assert_eq!(
            vec!["database", "identifier", "position", "collection", "table_ref", "name", "type", "ordering"],
            columns
        );
    }
}
