//! # doc-catalog
//!
//! The metadata catalog of a document store kept in a relational database.
//!
//! Documents are split into a tree of document parts, one table per nesting
//! level, and their fields become typed columns. The catalog records that
//! mapping in nine tables: databases, collections, document parts, fields,
//! scalars, logical indexes and their fields, physical indexes and their
//! columns.
//!
//! - [`write::MetaDataWriter`] creates the catalog tables and inserts and
//!   deletes catalog rows. It also hands out row ids per document part.
//! - [`read::MetaDataReader`] loads the catalog back into
//!   [entities](meta).
//! - [`structure::StructureWriter`] creates the schemas, tables, columns
//!   and indexes the catalog describes.
//!
//! Everything backend specific lives behind a [`dialect::Dialect`],
//! selected from a connection string:
//!
//! ```rust
//! # use doc_catalog::config::CatalogSettings;
//! # use doc_catalog::write::MetaDataWriter;
//! let settings = CatalogSettings::from_url("sqlite::memory:")?;
//! let writer = MetaDataWriter::new(settings.tables(), settings.dialect());
//!
//! assert_eq!("doc_catalog", writer.tables().schema());
//! # Ok::<(), doc_catalog::Error>(())
//! ```
//!
//! Statements run on any [`connector::Queryable`]. The caller owns the
//! connection and the transaction; nothing here begins or commits one.

pub mod ast;
pub mod config;
pub mod connector;
pub mod converters;
pub mod dialect;
pub mod error;
pub mod meta;
pub mod read;
pub mod sql_helper;
pub mod structure;
pub mod tables;
pub mod visitor;
pub mod write;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, error::Error>;
