//! Rendering of DDL statements, one module per SQL dialect. Every statement
//! is a plain struct implementing `Display`.

mod common;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use common::{Column, CreateTable, ForeignKey, IndexColumn, SortOrder};
