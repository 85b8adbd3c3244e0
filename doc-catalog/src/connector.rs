//! A database client connector and the traits the catalog talks to.
//!
//! The catalog never opens connections on its own. Callers hand every
//! operation a [`Queryable`], usually one already inside a transaction.
//! A native SQLite connector is included behind the `sqlite-native` feature.
mod queryable;
mod result_set;
#[cfg(feature = "sqlite-native")]
pub(crate) mod sqlite;

pub use queryable::*;
pub use result_set::*;
#[cfg(feature = "sqlite-native")]
pub use sqlite::Sqlite;
