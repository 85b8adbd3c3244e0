//! Catalog settings, read from a connection string.
//!
//! - `postgres://` and `postgresql://` select PostgreSQL.
//! - `file:<dir>` and `sqlite:<dir>` select SQLite with one database file
//!   per schema inside `<dir>`; `sqlite::memory:` keeps every schema in
//!   memory.
//!
//! Both accept a `catalog_schema` query parameter naming the schema of the
//! catalog tables, `doc_catalog` by default.

use crate::{
    dialect::{Dialect, Postgres, Sqlite, SqliteStorage},
    error::{Error, ErrorKind},
    tables::MetaTables,
};
use std::{borrow::Cow, path::PathBuf, str::FromStr, sync::Arc};
use url::Url;

const CATALOG_SCHEMA_PARAM: &str = "catalog_schema";
const SQLITE_IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Postgres(Url),
    Sqlite(SqliteStorage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    backend: Backend,
    catalog_schema: String,
}

impl CatalogSettings {
    pub fn new(backend: Backend) -> Self {
        CatalogSettings {
            backend,
            catalog_schema: MetaTables::DEFAULT_SCHEMA.to_owned(),
        }
    }

    /// Parses a connection string. See the [module documentation](self).
    pub fn from_url(url_str: &str) -> crate::Result<Self> {
        match url_str {
            s if s.starts_with("postgres://") || s.starts_with("postgresql://") => {
                let url = Url::parse(s)?;
                let schema = catalog_schema(url.query_pairs())?;

                Ok(Self::new(Backend::Postgres(url)).with_catalog_schema(schema))
            }
            s if s.starts_with("file:") || s.starts_with("sqlite:") => {
                let rest = s.split_once(':').map(|(_, rest)| rest).unwrap_or_default();

                let (path, query) = match rest.split_once('?') {
                    Some((path, query)) => (path, query),
                    None => (rest, ""),
                };

                let storage = match path.strip_prefix("//").unwrap_or(path) {
                    "" => return Err(invalid_url("SQLite URL without a directory")),
                    SQLITE_IN_MEMORY => SqliteStorage::InMemory,
                    p => SqliteStorage::Directory(PathBuf::from(p)),
                };

                let schema = catalog_schema(url::form_urlencoded::parse(query.as_bytes()))?;

                Ok(Self::new(Backend::Sqlite(storage)).with_catalog_schema(schema))
            }
            _ => Err(invalid_url(
                "Supported url schemes: file or sqlite, postgres or postgresql.",
            )),
        }
    }

    pub fn with_catalog_schema(mut self, schema: Option<String>) -> Self {
        if let Some(schema) = schema {
            self.catalog_schema = schema;
        }

        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn catalog_schema(&self) -> &str {
        &self.catalog_schema
    }

    pub fn dialect(&self) -> Arc<dyn Dialect> {
        match &self.backend {
            Backend::Postgres(_) => Arc::new(Postgres::new()),
            Backend::Sqlite(storage) => Arc::new(Sqlite::new(storage.clone())),
        }
    }

    pub fn tables(&self) -> MetaTables {
        MetaTables::new(self.catalog_schema.clone())
    }
}

impl FromStr for CatalogSettings {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_url(s)
    }
}

fn catalog_schema<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> crate::Result<Option<String>> {
    let mut schema = None;

    for (k, v) in pairs {
        if k == CATALOG_SCHEMA_PARAM {
            if v.is_empty() {
                return Err(invalid_url("empty catalog_schema"));
            }

            schema = Some(v.into_owned());
        } else {
            tracing::trace!(message = "Discarding connection string param", param = k.as_ref());
        }
    }

    Ok(schema)
}

fn invalid_url(message: &str) -> Error {
    Error::builder(ErrorKind::DatabaseUrlIsInvalid(message.to_owned())).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlFamily;
    use pretty_assertions::assert_eq;

    #[test]
    fn postgres_urls() {
        let settings = CatalogSettings::from_url("postgresql://docs@localhost:5432/docs?catalog_schema=meta").unwrap();

        assert_eq!(SqlFamily::Postgres, settings.dialect().family());
        assert_eq!("meta", settings.tables().schema());

        let settings: CatalogSettings = "postgres://localhost/db".parse().unwrap();
        assert_eq!("doc_catalog", settings.catalog_schema());
    }

    #[test]
    fn sqlite_urls() {
        let in_memory = CatalogSettings::from_url("sqlite::memory:").unwrap();
        assert_eq!(&Backend::Sqlite(SqliteStorage::InMemory), in_memory.backend());
        assert_eq!(SqlFamily::Sqlite, in_memory.dialect().family());

        let on_disk = CatalogSettings::from_url("file:/var/lib/docs?catalog_schema=cat").unwrap();
        assert_eq!(
            &Backend::Sqlite(SqliteStorage::Directory(PathBuf::from("/var/lib/docs"))),
            on_disk.backend()
        );
        assert_eq!("cat", on_disk.catalog_schema());
    }

    #[test]
    fn invalid_urls() {
        for url in ["mysql://localhost/db", "", "sqlite:", "file:/tmp?catalog_schema="] {
            let err = CatalogSettings::from_url(url).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::DatabaseUrlIsInvalid(_)), "{url}: {err}");
        }
    }
}
