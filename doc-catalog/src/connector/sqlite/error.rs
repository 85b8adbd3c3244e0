use std::fmt;

use crate::error::*;
use rusqlite::ffi;

#[derive(Debug)]
pub struct SqliteError {
    pub extended_code: i32,
    pub message: Option<String>,
}

impl fmt::Display for SqliteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error code {}: {}",
            self.extended_code,
            ffi::code_to_str(self.extended_code)
        )
    }
}

impl std::error::Error for SqliteError {}

impl SqliteError {
    pub fn new(extended_code: i32, message: Option<String>) -> Self {
        Self { extended_code, message }
    }

    pub fn primary_code(&self) -> i32 {
        self.extended_code & 0xFF
    }
}

/// `UNIQUE constraint failed: doc_part.database, doc_part.identifier` into
/// the bare column names.
fn constrained_columns(description: &str) -> DatabaseConstraint {
    description
        .split(": ")
        .nth(1)
        .map(|s| s.split(", "))
        .map(|i| i.flat_map(|s| s.split('.').last()))
        .map(DatabaseConstraint::fields)
        .unwrap_or(DatabaseConstraint::CannotParse)
}

impl From<SqliteError> for Error {
    fn from(error: SqliteError) -> Self {
        let extended_code = error.extended_code;

        let kind = match error.message.as_deref() {
            Some(description)
                if extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Some(ErrorKind::UniqueConstraintViolation {
                    constraint: constrained_columns(description),
                })
            }
            Some(description) if extended_code == ffi::SQLITE_CONSTRAINT_NOTNULL => {
                Some(ErrorKind::NullConstraintViolation {
                    constraint: constrained_columns(description),
                })
            }
            Some(_)
                if extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                    || extended_code == ffi::SQLITE_CONSTRAINT_TRIGGER =>
            {
                Some(ErrorKind::ForeignKeyConstraintViolation {
                    constraint: DatabaseConstraint::ForeignKey,
                })
            }
            Some(d) if d.starts_with("no such table") => Some(ErrorKind::TableDoesNotExist {
                table: d.split(": ").last().unwrap_or_default().to_owned(),
            }),
            Some(d) if d.contains("has no column named") => Some(ErrorKind::ColumnNotFound {
                column: d.split(" has no column named ").last().unwrap_or_default().to_owned(),
            }),
            Some(d) if d.starts_with("no such column: ") => Some(ErrorKind::ColumnNotFound {
                column: d.split("no such column: ").last().unwrap_or_default().to_owned(),
            }),
            _ => None,
        };

        let message = error.message.clone();
        let kind = kind.unwrap_or_else(|| ErrorKind::QueryError(error.into()));

        let mut builder = Error::builder(kind);
        builder.set_original_code(extended_code.to_string());

        if let Some(message) = message {
            builder.set_original_message(message);
        }

        builder.build()
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Error {
        match e {
            rusqlite::Error::ToSqlConversionFailure(error) => match error.downcast::<Error>() {
                Ok(error) => *error,
                Err(error) => {
                    let mut builder = Error::builder(ErrorKind::QueryError(error));

                    builder.set_original_message("Could not interpret parameters in an SQLite query.");

                    builder.build()
                }
            },
            rusqlite::Error::InvalidQuery => {
                let mut builder = Error::builder(ErrorKind::QueryError(e.into()));

                builder.set_original_message(
                    "Could not interpret the query or its parameters. Check the syntax and parameter types.",
                );

                builder.build()
            }
            rusqlite::Error::ExecuteReturnedResults => {
                let mut builder = Error::builder(ErrorKind::QueryError(e.into()));
                builder.set_original_message("Execute returned results, which is not allowed in SQLite.");

                builder.build()
            }

            rusqlite::Error::QueryReturnedNoRows => Error::builder(ErrorKind::NotFound).build(),

            rusqlite::Error::SqliteFailure(ffi::Error { code: _, extended_code }, message) => {
                SqliteError::new(extended_code, message).into()
            }

            rusqlite::Error::SqlInputError {
                error: ffi::Error { extended_code, .. },
                msg,
                ..
            } => SqliteError::new(extended_code, Some(msg)).into(),

            e => Error::builder(ErrorKind::QueryError(e.into())).build(),
        }
    }
}
