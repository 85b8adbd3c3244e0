//! Error module
use crate::sql_helper::ExecutionContext;
use kv_value::ConversionFailure;
use std::{borrow::Cow, fmt, num};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq)]
pub enum DatabaseConstraint {
    Fields(Vec<String>),
    Index(String),
    ForeignKey,
    CannotParse,
}

impl DatabaseConstraint {
    pub(crate) fn fields<I, S>(columns: I) -> Self
    where
        I: Iterator<Item = S>,
        S: ToString,
    {
        let fields = columns.map(|s| s.to_string()).collect();

        Self::Fields(fields)
    }
}

impl fmt::Display for DatabaseConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => write!(f, "({})", fields.join(",")),
            Self::Index(index) => index.fmt(f),
            Self::ForeignKey => "FOREIGN KEY".fmt(f),
            Self::CannotParse => "".fmt(f),
        }
    }
}

/// The error type of the catalog.
///
/// Errors fall into three groups. Build errors come from malformed input to
/// a statement builder and are raised before anything reaches the
/// connection. Execution errors wrap a backend failure and carry the
/// [`ExecutionContext`] of the statement that failed. Allocation races mean a
/// backend's RID allocation is not atomic and are never expected.
#[derive(Debug, Error)]
pub struct Error {
    kind: ErrorKind,
    original_code: Option<String>,
    original_message: Option<String>,
    context: Option<ExecutionContext>,
}

pub(crate) struct ErrorBuilder {
    kind: ErrorKind,
    original_code: Option<String>,
    original_message: Option<String>,
    context: Option<ExecutionContext>,
}

impl ErrorBuilder {
    pub(crate) fn set_original_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.original_code = Some(code.into());
        self
    }

    pub(crate) fn set_original_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.original_message = Some(message.into());
        self
    }

    pub(crate) fn set_context(&mut self, context: ExecutionContext) -> &mut Self {
        self.context = Some(context);
        self
    }

    pub(crate) fn build(self) -> Error {
        Error {
            kind: self.kind,
            original_code: self.original_code,
            original_message: self.original_message,
            context: self.context,
        }
    }
}

impl Error {
    pub(crate) fn builder(kind: ErrorKind) -> ErrorBuilder {
        ErrorBuilder {
            kind,
            original_code: None,
            original_message: None,
            context: None,
        }
    }

    /// The error code sent by the database, if available.
    pub fn original_code(&self) -> Option<&str> {
        self.original_code.as_deref()
    }

    /// The original error message sent by the database, if available.
    pub fn original_message(&self) -> Option<&str> {
        self.original_message.as_deref()
    }

    /// A more specific error type for matching.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Why the failing statement was run. `None` for errors raised before a
    /// statement reached the connection.
    pub fn context(&self) -> Option<ExecutionContext> {
        self.context
    }

    pub(crate) fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context.get_or_insert(context);
        self
    }

    pub fn is_build_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MalformedTableRef { .. } | ErrorKind::InvalidArgument(_)
        )
    }

    pub fn is_execution_error(&self) -> bool {
        self.context.is_some() && !self.is_build_error()
    }

    pub fn is_allocation_race(&self) -> bool {
        matches!(self.kind, ErrorKind::AllocationRace { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self.kind, ErrorKind::UniqueConstraintViolation { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.context {
            Some(context) => write!(f, "[{context}] {}", self.kind),
            None => self.kind.fmt(f),
        }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("Malformed table reference {table_ref}: {reason}")]
    MalformedTableRef { table_ref: String, reason: &'static str },

    #[error("Invalid argument: {}", _0)]
    InvalidArgument(Cow<'static, str>),

    #[error("Error querying the database: {}", _0)]
    QueryError(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("Query returned no data")]
    NotFound,

    #[error("No such table: {}", table)]
    TableDoesNotExist { table: String },

    #[error("Unique constraint failed: {}", constraint)]
    UniqueConstraintViolation { constraint: DatabaseConstraint },

    #[error("Null constraint failed: {}", constraint)]
    NullConstraintViolation { constraint: DatabaseConstraint },

    #[error("Foreign key constraint failed: {}", constraint)]
    ForeignKeyConstraintViolation { constraint: DatabaseConstraint },

    #[error("Error creating a database connection.")]
    ConnectionError(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("Error reading the column value: {}", _0)]
    ColumnReadFailure(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("Error accessing result set, index out of bounds: {}", _0)]
    ResultIndexOutOfBounds(usize),

    #[error("Error accessing result set, column not found: {}", column)]
    ColumnNotFound { column: String },

    #[error("Error accessing result set, type mismatch, expected: {}", _0)]
    ResultTypeMismatch(&'static str),

    #[error("Error parsing connection string: {}", _0)]
    DatabaseUrlIsInvalid(String),

    #[error("Conversion failed: {}", _0)]
    ConversionError(Cow<'static, str>),

    #[error("Document part {table_ref} of {database}.{collection} is not in the catalog")]
    DocPartNotFound {
        database: String,
        collection: String,
        table_ref: String,
    },

    #[error("RID counter of {table_ref} changed from {expected} during allocation")]
    AllocationRace { table_ref: String, expected: i32 },
}

impl ErrorKind {
    pub(crate) fn conversion(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::ConversionError(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::builder(kind).build()
    }
}

impl From<Error> for ErrorKind {
    fn from(e: Error) -> Self {
        e.kind
    }
}

impl From<ConversionFailure> for Error {
    fn from(e: ConversionFailure) -> Self {
        Self::builder(ErrorKind::conversion(e.to_string())).build()
    }
}

impl From<serde_json::Error> for Error {
    fn from(_: serde_json::Error) -> Self {
        Self::builder(ErrorKind::conversion("Malformed JSON data.")).build()
    }
}

impl From<std::fmt::Error> for Error {
    fn from(_: std::fmt::Error) -> Self {
        Self::builder(ErrorKind::conversion("Problems writing AST into a query string.")).build()
    }
}

impl From<num::TryFromIntError> for Error {
    fn from(_: num::TryFromIntError) -> Self {
        Self::builder(ErrorKind::conversion(
            "Couldn't convert an integer (possible overflow).",
        ))
        .build()
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Error {
        let kind = ErrorKind::DatabaseUrlIsInvalid(e.to_string());
        Error::builder(kind).build()
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Error {
        Error::builder(ErrorKind::conversion("Couldn't convert data to UTF-8")).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_errors_have_no_context() {
        let err: Error = ErrorKind::invalid_argument("count must be positive").into();

        assert!(err.is_build_error());
        assert!(!err.is_execution_error());
        assert_eq!(None, err.context());
    }

    #[test]
    fn context_is_shown_and_kept() {
        let err = Error::builder(ErrorKind::NotFound)
            .build()
            .with_context(ExecutionContext::MetaDelete)
            .with_context(ExecutionContext::MetaInsert);

        assert_eq!(Some(ExecutionContext::MetaDelete), err.context());
        assert!(err.is_execution_error());
        assert_eq!("[META_DELETE] Query returned no data", err.to_string());
    }
}
