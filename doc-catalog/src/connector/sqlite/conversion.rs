use crate::{
    ast::Value,
    converters::{DATE_FORMAT, TIME_FORMAT},
    error::{Error, ErrorKind},
};
use chrono::SecondsFormat;
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqliteValue, ValueRef},
    Error as RusqlError, Row as SqliteRow, Statement,
};

/// Column names and declared types of a prepared statement, read before the
/// statement is borrowed for iteration.
pub(crate) struct Columns {
    pub(crate) names: Vec<String>,
    pub(crate) decl_types: Vec<Option<String>>,
}

pub(crate) fn columns_of(stmt: &Statement<'_>) -> Columns {
    let columns = stmt.columns();

    Columns {
        names: columns.iter().map(|c| c.name().to_owned()).collect(),
        decl_types: columns.iter().map(|c| c.decl_type().map(str::to_owned)).collect(),
    }
}

pub(crate) fn to_result_row(row: &SqliteRow<'_>, decl_types: &[Option<String>]) -> crate::Result<Vec<Value<'static>>> {
    let mut values = Vec::with_capacity(decl_types.len());

    for (i, decl_type) in decl_types.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => match decl_type.as_deref() {
                Some(t) if t.eq_ignore_ascii_case("boolean") => Value::Boolean(i != 0),
                _ => Value::Int64(i),
            },
            ValueRef::Real(f) => Value::Double(f),
            ValueRef::Text(bytes) => Value::text(String::from_utf8(bytes.to_vec())?),
            ValueRef::Blob(bytes) => Value::bytes(bytes.to_vec()),
        };

        values.push(value);
    }

    Ok(values)
}

impl ToSql for Value<'_> {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, RusqlError> {
        let value = match self {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Boolean(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            Value::Int32(i) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*i))),
            Value::Int64(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            Value::Double(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            Value::Numeric(d) => ToSqlOutput::Owned(SqliteValue::Text(d.to_string())),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_ref())),
            Value::Date(d) => ToSqlOutput::Owned(SqliteValue::Text(d.format(DATE_FORMAT).to_string())),
            Value::Time(t) => ToSqlOutput::Owned(SqliteValue::Text(t.format(TIME_FORMAT).to_string())),
            Value::DateTime(dt) => {
                ToSqlOutput::Owned(SqliteValue::Text(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            }
            Value::Json(json) => ToSqlOutput::Owned(SqliteValue::Text(json.to_string())),
            Value::Array(_) => {
                let kind = ErrorKind::conversion("SQLite has no array parameters, encode arrays as JSON text.");
                let err = Error::builder(kind).build();

                return Err(RusqlError::ToSqlConversionFailure(Box::new(err)));
            }
        };

        Ok(value)
    }
}
