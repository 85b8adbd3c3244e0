//! Visitors for reading an abstract SQL syntax tree, generating the query and
//! gathering parameters in the right order.
//!
//! The visitor module should not know how to construct an AST, just how to read
//! one. Everything related to the tree generation is in the
//! [ast](crate::ast) module.
mod postgres;
mod sqlite;

pub use self::postgres::Postgres;
pub use self::sqlite::Sqlite;

use crate::ast::*;
use std::fmt;

pub type Result = crate::Result<()>;

/// A function travelling through the query AST, building the final query string
/// and gathering parameters sent to the database together with the query.
pub trait Visitor<'a> {
    /// Opening backtick character to surround identifiers, such as column and table names.
    const C_BACKTICK_OPEN: &'static str;
    /// Closing backtick character to surround identifiers, such as column and table names.
    const C_BACKTICK_CLOSE: &'static str;
    /// Wildcard character to be used in `SELECT` statements.
    const C_WILDCARD: &'static str = "*";

    /// Convert the given `Query` to an SQL string and a vector of parameters.
    /// When certain parameters are replaced with the `C_PARAM` character in the
    /// query, the vector should contain the parameter value in the right position.
    fn build<Q>(query: Q) -> crate::Result<(String, Vec<Value<'a>>)>
    where
        Q: Into<Query<'a>>;

    /// Write to the query.
    fn write<D: fmt::Display>(&mut self, s: D) -> Result;

    /// When called, the visitor decided to not render the parameter into the query,
    /// replacing it with the `C_PARAM`, calling `add_parameter` with the replaced value.
    fn add_parameter(&mut self, value: Value<'a>);

    /// The placeholder of the next parameter.
    fn parameter_substitution(&mut self) -> Result;

    /// Row locking for `SELECT ... FOR UPDATE`. Backends without row locks
    /// render nothing.
    fn visit_lock(&mut self) -> Result {
        self.write(" FOR UPDATE")
    }

    /// A `RETURNING` clause for an `UPDATE`.
    fn visit_returning(&mut self, returning: Vec<Column<'a>>) -> Result {
        if !returning.is_empty() {
            self.write(" RETURNING ")?;
            self.visit_columns(returning)?;
        }

        Ok(())
    }

    /// A walk through the query tree
    fn visit_query(&mut self, query: Query<'a>) -> Result {
        match query {
            Query::Select(select) => self.visit_select(*select),
            Query::Insert(insert) => self.visit_insert(*insert),
            Query::Update(update) => self.visit_update(*update),
            Query::Delete(delete) => self.visit_delete(*delete),
        }
    }

    /// A walk through a `SELECT` statement
    fn visit_select(&mut self, select: Select<'a>) -> Result {
        self.write("SELECT ")?;

        if select.columns.is_empty() {
            self.write(Self::C_WILDCARD)?;
        } else {
            self.visit_columns(select.columns)?;
        }

        self.write(" FROM ")?;
        self.visit_table(select.table)?;

        if let Some(conditions) = select.conditions {
            self.visit_where(conditions)?;
        }

        if !select.ordering.is_empty() {
            self.write(" ORDER BY ")?;
            let len = select.ordering.len();

            for (i, (column, order)) in select.ordering.into_iter().enumerate() {
                self.visit_column(column)?;

                match order {
                    Order::Asc => self.write(" ASC")?,
                    Order::Desc => self.write(" DESC")?,
                }

                if i < (len - 1) {
                    self.write(", ")?;
                }
            }
        }

        if select.for_update {
            self.visit_lock()?;
        }

        Ok(())
    }

    /// A walk through an `INSERT` statement
    fn visit_insert(&mut self, insert: Insert<'a>) -> Result {
        self.write("INSERT INTO ")?;
        self.visit_table(insert.table)?;

        self.write(" (")?;
        self.visit_columns(insert.columns)?;
        self.write(") VALUES (")?;

        let len = insert.values.len();

        for (i, value) in insert.values.into_iter().enumerate() {
            self.visit_expression(value)?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        self.write(")")
    }

    /// A walk through an `UPDATE` statement
    fn visit_update(&mut self, update: Update<'a>) -> Result {
        self.write("UPDATE ")?;
        self.visit_table(update.table)?;
        self.write(" SET ")?;

        let pairs = update.columns.into_iter().zip(update.values);
        let len = pairs.len();

        for (i, (column, value)) in pairs.enumerate() {
            self.visit_column(column)?;
            self.write(" = ")?;
            self.visit_expression(value)?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        if let Some(conditions) = update.conditions {
            self.visit_where(conditions)?;
        }

        self.visit_returning(update.returning)
    }

    /// A walk through a `DELETE` statement
    fn visit_delete(&mut self, delete: Delete<'a>) -> Result {
        self.write("DELETE FROM ")?;
        self.visit_table(delete.table)?;

        if let Some(conditions) = delete.conditions {
            self.visit_where(conditions)?;
        }

        Ok(())
    }

    fn visit_where(&mut self, conditions: ConditionTree<'a>) -> Result {
        if conditions == ConditionTree::NoCondition {
            return Ok(());
        }

        self.write(" WHERE ")?;
        self.visit_conditions(conditions)
    }

    /// A helper for delimiting an identifier, surrounding every part with `C_BACKTICK`
    /// and delimiting the values with a `.`
    fn delimited_identifiers(&mut self, parts: &[&str]) -> Result {
        let len = parts.len();

        for (i, part) in parts.iter().enumerate() {
            self.surround_with_backticks(part)?;

            if i < (len - 1) {
                self.write(".")?;
            }
        }

        Ok(())
    }

    /// A helper for delimiting a part of an identifier, surrounding it with `C_BACKTICK`.
    /// A closing backtick inside the part is doubled.
    fn surround_with_backticks(&mut self, part: &str) -> Result {
        let escaped = part.replace(Self::C_BACKTICK_CLOSE, &Self::C_BACKTICK_CLOSE.repeat(2));

        self.write(Self::C_BACKTICK_OPEN)?;
        self.write(escaped)?;
        self.write(Self::C_BACKTICK_CLOSE)
    }

    /// A walk through a table reference.
    fn visit_table(&mut self, table: Table<'a>) -> Result {
        match table.database {
            Some(database) => self.delimited_identifiers(&[&*database, &*table.name]),
            None => self.delimited_identifiers(&[&*table.name]),
        }
    }

    /// A walk through a column reference.
    fn visit_column(&mut self, column: Column<'a>) -> Result {
        match column.table {
            Some(table) => {
                self.visit_table(table)?;
                self.write(".")?;
                self.delimited_identifiers(&[&*column.name])
            }
            None => self.delimited_identifiers(&[&*column.name]),
        }
    }

    /// A comma-separated list of columns.
    fn visit_columns(&mut self, columns: Vec<Column<'a>>) -> Result {
        let len = columns.len();

        for (i, column) in columns.into_iter().enumerate() {
            self.visit_column(column)?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        Ok(())
    }

    /// A visit to a value we parameterize.
    fn visit_parameterized(&mut self, value: Value<'a>) -> Result {
        self.add_parameter(value);
        self.parameter_substitution()
    }

    /// A visit to a value used in an expression.
    fn visit_expression(&mut self, expression: Expression<'a>) -> Result {
        match expression {
            Expression::Column(column) => self.visit_column(*column),
            Expression::Parameterized(value) => self.visit_parameterized(value),
            Expression::Op(op) => self.visit_op(*op),
            Expression::Compare(compare) => self.visit_compare(compare),
            Expression::ConditionTree(tree) => self.visit_conditions(tree),
        }
    }

    fn visit_op(&mut self, op: SqlOp<'a>) -> Result {
        let (left, sign, right) = match op {
            SqlOp::Add(left, right) => (left, " + ", right),
            SqlOp::Sub(left, right) => (left, " - ", right),
        };

        self.write("(")?;
        self.visit_expression(left)?;
        self.write(sign)?;
        self.visit_expression(right)?;
        self.write(")")
    }

    /// A walk through the query conditions
    fn visit_conditions(&mut self, tree: ConditionTree<'a>) -> Result {
        match tree {
            ConditionTree::And(expressions) => self.visit_junction(expressions, " AND "),
            ConditionTree::Or(expressions) => self.visit_junction(expressions, " OR "),
            ConditionTree::Not(expression) => {
                self.write("(NOT ")?;
                self.visit_expression(*expression)?;
                self.write(")")
            }
            ConditionTree::Single(expression) => self.visit_expression(*expression),
            ConditionTree::NoCondition => self.write("1=1"),
        }
    }

    fn visit_junction(&mut self, expressions: Vec<Expression<'a>>, separator: &str) -> Result {
        let len = expressions.len();

        self.write("(")?;

        for (i, expr) in expressions.into_iter().enumerate() {
            self.visit_expression(expr)?;

            if i < (len - 1) {
                self.write(separator)?;
            }
        }

        self.write(")")
    }

    /// A comparison expression
    fn visit_compare(&mut self, compare: Compare<'a>) -> Result {
        match compare {
            Compare::Equals(left, right) => {
                self.visit_expression(*left)?;
                self.write(" = ")?;
                self.visit_expression(*right)
            }
            Compare::NotEquals(left, right) => {
                self.visit_expression(*left)?;
                self.write(" <> ")?;
                self.visit_expression(*right)
            }
            Compare::LessThanOrEquals(left, right) => {
                self.visit_expression(*left)?;
                self.write(" <= ")?;
                self.visit_expression(*right)
            }
            Compare::Null(left) => {
                self.visit_expression(*left)?;
                self.write(" IS NULL")
            }
            Compare::NotNull(left) => {
                self.visit_expression(*left)?;
                self.write(" IS NOT NULL")
            }
        }
    }
}
