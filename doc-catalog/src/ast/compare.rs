use super::*;

/// A comparison between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Compare<'a> {
    /// `left = right`
    Equals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left <> right`
    NotEquals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left <= right`
    LessThanOrEquals(Box<Expression<'a>>, Box<Expression<'a>>),
    /// `left IS NULL`
    Null(Box<Expression<'a>>),
    /// `left IS NOT NULL`
    NotNull(Box<Expression<'a>>),
}

impl<'a> From<Compare<'a>> for ConditionTree<'a> {
    fn from(compare: Compare<'a>) -> Self {
        ConditionTree::single(compare)
    }
}

impl<'a> Conjunctive<'a> for Compare<'a> {
    fn and<E>(self, other: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        ConditionTree::and(self, other)
    }

    fn or<E>(self, other: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        ConditionTree::or(self, other)
    }

    fn not(self) -> ConditionTree<'a> {
        ConditionTree::not(self)
    }
}

/// An item that can be compared against other values in the database.
pub trait Comparable<'a> {
    /// Tests if both sides are the same value.
    ///
    /// ```rust
    /// # use doc_catalog::{ast::*, visitor::{Visitor, Sqlite}};
    /// let query = Delete::from_table("field").so_that(Column::from("name").equals("age"));
    /// let (sql, params) = Sqlite::build(query).unwrap();
    ///
    /// assert_eq!("DELETE FROM `field` WHERE `name` = ?", sql);
    /// assert_eq!(vec![Value::from("age")], params);
    /// ```
    fn equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>;

    /// Tests if both sides are not the same value.
    fn not_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>;

    /// Tests if the left side is smaller than or equal to the right side.
    fn less_than_or_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>;

    /// Tests if the left side is `NULL`.
    fn is_null(self) -> Compare<'a>;

    /// Tests if the left side is not `NULL`.
    fn is_not_null(self) -> Compare<'a>;
}

impl<'a, U> Comparable<'a> for U
where
    U: Into<Column<'a>>,
{
    fn equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        let left: Column<'a> = self.into();
        Compare::Equals(Box::new(left.into()), Box::new(comparison.into()))
    }

    fn not_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        let left: Column<'a> = self.into();
        Compare::NotEquals(Box::new(left.into()), Box::new(comparison.into()))
    }

    fn less_than_or_equals<T>(self, comparison: T) -> Compare<'a>
    where
        T: Into<Expression<'a>>,
    {
        let left: Column<'a> = self.into();
        Compare::LessThanOrEquals(Box::new(left.into()), Box::new(comparison.into()))
    }

    fn is_null(self) -> Compare<'a> {
        let left: Column<'a> = self.into();
        Compare::Null(Box::new(left.into()))
    }

    fn is_not_null(self) -> Compare<'a> {
        let left: Column<'a> = self.into();
        Compare::NotNull(Box::new(left.into()))
    }
}
