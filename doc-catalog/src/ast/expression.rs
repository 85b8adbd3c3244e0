use super::*;

/// A part of a statement that evaluates to a value or a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'a> {
    Column(Box<Column<'a>>),
    /// A value bound as a statement parameter.
    Parameterized(Value<'a>),
    Op(Box<SqlOp<'a>>),
    Compare(Compare<'a>),
    ConditionTree(ConditionTree<'a>),
}

impl<'a> From<Column<'a>> for Expression<'a> {
    fn from(column: Column<'a>) -> Self {
        Expression::Column(Box::new(column))
    }
}

impl<'a> From<Value<'a>> for Expression<'a> {
    fn from(value: Value<'a>) -> Self {
        Expression::Parameterized(value)
    }
}

impl<'a> From<SqlOp<'a>> for Expression<'a> {
    fn from(op: SqlOp<'a>) -> Self {
        Expression::Op(Box::new(op))
    }
}

impl<'a> From<Compare<'a>> for Expression<'a> {
    fn from(compare: Compare<'a>) -> Self {
        Expression::Compare(compare)
    }
}

impl<'a> From<&'a str> for Expression<'a> {
    fn from(s: &'a str) -> Self {
        Expression::Parameterized(Value::from(s))
    }
}

impl From<String> for Expression<'_> {
    fn from(s: String) -> Self {
        Expression::Parameterized(Value::from(s))
    }
}

impl From<bool> for Expression<'_> {
    fn from(b: bool) -> Self {
        Expression::Parameterized(Value::from(b))
    }
}

impl From<i32> for Expression<'_> {
    fn from(i: i32) -> Self {
        Expression::Parameterized(Value::from(i))
    }
}

impl From<i64> for Expression<'_> {
    fn from(i: i64) -> Self {
        Expression::Parameterized(Value::from(i))
    }
}
