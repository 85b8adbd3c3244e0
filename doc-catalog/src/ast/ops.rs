use super::Expression;

/// Arithmetic on expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlOp<'a> {
    Add(Expression<'a>, Expression<'a>),
    Sub(Expression<'a>, Expression<'a>),
}

impl<'a> SqlOp<'a> {
    pub fn add(left: impl Into<Expression<'a>>, right: impl Into<Expression<'a>>) -> Self {
        SqlOp::Add(left.into(), right.into())
    }

    pub fn sub(left: impl Into<Expression<'a>>, right: impl Into<Expression<'a>>) -> Self {
        SqlOp::Sub(left.into(), right.into())
    }
}
