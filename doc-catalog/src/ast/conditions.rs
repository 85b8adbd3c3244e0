use crate::ast::*;

/// Tree structures and leaves for condition building.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum ConditionTree<'a> {
    /// `(left_expression AND right_expression)`
    And(Vec<Expression<'a>>),
    /// `(left_expression OR right_expression)`
    Or(Vec<Expression<'a>>),
    /// `(NOT expression)`
    Not(Box<Expression<'a>>),
    /// A single expression leaf
    Single(Box<Expression<'a>>),
    /// A leaf that does nothing to the condition, `1=1`
    #[default]
    NoCondition,
}

impl<'a> ConditionTree<'a> {
    /// An `AND` statement, is true when both sides are true.
    pub fn and<E, J>(left: E, right: J) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
        J: Into<Expression<'a>>,
    {
        ConditionTree::And(vec![left.into(), right.into()])
    }

    /// An `OR` statement, is true when one side is true.
    pub fn or<E, J>(left: E, right: J) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
        J: Into<Expression<'a>>,
    {
        ConditionTree::Or(vec![left.into(), right.into()])
    }

    /// A `NOT` statement, is true when the expression is false.
    pub fn not<E>(left: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        ConditionTree::Not(Box::new(left.into()))
    }

    /// A single leaf, is true when the expression is true.
    pub fn single<E>(left: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        ConditionTree::Single(Box::new(left.into()))
    }

    /// Joins every given condition with `AND`. An empty list is no
    /// condition at all.
    pub fn all<I, E>(conditions: I) -> ConditionTree<'a>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression<'a>>,
    {
        let mut exprs: Vec<Expression<'a>> = conditions.into_iter().map(Into::into).collect();

        match exprs.len() {
            0 => ConditionTree::NoCondition,
            1 => ConditionTree::Single(Box::new(exprs.remove(0))),
            _ => ConditionTree::And(exprs),
        }
    }
}

impl<'a> From<ConditionTree<'a>> for Expression<'a> {
    fn from(ct: ConditionTree<'a>) -> Self {
        Expression::ConditionTree(ct)
    }
}

impl<'a> Conjunctive<'a> for ConditionTree<'a> {
    fn and<E>(self, other: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        match self {
            ConditionTree::And(mut exprs) => {
                exprs.push(other.into());
                ConditionTree::And(exprs)
            }
            ConditionTree::NoCondition => ConditionTree::single(other),
            tree => ConditionTree::and(tree, other),
        }
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
