//! An abstract syntax tree for the statements the catalog runs.
//!
//! The ast module only builds portable statements, without going into
//! database-level specifics. Rendering them into SQL text for a particular
//! backend happens in the [visitor](crate::visitor) module.
mod column;
mod compare;
mod conditions;
mod conjunctive;
mod delete;
mod expression;
mod insert;
mod ops;
mod query;
mod select;
mod table;
mod update;
mod values;

pub use column::Column;
pub use compare::{Comparable, Compare};
pub use conditions::ConditionTree;
pub use conjunctive::Conjunctive;
pub use delete::Delete;
pub use expression::Expression;
pub use insert::{Insert, SingleRowInsert};
pub use ops::SqlOp;
pub use query::Query;
pub use select::{Order, Select};
pub use table::Table;
pub use update::Update;
pub use values::Value;
