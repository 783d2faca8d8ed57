mod codebook;
mod definition;
mod error;
mod expr;
mod outcome;
mod row;
mod value;
mod variable;

pub use codebook::Codebook;
pub use definition::VariableDefinition;
pub use error::{ConfigError, DefinitionError, DomainError};
pub use expr::TestKind;
pub use outcome::Outcome;
pub use row::Row;
pub use value::Value;
pub use variable::Variable;

pub(crate) use expr::{BoolExpr, Connective, NumExpr};
pub(crate) use variable::{Clause, EvalPlan};
