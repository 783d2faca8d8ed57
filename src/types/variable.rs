use crate::calendar::CalendarPolicy;

use super::expr::{BoolExpr, NumExpr};
use super::{DefinitionError, Outcome, Row, VariableDefinition};

/// A single primitive clause, pre-bound to its columns and operands at
/// compile time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Clause {
    Match {
        column: String,
        values: Vec<String>,
    },
    SubMatch {
        column: String,
        values: Vec<String>,
    },
    NotNull {
        column: String,
    },
    Between {
        columns: Vec<String>,
        lo: f64,
        hi: f64,
        expr: NumExpr,
    },
}

/// The evaluation plan selected once at compile time. Per-row evaluation
/// dispatches on the variant without re-inspecting the definition text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EvalPlan {
    /// Sole `value` kind: passthrough of the row value, ISO-normalized when
    /// the calculation tag is `date`.
    Value { column: String, as_date: bool },
    /// Sole `calc` kind: numeric expression over columns.
    Calc { expr: NumExpr },
    /// One boolean primitive.
    Single(Clause),
    /// Several primitives combined by the connective tree.
    Composed {
        clauses: Vec<Clause>,
        expr: BoolExpr,
    },
}

/// A compiled variable: immutable, reusable, and shareable across worker
/// threads without locking.
///
/// Compilation cost is paid once per definition; [`test`](Variable::test) is
/// then called per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub(crate) id: String,
    pub(crate) plan: EvalPlan,
    /// Days from the Unix epoch to the week epoch, used when date strings
    /// are coerced to seconds inside a calculation.
    pub(crate) epoch_offset: i64,
}

impl Variable {
    /// Compile a definition into an executable variable.
    ///
    /// The policy supplies the week epoch for date-valued calculations; it is
    /// not retained.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the definition text is structurally
    /// invalid.
    pub fn compile(
        definition: &VariableDefinition,
        policy: &CalendarPolicy,
    ) -> Result<Self, DefinitionError> {
        crate::compile::compile(definition, policy)
    }

    /// Test this variable against a row.
    ///
    /// Never fails: missing columns, type mismatches, unparseable numerics,
    /// and division by zero all degrade to a falsy outcome.
    #[must_use]
    pub fn test(&self, row: &Row) -> Outcome {
        crate::evaluate::evaluate(self, row)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}
