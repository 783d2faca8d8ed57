use std::collections::HashMap;

use log::debug;

use crate::calendar::CalendarPolicy;

use super::{DefinitionError, Outcome, Row, Variable, VariableDefinition};

/// A full set of compiled variables sharing one calendar policy.
///
/// Compile once at startup, then classify rows from any number of worker
/// threads. The codebook holds no mutable state after construction and is
/// designed to live behind `Arc`.
#[derive(Debug, Clone)]
pub struct Codebook {
    variables: Vec<Variable>,
}

impl Codebook {
    /// Compile every definition against the given policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] encountered; a codebook with an
    /// invalid definition is never partially usable.
    pub fn compile(
        definitions: &[VariableDefinition],
        policy: &CalendarPolicy,
    ) -> Result<Self, DefinitionError> {
        let variables = definitions
            .iter()
            .map(|definition| Variable::compile(definition, policy))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("compiled codebook with {} variable(s)", variables.len());
        Ok(Self { variables })
    }

    /// Classify a row against every variable.
    ///
    /// Returns the outcomes of the variables that matched; falsy outcomes are
    /// omitted, so an empty map means the row classified under nothing.
    #[must_use]
    pub fn classify(&self, row: &Row) -> HashMap<String, Outcome> {
        self.variables
            .iter()
            .filter_map(|variable| {
                let outcome = variable.test(row);
                if outcome.is_truthy() {
                    Some((variable.id().to_owned(), outcome))
                } else {
                    None
                }
            })
            .collect()
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
