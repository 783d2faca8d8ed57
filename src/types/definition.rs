/// An externally owned rule definition, loaded from configuration at startup
/// and compiled once into a [`Variable`](super::Variable).
///
/// The textual fields follow the codebook convention: `method` is a
/// whitespace-separated alternation of test kinds and connectives,
/// `condition` and `db_column` are `;`-separated with one clause per test
/// kind, and `calculation` carries an arithmetic expression (or the literal
/// tag `date` for the `value` kind).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDefinition {
    pub id: String,
    pub method: String,
    pub condition: String,
    pub db_column: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub calculation: Option<String>,
}

impl VariableDefinition {
    /// Create a definition without a calculation.
    #[must_use]
    pub fn new(id: &str, method: &str, condition: &str, db_column: &str) -> Self {
        Self {
            id: id.to_owned(),
            method: method.to_owned(),
            condition: condition.to_owned(),
            db_column: db_column.to_owned(),
            calculation: None,
        }
    }

    /// Attach a calculation expression (or the `date` tag for `value`).
    #[must_use]
    pub fn with_calculation(mut self, calculation: &str) -> Self {
        self.calculation = Some(calculation.to_owned());
        self
    }
}
