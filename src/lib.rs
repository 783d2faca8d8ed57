mod calendar;
mod compile;
mod error;
mod evaluate;
mod parse;
mod types;

pub use calendar::{CalendarPolicy, EpiWeek};
pub use error::EpicodeError;
pub use parse::ParseError;
pub use types::{
    Codebook, ConfigError, DefinitionError, DomainError, Outcome, Row, TestKind, Value, Variable,
    VariableDefinition,
};
