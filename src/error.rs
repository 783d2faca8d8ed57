use thiserror::Error;

use crate::types::{ConfigError, DefinitionError, DomainError};

/// Unified error type covering definition compilation and calendar
/// configuration.
///
/// Individual entry points return the specific error; this exists for callers
/// wiring both engines together at startup.
#[derive(Debug, Error)]
pub enum EpicodeError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
