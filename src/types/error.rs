use chrono::NaiveDate;
use thiserror::Error;

use crate::parse::ParseError;

use super::TestKind;

/// A rule definition is structurally invalid. Raised at compile time only;
/// row evaluation never fails.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("variable '{id}': unknown test kind '{token}'")]
    UnknownTestKind { id: String, token: String },

    #[error("variable '{id}': unknown connective '{token}'")]
    UnknownConnective { id: String, token: String },

    #[error("variable '{id}': method is empty")]
    EmptyMethod { id: String },

    #[error("variable '{id}': method must end with a test kind")]
    TrailingConnective { id: String },

    #[error("variable '{id}': {conditions} condition clause(s) for {tests} test kind(s)")]
    ClauseCountMismatch {
        id: String,
        conditions: usize,
        tests: usize,
    },

    #[error("variable '{id}': {columns} column group(s) for {tests} test kind(s)")]
    ColumnCountMismatch {
        id: String,
        columns: usize,
        tests: usize,
    },

    #[error("variable '{id}': '{kind}' cannot be combined with other test kinds")]
    ExclusiveKind { id: String, kind: TestKind },

    #[error("variable '{id}': test kind '{kind}' requires a calculation")]
    MissingCalculation { id: String, kind: TestKind },

    #[error("variable '{id}': expected {expected} calculation clause(s), found {found}")]
    CalculationClauseMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("variable '{id}': 'between' needs a numeric lower and upper bound, got '{clause}'")]
    InvalidBounds { id: String, clause: String },

    #[error("variable '{id}': {source}")]
    Calculation {
        id: String,
        #[source]
        source: ParseError,
    },
}

/// A calendar policy specification could not be understood.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown calendar policy '{spec}'")]
    UnknownPolicy { spec: String },

    #[error("weekday must be 0-6 (0 = Monday), got '{token}'")]
    InvalidWeekday { token: String },

    #[error("explicit calendar mapping is empty")]
    EmptyMapping,
}

/// A date or year falls outside the domain an explicit calendar mapping can
/// resolve.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("no epidemiological year starts before {date}")]
    DateBeforeMapping { date: NaiveDate },

    #[error("no epidemiological year start configured for {year}")]
    UnmappedYear { year: i32 },

    #[error("year {year} is outside the supported calendar range")]
    YearOutOfRange { year: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_test_kind_message() {
        let err = DefinitionError::UnknownTestKind {
            id: "cmd_1".into(),
            token: "regex".into(),
        };
        assert_eq!(err.to_string(), "variable 'cmd_1': unknown test kind 'regex'");
    }

    #[test]
    fn clause_count_mismatch_message() {
        let err = DefinitionError::ClauseCountMismatch {
            id: "cmd_2".into(),
            conditions: 1,
            tests: 2,
        };
        assert_eq!(
            err.to_string(),
            "variable 'cmd_2': 1 condition clause(s) for 2 test kind(s)"
        );
    }

    #[test]
    fn exclusive_kind_message() {
        let err = DefinitionError::ExclusiveKind {
            id: "age".into(),
            kind: TestKind::Calc,
        };
        assert_eq!(
            err.to_string(),
            "variable 'age': 'calc' cannot be combined with other test kinds"
        );
    }

    #[test]
    fn unknown_policy_message() {
        let err = ConfigError::UnknownPolicy {
            spec: "lunar".into(),
        };
        assert_eq!(err.to_string(), "unknown calendar policy 'lunar'");
    }

    #[test]
    fn date_before_mapping_message() {
        let err = DomainError::DateBeforeMapping {
            date: NaiveDate::from_ymd_opt(2015, 6, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no epidemiological year starts before 2015-06-01"
        );
    }

    #[test]
    fn unmapped_year_message() {
        let err = DomainError::UnmappedYear { year: 2014 };
        assert_eq!(
            err.to_string(),
            "no epidemiological year start configured for 2014"
        );
    }
}
