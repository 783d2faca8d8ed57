use log::debug;

use crate::calendar::CalendarPolicy;
use crate::parse;
use crate::types::{
    BoolExpr, Clause, Connective, DefinitionError, EvalPlan, TestKind, Variable,
    VariableDefinition,
};

pub(crate) fn compile(
    def: &VariableDefinition,
    policy: &CalendarPolicy,
) -> Result<Variable, DefinitionError> {
    let (kinds, connectives) = tokenize_method(def)?;
    let conditions = split_clauses(&def.condition);
    let columns = split_clauses(&def.db_column);

    if conditions.len() != kinds.len() {
        return Err(DefinitionError::ClauseCountMismatch {
            id: def.id.clone(),
            conditions: conditions.len(),
            tests: kinds.len(),
        });
    }
    if columns.len() != kinds.len() {
        return Err(DefinitionError::ColumnCountMismatch {
            id: def.id.clone(),
            columns: columns.len(),
            tests: kinds.len(),
        });
    }
    if kinds.len() > 1 {
        if let Some(kind) = kinds.iter().copied().find(|k| k.is_exclusive()) {
            return Err(DefinitionError::ExclusiveKind {
                id: def.id.clone(),
                kind,
            });
        }
    }

    let plan = match kinds.as_slice() {
        [TestKind::Value] => value_plan(def, &columns[0]),
        [TestKind::Calc] => calc_plan(def)?,
        [kind] => EvalPlan::Single(clause(
            def,
            *kind,
            &columns[0],
            &conditions[0],
            def.calculation.as_deref(),
        )?),
        _ => composed_plan(def, &kinds, &connectives, &columns, &conditions)?,
    };

    debug!("compiled variable '{}' with {} clause(s)", def.id, kinds.len());

    Ok(Variable {
        id: def.id.clone(),
        plan,
        epoch_offset: policy.week_epoch_offset(),
    })
}

/// Split `method` on whitespace and classify tokens by parity: even
/// positions are test kinds, odd positions connectives.
fn tokenize_method(
    def: &VariableDefinition,
) -> Result<(Vec<TestKind>, Vec<Connective>), DefinitionError> {
    let mut kinds = Vec::new();
    let mut connectives = Vec::new();

    for (i, token) in def.method.split_whitespace().enumerate() {
        if i % 2 == 0 {
            let kind =
                TestKind::parse(token).ok_or_else(|| DefinitionError::UnknownTestKind {
                    id: def.id.clone(),
                    token: token.to_owned(),
                })?;
            kinds.push(kind);
        } else {
            let connective =
                Connective::parse(token).ok_or_else(|| DefinitionError::UnknownConnective {
                    id: def.id.clone(),
                    token: token.to_owned(),
                })?;
            connectives.push(connective);
        }
    }

    if kinds.is_empty() {
        return Err(DefinitionError::EmptyMethod { id: def.id.clone() });
    }
    if connectives.len() == kinds.len() {
        return Err(DefinitionError::TrailingConnective { id: def.id.clone() });
    }
    Ok((kinds, connectives))
}

/// Split a `;`-separated spec into clauses, each a `,`-separated list of
/// trimmed parts. A clause without commas is a single-element list.
fn split_clauses(text: &str) -> Vec<Vec<String>> {
    text.split(';')
        .map(|clause| clause.split(',').map(|part| part.trim().to_owned()).collect())
        .collect()
}

fn value_plan(def: &VariableDefinition, columns: &[String]) -> EvalPlan {
    EvalPlan::Value {
        column: columns[0].clone(),
        as_date: def.calculation.as_deref().map(str::trim) == Some("date"),
    }
}

fn calc_plan(def: &VariableDefinition) -> Result<EvalPlan, DefinitionError> {
    let text = def
        .calculation
        .as_deref()
        .ok_or_else(|| DefinitionError::MissingCalculation {
            id: def.id.clone(),
            kind: TestKind::Calc,
        })?;
    let expr = parse_calculation(def, text)?;
    Ok(EvalPlan::Calc { expr })
}

fn composed_plan(
    def: &VariableDefinition,
    kinds: &[TestKind],
    connectives: &[Connective],
    columns: &[Vec<String>],
    conditions: &[Vec<String>],
) -> Result<EvalPlan, DefinitionError> {
    // Calculations for composed methods are `;`-separated, aligned with the
    // clause positions; only `between` clauses consume theirs.
    let segments: Vec<&str> = def
        .calculation
        .as_deref()
        .map(|text| text.split(';').collect())
        .unwrap_or_default();

    let mut clauses = Vec::with_capacity(kinds.len());
    for (i, kind) in kinds.iter().enumerate() {
        let calculation = if *kind == TestKind::Between {
            if def.calculation.is_none() {
                return Err(DefinitionError::MissingCalculation {
                    id: def.id.clone(),
                    kind: TestKind::Between,
                });
            }
            let segment =
                segments
                    .get(i)
                    .ok_or_else(|| DefinitionError::CalculationClauseMismatch {
                        id: def.id.clone(),
                        expected: kinds.len(),
                        found: segments.len(),
                    })?;
            Some(*segment)
        } else {
            None
        };
        clauses.push(clause(def, *kind, &columns[i], &conditions[i], calculation)?);
    }

    Ok(EvalPlan::Composed {
        clauses,
        expr: BoolExpr::from_connectives(connectives),
    })
}

fn clause(
    def: &VariableDefinition,
    kind: TestKind,
    columns: &[String],
    condition: &[String],
    calculation: Option<&str>,
) -> Result<Clause, DefinitionError> {
    match kind {
        TestKind::Match => Ok(Clause::Match {
            column: columns[0].clone(),
            values: condition.to_vec(),
        }),
        TestKind::SubMatch => Ok(Clause::SubMatch {
            column: columns[0].clone(),
            values: condition.to_vec(),
        }),
        TestKind::NotNull => Ok(Clause::NotNull {
            column: columns[0].clone(),
        }),
        TestKind::Between => {
            let text = calculation.ok_or_else(|| DefinitionError::MissingCalculation {
                id: def.id.clone(),
                kind: TestKind::Between,
            })?;
            let expr = parse_calculation(def, text)?;
            let (lo, hi) = parse_bounds(def, condition)?;
            Ok(Clause::Between {
                columns: columns.to_vec(),
                lo,
                hi,
                expr,
            })
        }
        // value and calc are compiled as dedicated plans before clause
        // construction is reached.
        TestKind::Value | TestKind::Calc => unreachable!("exclusive kinds handled upstream"),
    }
}

fn parse_calculation(def: &VariableDefinition, text: &str) -> Result<crate::types::NumExpr, DefinitionError> {
    parse::parse_calculation(text).map_err(|source| DefinitionError::Calculation {
        id: def.id.clone(),
        source,
    })
}

fn parse_bounds(
    def: &VariableDefinition,
    condition: &[String],
) -> Result<(f64, f64), DefinitionError> {
    let invalid = || DefinitionError::InvalidBounds {
        id: def.id.clone(),
        clause: condition.join(","),
    };
    if condition.len() != 2 {
        return Err(invalid());
    }
    let lo = condition[0].parse().map_err(|_| invalid())?;
    let hi = condition[1].parse().map_err(|_| invalid())?;
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use crate::{CalendarPolicy, DefinitionError, Variable, VariableDefinition};

    fn compile(def: &VariableDefinition) -> Result<Variable, DefinitionError> {
        Variable::compile(def, &CalendarPolicy::International)
    }

    #[test]
    fn compile_simple_match() {
        let def = VariableDefinition::new("gen_1", "match", "male", "sex");
        assert!(compile(&def).is_ok());
    }

    #[test]
    fn compile_unknown_test_kind() {
        let def = VariableDefinition::new("bad", "regex", "x", "y");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::UnknownTestKind { token, .. }) if token == "regex"
        ));
    }

    #[test]
    fn compile_unknown_connective() {
        let def = VariableDefinition::new("bad", "match xor match", "a;b", "x;y");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::UnknownConnective { token, .. }) if token == "xor"
        ));
    }

    #[test]
    fn compile_empty_method() {
        let def = VariableDefinition::new("bad", "   ", "a", "x");
        assert!(matches!(compile(&def), Err(DefinitionError::EmptyMethod { .. })));
    }

    #[test]
    fn compile_trailing_connective() {
        let def = VariableDefinition::new("bad", "match and", "a", "x");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::TrailingConnective { .. })
        ));
    }

    #[test]
    fn compile_clause_count_mismatch() {
        // Two test kinds, one condition clause.
        let def = VariableDefinition::new("bad", "match and match", "male", "sex;sex");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::ClauseCountMismatch {
                conditions: 1,
                tests: 2,
                ..
            })
        ));
    }

    #[test]
    fn compile_column_count_mismatch() {
        let def = VariableDefinition::new("bad", "match and match", "male;female", "sex");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::ColumnCountMismatch { .. })
        ));
    }

    #[test]
    fn compile_value_must_be_alone() {
        let def = VariableDefinition::new("bad", "value and match", "a;b", "x;y");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::ExclusiveKind { .. })
        ));
    }

    #[test]
    fn compile_calc_must_be_alone() {
        let def = VariableDefinition::new("bad", "calc or not_null", "a;b", "x;y");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::ExclusiveKind { .. })
        ));
    }

    #[test]
    fn compile_calc_requires_calculation() {
        let def = VariableDefinition::new("bad", "calc", "", "age");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::MissingCalculation { .. })
        ));
    }

    #[test]
    fn compile_between_requires_calculation() {
        let def = VariableDefinition::new("bad", "between", "0,5", "age");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::MissingCalculation { .. })
        ));
    }

    #[test]
    fn compile_between_requires_two_numeric_bounds() {
        let def = VariableDefinition::new("bad", "between", "0", "age").with_calculation("age");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::InvalidBounds { .. })
        ));

        let def =
            VariableDefinition::new("bad", "between", "low,high", "age").with_calculation("age");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn compile_bad_calculation_expression() {
        let def = VariableDefinition::new("bad", "calc", "", "age").with_calculation("age +");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::Calculation { .. })
        ));
    }

    #[test]
    fn compile_composed_between_uses_aligned_segment() {
        let def = VariableDefinition::new(
            "mix",
            "match and between",
            "male;0,5",
            "sex;age",
        )
        .with_calculation(";age");
        assert!(compile(&def).is_ok());
    }

    #[test]
    fn compile_composed_between_missing_segment() {
        let def = VariableDefinition::new(
            "mix",
            "between and between",
            "0,5;5,10",
            "age;age",
        )
        .with_calculation("age");
        assert!(matches!(
            compile(&def),
            Err(DefinitionError::CalculationClauseMismatch { .. })
        ));
    }
}
