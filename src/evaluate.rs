use crate::calendar;
use crate::types::{Clause, EvalPlan, NumExpr, Outcome, Row, Value, Variable};

pub(crate) fn evaluate(variable: &Variable, row: &Row) -> Outcome {
    match &variable.plan {
        EvalPlan::Value { column, as_date } => eval_value(column, *as_date, row),
        EvalPlan::Calc { expr } => Outcome::Number(eval_calc(expr, row, variable.epoch_offset)),
        EvalPlan::Single(clause) => Outcome::Bool(eval_clause(clause, row, variable.epoch_offset)),
        EvalPlan::Composed { clauses, expr } => {
            let slots: Vec<bool> = clauses
                .iter()
                .map(|clause| eval_clause(clause, row, variable.epoch_offset))
                .collect();
            Outcome::Bool(expr.eval(&slots))
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn eval_value(column: &str, as_date: bool, row: &Row) -> Outcome {
    let Some(value) = row.get(column) else {
        return Outcome::Bool(false);
    };
    if !value.is_truthy() {
        return Outcome::Bool(false);
    }
    match value {
        Value::String(s) if as_date => match calendar::normalize_iso(s) {
            Some(iso) => Outcome::Text(iso),
            // Best-effort passthrough for strings no accepted format matches.
            None => Outcome::Text(s.clone()),
        },
        Value::String(s) => Outcome::Text(s.clone()),
        Value::Int(i) => Outcome::Number(*i as f64),
        Value::Float(f) => Outcome::Number(*f),
    }
}

fn eval_calc(expr: &NumExpr, row: &Row, epoch_offset: i64) -> f64 {
    expr.eval(&|column| column_as_number(row, column, epoch_offset))
        .unwrap_or(0.0)
}

fn eval_clause(clause: &Clause, row: &Row, epoch_offset: i64) -> bool {
    match clause {
        Clause::Match { column, values } => row
            .get(column)
            .and_then(Value::as_str)
            .is_some_and(|s| values.iter().any(|v| v == s)),
        Clause::SubMatch { column, values } => row
            .get(column)
            .and_then(Value::as_str)
            .is_some_and(|s| {
                values.iter().any(|v| v == s)
                    || (!s.is_empty() && values.iter().any(|v| v.contains(s)))
            }),
        Clause::NotNull { column } => row.get(column).is_some_and(Value::is_truthy),
        Clause::Between {
            columns,
            lo,
            hi,
            expr,
        } => eval_between(columns, *lo, *hi, expr, row, epoch_offset),
    }
}

fn eval_between(
    columns: &[String],
    lo: f64,
    hi: f64,
    expr: &NumExpr,
    row: &Row,
    epoch_offset: i64,
) -> bool {
    // Any missing or falsy referenced column fails the whole test.
    if columns
        .iter()
        .any(|column| !row.get(column).is_some_and(Value::is_truthy))
    {
        return false;
    }
    match expr.eval(&|column| column_as_number(row, column, epoch_offset)) {
        // Lower-inclusive, upper-exclusive.
        Some(result) => lo <= result && result < hi,
        None => false,
    }
}

/// Numeric coercion of a row column: missing and falsy values read as zero,
/// date-formatted strings convert to seconds since the week epoch, numeric
/// strings parse, and anything else degrades to zero.
#[allow(clippy::cast_precision_loss)]
fn column_as_number(row: &Row, column: &str, epoch_offset: i64) -> f64 {
    match row.get(column) {
        None => 0.0,
        Some(value) if !value.is_truthy() => 0.0,
        Some(Value::Int(i)) => *i as f64,
        Some(Value::Float(f)) => *f,
        Some(Value::String(s)) => match calendar::parse_date(s) {
            Some(datetime) => calendar::seconds_since_week_epoch(datetime, epoch_offset),
            None => s.trim().parse().unwrap_or(0.0),
        },
    }
}
