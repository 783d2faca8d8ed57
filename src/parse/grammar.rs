use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::types::NumExpr;

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Column references ------------------------------------------------------

// Column names follow identifier rules; dots are allowed because form columns
// use dotted prefixes.
fn column<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '.'
        }),
    )
        .take()
        .parse_next(input)
}

// -- Number literals --------------------------------------------------------

fn number(input: &mut &str) -> ModalResult<f64> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

// -- Expressions (precedence: add/sub < mul/div < unary < primary) ----------

fn primary(input: &mut &str) -> ModalResult<NumExpr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', calculation, (ws, ')')),
        number.map(NumExpr::Num),
        column.map(|c: &str| NumExpr::Column(c.to_owned())),
    ))
    .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<NumExpr> {
    ws.parse_next(input)?;
    if opt('-').parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(NumExpr::Neg(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn term(input: &mut &str) -> ModalResult<NumExpr> {
    let first = unary(input)?;
    let rest: Vec<(char, NumExpr)> =
        repeat(0.., (preceded(ws, alt(('*', '/'))), cut_err(unary))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => NumExpr::Mul(Box::new(acc), Box::new(rhs)),
        _ => NumExpr::Div(Box::new(acc), Box::new(rhs)),
    }))
}

pub(crate) fn calculation(input: &mut &str) -> ModalResult<NumExpr> {
    let first = term(input)?;
    let rest: Vec<(char, NumExpr)> =
        repeat(0.., (preceded(ws, alt(('+', '-'))), cut_err(term))).parse_next(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => NumExpr::Add(Box::new(acc), Box::new(rhs)),
        _ => NumExpr::Sub(Box::new(acc), Box::new(rhs)),
    });
    ws.parse_next(input)?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_calculation;
    use crate::types::NumExpr;

    #[test]
    fn parse_single_column() {
        let expr = parse_calculation("age").unwrap();
        assert_eq!(expr, NumExpr::Column("age".to_owned()));
    }

    #[test]
    fn parse_dotted_column() {
        let expr = parse_calculation("pt.visit_date").unwrap();
        assert_eq!(expr, NumExpr::Column("pt.visit_date".to_owned()));
    }

    #[test]
    fn parse_number_literals() {
        assert_eq!(parse_calculation("42").unwrap(), NumExpr::Num(42.0));
        assert_eq!(parse_calculation("3.5").unwrap(), NumExpr::Num(3.5));
    }

    #[test]
    fn parse_subtraction() {
        let expr = parse_calculation("end_date - start_date").unwrap();
        assert_eq!(
            expr,
            NumExpr::Sub(
                Box::new(NumExpr::Column("end_date".to_owned())),
                Box::new(NumExpr::Column("start_date".to_owned())),
            )
        );
    }

    #[test]
    fn parse_precedence_mul_before_add() {
        // a + b * c parses as a + (b * c)
        let expr = parse_calculation("a + b * c").unwrap();
        match expr {
            NumExpr::Add(left, right) => {
                assert_eq!(*left, NumExpr::Column("a".to_owned()));
                assert!(matches!(*right, NumExpr::Mul(_, _)));
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn parse_left_associative_division() {
        // a / b / c parses as (a / b) / c
        let expr = parse_calculation("a / b / c").unwrap();
        match expr {
            NumExpr::Div(left, right) => {
                assert!(matches!(*left, NumExpr::Div(_, _)));
                assert_eq!(*right, NumExpr::Column("c".to_owned()));
            }
            other => panic!("expected Div, got {other:?}"),
        }
    }

    #[test]
    fn parse_parenthesized_grouping() {
        let expr = parse_calculation("(a + b) / 2").unwrap();
        match expr {
            NumExpr::Div(left, right) => {
                assert!(matches!(*left, NumExpr::Add(_, _)));
                assert_eq!(*right, NumExpr::Num(2.0));
            }
            other => panic!("expected Div, got {other:?}"),
        }
    }

    #[test]
    fn parse_unary_minus() {
        let expr = parse_calculation("-age").unwrap();
        assert_eq!(
            expr,
            NumExpr::Neg(Box::new(NumExpr::Column("age".to_owned())))
        );
    }

    #[test]
    fn parse_whitespace_insensitive() {
        assert_eq!(
            parse_calculation("  weight/height  ").unwrap(),
            parse_calculation("weight / height").unwrap()
        );
    }

    #[test]
    fn parse_evaluates_end_to_end() {
        let expr = parse_calculation("(a + b) * 2 - 1").unwrap();
        let result = expr.eval(&|name| match name {
            "a" => 3.0,
            "b" => 4.0,
            _ => 0.0,
        });
        assert_eq!(result, Some(13.0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_calculation("").is_err());
        assert!(parse_calculation("a +").is_err());
        assert!(parse_calculation("1 ** 2").is_err());
        assert!(parse_calculation("(a + b").is_err());
    }
}
