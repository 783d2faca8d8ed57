use std::fmt;

/// The primitive evaluation semantics a `method` token can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    Match,
    SubMatch,
    Between,
    Value,
    NotNull,
    Calc,
}

impl TestKind {
    pub(crate) fn parse(token: &str) -> Option<Self> {
        match token {
            "match" => Some(TestKind::Match),
            "sub_match" => Some(TestKind::SubMatch),
            "between" => Some(TestKind::Between),
            "value" => Some(TestKind::Value),
            "not_null" => Some(TestKind::NotNull),
            "calc" => Some(TestKind::Calc),
            _ => None,
        }
    }

    /// `value` and `calc` may only appear as the sole test kind.
    pub(crate) fn is_exclusive(self) -> bool {
        matches!(self, TestKind::Value | TestKind::Calc)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestKind::Match => "match",
            TestKind::SubMatch => "sub_match",
            TestKind::Between => "between",
            TestKind::Value => "value",
            TestKind::NotNull => "not_null",
            TestKind::Calc => "calc",
        };
        write!(f, "{name}")
    }
}

/// Boolean connectives between method clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Connective {
    And,
    Or,
    Not,
}

impl Connective {
    pub(crate) fn parse(token: &str) -> Option<Self> {
        match token {
            "and" => Some(Connective::And),
            "or" => Some(Connective::Or),
            "not" => Some(Connective::Not),
            _ => None,
        }
    }
}

/// Composed boolean tree over clause slots, built once at compile time and
/// folded per row. Slot `i` is the result of the `i`-th primitive clause.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BoolExpr {
    Slot(usize),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    Not(Box<BoolExpr>),
}

impl BoolExpr {
    /// Left-to-right composition mirroring the method token order: `and` and
    /// `or` join the accumulated tree with the next slot, `not` conjoins with
    /// the negated next slot (`a not b` reads as `a and not b`).
    pub(crate) fn from_connectives(connectives: &[Connective]) -> Self {
        let mut expr = BoolExpr::Slot(0);
        for (i, connective) in connectives.iter().enumerate() {
            let rhs = BoolExpr::Slot(i + 1);
            expr = match connective {
                Connective::And => BoolExpr::And(Box::new(expr), Box::new(rhs)),
                Connective::Or => BoolExpr::Or(Box::new(expr), Box::new(rhs)),
                Connective::Not => {
                    BoolExpr::And(Box::new(expr), Box::new(BoolExpr::Not(Box::new(rhs))))
                }
            };
        }
        expr
    }

    pub(crate) fn eval(&self, slots: &[bool]) -> bool {
        match self {
            BoolExpr::Slot(i) => slots.get(*i).copied().unwrap_or(false),
            BoolExpr::And(a, b) => a.eval(slots) && b.eval(slots),
            BoolExpr::Or(a, b) => a.eval(slots) || b.eval(slots),
            BoolExpr::Not(inner) => !inner.eval(slots),
        }
    }
}

/// Arithmetic expression over row columns.
///
/// Column references resolve through a caller-supplied lookup at evaluation
/// time; a zero divisor anywhere poisons the whole evaluation to `None`, which
/// callers degrade to a zero/false result.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NumExpr {
    Num(f64),
    Column(String),
    Neg(Box<NumExpr>),
    Add(Box<NumExpr>, Box<NumExpr>),
    Sub(Box<NumExpr>, Box<NumExpr>),
    Mul(Box<NumExpr>, Box<NumExpr>),
    Div(Box<NumExpr>, Box<NumExpr>),
}

impl NumExpr {
    pub(crate) fn eval<F>(&self, lookup: &F) -> Option<f64>
    where
        F: Fn(&str) -> f64,
    {
        Some(match self {
            NumExpr::Num(n) => *n,
            NumExpr::Column(name) => lookup(name),
            NumExpr::Neg(inner) => -inner.eval(lookup)?,
            NumExpr::Add(a, b) => a.eval(lookup)? + b.eval(lookup)?,
            NumExpr::Sub(a, b) => a.eval(lookup)? - b.eval(lookup)?,
            NumExpr::Mul(a, b) => a.eval(lookup)? * b.eval(lookup)?,
            NumExpr::Div(a, b) => {
                let divisor = b.eval(lookup)?;
                if divisor == 0.0 {
                    return None;
                }
                a.eval(lookup)? / divisor
            }
        })
    }
}
