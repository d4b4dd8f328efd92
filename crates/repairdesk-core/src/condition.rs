//! # Conditions
//!
//! A narrow WHERE-clause type for update and delete: a conjunction of
//! `column <op> value` predicates. The database layer quotes the columns and
//! binds the values, so nothing a caller types reaches SQL verbatim.
//!
//! ## Text Form
//! ```text
//!   ItemID=1
//!   Status = 'In Progress' AND Price >= 100
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConditionError;
use crate::types::Value;

/// Comparison operators a predicate may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

// Two-character tokens first so "<=" is not read as "<".
const OPERATOR_TOKENS: [(&str, Operator); 7] = [
    ("<=", Operator::Le),
    (">=", Operator::Ge),
    ("!=", Operator::Ne),
    ("<>", Operator::Ne),
    ("=", Operator::Eq),
    ("<", Operator::Lt),
    (">", Operator::Gt),
];

/// `column <op> value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: Operator,
    pub value: Value,
}

/// All predicates must hold (AND).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub predicates: Vec<Predicate>,
}

impl Condition {
    /// Starts a condition with a single equality.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::default().and(column, Operator::Eq, value)
    }

    /// Adds another predicate.
    pub fn and(mut self, column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{} {} {}", p.column, p.op.as_sql(), p.value)?;
        }
        Ok(())
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut condition = Condition::default();
        for fragment in split_and(s) {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            condition.predicates.push(parse_predicate(fragment)?);
        }
        Ok(condition)
    }
}

/// Splits on the keyword AND (any case) outside of quotes.
fn split_and(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => quote = Some(b),
            None => {
                let at_word_start = i == 0 || bytes[i - 1].is_ascii_whitespace();
                let is_and = bytes.len() >= i + 3 && bytes[i..i + 3].eq_ignore_ascii_case(b"AND");
                let at_word_end = bytes.get(i + 3).map_or(true, |c| c.is_ascii_whitespace());
                if at_word_start && is_and && at_word_end {
                    parts.push(&s[start..i]);
                    start = i + 3;
                    i += 3;
                    continue;
                }
            }
        }
        i += 1;
    }
    parts.push(&s[start..]);
    parts
}

fn parse_predicate(fragment: &str) -> Result<Predicate, ConditionError> {
    // Leftmost operator; at equal positions the longer token wins.
    let (pos, token, op) = OPERATOR_TOKENS
        .iter()
        .filter_map(|(token, op)| fragment.find(token).map(|pos| (pos, *token, *op)))
        .min_by_key(|(pos, token, _)| (*pos, std::cmp::Reverse(token.len())))
        .ok_or_else(|| ConditionError::MissingOperator(fragment.to_string()))?;

    let column = fragment[..pos].trim();
    let raw_value = fragment[pos + token.len()..].trim();

    if column.is_empty() {
        return Err(ConditionError::EmptyColumn(fragment.to_string()));
    }
    if raw_value.is_empty() {
        return Err(ConditionError::EmptyValue(fragment.to_string()));
    }

    Ok(Predicate {
        column: column.to_string(),
        op,
        value: parse_literal(raw_value),
    })
}

/// Quoted literals lose their quotes (`''` unescapes to `'`); everything
/// else stays text and is coerced against the column type later.
fn parse_literal(raw: &str) -> Value {
    for quote in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            let inner = &raw[1..raw.len() - 1];
            let doubled = format!("{quote}{quote}");
            return Value::Text(inner.replace(&doubled, &quote.to_string()));
        }
    }
    if raw.eq_ignore_ascii_case("NULL") {
        return Value::Null;
    }
    Value::Text(raw.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
