//! Boolean condition primitives for WHERE clauses.
//!
//! [`Comparable`] gives any renderable SQL term (columns, aggregates, values)
//! comparison methods that produce [`Condition`] nodes. Conditions combine with
//! [`Condition::and`] / [`Condition::or`] (or `&` / `|`), and every combination
//! is wrapped in parentheses, so a condition can always be reused inside a
//! larger one without precedence surprises.
//!
//! # Example
//! ```ignore
//! use pgstone::{Comparable, Condition};
//!
//! let cond = a.is(true) | (a.equals(100) & b.ilike("dan"));
//! assert_eq!(cond.sql(), "(t.a IS TRUE OR (t.a = 100 AND t.b ILIKE 'dan'))");
//! ```

use crate::value::Value;
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// A rendered boolean SQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition(String);

impl Condition {
    /// Create a raw SQL condition.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition(sql.into())
    }

    /// The rendered SQL.
    pub fn sql(&self) -> &str {
        &self.0
    }

    /// `({self} AND {other})`
    pub fn and(self, other: impl Into<Condition>) -> Condition {
        Condition(format!("({} AND {})", self.0, other.into().0))
    }

    /// `({self} OR {other})`
    pub fn or(self, other: impl Into<Condition>) -> Condition {
        Condition(format!("({} OR {})", self.0, other.into().0))
    }

    /// Join several conditions into one AND group: `(a AND b AND c)`.
    pub fn all<I, C>(conditions: I) -> Condition
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::join(conditions, " AND ")
    }

    /// Join several conditions into one OR group: `(a OR b OR c)`.
    pub fn any<I, C>(conditions: I) -> Condition
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::join(conditions, " OR ")
    }

    fn join<I, C>(conditions: I, sep: &str) -> Condition
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        let parts: Vec<String> = conditions.into_iter().map(|c| c.into().0).collect();
        Condition(format!("({})", parts.join(sep)))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::raw(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::raw(sql)
    }
}

impl PartialEq<&str> for Condition {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<C: Into<Condition>> BitAnd<C> for Condition {
    type Output = Condition;

    fn bitand(self, rhs: C) -> Condition {
        self.and(rhs)
    }
}

impl<C: Into<Condition>> BitOr<C> for Condition {
    type Output = Condition;

    fn bitor(self, rhs: C) -> Condition {
        self.or(rhs)
    }
}

fn binary(left: &dyn fmt::Display, operator: &str, right: Value) -> Condition {
    Condition(format!("{left} {operator} {right}"))
}

/// Comparison operators for any renderable SQL term.
///
/// The left side renders through `Display`; the right side follows the
/// [`Value`] literal rule.
pub trait Comparable: fmt::Display {
    /// `self < value`
    fn less_than(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "<", value.into())
    }

    /// `self <= value`
    fn less_or_equal(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "<=", value.into())
    }

    /// `self = value`
    fn equals(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "=", value.into())
    }

    /// `self <> value`
    fn not_equals(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "<>", value.into())
    }

    /// `self > value`
    fn greater_than(&self, value: impl Into<Value>) -> Condition {
        binary(&self, ">", value.into())
    }

    /// `self >= value`
    fn greater_or_equal(&self, value: impl Into<Value>) -> Condition {
        binary(&self, ">=", value.into())
    }

    /// `self LIKE pattern`
    fn like(&self, pattern: impl Into<Value>) -> Condition {
        binary(&self, "LIKE", pattern.into())
    }

    /// `self NOT LIKE pattern`
    fn not_like(&self, pattern: impl Into<Value>) -> Condition {
        binary(&self, "NOT LIKE", pattern.into())
    }

    /// `self ILIKE pattern` (case-insensitive)
    fn ilike(&self, pattern: impl Into<Value>) -> Condition {
        binary(&self, "ILIKE", pattern.into())
    }

    /// `self NOT ILIKE pattern` (case-insensitive)
    fn not_ilike(&self, pattern: impl Into<Value>) -> Condition {
        binary(&self, "NOT ILIKE", pattern.into())
    }

    /// `self BETWEEN from AND to`
    fn between(&self, from: impl Into<Value>, to: impl Into<Value>) -> Condition {
        Condition(format!("{self} BETWEEN {} AND {}", from.into(), to.into()))
    }

    /// `self NOT BETWEEN from AND to`
    fn not_between(&self, from: impl Into<Value>, to: impl Into<Value>) -> Condition {
        Condition(format!("{self} NOT BETWEEN {} AND {}", from.into(), to.into()))
    }

    /// `self IS value`
    fn is(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "IS", value.into())
    }

    /// `self IS NOT value`
    fn is_not(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "IS NOT", value.into())
    }

    /// `self IN value`; lists render as `(a, b, ...)`.
    fn is_in(&self, value: impl Into<Value>) -> Condition {
        binary(&self, "IN", value.into())
    }
}

impl Comparable for Value {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_operators() {
        let hundred = Value::from(100);
        assert_eq!(hundred.less_than(500), "100 < 500");
        assert_eq!(hundred.less_or_equal(500), "100 <= 500");
        assert_eq!(hundred.equals(500), "100 = 500");
        assert_eq!(hundred.not_equals(500), "100 <> 500");
        assert_eq!(hundred.greater_or_equal(500), "100 >= 500");
        assert_eq!(hundred.greater_than(500), "100 > 500");
        assert_eq!(hundred.between(0, 500), "100 BETWEEN 0 AND 500");
        assert_eq!(hundred.not_between(0, 500), "100 NOT BETWEEN 0 AND 500");
    }

    #[test]
    fn test_text_operators() {
        let example = Value::from("example_text");
        assert_eq!(example.like("something"), "'example_text' LIKE 'something'");
        assert_eq!(example.not_like("something"), "'example_text' NOT LIKE 'something'");
        assert_eq!(example.ilike("something"), "'example_text' ILIKE 'something'");
        assert_eq!(example.not_ilike("something"), "'example_text' NOT ILIKE 'something'");
        assert_eq!(example.is("something"), "'example_text' IS 'something'");
        assert_eq!(example.is_not("something"), "'example_text' IS NOT 'something'");
        assert_eq!(example.is_in(vec!["a", "b"]), "'example_text' IN ('a', 'b')");
        assert_eq!(example.is_not(Value::Null), "'example_text' IS NOT NULL");
    }

    #[test]
    fn test_and_or_always_parenthesize() {
        let a = Condition::raw("a = 1");
        let b = Condition::raw("b = 2");
        let c = Condition::raw("c = 3");
        assert_eq!(a.clone().and(b.clone()), "(a = 1 AND b = 2)");
        assert_eq!(a.clone().or(b.clone()), "(a = 1 OR b = 2)");
        assert_eq!(
            a.clone().and(b.clone()).and(c.clone()),
            "((a = 1 AND b = 2) AND c = 3)"
        );
        assert_eq!(
            a.clone() | (b.clone() & c.clone()),
            "(a = 1 OR (b = 2 AND c = 3))"
        );
    }

    #[test]
    fn test_joined_groups() {
        assert_eq!(Condition::all(["a", "b", "c"]), "(a AND b AND c)");
        assert_eq!(Condition::any(["a", "b"]), "(a OR b)");
    }

    #[test]
    fn test_equality_is_textual() {
        assert_eq!(Condition::raw("x IS NULL"), Condition::from("x IS NULL".to_string()));
        assert_ne!(Condition::raw("x IS NULL"), Condition::raw("(x IS NULL)"));
    }
}
