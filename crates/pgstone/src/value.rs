//! SQL values: literal rendering and positional parameter binding.
//!
//! A [`Value`] is both the right-hand side of a comparison (rendered inline
//! through its `Display` impl) and a positional statement argument (bound as
//! `$n` through [`ToSql`]).
//!
//! Literal rule:
//! - `Null` renders bare `NULL`
//! - text is single-quoted, embedded quotes doubled
//! - booleans render `TRUE` / `FALSE`
//! - lists render `(a, b, ...)` with each item following the same rule
//! - expressions (columns, aggregates, special values) render as-is
//! - everything else uses its default text form

use crate::types::SpecialValue;
use bytes::BytesMut;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A value usable in conditions, defaults and statement arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
    List(Vec<Value>),
    /// Pre-rendered SQL expression, never quoted.
    Expr(String),
}

impl Value {
    /// Wrap a pre-rendered SQL expression.
    pub fn expr(sql: impl Into<String>) -> Self {
        Value::Expr(sql.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Json(v) => write!(f, "'{}'", v.to_string().replace('\'', "''")),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Expr(sql) => f.write_str(sql),
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<SpecialValue> for Value {
    fn from(v: SpecialValue) -> Self {
        Value::Expr(v.sql().to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Every arm goes through the inner value's `to_sql_checked`, so a value bound
/// to a parameter of an incompatible type fails with `WrongType` instead of
/// sending another type's encoding.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Int(i) => {
                if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql_checked(ty, out)
                } else {
                    i.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(s) | Value::Expr(s) => s.as_str().to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::List(items) => items.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_postgres::types::WrongType;

    #[test]
    fn test_literal_rule() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(true).to_string(), "TRUE");
        assert_eq!(Value::from(false).to_string(), "FALSE");
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from("testing_value").to_string(), "'testing_value'");
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::from(None::<i32>).to_string(), "NULL");
        assert_eq!(Value::expr("now()").to_string(), "now()");
    }

    #[test]
    fn test_lists_quote_each_item() {
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "(1, 2, 3)");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "('a', 'b')");
    }

    #[test]
    fn test_special_values_render_bare() {
        let now = crate::SqlType::Date.special_value("now").unwrap();
        assert_eq!(Value::from(now).to_string(), "Now");
    }

    fn bind(value: Value, ty: &Type) -> Result<BytesMut, Box<dyn Error + Sync + Send>> {
        let mut out = BytesMut::new();
        value.to_sql_checked(ty, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_bind_matching_types() {
        assert_eq!(&bind(Value::from(7), &Type::INT4).unwrap()[..], &7i32.to_be_bytes());
        assert_eq!(&bind(Value::from(7), &Type::INT8).unwrap()[..], &7i64.to_be_bytes());
        assert_eq!(&bind(Value::from("abcd"), &Type::TEXT).unwrap()[..], b"abcd");
        assert_eq!(&bind(Value::from(true), &Type::BOOL).unwrap()[..], &[1]);
        assert!(bind(Value::Null, &Type::INT4).unwrap().is_empty());
    }

    #[test]
    fn test_bind_rejects_mismatched_types() {
        let err = bind(Value::from("abcd"), &Type::INT4).unwrap_err();
        assert!(err.is::<WrongType>());
        let err = bind(Value::from(7), &Type::TEXT).unwrap_err();
        assert!(err.is::<WrongType>());
        assert!(bind(Value::from(true), &Type::INT8).is_err());
        assert!(bind(Value::from(vec![1, 2]), &Type::TEXT).is_err());
    }

    #[test]
    fn test_bind_rejects_out_of_range_ints() {
        assert!(bind(Value::from(70_000), &Type::INT2).is_err());
    }
}
