//! PostgreSQL data types used in column definitions.
//!
//! [`SqlType`] values render to their DDL keyword (`INTEGER`, `NUMERIC(10, 2)`,
//! `TEXT[]`, ...). Two types are equal when they render the same SQL, so the
//! plain variant `SqlType::Numeric(None)` and `SqlType::numeric(2, 0)` differ,
//! while two separately built `SqlType::Text` values are interchangeable.
//!
//! # Example
//! ```ignore
//! use pgstone::SqlType;
//!
//! assert_eq!(SqlType::numeric(10, 2).sql(), "NUMERIC(10, 2)");
//! assert_eq!(SqlType::array(SqlType::Integer).sql(), "INTEGER[]");
//! assert_eq!(SqlType::Date.special_value("tomorrow").unwrap().sql(), "Tomorrow");
//! ```

mod special;

pub use special::{
    DATE_SPECIAL_VALUES, FLOAT_SPECIAL_VALUES, NUMERIC_SPECIAL_VALUES, NativeValue, SpecialValue,
    TIME_SPECIAL_VALUES, TIMESTAMP_SPECIAL_VALUES,
};

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Category of Rust value a column of a given type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Integer,
    Decimal,
    Float,
    Text,
    Bytes,
    DateTime,
    Date,
    Time,
    Interval,
    Boolean,
    Json,
    Array,
}

/// Precision and scale of a fixed-point numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub precision: u32,
    pub scale: u32,
}

/// A PostgreSQL data type.
#[derive(Debug, Clone)]
pub enum SqlType {
    /// 4-byte whole number.
    Integer,
    /// 2-byte whole number.
    SmallInteger,
    /// 8-byte whole number.
    BigInteger,
    /// 4-byte auto-incrementing number.
    Serial,
    /// 2-byte auto-incrementing number.
    SmallSerial,
    /// 8-byte auto-incrementing number.
    BigSerial,
    /// Exact decimal, optionally with precision and scale.
    Numeric(Option<Precision>),
    /// Exact decimal (`DECIMAL` spelling), optionally with precision and scale.
    Decimal(Option<Precision>),
    /// 4-byte inexact floating point.
    Real,
    /// 8-byte inexact floating point.
    DoublePrecision,
    /// Currency amount.
    Money,
    /// Variable unlimited string.
    Text,
    /// Variable unlimited binary string.
    ByteA,
    /// Timezone naive datetime, optional fractional-second precision.
    Timestamp(Option<u32>),
    /// Timezone aware datetime, optional fractional-second precision.
    TimestampTz(Option<u32>),
    Date,
    /// Timezone naive time of day, optional fractional-second precision.
    Time(Option<u32>),
    Interval(Option<u32>),
    Boolean,
    Json,
    Jsonb,
    /// Array of another type; `size: None` is variable length.
    Array {
        element: Box<SqlType>,
        size: Option<u32>,
    },
}

impl SqlType {
    /// `NUMERIC(precision, scale)`.
    pub fn numeric(precision: u32, scale: u32) -> Self {
        SqlType::Numeric(Some(Precision { precision, scale }))
    }

    /// `DECIMAL(precision, scale)`.
    pub fn decimal(precision: u32, scale: u32) -> Self {
        SqlType::Decimal(Some(Precision { precision, scale }))
    }

    /// `TIMESTAMP(precision)`.
    pub fn timestamp(precision: u32) -> Self {
        SqlType::Timestamp(Some(precision))
    }

    /// `TIMESTAMP(precision) WITH TIME ZONE`.
    pub fn timestamptz(precision: u32) -> Self {
        SqlType::TimestampTz(Some(precision))
    }

    /// `TIME(precision)`.
    pub fn time(precision: u32) -> Self {
        SqlType::Time(Some(precision))
    }

    /// `INTERVAL(precision)`.
    pub fn interval(precision: u32) -> Self {
        SqlType::Interval(Some(precision))
    }

    /// Variable length array: `<element>[]`.
    pub fn array(element: SqlType) -> Self {
        SqlType::Array {
            element: Box::new(element),
            size: None,
        }
    }

    /// Fixed length array: `<element>[size]`.
    pub fn array_sized(element: SqlType, size: u32) -> Self {
        SqlType::Array {
            element: Box::new(element),
            size: Some(size),
        }
    }

    /// Render the type as used in a column definition.
    pub fn sql(&self) -> Cow<'static, str> {
        match self {
            SqlType::Integer => Cow::Borrowed("INTEGER"),
            SqlType::SmallInteger => Cow::Borrowed("SMALLINT"),
            SqlType::BigInteger => Cow::Borrowed("BIGINT"),
            SqlType::Serial => Cow::Borrowed("SERIAL"),
            SqlType::SmallSerial => Cow::Borrowed("SMALLSERIAL"),
            SqlType::BigSerial => Cow::Borrowed("BIGSERIAL"),
            SqlType::Numeric(p) => with_precision("NUMERIC", p),
            SqlType::Decimal(p) => with_precision("DECIMAL", p),
            SqlType::Real => Cow::Borrowed("REAL"),
            SqlType::DoublePrecision => Cow::Borrowed("DOUBLE PRECISION"),
            SqlType::Money => Cow::Borrowed("MONEY"),
            SqlType::Text => Cow::Borrowed("TEXT"),
            SqlType::ByteA => Cow::Borrowed("BYTEA"),
            SqlType::Timestamp(None) => Cow::Borrowed("TIMESTAMP"),
            SqlType::Timestamp(Some(p)) => Cow::Owned(format!("TIMESTAMP({p})")),
            SqlType::TimestampTz(None) => Cow::Borrowed("TIMESTAMP WITH TIME ZONE"),
            SqlType::TimestampTz(Some(p)) => Cow::Owned(format!("TIMESTAMP({p}) WITH TIME ZONE")),
            SqlType::Date => Cow::Borrowed("DATE"),
            SqlType::Time(None) => Cow::Borrowed("TIME"),
            SqlType::Time(Some(p)) => Cow::Owned(format!("TIME({p})")),
            SqlType::Interval(None) => Cow::Borrowed("INTERVAL"),
            SqlType::Interval(Some(p)) => Cow::Owned(format!("INTERVAL({p})")),
            SqlType::Boolean => Cow::Borrowed("BOOLEAN"),
            SqlType::Json => Cow::Borrowed("JSON"),
            SqlType::Jsonb => Cow::Borrowed("JSONB"),
            SqlType::Array { element, size } => match size {
                Some(n) => Cow::Owned(format!("{}[{n}]", element.sql())),
                None => Cow::Owned(format!("{}[]", element.sql())),
            },
        }
    }

    /// The category of native value this type holds.
    pub fn native(&self) -> NativeKind {
        match self {
            SqlType::Integer
            | SqlType::SmallInteger
            | SqlType::BigInteger
            | SqlType::Serial
            | SqlType::SmallSerial
            | SqlType::BigSerial => NativeKind::Integer,
            SqlType::Numeric(_) | SqlType::Decimal(_) => NativeKind::Decimal,
            SqlType::Real | SqlType::DoublePrecision => NativeKind::Float,
            SqlType::Money | SqlType::Text => NativeKind::Text,
            SqlType::ByteA => NativeKind::Bytes,
            SqlType::Timestamp(_) | SqlType::TimestampTz(_) => NativeKind::DateTime,
            SqlType::Date => NativeKind::Date,
            SqlType::Time(_) => NativeKind::Time,
            SqlType::Interval(_) => NativeKind::Interval,
            SqlType::Boolean => NativeKind::Boolean,
            SqlType::Json | SqlType::Jsonb => NativeKind::Json,
            SqlType::Array { .. } => NativeKind::Array,
        }
    }

    /// Special values accepted by this type.
    pub fn special_values(&self) -> &'static [SpecialValue] {
        match self {
            SqlType::Numeric(_) | SqlType::Decimal(_) => NUMERIC_SPECIAL_VALUES,
            SqlType::Real | SqlType::DoublePrecision => FLOAT_SPECIAL_VALUES,
            SqlType::Timestamp(_) | SqlType::TimestampTz(_) => TIMESTAMP_SPECIAL_VALUES,
            SqlType::Date => DATE_SPECIAL_VALUES,
            SqlType::Time(_) => TIME_SPECIAL_VALUES,
            _ => &[],
        }
    }

    /// Look up a special value by name (`"epoch"`, `"tomorrow"`, `"not_a_number"`, ...).
    pub fn special_value(&self, name: &str) -> Option<SpecialValue> {
        self.special_values()
            .iter()
            .find(|v| v.name() == name)
            .copied()
    }
}

fn with_precision(keyword: &'static str, precision: &Option<Precision>) -> Cow<'static, str> {
    match precision {
        Some(Precision { precision, scale }) => {
            Cow::Owned(format!("{keyword}({precision}, {scale})"))
        }
        None => Cow::Borrowed(keyword),
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

impl PartialEq for SqlType {
    fn eq(&self, other: &Self) -> bool {
        self.sql() == other.sql()
    }
}

impl Eq for SqlType {}

impl Hash for SqlType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sql().hash(state);
    }
}
