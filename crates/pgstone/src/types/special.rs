//! Named special values understood by PostgreSQL input parsing.
//!
//! Each [`SpecialValue`] pairs a literal SQL token (`'Infinity'`, `Now`, ...)
//! with a resolver for the matching native value. The resolver runs on every
//! access, so relative values like `tomorrow` always track the current clock.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use std::fmt;

/// Native (Rust-side) value of a special value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue {
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

/// A special value specific to an SQL type.
#[derive(Clone, Copy)]
pub struct SpecialValue {
    name: &'static str,
    sql: &'static str,
    resolve: fn() -> NativeValue,
}

impl SpecialValue {
    pub const fn new(name: &'static str, sql: &'static str, resolve: fn() -> NativeValue) -> Self {
        Self { name, sql, resolve }
    }

    /// Lookup name, e.g. `"tomorrow"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// SQL literal token, e.g. `Tomorrow` or `'NaN'`.
    pub fn sql(&self) -> &'static str {
        self.sql
    }

    /// Resolve the native value. Evaluated on every call.
    pub fn value(&self) -> NativeValue {
        (self.resolve)()
    }
}

impl fmt::Debug for SpecialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialValue")
            .field("name", &self.name)
            .field("sql", &self.sql)
            .finish()
    }
}

impl fmt::Display for SpecialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql)
    }
}

impl PartialEq for SpecialValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sql == other.sql
    }
}

impl Eq for SpecialValue {}

fn not_a_number() -> NativeValue {
    NativeValue::Float(f64::NAN)
}

fn infinity() -> NativeValue {
    NativeValue::Float(f64::INFINITY)
}

fn negative_infinity() -> NativeValue {
    NativeValue::Float(f64::NEG_INFINITY)
}

fn timestamp_epoch() -> NativeValue {
    NativeValue::DateTime(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
}

fn timestamp_max() -> NativeValue {
    NativeValue::DateTime(NaiveDateTime::MAX)
}

fn timestamp_min() -> NativeValue {
    NativeValue::DateTime(NaiveDateTime::MIN)
}

fn timestamp_now() -> NativeValue {
    NativeValue::DateTime(Local::now().naive_local())
}

fn timestamp_tomorrow() -> NativeValue {
    NativeValue::DateTime(Local::now().naive_local() + TimeDelta::days(1))
}

fn timestamp_yesterday() -> NativeValue {
    NativeValue::DateTime(Local::now().naive_local() - TimeDelta::days(1))
}

fn date_epoch() -> NativeValue {
    NativeValue::Date(DateTime::<Utc>::UNIX_EPOCH.date_naive())
}

fn date_max() -> NativeValue {
    NativeValue::Date(NaiveDate::MAX)
}

fn date_min() -> NativeValue {
    NativeValue::Date(NaiveDate::MIN)
}

fn date_today() -> NativeValue {
    NativeValue::Date(Local::now().date_naive())
}

fn date_tomorrow() -> NativeValue {
    NativeValue::Date(Local::now().date_naive() + TimeDelta::days(1))
}

fn date_yesterday() -> NativeValue {
    NativeValue::Date(Local::now().date_naive() - TimeDelta::days(1))
}

fn time_now() -> NativeValue {
    NativeValue::Time(Local::now().time())
}

fn time_allballs() -> NativeValue {
    NativeValue::Time(NaiveTime::default())
}

pub const NUMERIC_SPECIAL_VALUES: &[SpecialValue] =
    &[SpecialValue::new("not_a_number", "'NaN'", not_a_number)];

pub const FLOAT_SPECIAL_VALUES: &[SpecialValue] = &[
    SpecialValue::new("not_a_number", "'NaN'", not_a_number),
    SpecialValue::new("infinity", "'Infinity'", infinity),
    SpecialValue::new("negative_infinity", "'-Infinity'", negative_infinity),
];

pub const TIMESTAMP_SPECIAL_VALUES: &[SpecialValue] = &[
    SpecialValue::new("epoch", "'Epoch'", timestamp_epoch),
    SpecialValue::new("infinity", "'Infinity'", timestamp_max),
    SpecialValue::new("negative_infinity", "'-Infinity'", timestamp_min),
    SpecialValue::new("now", "Now", timestamp_now),
    SpecialValue::new("today", "Today", timestamp_now),
    SpecialValue::new("tomorrow", "Tomorrow", timestamp_tomorrow),
    SpecialValue::new("yesterday", "Yesterday", timestamp_yesterday),
];

pub const DATE_SPECIAL_VALUES: &[SpecialValue] = &[
    SpecialValue::new("epoch", "'Epoch'", date_epoch),
    SpecialValue::new("infinity", "'Infinity'", date_max),
    SpecialValue::new("negative_infinity", "'-Infinity'", date_min),
    SpecialValue::new("now", "Now", date_today),
    SpecialValue::new("today", "Today", date_today),
    SpecialValue::new("tomorrow", "Tomorrow", date_tomorrow),
    SpecialValue::new("yesterday", "Yesterday", date_yesterday),
];

pub const TIME_SPECIAL_VALUES: &[SpecialValue] = &[
    SpecialValue::new("now", "Now", time_now),
    SpecialValue::new("allballs", "Allballs", time_allballs),
];
