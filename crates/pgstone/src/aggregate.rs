//! Aggregate function expressions.
//!
//! ```ignore
//! use pgstone::{Aggregate, Comparable};
//!
//! let mut total = Aggregate::sum(&price).distinct();
//! assert_eq!(total.as_("total"), "sum(DISTINCT public.items.price) AS total");
//! assert_eq!(total.greater_than(100), "total > 100");
//! ```

use crate::column::Column;
use crate::condition::Comparable;
use crate::table::Table;
use crate::value::Value;
use std::fmt;

/// Aggregate function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Avg,
    BitAnd,
    BitOr,
    BoolAnd,
    BoolOr,
    Count,
    Max,
    Min,
    Sum,
    /// Any other aggregate, rendered by name.
    Other(String),
}

impl AggregateFunction {
    pub fn name(&self) -> &str {
        match self {
            AggregateFunction::Avg => "avg",
            AggregateFunction::BitAnd => "bit_and",
            AggregateFunction::BitOr => "bit_or",
            AggregateFunction::BoolAnd => "bool_and",
            AggregateFunction::BoolOr => "bool_or",
            AggregateFunction::Count => "count",
            AggregateFunction::Max => "max",
            AggregateFunction::Min => "min",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Other(name) => name,
        }
    }
}

/// What an aggregate runs over.
#[derive(Debug, Clone)]
pub enum AggregateTarget {
    /// `*`
    All,
    Column(Column),
    /// `schema.table.*`
    Table(Table),
    Raw(String),
}

impl AggregateTarget {
    fn sql(&self) -> String {
        match self {
            AggregateTarget::All => "*".to_string(),
            AggregateTarget::Column(column) => column.full_name(),
            AggregateTarget::Table(table) => format!("{}.*", table.full_name()),
            AggregateTarget::Raw(sql) => sql.clone(),
        }
    }
}

impl From<&Column> for AggregateTarget {
    fn from(column: &Column) -> Self {
        AggregateTarget::Column(column.clone())
    }
}

impl From<Column> for AggregateTarget {
    fn from(column: Column) -> Self {
        AggregateTarget::Column(column)
    }
}

impl From<&Table> for AggregateTarget {
    fn from(table: &Table) -> Self {
        AggregateTarget::Table(table.clone())
    }
}

impl From<&str> for AggregateTarget {
    fn from(sql: &str) -> Self {
        AggregateTarget::Raw(sql.to_string())
    }
}

impl From<String> for AggregateTarget {
    fn from(sql: String) -> Self {
        AggregateTarget::Raw(sql)
    }
}

/// An aggregate function call, optionally DISTINCT and aliased.
#[derive(Debug, Clone)]
pub struct Aggregate {
    function: AggregateFunction,
    target: AggregateTarget,
    distinct: bool,
    alias: Option<String>,
}

impl Aggregate {
    pub fn new(function: AggregateFunction, target: impl Into<AggregateTarget>) -> Self {
        Self {
            function,
            target: target.into(),
            distinct: false,
            alias: None,
        }
    }

    /// Any aggregate by function name, e.g. `string_agg`.
    pub fn function(name: impl Into<String>, target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::Other(name.into()), target)
    }

    pub fn avg(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::Avg, target)
    }

    pub fn bit_and(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::BitAnd, target)
    }

    pub fn bit_or(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::BitOr, target)
    }

    pub fn bool_and(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::BoolAnd, target)
    }

    pub fn bool_or(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::BoolOr, target)
    }

    pub fn count(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::Count, target)
    }

    /// `count(*)`
    pub fn count_all() -> Self {
        Self::new(AggregateFunction::Count, AggregateTarget::All)
    }

    pub fn max(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::Max, target)
    }

    pub fn min(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::Min, target)
    }

    pub fn sum(target: impl Into<AggregateTarget>) -> Self {
        Self::new(AggregateFunction::Sum, target)
    }

    /// Aggregate over distinct input values only.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Alias the aggregate and return its select-list entry.
    ///
    /// Afterwards `Display` (and therefore every comparison) uses the alias.
    pub fn as_(&mut self, alias: impl Into<String>) -> String {
        self.alias = Some(alias.into());
        self.sql()
    }

    /// Owned variant of [`as_`](Self::as_).
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn aggregate_function(&self) -> &AggregateFunction {
        &self.function
    }

    pub fn target(&self) -> &AggregateTarget {
        &self.target
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// The call without its alias: `fn([DISTINCT ]target)`.
    pub fn expression(&self) -> String {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        format!("{}({distinct}{})", self.function.name(), self.target.sql())
    }

    /// Select-list entry: the expression followed by `AS alias` when aliased.
    pub fn sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {alias}", self.expression()),
            None => self.expression(),
        }
    }

    /// The table whose rows this aggregate reads, if known.
    pub fn table(&self) -> Option<Table> {
        match &self.target {
            AggregateTarget::Column(column) => column.table(),
            AggregateTarget::Table(table) => Some(table.clone()),
            AggregateTarget::All | AggregateTarget::Raw(_) => None,
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => f.write_str(alias),
            None => f.write_str(&self.expression()),
        }
    }
}

impl PartialEq for Aggregate {
    fn eq(&self, other: &Self) -> bool {
        self.sql() == other.sql()
    }
}

impl Comparable for Aggregate {}

impl From<&Aggregate> for Value {
    fn from(aggregate: &Aggregate) -> Self {
        Value::Expr(aggregate.to_string())
    }
}

impl From<Aggregate> for Value {
    fn from(aggregate: Aggregate) -> Self {
        Value::from(&aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::types::SqlType;

    #[test]
    fn test_count_all_and_raw_targets() {
        assert_eq!(Aggregate::count_all().sql(), "count(*)");
        assert_eq!(Aggregate::max("price * qty").sql(), "max(price * qty)");
        assert_eq!(
            Aggregate::function("string_agg", "name, ','").sql(),
            "string_agg(name, ',')"
        );
    }

    #[test]
    fn test_table_and_column_targets() {
        let db = Database::new("aggregate_tests");
        let table = db.table("t");
        let x = table.add_column("x", SqlType::Integer, []);

        assert_eq!(Aggregate::count(&table).sql(), "count(public.t.*)");
        assert_eq!(Aggregate::sum(&x).sql(), "sum(public.t.x)");
        assert_eq!(Aggregate::count(&x).distinct().sql(), "count(DISTINCT public.t.x)");
        assert_eq!(Aggregate::count(&x).table(), Some(table.clone()));
        assert_eq!(Aggregate::count_all().table(), None);
    }

    #[test]
    fn test_alias_shadows_expression() {
        let mut agg = Aggregate::avg("score");
        assert_eq!(agg.to_string(), "avg(score)");
        assert_eq!(agg.as_("test_alias"), "avg(score) AS test_alias");
        assert_eq!(agg.to_string(), "test_alias");
        assert_eq!(agg.expression(), "avg(score)");
        assert_eq!(agg.greater_or_equal(3), "test_alias >= 3");
        assert_eq!(agg.as_("other"), "avg(score) AS other");
    }

    #[test]
    fn test_comparisons_without_alias_use_expression() {
        let agg = Aggregate::count_all();
        assert_eq!(agg.greater_than(0), "count(*) > 0");
        let cond = Value::from(10).less_than(&agg);
        assert_eq!(cond, "10 < count(*)");
    }
}
