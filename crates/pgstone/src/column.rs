//! Table columns.
//!
//! A [`Column`] is a plain value: a name, a SQL type, an ordered set of
//! constraints and an optional default. Binding it to a table (through
//! [`Table::add_columns`](crate::Table::add_columns)) gives it a qualified name
//! `schema.table.column`. The table is referenced weakly, so a column never
//! keeps its table alive.
//!
//! Aliases and sort/group modifiers live on the value itself. Reading a column
//! from a table returns a fresh copy, so aliasing or sorting one copy never
//! leaks into other statements using the same column.
//!
//! # Example
//! ```ignore
//! use pgstone::{Column, Comparable, SqlType, NOT_NULL};
//!
//! let users = db.table("users");
//! users.add_columns([Column::new("name", SqlType::Text).constraint(NOT_NULL)]);
//!
//! let mut name = users.column("name")?;
//! assert_eq!(name.full_name(), "public.users.name");
//! assert_eq!(name.as_("username"), "public.users.name AS username");
//! assert_eq!(name.ilike("dan%"), "username ILIKE 'dan%'");
//! ```

use crate::aggregate::{Aggregate, AggregateFunction};
use crate::condition::Comparable;
use crate::constraints::Constraint;
use crate::error::{DbError, DbResult};
use crate::table::{Table, TableInner};
use crate::types::SqlType;
use crate::value::Value;
use std::fmt;
use std::sync::Weak;

/// Sort direction modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A column definition, optionally bound to a table.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    sql_type: SqlType,
    constraints: Vec<Constraint>,
    default: Option<Value>,
    alias: Option<String>,
    table: Option<Weak<TableInner>>,
    sort: Option<SortDirection>,
    grouped: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            constraints: Vec::new(),
            default: None,
            alias: None,
            table: None,
            sort: None,
            grouped: false,
        }
    }

    /// Add a constraint. Duplicates are ignored; order of first insertion is kept.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.push_constraint(constraint);
        self
    }

    /// Add several constraints.
    pub fn constraints<I>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        for constraint in constraints {
            self.push_constraint(constraint);
        }
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn push_constraint(&mut self, constraint: Constraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    /// Base name, without table qualification or alias.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }

    pub fn constraint_list(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The default value.
    ///
    /// Fails with [`DbError::Configuration`] when no default was set.
    pub fn default(&self) -> DbResult<&Value> {
        self.default.as_ref().ok_or_else(|| {
            DbError::configuration(format!("Column '{}' has no default value set.", self.name))
        })
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The owning table, if bound and still alive.
    pub fn table(&self) -> Option<Table> {
        self.table
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Table::from_inner)
    }

    pub(crate) fn bind(&mut self, table: Weak<TableInner>) {
        self.table = Some(table);
    }

    /// `schema.table.column` when bound, the bare name otherwise. Ignores the alias.
    pub fn qualified_name(&self) -> String {
        match self.table() {
            Some(table) => format!("{}.{}", table.full_name(), self.name),
            None => self.name.clone(),
        }
    }

    /// The name used to reference this column in expressions: the alias when
    /// one is set, the qualified name otherwise.
    pub fn full_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.qualified_name(),
        }
    }

    /// Alias this column and return the select-list entry `qualified AS alias`.
    ///
    /// Afterwards [`full_name`](Self::full_name) (and `Display`) yield the alias.
    pub fn as_(&mut self, alias: impl Into<String>) -> String {
        let alias = alias.into();
        let entry = format!("{} AS {alias}", self.qualified_name());
        self.alias = Some(alias);
        entry
    }

    /// Owned variant of [`as_`](Self::as_).
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.as_(alias);
        self
    }

    /// Column definition for `CREATE TABLE`: `name type [constraints...]`.
    pub fn definition(&self) -> String {
        let mut parts = vec![self.name.clone(), self.sql_type.sql().into_owned()];
        parts.extend(self.constraints.iter().map(Constraint::sql));
        parts.join(" ")
    }

    // ── Modifiers ────────────────────────────────────────────────────────────

    pub fn asc(&mut self) -> &mut Self {
        self.sort = Some(SortDirection::Asc);
        self
    }

    pub fn desc(&mut self) -> &mut Self {
        self.sort = Some(SortDirection::Desc);
        self
    }

    pub fn grouped(&mut self) -> &mut Self {
        self.grouped = true;
        self
    }

    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Clear the sort and group modifiers.
    pub fn reset_modifiers(&mut self) -> &mut Self {
        self.sort = None;
        self.grouped = false;
        self
    }

    // ── Aggregate shortcuts ──────────────────────────────────────────────────

    fn aggregate(&self, function: AggregateFunction) -> Aggregate {
        let alias = format!("{}_{}", self.name, function.name());
        Aggregate::new(function, self).aliased(alias)
    }

    /// `avg(col) AS col_avg`
    pub fn avg(&self) -> Aggregate {
        self.aggregate(AggregateFunction::Avg)
    }

    /// `bit_and(col) AS col_bit_and`
    pub fn bit_and(&self) -> Aggregate {
        self.aggregate(AggregateFunction::BitAnd)
    }

    /// `bit_or(col) AS col_bit_or`
    pub fn bit_or(&self) -> Aggregate {
        self.aggregate(AggregateFunction::BitOr)
    }

    /// `bool_and(col) AS col_bool_and`
    pub fn bool_and(&self) -> Aggregate {
        self.aggregate(AggregateFunction::BoolAnd)
    }

    /// `bool_or(col) AS col_bool_or`
    pub fn bool_or(&self) -> Aggregate {
        self.aggregate(AggregateFunction::BoolOr)
    }

    /// `count(col) AS col_count`
    pub fn count(&self) -> Aggregate {
        self.aggregate(AggregateFunction::Count)
    }

    /// `max(col) AS col_max`
    pub fn max(&self) -> Aggregate {
        self.aggregate(AggregateFunction::Max)
    }

    /// `min(col) AS col_min`
    pub fn min(&self) -> Aggregate {
        self.aggregate(AggregateFunction::Min)
    }

    /// `sum(col) AS col_sum`
    pub fn sum(&self) -> Aggregate {
        self.aggregate(AggregateFunction::Sum)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Identity is name, type, binding and alias. Modifiers are ignored.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name() == other.qualified_name()
            && self.alias == other.alias
            && self.sql_type == other.sql_type
    }
}

impl Comparable for Column {}

impl From<&Column> for Value {
    fn from(column: &Column) -> Self {
        Value::Expr(column.full_name())
    }
}

impl From<Column> for Value {
    fn from(column: Column) -> Self {
        Value::from(&column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{NOT_NULL, PRIMARY_KEY, UNIQUE};
    use crate::database::Database;

    /// Columns only reference their table weakly; the database handle keeps it alive.
    fn bound(name: &str, sql_type: SqlType) -> (Database, Column) {
        let db = Database::new("column_tests");
        let table = db.table("test_table");
        table.add_columns([Column::new(name, sql_type)]);
        let column = table.column(name).unwrap();
        (db, column)
    }

    #[test]
    fn test_unbound_names() {
        let col = Column::new("test_col", SqlType::Integer);
        assert_eq!(col.name(), "test_col");
        assert_eq!(col.full_name(), "test_col");
        assert_eq!(col.to_string(), "test_col");
        assert!(col.table().is_none());
    }

    #[test]
    fn test_bound_names_are_qualified() {
        let (_db, col) = bound("test_col", SqlType::Integer);
        assert_eq!(col.full_name(), "public.test_table.test_col");
        assert_eq!(col.name(), "test_col");
    }

    #[test]
    fn test_definition() {
        let col = Column::new("id", SqlType::Serial).constraint(PRIMARY_KEY);
        assert_eq!(col.definition(), "id SERIAL PRIMARY KEY");

        let col = Column::new("name", SqlType::Text).constraints([NOT_NULL, UNIQUE, NOT_NULL]);
        assert_eq!(col.definition(), "name TEXT NOT NULL UNIQUE");
        assert_eq!(col.constraint_list().len(), 2);
    }

    #[test]
    fn test_default_must_be_set() {
        let col = Column::new("n", SqlType::Integer);
        assert!(col.default().unwrap_err().is_configuration());

        let col = col.default_value(5);
        assert_eq!(col.default().unwrap(), &Value::Int(5));
    }

    #[test]
    fn test_alias_applies_to_the_copy_only() {
        let (_db, original) = bound("test_col", SqlType::Text);
        let mut aliased = original.clone();
        assert_eq!(aliased.as_("test"), "public.test_table.test_col AS test");
        assert_eq!(aliased.full_name(), "test");
        assert_eq!(aliased.qualified_name(), "public.test_table.test_col");
        assert_eq!(original.full_name(), "public.test_table.test_col");

        assert_eq!(aliased.as_("other"), "public.test_table.test_col AS other");
    }

    #[test]
    fn test_comparisons_use_full_name() {
        let (_db, col) = bound("test_col", SqlType::Integer);
        assert_eq!(col.equals(5), "public.test_table.test_col = 5");
        assert_eq!(col.is(Value::Null), "public.test_table.test_col IS NULL");

        let other = col.table().unwrap().add_column("other", SqlType::Integer, []);
        assert_eq!(
            col.greater_than(&other),
            "public.test_table.test_col > public.test_table.other"
        );
    }

    #[test]
    fn test_modifiers() {
        let mut col = Column::new("c", SqlType::Integer);
        col.asc().grouped();
        assert_eq!(col.sort_direction(), Some(SortDirection::Asc));
        assert!(col.is_grouped());

        col.desc();
        assert_eq!(col.sort_direction(), Some(SortDirection::Desc));

        col.reset_modifiers();
        assert_eq!(col.sort_direction(), None);
        assert!(!col.is_grouped());
        assert_eq!(col, Column::new("c", SqlType::Integer));
    }

    #[test]
    fn test_aggregate_shortcuts() {
        let (_db, col) = bound("test_col", SqlType::Integer);
        assert_eq!(col.avg().sql(), "avg(public.test_table.test_col) AS test_col_avg");
        assert_eq!(col.bit_and().sql(), "bit_and(public.test_table.test_col) AS test_col_bit_and");
        assert_eq!(col.bit_or().sql(), "bit_or(public.test_table.test_col) AS test_col_bit_or");
        assert_eq!(col.bool_and().sql(), "bool_and(public.test_table.test_col) AS test_col_bool_and");
        assert_eq!(col.bool_or().sql(), "bool_or(public.test_table.test_col) AS test_col_bool_or");
        assert_eq!(col.count().sql(), "count(public.test_table.test_col) AS test_col_count");
        assert_eq!(col.max().sql(), "max(public.test_table.test_col) AS test_col_max");
        assert_eq!(col.min().sql(), "min(public.test_table.test_col) AS test_col_min");
        assert_eq!(col.sum().sql(), "sum(public.test_table.test_col) AS test_col_sum");
        assert_eq!(col.sum().to_string(), "test_col_sum");
    }
}
