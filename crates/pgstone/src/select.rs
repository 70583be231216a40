//! SELECT statement builder.
//!
//! The FROM clause is never given explicitly: it is derived from the tables
//! owning the projected columns and aggregates, in order of first appearance.
//!
//! # Example
//! ```ignore
//! use pgstone::Comparable;
//!
//! let mut query = users.select([&name, &age])?;
//! query.filter(age.greater_or_equal(18)).group_by([&name]);
//! assert_eq!(
//!     query.sql(),
//!     "SELECT public.users.name, public.users.age FROM public.users \
//!      WHERE public.users.age >= 18 GROUP BY public.users.name;"
//! );
//! let response = query.execute().await?;
//! ```

use crate::aggregate::Aggregate;
use crate::column::Column;
use crate::condition::Condition;
use crate::database::{Database, Response};
use crate::error::DbResult;
use crate::table::Table;
use std::borrow::Borrow;
use std::fmt;

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Column(Column),
    Aggregate(Aggregate),
    /// Raw SQL, rendered as-is.
    Raw(String),
}

impl Projection {
    /// Select-list rendering. Aliased columns render `qualified AS alias`.
    pub fn sql(&self) -> String {
        match self {
            Projection::Column(column) => match column.alias() {
                Some(alias) => format!("{} AS {alias}", column.qualified_name()),
                None => column.qualified_name(),
            },
            Projection::Aggregate(aggregate) => aggregate.sql(),
            Projection::Raw(sql) => sql.clone(),
        }
    }

    fn table(&self) -> Option<Table> {
        match self {
            Projection::Column(column) => column.table(),
            Projection::Aggregate(aggregate) => aggregate.table(),
            Projection::Raw(_) => None,
        }
    }
}

impl From<&Column> for Projection {
    fn from(column: &Column) -> Self {
        Projection::Column(column.clone())
    }
}

impl From<Column> for Projection {
    fn from(column: Column) -> Self {
        Projection::Column(column)
    }
}

impl From<&Aggregate> for Projection {
    fn from(aggregate: &Aggregate) -> Self {
        Projection::Aggregate(aggregate.clone())
    }
}

impl From<Aggregate> for Projection {
    fn from(aggregate: Aggregate) -> Self {
        Projection::Aggregate(aggregate)
    }
}

impl From<&str> for Projection {
    fn from(sql: &str) -> Self {
        Projection::Raw(sql.to_string())
    }
}

impl From<String> for Projection {
    fn from(sql: String) -> Self {
        Projection::Raw(sql)
    }
}

/// DISTINCT mode of a select.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Distinct {
    #[default]
    Off,
    All,
    On(Vec<Column>),
}

/// WHERE conditions, joined with AND.
#[derive(Debug, Clone, Default)]
pub struct Where {
    conditions: Vec<Condition>,
}

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition; plain strings become raw conditions.
    pub fn add(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn extend<I, C>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.conditions.extend(conditions.into_iter().map(Into::into));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    /// Conditions joined with ` AND `; empty when there are none.
    pub fn sql(&self) -> String {
        self.conditions
            .iter()
            .map(Condition::sql)
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// A SELECT statement under construction.
#[derive(Debug, Clone)]
pub struct Select {
    database: Database,
    projections: Vec<Projection>,
    distinct: Distinct,
    group_by: Vec<Column>,
    order_by: Vec<Column>,
    where_clause: Where,
}

impl Select {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            projections: Vec::new(),
            distinct: Distinct::Off,
            group_by: Vec::new(),
            order_by: Vec::new(),
            where_clause: Where::new(),
        }
    }

    /// An empty select on the same database.
    pub fn new_query(&self) -> Select {
        Select::new(self.database.clone())
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Append projections.
    pub fn select<I, P>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        self.projections.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// `SELECT DISTINCT`
    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = Distinct::All;
        self
    }

    /// `SELECT DISTINCT ON (...)`. Columns missing from the select list are
    /// appended to it.
    pub fn distinct_on<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Borrow<Column>,
    {
        let columns: Vec<Column> = columns.into_iter().map(|c| c.borrow().clone()).collect();
        for column in &columns {
            let projection = Projection::Column(column.clone());
            if !self.projections.contains(&projection) {
                self.projections.push(projection);
            }
        }
        self.distinct = Distinct::On(columns);
        self
    }

    pub fn distinct_mode(&self) -> &Distinct {
        &self.distinct
    }

    /// Replace the GROUP BY list.
    ///
    /// Projected columns marked [`grouped`](Column::grouped) are grouped as
    /// well, after these.
    pub fn group_by<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Borrow<Column>,
    {
        self.group_by = columns.into_iter().map(|c| c.borrow().clone()).collect();
        self
    }

    /// The explicit GROUP BY list.
    pub fn groups(&self) -> &[Column] {
        &self.group_by
    }

    /// Replace the ORDER BY list. Each column sorts by its
    /// [`asc`](Column::asc)/[`desc`](Column::desc) modifier.
    pub fn order_by<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Borrow<Column>,
    {
        self.order_by = columns.into_iter().map(|c| c.borrow().clone()).collect();
        self
    }

    pub fn where_clause(&self) -> &Where {
        &self.where_clause
    }

    pub fn where_clause_mut(&mut self) -> &mut Where {
        &mut self.where_clause
    }

    /// Add a WHERE condition.
    pub fn filter(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.where_clause.add(condition);
        self
    }

    /// Tables referenced by the projections, in first-appearance order.
    pub fn tables(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = Vec::new();
        for table in self.projections.iter().filter_map(Projection::table) {
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        tables
    }

    /// The rendered GROUP BY list: the explicit groups followed by projected
    /// columns marked as grouped.
    pub fn grouping(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.group_by.iter().map(Column::full_name).collect();
        let marked = self.projections.iter().filter_map(|p| match p {
            Projection::Column(column) if column.is_grouped() => Some(column.full_name()),
            _ => None,
        });
        for name in marked {
            if !groups.contains(&name) {
                groups.push(name);
            }
        }
        groups
    }

    /// Render the statement. With nothing selected this is `SELECT NULL`.
    pub fn sql(&self) -> String {
        if self.projections.is_empty() {
            return "SELECT NULL".to_string();
        }

        let mut sql = String::from("SELECT ");
        match &self.distinct {
            Distinct::Off => {}
            Distinct::All => sql.push_str("DISTINCT "),
            Distinct::On(columns) => {
                let on: Vec<String> = columns.iter().map(Column::full_name).collect();
                sql.push_str(&format!("DISTINCT ON ({}) ", on.join(", ")));
            }
        }

        let projections: Vec<String> = self.projections.iter().map(Projection::sql).collect();
        sql.push_str(&projections.join(", "));

        let tables = self.tables();
        if !tables.is_empty() {
            let tables: Vec<String> = tables.iter().map(Table::full_name).collect();
            sql.push_str(" FROM ");
            sql.push_str(&tables.join(", "));
        }

        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause.sql());
        }

        let groups = self.grouping();
        if !groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&groups.join(", "));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|column| match column.sort_direction() {
                    Some(direction) => format!("{} {}", column.full_name(), direction.sql()),
                    None => column.full_name(),
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        sql.push(';');
        sql
    }

    /// Send the statement to the database.
    pub async fn execute(&self) -> DbResult<Response> {
        self.database.execute(&self.sql(), &[], None).await
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Comparable;
    use crate::constraints::PRIMARY_KEY;
    use crate::types::SqlType;

    struct Fixture {
        db: Database,
        table: Table,
        col_a: Column,
        col_b: Column,
    }

    fn fixture() -> Fixture {
        let db = Database::new("select_tests");
        db.disable_execution();
        let table = db.table("sample_table");
        let col_a = table.add_column("col_a", SqlType::Text, [PRIMARY_KEY]);
        let col_b = table.add_column("col_b", SqlType::Integer, []);
        Fixture {
            db,
            table,
            col_a,
            col_b,
        }
    }

    #[test]
    fn test_empty_select_is_null() {
        let f = fixture();
        let select = f.table.select(Vec::<Projection>::new()).unwrap();
        assert_eq!(select.sql(), "SELECT NULL");
        assert_eq!(Select::new(f.db.clone()).to_string(), "SELECT NULL");
    }

    #[test]
    fn test_from_is_derived_from_columns() {
        let f = fixture();
        let select = f.table.select([&f.col_a]).unwrap();
        assert_eq!(
            select.sql(),
            "SELECT public.sample_table.col_a FROM public.sample_table;"
        );
        assert_eq!(select.projections(), &[Projection::from(&f.col_a)]);
        assert_eq!(select.tables(), vec![f.table.clone()]);
    }

    #[test]
    fn test_tables_are_listed_once_in_order() {
        let f = fixture();
        let other = f.db.table("other");
        let x = other.add_column("x", SqlType::Integer, []);
        let mut select = f.db.select([&f.col_a]);
        select.select([&x]).select([&f.col_b]);
        assert_eq!(
            select.sql(),
            "SELECT public.sample_table.col_a, public.other.x, public.sample_table.col_b \
             FROM public.sample_table, public.other;"
        );
    }

    #[test]
    fn test_distinct_modes() {
        let f = fixture();
        let mut select = f.table.select([&f.col_a]).unwrap();
        select.distinct();
        assert_eq!(
            select.sql(),
            "SELECT DISTINCT public.sample_table.col_a FROM public.sample_table;"
        );

        let mut select = select.new_query();
        select.distinct_on([&f.col_a, &f.col_b]);
        assert_eq!(
            select.sql(),
            "SELECT DISTINCT ON (public.sample_table.col_a, public.sample_table.col_b) \
             public.sample_table.col_a, public.sample_table.col_b FROM public.sample_table;"
        );

        // already projected columns are not duplicated
        let mut select = f.table.select([&f.col_a]).unwrap();
        select.distinct_on([&f.col_a]);
        assert_eq!(select.projections().len(), 1);
    }

    #[test]
    fn test_grouped_aggregate() {
        let f = fixture();
        let mut select = f.table.select([f.col_a.count()]).unwrap();
        select.group_by([&f.col_a]);
        assert_eq!(select.groups(), &[f.col_a.clone()]);
        assert_eq!(
            select.sql(),
            "SELECT count(public.sample_table.col_a) AS col_a_count FROM public.sample_table \
             GROUP BY public.sample_table.col_a;"
        );

        select.group_by([&f.col_b]);
        assert_eq!(select.groups(), &[f.col_b.clone()]);
    }

    #[test]
    fn test_grouped_modifier_extends_group_by() {
        let f = fixture();
        let mut col_a = f.col_a.clone();
        col_a.grouped();
        let select = f.db.select([Projection::from(&col_a), Projection::from(f.col_b.sum())]);
        assert_eq!(
            select.sql(),
            "SELECT public.sample_table.col_a, sum(public.sample_table.col_b) AS col_b_sum \
             FROM public.sample_table GROUP BY public.sample_table.col_a;"
        );
    }

    #[test]
    fn test_order_by_uses_sort_modifiers() {
        let f = fixture();
        let mut col_b = f.col_b.clone();
        col_b.desc();
        let mut select = f.table.select([&f.col_a]).unwrap();
        select.order_by([&col_b, &f.col_a]);
        assert_eq!(
            select.sql(),
            "SELECT public.sample_table.col_a FROM public.sample_table \
             ORDER BY public.sample_table.col_b DESC, public.sample_table.col_a;"
        );
    }

    #[test]
    fn test_aliased_columns_keep_their_source() {
        let f = fixture();
        let name = f.col_a.clone().aliased("name");
        let mut select = f.table.select([&name]).unwrap();
        select.filter(name.ilike("dan%"));
        assert_eq!(
            select.sql(),
            "SELECT public.sample_table.col_a AS name FROM public.sample_table WHERE name ILIKE 'dan%';"
        );
        // the table's own column is untouched
        assert_eq!(f.table.column("col_a").unwrap().full_name(), "public.sample_table.col_a");
    }

    #[test]
    fn test_where_accumulates_and_clears() {
        let f = fixture();
        let (a, b) = (&f.col_a, &f.col_b);
        let mut select = f.table.select(["col_a"]).unwrap();

        select.filter(a.equals(b));
        assert_eq!(
            select.where_clause().sql(),
            "public.sample_table.col_a = public.sample_table.col_b"
        );

        select.where_clause_mut().clear();
        assert_eq!(select.where_clause().sql(), "");

        select
            .where_clause_mut()
            .extend([a.equals("john"), b.greater_or_equal(100)]);
        assert_eq!(
            select.where_clause().sql(),
            "public.sample_table.col_a = 'john' AND public.sample_table.col_b >= 100"
        );

        select.where_clause_mut().clear();
        select.filter(a.is(true) | (a.equals(100) & b.ilike("dan")));
        assert_eq!(
            select.where_clause().sql(),
            "(public.sample_table.col_a IS TRUE OR (public.sample_table.col_a = 100 \
             AND public.sample_table.col_b ILIKE 'dan'))"
        );

        select.where_clause_mut().clear();
        select.filter("string_example IS NOT NULL");
        assert_eq!(select.where_clause().sql(), "string_example IS NOT NULL");
        assert_eq!(
            select.sql(),
            "SELECT col_a WHERE string_example IS NOT NULL;"
        );
    }

    #[tokio::test]
    async fn test_execute_goes_through_the_database() {
        let f = fixture();
        let select = f.table.select([&f.col_a]).unwrap();
        let (response, statements) = f.db.track_statements(select.execute()).await;
        let expected = "SELECT public.sample_table.col_a FROM public.sample_table;";
        assert_eq!(response.unwrap().sql(), Some(expected));
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0], expected);
    }
}
