//! Column and table constraints rendered into DDL.
//!
//! The stateless constraints are plain values ([`NOT_NULL`], [`UNIQUE`],
//! [`PRIMARY_KEY`]) that can be shared freely. Parametrized constraints are
//! built with [`Constraint::check`], [`Constraint::foreign_key`] and
//! [`Constraint::references`]. Any constraint can then be wrapped with a name
//! ([`Constraint::named`]) or applied to several columns
//! ([`Constraint::composite`]).
//!
//! Constraints compare and hash by their rendered SQL.

use crate::column::Column;
use crate::error::{DbError, DbResult};
use std::fmt;
use std::hash::{Hash, Hasher};

/// `NOT NULL`
pub const NOT_NULL: Constraint = Constraint::NotNull;
/// `UNIQUE`
pub const UNIQUE: Constraint = Constraint::Unique;
/// `PRIMARY KEY`
pub const PRIMARY_KEY: Constraint = Constraint::PrimaryKey;

/// A SQL constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    NotNull,
    Unique,
    PrimaryKey,
    /// `CHECK (<expression>)`
    Check(String),
    /// `REFERENCES <table> (<column>)`
    ForeignKey { table: String, column: String },
    /// `CONSTRAINT <name> <constraint>`
    Named {
        name: String,
        constraint: Box<Constraint>,
    },
    /// `<constraint> (<col>, <col>, ...)`
    Composite {
        constraint: Box<Constraint>,
        columns: Vec<String>,
    },
}

impl Constraint {
    /// `CHECK (<expression>)`
    pub fn check(expression: impl Into<String>) -> Self {
        Constraint::Check(expression.into())
    }

    /// `REFERENCES <table> (<column>)` with an explicit target table.
    pub fn foreign_key(table: impl fmt::Display, column: impl ColumnName) -> Self {
        Constraint::ForeignKey {
            table: table.to_string(),
            column: column.column_name(),
        }
    }

    /// `REFERENCES <table> (<column>)` with the table taken from the column's binding.
    ///
    /// Fails with [`DbError::Configuration`] when the column is not bound to a table.
    pub fn references(column: &Column) -> DbResult<Self> {
        let table = column.table().ok_or_else(|| {
            DbError::configuration(format!(
                "Foreign key target for column '{}' has no table; bind the column or pass the table explicitly.",
                column.name()
            ))
        })?;
        Ok(Self::foreign_key(table.full_name(), column))
    }

    /// Wrap as `CONSTRAINT <name> <self>`.
    pub fn named(self, name: impl Into<String>) -> Self {
        Constraint::Named {
            name: name.into(),
            constraint: Box::new(self),
        }
    }

    /// Apply to several columns: `<self> (a, b)`.
    ///
    /// Columns resolve to their bare names, since composite constraints are
    /// declared inside a single table's DDL.
    pub fn composite<I, C>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: ColumnName,
    {
        Constraint::Composite {
            constraint: Box::new(self),
            columns: columns.into_iter().map(|c| c.column_name()).collect(),
        }
    }

    /// Render the constraint.
    pub fn sql(&self) -> String {
        match self {
            Constraint::NotNull => "NOT NULL".to_string(),
            Constraint::Unique => "UNIQUE".to_string(),
            Constraint::PrimaryKey => "PRIMARY KEY".to_string(),
            Constraint::Check(expression) => format!("CHECK ({expression})"),
            Constraint::ForeignKey { table, column } => format!("REFERENCES {table} ({column})"),
            Constraint::Named { name, constraint } => {
                format!("CONSTRAINT {name} {}", constraint.sql())
            }
            Constraint::Composite {
                constraint,
                columns,
            } => format!("{} ({})", constraint.sql(), columns.join(", ")),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.sql() == other.sql()
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sql().hash(state);
    }
}

/// Anything that names a column inside a table definition.
pub trait ColumnName {
    fn column_name(&self) -> String;
}

impl ColumnName for &str {
    fn column_name(&self) -> String {
        (*self).to_string()
    }
}

impl ColumnName for String {
    fn column_name(&self) -> String {
        self.clone()
    }
}

impl ColumnName for &Column {
    fn column_name(&self) -> String {
        self.name().to_string()
    }
}

impl ColumnName for Column {
    fn column_name(&self) -> String {
        self.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    #[test]
    fn test_shared_and_built_constraints_are_interchangeable() {
        assert_eq!(UNIQUE.sql(), "UNIQUE");
        assert_eq!(UNIQUE.to_string(), "UNIQUE");
        assert_eq!(UNIQUE, Constraint::Unique);
        assert_ne!(UNIQUE, NOT_NULL);
        assert_eq!(PRIMARY_KEY.sql(), "PRIMARY KEY");
        assert_eq!(NOT_NULL.sql(), "NOT NULL");
    }

    #[test]
    fn test_named() {
        assert_eq!(UNIQUE.named("unique_test").sql(), "CONSTRAINT unique_test UNIQUE");
        assert_eq!(
            Constraint::check("price > 0").named("positive_price").sql(),
            "CONSTRAINT positive_price CHECK (price > 0)"
        );
    }

    #[test]
    fn test_composite_uses_bare_names() {
        let a = Column::new("test_a", SqlType::Text);
        let b = Column::new("test_b", SqlType::Text);
        assert_eq!(UNIQUE.composite([&a, &b]).sql(), "UNIQUE (test_a, test_b)");
        assert_eq!(
            PRIMARY_KEY.composite(["x", "y"]).named("pk_xy").sql(),
            "CONSTRAINT pk_xy PRIMARY KEY (x, y)"
        );
    }

    #[test]
    fn test_foreign_keys() {
        assert_eq!(
            Constraint::foreign_key("public.users", "id").sql(),
            "REFERENCES public.users (id)"
        );

        let unbound = Column::new("id", SqlType::Integer);
        let err = Constraint::references(&unbound).unwrap_err();
        assert!(err.is_configuration());
    }
}
