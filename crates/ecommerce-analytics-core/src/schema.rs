// crates/ecommerce-analytics-core/src/schema.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::store::Entity;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    /// Calendar date; the leading `YYYY-MM-DD` of the value, any time part is dropped.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    GreaterThan,
    GreaterOrEqual,
}

/// Row predicate applied once the frame is typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainFilter {
    pub column: &'static str,
    pub comparison: Comparison,
    pub bound: i64,
}

impl DomainFilter {
    pub fn expr(&self) -> Expr {
        let bound = lit(self.bound);
        match self.comparison {
            Comparison::GreaterThan => col(self.column).gt(bound),
            Comparison::GreaterOrEqual => col(self.column).gt_eq(bound),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub entity: Entity,
    pub required: &'static [&'static str],
    pub optional_text: &'static [&'static str],
    /// `(raw header, canonical name)` pairs, applied after lower-casing.
    pub aliases: &'static [(&'static str, &'static str)],
    pub types: &'static [(&'static str, ColumnType)],
    pub filters: &'static [DomainFilter],
}

const CLIENTS: EntitySchema = EntitySchema {
    entity: Entity::Clients,
    required: &["customer_id", "email"],
    optional_text: &["first_name", "last_name"],
    aliases: &[("firstname", "first_name"), ("lastname", "last_name")],
    types: &[
        ("customer_id", ColumnType::Integer),
        ("date", ColumnType::Date),
        ("first_name", ColumnType::Text),
        ("last_name", ColumnType::Text),
        ("email", ColumnType::Text),
    ],
    filters: &[],
};

const PRODUCTS: EntitySchema = EntitySchema {
    entity: Entity::Products,
    required: &["product_id"],
    optional_text: &["product_name"],
    aliases: &[],
    types: &[
        ("stock", ColumnType::Integer),
        ("date", ColumnType::Date),
        ("product_id", ColumnType::Integer),
        ("product_name", ColumnType::Text),
    ],
    filters: &[DomainFilter {
        column: "stock",
        comparison: Comparison::GreaterThan,
        bound: 0,
    }],
};

const ORDERS: EntitySchema = EntitySchema {
    entity: Entity::Orders,
    required: &[
        "order_id",
        "customer_id",
        "product_id",
        "quantity",
        "order_date",
        "price",
    ],
    optional_text: &["customer_name", "product_name"],
    aliases: &[],
    types: &[
        ("order_date", ColumnType::Date),
        ("quantity", ColumnType::Integer),
        ("price", ColumnType::Float),
        ("order_id", ColumnType::Integer),
        ("customer_id", ColumnType::Integer),
        ("product_id", ColumnType::Integer),
        ("customer_name", ColumnType::Text),
        ("product_name", ColumnType::Text),
    ],
    filters: &[
        DomainFilter {
            column: "quantity",
            comparison: Comparison::GreaterThan,
            bound: 0,
        },
        DomainFilter {
            column: "price",
            comparison: Comparison::GreaterOrEqual,
            bound: 0,
        },
    ],
};

impl EntitySchema {
    pub fn for_entity(entity: Entity) -> &'static EntitySchema {
        match entity {
            Entity::Clients => &CLIENTS,
            Entity::Products => &PRODUCTS,
            Entity::Orders => &ORDERS,
        }
    }

    /// True when no required column is null.
    pub fn required_present(&self) -> Option<Expr> {
        self.required
            .iter()
            .map(|name| col(*name).is_not_null())
            .reduce(|acc, expr| acc.and(expr))
    }

    pub fn domain_predicate(&self) -> Option<Expr> {
        self.filters
            .iter()
            .map(DomainFilter::expr)
            .reduce(|acc, expr| acc.and(expr))
    }

    /// Casts every declared column, one column at a time so a failure names its column.
    pub fn coerce(&self, df: DataFrame) -> Result<DataFrame> {
        let mut typed = df;
        for &(name, kind) in self.types {
            let current = typed
                .column(name)
                .map_err(|_| PipelineError::MissingColumn {
                    entity: self.entity.as_str(),
                    column: name,
                })?
                .dtype()
                .clone();

            typed = coerce_column(typed, name, kind, &current).map_err(|source| {
                PipelineError::Coercion {
                    entity: self.entity.as_str(),
                    column: name,
                    source,
                }
            })?;
        }
        Ok(typed)
    }
}

fn coerce_column(
    df: DataFrame,
    name: &str,
    kind: ColumnType,
    current: &DataType,
) -> PolarsResult<DataFrame> {
    match (kind, current) {
        (ColumnType::Integer, DataType::String) => integer_from_text(df, name),
        _ => match coercion_expr(name, kind, current) {
            Some(expr) => df.lazy().with_column(expr).collect(),
            None => Ok(df),
        },
    }
}

/// Accepts `5`, ` 5 ` and `5.0`; rejects `5.5`.
fn integer_from_text(df: DataFrame, name: &str) -> PolarsResult<DataFrame> {
    let stripped = df
        .lazy()
        .with_column(trimmed(name))
        .collect()?;

    if let Ok(exact) = stripped
        .clone()
        .lazy()
        .with_column(col(name).strict_cast(DataType::Int64))
        .collect()
    {
        return Ok(exact);
    }

    let floats = stripped
        .lazy()
        .with_column(col(name).strict_cast(DataType::Float64))
        .collect()?;
    if let Some(value) = floats
        .column(name)?
        .f64()?
        .into_iter()
        .flatten()
        .find(|value| !value.is_finite() || value.fract() != 0.0)
    {
        return Err(PolarsError::ComputeError(
            format!("value {value} is not a whole number").into(),
        ));
    }

    floats
        .lazy()
        .with_column(col(name).strict_cast(DataType::Int64))
        .collect()
}

fn trimmed(name: &str) -> Expr {
    col(name).str().strip_chars(lit(Null {}))
}

fn coercion_expr(name: &str, kind: ColumnType, current: &DataType) -> Option<Expr> {
    match (kind, current) {
        (ColumnType::Integer, DataType::Int64)
        | (ColumnType::Float, DataType::Float64)
        | (ColumnType::Text, DataType::String)
        | (ColumnType::Date, DataType::Date) => None,
        (ColumnType::Integer, _) => Some(col(name).strict_cast(DataType::Int64)),
        (ColumnType::Float, DataType::String) => {
            Some(trimmed(name).strict_cast(DataType::Float64))
        }
        (ColumnType::Float, _) => Some(col(name).strict_cast(DataType::Float64)),
        (ColumnType::Text, _) => Some(col(name).cast(DataType::String)),
        // Only the leading date is read, so `2024-05-10 14:30:00` becomes 2024-05-10.
        (ColumnType::Date, DataType::String) => Some(trimmed(name).str().to_date(StrptimeOptions {
            format: Some(DATE_FORMAT.into()),
            strict: true,
            exact: false,
            ..Default::default()
        })),
        (ColumnType::Date, DataType::Datetime(_, _)) => Some(col(name).dt().date()),
        (ColumnType::Date, _) => Some(col(name).strict_cast(DataType::Date)),
    }
}
