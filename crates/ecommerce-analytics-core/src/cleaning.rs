// crates/ecommerce-analytics-core/src/cleaning.rs

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::context::JobContext;
use crate::error::{PipelineError, Result};
use crate::schema::EntitySchema;
use crate::store::Entity;

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub entity: Entity,
    pub date: NaiveDate,
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub missing_keys_dropped: usize,
    pub values_filled: usize,
    pub rows_rejected: usize,
    pub rows_written: usize,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct CleanedFrame {
    pub frame: DataFrame,
    pub duplicates_removed: usize,
    pub missing_keys_dropped: usize,
    /// Optional text cells set to the sentinel, including columns absent from the header.
    pub values_filled: usize,
    pub rows_rejected: usize,
}

/// Normalizes one raw table in memory. The step order matters: headers, duplicates,
/// missing keys, sentinel fill, coercion, then domain filters.
pub fn clean_frame(raw: DataFrame, schema: &EntitySchema, missing_text: &str) -> Result<CleanedFrame> {
    let entity = schema.entity.as_str();
    let mut df = raw;

    let lowered: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_lowercase())
        .collect();
    let repeated = {
        let mut seen = HashSet::with_capacity(lowered.len());
        lowered
            .iter()
            .find(|name| !seen.insert(name.as_str()))
            .cloned()
    };
    if let Some(column) = repeated {
        return Err(PipelineError::DuplicateColumn { entity, column });
    }
    df.set_column_names(lowered)?;

    for &(raw_name, canonical) in schema.aliases {
        if df.get_column_index(raw_name).is_some() && df.get_column_index(canonical).is_none() {
            df.rename(raw_name, canonical.into())?;
        }
    }

    for &name in schema.required {
        if df.get_column_index(name).is_none() {
            return Err(PipelineError::MissingColumn {
                entity,
                column: name,
            });
        }
    }

    let before_dedup = df.height();
    df = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    let duplicates_removed = before_dedup - df.height();
    info!(entity, duplicates_removed, "removed duplicate rows");

    let before_keys = df.height();
    if let Some(predicate) = schema.required_present() {
        df = df.lazy().filter(predicate).collect()?;
    }
    let missing_keys_dropped = before_keys - df.height();

    let mut values_filled = 0;
    let mut fills = Vec::with_capacity(schema.optional_text.len());
    for &name in schema.optional_text {
        match df.column(name) {
            Ok(column) => {
                values_filled += column.null_count();
                fills.push(col(name).fill_null(lit(missing_text)));
            }
            Err(_) => {
                values_filled += df.height();
                fills.push(lit(missing_text).alias(name));
            }
        }
    }
    if !fills.is_empty() {
        df = df.lazy().with_columns(fills).collect()?;
    }
    info!(
        entity,
        missing_keys_dropped,
        values_filled,
        "handled missing values"
    );

    df = schema.coerce(df)?;

    let before_filters = df.height();
    if let Some(predicate) = schema.domain_predicate() {
        df = df.lazy().filter(predicate).collect()?;
    }
    let rows_rejected = before_filters - df.height();

    Ok(CleanedFrame {
        frame: df,
        duplicates_removed,
        missing_keys_dropped,
        values_filled,
        rows_rejected,
    })
}

pub fn clean_entity(ctx: &JobContext, entity: Entity, date: NaiveDate) -> Result<CleanSummary> {
    let input = ctx.store.raw_path(entity, date);
    let output = ctx.store.clean_path(entity, date);

    let raw = ctx.store.read_table(&input)?;
    let rows_read = raw.height();
    debug!(entity = entity.as_str(), preview = %raw.head(Some(PREVIEW_ROWS)), "raw table preview");

    let schema = EntitySchema::for_entity(entity);
    let CleanedFrame {
        frame: mut cleaned,
        duplicates_removed,
        missing_keys_dropped,
        values_filled,
        rows_rejected,
    } = clean_frame(raw, schema, &ctx.missing_text)?;

    ctx.store.write_table(&output, &mut cleaned)?;
    info!(
        entity = entity.as_str(),
        %date,
        rows = cleaned.height(),
        path = %output.display(),
        "cleaned table written"
    );

    Ok(CleanSummary {
        entity,
        date,
        rows_read,
        duplicates_removed,
        missing_keys_dropped,
        values_filled,
        rows_rejected,
        rows_written: cleaned.height(),
        output,
    })
}

pub fn clean_clients(ctx: &JobContext, date: NaiveDate) -> Result<CleanSummary> {
    clean_entity(ctx, Entity::Clients, date)
}

pub fn clean_products(ctx: &JobContext, date: NaiveDate) -> Result<CleanSummary> {
    clean_entity(ctx, Entity::Products, date)
}

pub fn clean_orders(ctx: &JobContext, date: NaiveDate) -> Result<CleanSummary> {
    clean_entity(ctx, Entity::Orders, date)
}

/// Reads a cleaned table back with its declared column types.
pub fn load_clean_table(ctx: &JobContext, entity: Entity, date: NaiveDate) -> Result<(PathBuf, DataFrame)> {
    let path = ctx.store.clean_path(entity, date);
    let df = ctx.store.read_table(&path)?;
    let typed = EntitySchema::for_entity(entity).coerce(df)?;
    Ok((path, typed))
}
