use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use super::{EnrichmentSummary, ROW_ORDER};
use crate::cleaning::load_clean_table;
use crate::context::JobContext;
use crate::error::Result;
use crate::store::{EnrichmentJob, Entity};

pub const TOTAL_ORDERED: &str = "total_commandé";
pub const DAILY_STOCK: &str = "stock_journalier";

/// One row per product: ordered quantity for the day and the stock left afterwards.
pub fn stock_snapshot_frame(products: DataFrame, orders: DataFrame) -> Result<DataFrame> {
    let ordered = orders
        .lazy()
        .group_by([col("product_id")])
        .agg([col("quantity").sum().alias(TOTAL_ORDERED)]);

    let snapshot = products
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(
            ordered,
            [col("product_id")],
            [col("product_id")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(col(TOTAL_ORDERED).fill_null(lit(0i64)))
        .with_column((col("stock") - col(TOTAL_ORDERED)).alias(DAILY_STOCK))
        .sort([ROW_ORDER], SortMultipleOptions::default())
        .collect()?;

    Ok(snapshot.drop(ROW_ORDER)?)
}

pub fn stock_journalier(ctx: &JobContext, date: NaiveDate) -> Result<EnrichmentSummary> {
    let (products_path, products) = load_clean_table(ctx, Entity::Products, date)?;
    let (orders_path, orders) = load_clean_table(ctx, Entity::Orders, date)?;

    let mut snapshot = stock_snapshot_frame(products, orders)?;

    let output = ctx.store.enriched_path(EnrichmentJob::StockJournalier, date);
    ctx.store.write_table(&output, &mut snapshot)?;
    info!(%date, products = snapshot.height(), path = %output.display(), "daily stock snapshot written");

    Ok(EnrichmentSummary {
        job: EnrichmentJob::StockJournalier,
        period: date.to_string(),
        inputs: vec![products_path, orders_path],
        rows_written: snapshot.height(),
        output,
    })
}
