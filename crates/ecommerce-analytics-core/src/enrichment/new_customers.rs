use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use super::{EnrichmentSummary, ROW_ORDER};
use crate::cleaning::load_clean_table;
use crate::context::JobContext;
use crate::error::{PipelineError, Result};
use crate::store::{EnrichmentJob, Entity};

pub const TOTAL_SPENT: &str = "total_dépensé";

/// Clients of `today` whose id is absent from `previous`, with what they spent in `orders`.
pub fn new_customers_frame(
    today: DataFrame,
    previous: DataFrame,
    orders: DataFrame,
) -> Result<DataFrame> {
    let known = previous.lazy().select([col("customer_id")]);

    let newcomers = today
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(
            known,
            [col("customer_id")],
            [col("customer_id")],
            JoinArgs::new(JoinType::Anti),
        );

    let spend = orders
        .lazy()
        .join(
            newcomers.clone().select([col("customer_id")]),
            [col("customer_id")],
            [col("customer_id")],
            JoinArgs::new(JoinType::Semi),
        )
        .group_by([col("customer_id")])
        .agg([col("price").sum().alias(TOTAL_SPENT)]);

    let tracked = newcomers
        .join(
            spend,
            [col("customer_id")],
            [col("customer_id")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(col(TOTAL_SPENT).fill_null(lit(0.0f64)))
        .sort([ROW_ORDER], SortMultipleOptions::default())
        .collect()?;

    Ok(tracked.drop(ROW_ORDER)?)
}

pub fn suivie_nouveau_client(ctx: &JobContext, date: NaiveDate) -> Result<EnrichmentSummary> {
    let previous_date = date
        .pred_opt()
        .ok_or_else(|| PipelineError::InvalidDate(format!("{date} has no previous day")))?;

    let (clients_path, clients) = load_clean_table(ctx, Entity::Clients, date)?;
    let (previous_path, previous) = load_clean_table(ctx, Entity::Clients, previous_date)?;
    let (orders_path, orders) = load_clean_table(ctx, Entity::Orders, date)?;

    let mut tracked = new_customers_frame(clients, previous, orders)?;
    info!(%date, %previous_date, new_customers = tracked.height(), "compared client tables");

    let output = ctx.store.enriched_path(EnrichmentJob::SuiviNouveauClient, date);
    ctx.store.write_table(&output, &mut tracked)?;
    info!(path = %output.display(), "new customer tracking written");

    Ok(EnrichmentSummary {
        job: EnrichmentJob::SuiviNouveauClient,
        period: date.to_string(),
        inputs: vec![clients_path, previous_path, orders_path],
        rows_written: tracked.height(),
        output,
    })
}
