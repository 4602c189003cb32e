use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::EnrichmentSummary;
use crate::context::JobContext;
use crate::error::{PipelineError, Result};
use crate::schema::EntitySchema;
use crate::store::{EnrichmentJob, Entity, Stage};

pub const MONTH_LABEL: &str = "mois";
pub const REVENUE: &str = "chiffre_affaire";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
}

impl MonthlyRevenue {
    pub fn label(&self) -> String {
        month_label(self.year, self.month)
    }
}

fn month_label(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Sums `price` per calendar month of each row's own `order_date`, oldest month first.
pub fn revenue_by_month(orders: DataFrame) -> Result<Vec<MonthlyRevenue>> {
    let grouped = orders
        .lazy()
        .group_by([
            col("order_date").dt().year().cast(DataType::Int32).alias("year"),
            col("order_date").dt().month().cast(DataType::Int32).alias("month"),
        ])
        .agg([col("price").sum().alias(REVENUE)])
        .sort(["year", "month"], SortMultipleOptions::default())
        .collect()?;

    let years = grouped.column("year")?.i32()?;
    let months = grouped.column("month")?.i32()?;
    let revenue = grouped.column(REVENUE)?.f64()?;

    let mut groups = Vec::with_capacity(grouped.height());
    for idx in 0..grouped.height() {
        let (Some(year), Some(month)) = (years.get(idx), months.get(idx)) else {
            continue;
        };
        groups.push(MonthlyRevenue {
            year,
            month: month as u32,
            revenue: revenue.get(idx).unwrap_or(0.0),
        });
    }
    Ok(groups)
}

pub fn chiffre_affaire_mensuel(ctx: &JobContext, year: i32, month: u32) -> Result<EnrichmentSummary> {
    let output = ctx
        .store
        .monthly_path(EnrichmentJob::ChiffreAffaireMensuel, year, month)?;
    let files = ctx
        .store
        .daily_files(Stage::Clean, Entity::Orders.as_str(), year, month)?;
    if files.is_empty() {
        return Err(PipelineError::NoData { year, month });
    }

    let schema = EntitySchema::for_entity(Entity::Orders);
    let mut frames = Vec::with_capacity(files.len());
    for (_, path) in &files {
        let typed = schema.coerce(ctx.store.read_table(path)?)?;
        frames.push(typed.lazy().select([col("order_date"), col("price")]));
    }
    let month_orders = concat(&frames, UnionArgs::default())?.collect()?;
    info!(
        year,
        month,
        files = files.len(),
        rows = month_orders.height(),
        "loaded month orders"
    );

    let mut total = 0.0;
    for group in revenue_by_month(month_orders)? {
        if group.year == year && group.month == month {
            total += group.revenue;
        } else {
            warn!(
                period = %group.label(),
                revenue = group.revenue,
                "excluding orders dated outside the requested month"
            );
        }
    }

    let label = month_label(year, month);
    let mut frame = df!(
        MONTH_LABEL => &[label.as_str()],
        REVENUE => &[total],
    )?;

    ctx.store.write_table(&output, &mut frame)?;
    info!(period = %label, revenue = total, path = %output.display(), "monthly revenue written");

    Ok(EnrichmentSummary {
        job: EnrichmentJob::ChiffreAffaireMensuel,
        period: label,
        inputs: files.into_iter().map(|(_, path)| path).collect(),
        rows_written: frame.height(),
        output,
    })
}
