// crates/ecommerce-analytics-core/src/enrichment/mod.rs

use std::path::PathBuf;

use serde::Serialize;

use crate::store::EnrichmentJob;

mod monthly_revenue;
mod new_customers;
mod stock_snapshot;

pub use monthly_revenue::{
    chiffre_affaire_mensuel, revenue_by_month, MonthlyRevenue, MONTH_LABEL, REVENUE,
};
pub use new_customers::{new_customers_frame, suivie_nouveau_client, TOTAL_SPENT};
pub use stock_snapshot::{stock_journalier, stock_snapshot_frame, DAILY_STOCK, TOTAL_ORDERED};

/// Temporary column used to restore the left table's row order after joins.
const ROW_ORDER: &str = "__row_order";

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentSummary {
    pub job: EnrichmentJob,
    /// `YYYY-MM-DD` for daily jobs, `YYYY-MM` for the monthly one.
    pub period: String,
    pub inputs: Vec<PathBuf>,
    pub rows_written: usize,
    pub output: PathBuf,
}
