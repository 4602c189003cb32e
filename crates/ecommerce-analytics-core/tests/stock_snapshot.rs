mod common;

use common::{column_names, context, day, ints, read_output, write_clean};
use ecommerce_analytics_core::{
    enrichment::{stock_journalier, stock_snapshot_frame, DAILY_STOCK, TOTAL_ORDERED},
    store::{EnrichmentJob, Entity},
    PipelineError,
};
use polars::prelude::*;

const CLEAN_PRODUCTS: &str = "\
product_id,product_name,stock,date
3,Cap,7,2024-05-10
1,Mug,10,2024-05-10
2,Pen,5,2024-05-10
";

const CLEAN_ORDERS: &str = "\
order_id,customer_id,product_id,quantity,price,order_date,customer_name,product_name
100,1,1,2,10.0,2024-05-10,Ann,Mug
101,2,1,3,15.0,2024-05-10,Bob,Mug
102,1,2,1,1.5,2024-05-10,Ann,Pen
103,4,99,6,3.0,2024-05-10,Zoe,Gone
";

#[test]
fn snapshot_keeps_every_product_and_zero_fills() {
    let (_dir, ctx) = context();
    let date = day(2024, 5, 10);
    write_clean(&ctx, Entity::Products, date, CLEAN_PRODUCTS);
    write_clean(&ctx, Entity::Orders, date, CLEAN_ORDERS);

    let summary = stock_journalier(&ctx, date).unwrap();
    assert_eq!(summary.rows_written, 3);
    assert_eq!(
        summary.output,
        ctx.store.enriched_path(EnrichmentJob::StockJournalier, date)
    );
    assert_eq!(summary.inputs.len(), 2);

    let snapshot = read_output(&ctx, &summary.output);
    assert_eq!(
        column_names(&snapshot),
        vec!["product_id", "product_name", "stock", "date", TOTAL_ORDERED, DAILY_STOCK]
    );
    assert_eq!(ints(&snapshot, "product_id"), vec![3, 1, 2]);
    assert_eq!(ints(&snapshot, TOTAL_ORDERED), vec![0, 5, 1]);
    assert_eq!(ints(&snapshot, DAILY_STOCK), vec![7, 5, 4]);
}

#[test]
fn missing_orders_table_fails_without_output() {
    let (_dir, ctx) = context();
    let date = day(2024, 5, 10);
    write_clean(&ctx, Entity::Products, date, CLEAN_PRODUCTS);

    let err = stock_journalier(&ctx, date).unwrap_err();
    match err {
        PipelineError::MissingInput { path } => {
            assert_eq!(path, ctx.store.clean_path(Entity::Orders, date))
        }
        other => panic!("expected missing input, got {other:?}"),
    }
    assert!(!ctx
        .store
        .enriched_path(EnrichmentJob::StockJournalier, date)
        .exists());
}

#[test]
fn header_only_orders_table_leaves_stock_untouched() {
    let (_dir, ctx) = context();
    let date = day(2024, 5, 11);
    write_clean(&ctx, Entity::Products, date, CLEAN_PRODUCTS);
    write_clean(
        &ctx,
        Entity::Orders,
        date,
        "order_id,customer_id,product_id,quantity,price,order_date,customer_name,product_name\n",
    );

    let summary = stock_journalier(&ctx, date).unwrap();
    let snapshot = read_output(&ctx, &summary.output);
    assert_eq!(ints(&snapshot, TOTAL_ORDERED), vec![0, 0, 0]);
    assert_eq!(ints(&snapshot, DAILY_STOCK), ints(&snapshot, "stock"));
}

#[test]
fn in_memory_snapshot_subtracts_ordered_quantity() -> PolarsResult<()> {
    let products = df!(
        "product_id" => &[1i64, 2, 3],
        "stock" => &[10i64, 4, 1],
    )?;
    let orders = df!(
        "product_id" => &[2i64, 2, 3],
        "quantity" => &[1i64, 5, 1],
    )?;

    let snapshot = stock_snapshot_frame(products, orders).unwrap();
    assert_eq!(snapshot.height(), 3);

    let stock = snapshot.column(DAILY_STOCK)?.i64()?;
    assert_eq!(stock.get(0), Some(10));
    // Over-ordering is reported as negative stock rather than clamped.
    assert_eq!(stock.get(1), Some(-2));
    assert_eq!(stock.get(2), Some(0));
    Ok(())
}
