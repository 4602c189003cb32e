mod common;

use std::fs;
use std::path::Path;

use common::{context, day, text, write_file};
use ecommerce_analytics_core::{
    store::{EnrichmentJob, Entity, PartitionedStore, Stage},
    PipelineError,
};
use polars::prelude::*;

#[test]
fn paths_keep_calendar_numbers_unpadded() {
    let store = PartitionedStore::new("data");
    let date = day(2024, 5, 9);

    assert_eq!(
        store.raw_path(Entity::Clients, date),
        Path::new("data/raw_data/clients/2024/5/9.csv")
    );
    assert_eq!(
        store.clean_path(Entity::Orders, date),
        Path::new("data/clean_data/orders/2024/5/9.csv")
    );
    assert_eq!(
        store.enriched_path(EnrichmentJob::StockJournalier, date),
        Path::new("data/enriched_data/stock_journalier/2024/5/9.csv")
    );
    assert_eq!(
        store.enriched_path(EnrichmentJob::SuiviNouveauClient, day(2024, 11, 30)),
        Path::new("data/enriched_data/suivie_nouveau_client/2024/11/30.csv")
    );
    assert_eq!(
        store
            .monthly_path(EnrichmentJob::ChiffreAffaireMensuel, 2024, 5)
            .unwrap(),
        Path::new("data/enriched_data/chiffre_affaire_mensuel/2024/5/5.csv")
    );
}

#[test]
fn monthly_path_rejects_month_out_of_range() {
    let store = PartitionedStore::new("data");
    let err = store
        .monthly_path(EnrichmentJob::ChiffreAffaireMensuel, 2024, 13)
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidDate(_)));
}

#[test]
fn reading_absent_table_names_the_path() {
    let (_dir, ctx) = context();
    let path = ctx.store.clean_path(Entity::Products, day(2024, 5, 10));

    let err = ctx.store.read_table(&path).unwrap_err();
    assert!(err.to_string().contains(&path.display().to_string()));
    match err {
        PipelineError::MissingInput { path: reported } => assert_eq!(reported, path),
        other => panic!("expected missing input, got {other:?}"),
    }
}

#[test]
fn raw_tables_are_read_as_text() {
    let (_dir, ctx) = context();
    let path = ctx.store.raw_path(Entity::Orders, day(2024, 5, 10));
    write_file(&path, "order_id,price\n1,9.5\n2,\n");

    let df = ctx.store.read_table(&path).unwrap();
    assert_eq!(df.column("order_id").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("price").unwrap().dtype(), &DataType::String);
    assert_eq!(
        text(&df, "price"),
        vec![Some("9.5".to_string()), None]
    );
}

#[test]
fn write_creates_partition_and_leaves_no_staging_file() -> PolarsResult<()> {
    let (_dir, ctx) = context();
    let path = ctx
        .store
        .enriched_path(EnrichmentJob::StockJournalier, day(2024, 1, 2));
    let mut df = df!("product_id" => &[1i64, 2], "stock" => &[4i64, 0])?;

    ctx.store.write_table(&path, &mut df).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "product_id,stock\n1,4\n2,0\n"
    );
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);

    // Writing again overwrites in place.
    let mut smaller = df!("product_id" => &[7i64], "stock" => &[1i64])?;
    ctx.store.write_table(&path, &mut smaller).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "product_id,stock\n7,1\n");
    Ok(())
}

#[test]
fn daily_files_lists_plain_day_numbers_in_order() {
    let (_dir, ctx) = context();
    let dir = ctx
        .store
        .partition_dir(Stage::Clean, Entity::Orders.as_str(), 2024, 5);
    for name in ["10.csv", "2.csv", "05.csv", "notes.csv", "32.csv", "3.csv.tmp"] {
        write_file(&dir.join(name), "order_id\n1\n");
    }

    let files = ctx
        .store
        .daily_files(Stage::Clean, Entity::Orders.as_str(), 2024, 5)
        .unwrap();
    let days: Vec<u32> = files.iter().map(|(day, _)| *day).collect();
    assert_eq!(days, vec![2, 10]);
    assert_eq!(files[1].1, dir.join("10.csv"));
}

#[test]
fn daily_files_is_empty_for_absent_month() {
    let (_dir, ctx) = context();
    let files = ctx
        .store
        .daily_files(Stage::Clean, Entity::Orders.as_str(), 2023, 2)
        .unwrap();
    assert!(files.is_empty());
}
