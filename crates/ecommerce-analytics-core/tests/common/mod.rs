#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ecommerce_analytics_core::{config::PipelineConfig, store::Entity, JobContext};
use polars::prelude::*;
use tempfile::TempDir;

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Fresh data root per test; keep the `TempDir` alive for the test's duration.
pub fn context() -> (TempDir, JobContext) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let ctx = JobContext::from_config(&PipelineConfig::new(dir.path()));
    (dir, ctx)
}

pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("partition dir")).expect("create partition");
    fs::write(path, contents).expect("write fixture");
}

pub fn write_raw(ctx: &JobContext, entity: Entity, date: NaiveDate, contents: &str) -> PathBuf {
    let path = ctx.store.raw_path(entity, date);
    write_file(&path, contents);
    path
}

pub fn write_clean(ctx: &JobContext, entity: Entity, date: NaiveDate, contents: &str) -> PathBuf {
    let path = ctx.store.clean_path(entity, date);
    write_file(&path, contents);
    path
}

pub fn read_output(ctx: &JobContext, path: &Path) -> DataFrame {
    ctx.store.read_table(path).expect("read output table")
}

pub fn text(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap_or_else(|_| panic!("missing column {name}"))
        .str()
        .expect("text column")
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

pub fn ints(df: &DataFrame, name: &str) -> Vec<i64> {
    text(df, name)
        .into_iter()
        .map(|value| value.expect("non-null").parse().expect("integer"))
        .collect()
}

pub fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
    text(df, name)
        .into_iter()
        .map(|value| value.expect("non-null").parse().expect("float"))
        .collect()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}
