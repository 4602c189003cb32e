use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use ecommerce_analytics_core::{
    cleaning::{self, CleanSummary},
    config::PipelineConfig,
    enrichment::{self, EnrichmentSummary},
    store::Entity,
    JobContext,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "E-commerce analytics data preparation", long_about = None)]
struct Cli {
    /// Root directory holding raw_data/, clean_data/ and enriched_data/
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// TOML file layered over the environment configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print run summaries as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the raw extract of one or every entity for a day
    Clean(CleanArgs),
    /// Run a daily enrichment job
    Enrich(EnrichArgs),
    /// Aggregate a month of cleaned orders into revenue
    Monthly(MonthlyArgs),
    /// Clean every entity, then run both daily enrichment jobs
    RunDay(DayArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[arg(value_enum)]
    target: CleanTarget,
    /// Partition date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
}

#[derive(Args, Debug)]
struct EnrichArgs {
    #[arg(value_enum)]
    job: DailyJob,
    /// Partition date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
}

#[derive(Args, Debug)]
struct MonthlyArgs {
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

#[derive(Args, Debug)]
struct DayArgs {
    /// Partition date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CleanTarget {
    Clients,
    Products,
    Orders,
    All,
}

impl CleanTarget {
    fn entities(self) -> &'static [Entity] {
        match self {
            CleanTarget::Clients => &[Entity::Clients],
            CleanTarget::Products => &[Entity::Products],
            CleanTarget::Orders => &[Entity::Orders],
            CleanTarget::All => &Entity::ALL,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DailyJob {
    Stock,
    NewCustomers,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Report {
    Clean(CleanSummary),
    Enrichment(EnrichmentSummary),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(data_dir = %config.data_dir.display(), "configuration loaded");
    let ctx = JobContext::from_config(&config);

    let reports = match cli.command {
        Command::Clean(args) => run_clean(&ctx, args.target, args.date)?,
        Command::Enrich(args) => vec![run_enrich(&ctx, args.job, args.date)?],
        Command::Monthly(args) => {
            let summary = enrichment::chiffre_affaire_mensuel(&ctx, args.year, args.month)
                .with_context(|| format!("monthly revenue for {}-{} failed", args.year, args.month))?;
            vec![Report::Enrichment(summary)]
        }
        Command::RunDay(args) => {
            let mut reports = run_clean(&ctx, CleanTarget::All, args.date)?;
            reports.push(run_enrich(&ctx, DailyJob::Stock, args.date)?);
            reports.push(run_enrich(&ctx, DailyJob::NewCustomers, args.date)?);
            reports
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{}", render_table(&reports));
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    dotenvy::dotenv().ok();

    PipelineConfig::layered(cli.config.as_deref(), cli.data_dir.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("failed to load config file {}", path.display()),
            None => "failed to load configuration".to_string(),
        }
    })
}

fn run_clean(ctx: &JobContext, target: CleanTarget, date: NaiveDate) -> Result<Vec<Report>> {
    target
        .entities()
        .iter()
        .map(|&entity| {
            cleaning::clean_entity(ctx, entity, date)
                .map(Report::Clean)
                .with_context(|| format!("cleaning {entity} for {date} failed"))
        })
        .collect()
}

fn run_enrich(ctx: &JobContext, job: DailyJob, date: NaiveDate) -> Result<Report> {
    let summary = match job {
        DailyJob::Stock => enrichment::stock_journalier(ctx, date),
        DailyJob::NewCustomers => enrichment::suivie_nouveau_client(ctx, date),
    }
    .with_context(|| format!("{job:?} enrichment for {date} failed"))?;
    Ok(Report::Enrichment(summary))
}

fn render_table(reports: &[Report]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["step", "period", "rows in", "rows out", "notes", "output"]);

    for report in reports {
        match report {
            Report::Clean(summary) => {
                table.add_row(vec![
                    format!("clean {}", summary.entity),
                    summary.date.to_string(),
                    summary.rows_read.to_string(),
                    summary.rows_written.to_string(),
                    format!(
                        "{} duplicate, {} missing key, {} filled, {} rejected",
                        summary.duplicates_removed,
                        summary.missing_keys_dropped,
                        summary.values_filled,
                        summary.rows_rejected
                    ),
                    summary.output.display().to_string(),
                ]);
            }
            Report::Enrichment(summary) => {
                table.add_row(vec![
                    summary.job.to_string(),
                    summary.period.clone(),
                    format!("{} files", summary.inputs.len()),
                    summary.rows_written.to_string(),
                    String::new(),
                    summary.output.display().to_string(),
                ]);
            }
        }
    }

    table
}
