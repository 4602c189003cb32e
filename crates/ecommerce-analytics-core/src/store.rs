// crates/ecommerce-analytics-core/src/store.rs

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

const TABLE_EXTENSION: &str = "csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Raw,
    Clean,
    Enriched,
}

impl Stage {
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Raw => "raw_data",
            Stage::Clean => "clean_data",
            Stage::Enriched => "enriched_data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Clients,
    Products,
    Orders,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Clients, Entity::Products, Entity::Orders];

    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Clients => "clients",
            Entity::Products => "products",
            Entity::Orders => "orders",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentJob {
    StockJournalier,
    SuiviNouveauClient,
    ChiffreAffaireMensuel,
}

impl EnrichmentJob {
    pub fn as_str(self) -> &'static str {
        match self {
            EnrichmentJob::StockJournalier => "stock_journalier",
            EnrichmentJob::SuiviNouveauClient => "suivie_nouveau_client",
            EnrichmentJob::ChiffreAffaireMensuel => "chiffre_affaire_mensuel",
        }
    }
}

impl fmt::Display for EnrichmentJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves `<root>/<stage>/<dataset>/<year>/<month>/<leaf>.csv` locations and moves
/// frames in and out of them. Month and day segments are never zero-padded.
#[derive(Debug, Clone)]
pub struct PartitionedStore {
    root: PathBuf,
}

impl PartitionedStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn partition_dir(&self, stage: Stage, dataset: &str, year: i32, month: u32) -> PathBuf {
        self.root
            .join(stage.dir_name())
            .join(dataset)
            .join(year.to_string())
            .join(month.to_string())
    }

    fn leaf_path(&self, stage: Stage, dataset: &str, year: i32, month: u32, leaf: u32) -> PathBuf {
        self.partition_dir(stage, dataset, year, month)
            .join(format!("{leaf}.{TABLE_EXTENSION}"))
    }

    pub fn raw_path(&self, entity: Entity, date: NaiveDate) -> PathBuf {
        self.leaf_path(Stage::Raw, entity.as_str(), date.year(), date.month(), date.day())
    }

    pub fn clean_path(&self, entity: Entity, date: NaiveDate) -> PathBuf {
        self.leaf_path(Stage::Clean, entity.as_str(), date.year(), date.month(), date.day())
    }

    pub fn enriched_path(&self, job: EnrichmentJob, date: NaiveDate) -> PathBuf {
        self.leaf_path(Stage::Enriched, job.as_str(), date.year(), date.month(), date.day())
    }

    /// Month-keyed outputs use the month number as the file name: `<year>/<month>/<month>.csv`.
    pub fn monthly_path(&self, job: EnrichmentJob, year: i32, month: u32) -> Result<PathBuf> {
        validate_month(month)?;
        Ok(self.leaf_path(Stage::Enriched, job.as_str(), year, month, month))
    }

    pub fn require(&self, path: &Path) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
            })
        }
    }

    /// Loads a table with every column as text; typing is left to the caller.
    pub fn read_table(&self, path: &Path) -> Result<DataFrame> {
        self.require(path)?;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        debug!(path = %path.display(), rows = df.height(), "loaded table");
        Ok(df)
    }

    /// Writes to a sibling temporary file first so the target is either the old
    /// file, the complete new file, or absent.
    pub fn write_table(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = path.with_extension(format!("{TABLE_EXTENSION}.tmp"));
        let written = File::create(&staging)
            .map_err(PipelineError::from)
            .and_then(|mut file| {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(df)
                    .map_err(PipelineError::from)
            });

        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        fs::rename(&staging, path)?;
        debug!(path = %path.display(), rows = df.height(), "wrote table");
        Ok(())
    }

    /// Day files present under one month partition, ordered by day. Only stems that are
    /// plain day numbers in 1..=31 count.
    pub fn daily_files(
        &self,
        stage: Stage,
        dataset: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<(u32, PathBuf)>> {
        validate_month(month)?;
        let dir = self.partition_dir(stage, dataset, year, month);
        let pattern = format!(
            "{}/*.{TABLE_EXTENSION}",
            glob::Pattern::escape(&dir.to_string_lossy())
        );

        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|err| PipelineError::Io(err.into()))?;
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let Ok(day) = stem.parse::<u32>() else {
                continue;
            };
            if (1..=31).contains(&day) && stem == day.to_string() {
                files.push((day, path));
            }
        }

        files.sort_by_key(|(day, _)| *day);
        Ok(files)
    }
}

fn validate_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(PipelineError::InvalidDate(format!(
            "month must be between 1 and 12, got {month}"
        )))
    }
}
