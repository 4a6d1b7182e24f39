pub mod config;
pub mod export;
pub mod ingest;
pub mod process;
pub mod tables;
pub mod verify;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub use config::TransformConfig;
pub use process::StageCounts;
pub use tables::SeedTables;

/// Which optional artifacts to emit alongside the three CSVs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    pub sql: bool,
    pub parquet: bool,
}

/// Load `input`, transform it and write every requested artifact under `out_dir`.
/// Nothing is written unless the tables pass verification.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    out_dir: Q,
    cfg: &TransformConfig,
    emit: EmitOptions,
) -> Result<(SeedTables, StageCounts)> {
    let out_dir = out_dir.as_ref();

    info!("reading input {}", input.as_ref().display());
    let rows = ingest::load_retail_csv(&input)?;

    info!("processing");
    let (tables, counts) = process::transform(rows, cfg).context("transform failed")?;

    verify::verify_tables(&tables, cfg).ensure_ok()?;

    info!("writing seed files to {}", out_dir.display());
    export::write_csv_tables(&tables, out_dir)?;
    if emit.sql {
        export::write_sql_scripts(&tables, out_dir)?;
    }
    if emit.parquet {
        export::write_parquet_tables(&tables, out_dir)?;
    }
    Ok((tables, counts))
}
