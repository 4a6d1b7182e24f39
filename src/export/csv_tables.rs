use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};
use tracing::info;

use super::{CATALOG_FILE, ORDERS_FILE, ORDER_ITEMS_FILE};
use crate::tables::SeedTables;

/// Write `records` with a header row derived from the record type.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in records {
        wtr.serialize(r)
            .with_context(|| format!("Failed to write record to {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "wrote csv");
    Ok(())
}

pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    rdr.deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("{}: bad record #{}", path.display(), i + 1)))
        .collect()
}

/// Emit `catalog.csv`, `orders.csv` and `orderItems.csv` under `dir`.
pub fn write_csv_tables(tables: &SeedTables, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_records(&dir.join(CATALOG_FILE), &tables.products)?;
    write_records(&dir.join(ORDERS_FILE), &tables.orders)?;
    write_records(&dir.join(ORDER_ITEMS_FILE), &tables.order_items)?;
    Ok(())
}

/// Read the three CSV tables back from `dir`.
pub fn load_tables(dir: &Path) -> Result<SeedTables> {
    Ok(SeedTables {
        products: read_records(&dir.join(CATALOG_FILE))?,
        orders: read_records(&dir.join(ORDERS_FILE))?,
        order_items: read_records(&dir.join(ORDER_ITEMS_FILE))?,
    })
}
