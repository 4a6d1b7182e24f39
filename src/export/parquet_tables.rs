use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampSecondArray, UInt32Array, UInt8Array},
    datatypes::{DataType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{fs, fs::File, path::Path, sync::Arc};
use tracing::info;

use super::{CATALOG_PARQUET_FILE, ORDERS_PARQUET_FILE, ORDER_ITEMS_PARQUET_FILE};
use crate::tables::{Order, OrderItem, Product, SeedTables};

/// A seed table with a fixed Arrow layout.
pub trait ArrowTable: Sized {
    fn schema() -> Schema;
    /// Column arrays matching `schema()`, one element per row.
    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef>;
}

impl ArrowTable for Product {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Id", DataType::UInt32, false),
            Field::new("CatalogBrandId", DataType::UInt32, false),
            Field::new("CatalogTypeId", DataType::UInt32, false),
            Field::new("Name", DataType::Utf8, false),
            Field::new("Description", DataType::Utf8, false),
            Field::new("Price", DataType::Float64, false),
            Field::new("AvailableStock", DataType::UInt32, false),
            Field::new("MaxStockThreshold", DataType::UInt32, false),
            Field::new("OnReorder", DataType::UInt8, false),
            Field::new("RestockThreshold", DataType::UInt32, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.catalog_brand_id))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.catalog_type_id))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.description.as_str()))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.price))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.available_stock))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.max_stock_threshold))),
            Arc::new(UInt8Array::from_iter_values(rows.iter().map(|r| r.on_reorder))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.restock_threshold))),
        ]
    }
}

impl ArrowTable for Order {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Id", DataType::UInt32, false),
            Field::new("Address_Country", DataType::Utf8, false),
            Field::new("OrderDate", DataType::Timestamp(TimeUnit::Second, None), false),
            Field::new("Description", DataType::Utf8, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.address_country.as_str()))),
            Arc::new(TimestampSecondArray::from_iter_values(
                rows.iter().map(|r| r.order_date.and_utc().timestamp()),
            )),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.description.as_str()))),
        ]
    }
}

impl ArrowTable for OrderItem {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Id", DataType::UInt32, false),
            Field::new("OrderId", DataType::UInt32, false),
            Field::new("ProductId", DataType::UInt32, false),
            Field::new("UnitPrice", DataType::Float64, false),
            Field::new("Units", DataType::Int64, false),
            Field::new("ProductName", DataType::Utf8, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.order_id))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.product_id))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.unit_price))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.units))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.product_name.as_str()))),
        ]
    }
}

/// Write `rows` as a single-batch, Snappy-compressed Parquet file.
pub fn write_parquet<T: ArrowTable>(path: &Path, rows: &[T]) -> Result<()> {
    let schema = Arc::new(T::schema());
    let batch = RecordBatch::try_new(schema.clone(), T::to_arrays(rows))
        .with_context(|| format!("building record batch for {}", path.display()))?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .with_context(|| format!("creating Arrow writer for {}", path.display()))?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    info!(path = %path.display(), rows = rows.len(), "wrote parquet");
    Ok(())
}

/// Emit `catalog.parquet`, `orders.parquet` and `orderItems.parquet` under `dir`.
pub fn write_parquet_tables(tables: &SeedTables, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_parquet(&dir.join(CATALOG_PARQUET_FILE), &tables.products)?;
    write_parquet(&dir.join(ORDERS_PARQUET_FILE), &tables.orders)?;
    write_parquet(&dir.join(ORDER_ITEMS_PARQUET_FILE), &tables.order_items)?;
    Ok(())
}
