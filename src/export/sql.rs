use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use super::{CATALOG_SQL_FILE, ORDERS_SQL_FILE, ORDER_ITEMS_SQL_FILE};
use crate::tables::{Order, OrderItem, Product, SeedTables};

/// SQL Server accepts at most 1000 row values per insert.
pub const MAX_ROWS_PER_INSERT: usize = 1000;

/// A table row that can be rendered as one tuple of an `insert ... values` statement.
pub trait SqlRow {
    /// Schema-qualified target table.
    const TABLE: &'static str;
    /// Comma separated column list, in the order `values` renders them.
    const COLUMNS: &'static str;
    /// `(v1,v2,...)` for this row.
    fn values(&self) -> String;
}

impl SqlRow for Product {
    const TABLE: &'static str = "Catalog.CatalogItems";
    const COLUMNS: &'static str = "Id,CatalogBrandId,CatalogTypeId,Name,Description,Price,AvailableStock,MaxStockThreshold,OnReorder,RestockThreshold";

    fn values(&self) -> String {
        format!(
            "({},{},{},{},{},{},{},{},{},{})",
            self.id,
            self.catalog_brand_id,
            self.catalog_type_id,
            quote(&self.name),
            quote(&self.description),
            self.price,
            self.available_stock,
            self.max_stock_threshold,
            self.on_reorder,
            self.restock_threshold
        )
    }
}

impl SqlRow for Order {
    const TABLE: &'static str = "Ordering.Orders";
    const COLUMNS: &'static str = "Id,Address_Country,OrderDate";

    fn values(&self) -> String {
        format!(
            "({},{},'{}.0000000')",
            self.id,
            quote(&self.address_country),
            self.order_date.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

impl SqlRow for OrderItem {
    const TABLE: &'static str = "Ordering.OrderItems";
    const COLUMNS: &'static str = "Id,OrderId,ProductId,UnitPrice,Units,ProductName";

    fn values(&self) -> String {
        format!(
            "({},{},{},{},{},{})",
            self.id,
            self.order_id,
            self.product_id,
            self.unit_price,
            self.units,
            quote(&self.product_name)
        )
    }
}

/// Single-quoted SQL string literal.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Render `rows` as consecutive insert statements of at most `batch` tuples each.
pub fn render_inserts<R: SqlRow, W: Write>(out: &mut W, rows: &[R], batch: usize) -> Result<usize> {
    let batch = batch.max(1);
    let mut statements = 0;
    for chunk in rows.chunks(batch) {
        writeln!(out, "insert into {} ({}) values", R::TABLE, R::COLUMNS)?;
        for (i, row) in chunk.iter().enumerate() {
            let end = if i + 1 == chunk.len() { ";" } else { "," };
            writeln!(out, "{}{}", row.values(), end)?;
        }
        writeln!(out)?;
        statements += 1;
    }
    Ok(statements)
}

fn write_script<R: SqlRow>(path: &Path, rows: &[R]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let statements = render_inserts(&mut out, rows, MAX_ROWS_PER_INSERT)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush()?;
    info!(path = %path.display(), rows = rows.len(), statements, "wrote sql seed script");
    Ok(())
}

/// Emit `CatalogItems.sql`, `Orders.sql` and `OrderItems.sql` under `dir`.
pub fn write_sql_scripts(tables: &SeedTables, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_script(&dir.join(CATALOG_SQL_FILE), &tables.products)?;
    write_script(&dir.join(ORDERS_SQL_FILE), &tables.orders)?;
    write_script(&dir.join(ORDER_ITEMS_SQL_FILE), &tables.order_items)?;
    Ok(())
}
