// src/process/mod.rs
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::config::TransformConfig;
use crate::ingest::RetailRow;
use crate::tables::SeedTables;

pub mod aggregate;
pub mod derive;
pub mod encode;
pub mod filter;
pub mod shift;
pub mod utils;

/// A transaction row with every field present.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub date: NaiveDateTime,
    pub customer_id: String,
    pub country: String,
}

impl CleanRow {
    pub fn from_retail(row: RetailRow) -> Option<Self> {
        Some(Self {
            invoice_no: row.invoice_no?,
            stock_code: row.stock_code?,
            description: row.description?,
            quantity: row.quantity?,
            unit_price: row.unit_price?,
            date: row.invoice_date?,
            customer_id: row.customer_id?,
            country: row.country?,
        })
    }
}

/// A transaction row after invoice factorization.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub invoice: u32,
    pub stock_code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub date: NaiveDateTime,
    pub customer_id: String,
    pub country: String,
}

/// Row counts after each stage of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub input: usize,
    pub after_trim: usize,
    pub after_dropna: usize,
    pub after_quantity: usize,
    pub after_country: usize,
    pub collapsed_lines: usize,
    pub products: usize,
    pub orders: usize,
    pub order_items: usize,
}

/// Run the whole transformation over an in-memory transaction log.
#[tracing::instrument(level = "info", skip_all, fields(rows = rows.len()))]
pub fn transform(mut rows: Vec<RetailRow>, cfg: &TransformConfig) -> Result<(SeedTables, StageCounts)> {
    let mut counts = StageCounts {
        input: rows.len(),
        ..StageCounts::default()
    };

    shift::shift_invoice_dates(&mut rows, cfg.year_offset)?;

    let rows = filter::trim_month(rows, cfg.trim_year, cfg.trim_month);
    counts.after_trim = rows.len();

    let rows = filter::drop_incomplete(rows);
    counts.after_dropna = rows.len();

    let rows = filter::drop_non_positive_quantity(rows);
    counts.after_quantity = rows.len();

    let mut rows = filter::filter_countries(rows, cfg);
    counts.after_country = rows.len();
    if rows.is_empty() {
        anyhow::bail!("no transactions left after filtering ({:?})", counts);
    }

    for r in rows.iter_mut() {
        r.description = utils::sanitize_description(&r.description);
    }

    let lines = encode::factorize_invoices(rows, cfg.invoice_base)?;
    let lines = aggregate::collapse_lines(lines)?;
    counts.collapsed_lines = lines.len();

    let products = derive::build_products(&lines, cfg)?;
    let orders = derive::build_orders(&lines);
    let order_items = derive::build_order_items(&lines, &products, cfg)?;
    counts.products = products.len();
    counts.orders = orders.len();
    counts.order_items = order_items.len();

    info!(?counts, "transform complete");
    Ok((
        SeedTables {
            products,
            orders,
            order_items,
        },
        counts,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_retail;
    use chrono::Datelike;

    const LOG: &str = "\
InvoiceNo,StockCode,Description,Quantity,UnitPrice,InvoiceDate,CustomerID,Country
536365,85123A,\"HEART, WHITE\",6,2.55,12/1/2010 8:26,17850,France
536365,85123A,\"HEART, WHITE\",2,2.75,12/1/2010 8:30,17850,France
536366,22633,HAND WARMER,6,1.85,12/1/2010 8:28,17850,Belgium
536367,22633,HAND WARMER,-1,1.85,12/1/2010 9:00,17850,France
536368,22633,HAND WARMER,1,1.85,12/5/2011 9:00,17850,France
536369,22633,HAND WARMER,1,1.85,12/1/2010 9:00,,France
";

    #[test]
    fn transform_small_log() {
        let rows = read_retail(LOG.as_bytes()).unwrap();
        let cfg = TransformConfig {
            min_country_rows: 0,
            ..TransformConfig::default()
        };
        let (tables, counts) = transform(rows, &cfg).unwrap();

        assert_eq!(counts.input, 6);
        // 12/5/2011 shifts into December 2017
        assert_eq!(counts.after_trim, 5);
        assert_eq!(counts.after_dropna, 4);
        assert_eq!(counts.after_quantity, 3);
        assert_eq!(counts.collapsed_lines, 2);

        assert_eq!(tables.products.len(), 2);
        let heart = tables
            .products
            .iter()
            .find(|p| p.stock_code == "85123A")
            .unwrap();
        assert_eq!(heart.description, "HEART- WHITE");

        assert_eq!(tables.orders.len(), 2);
        assert_eq!(tables.orders[0].id, 1001);
        assert_eq!(tables.orders[0].order_date.year(), 2016);
        assert_eq!(tables.orders[1].address_country, "United States");

        let heart_item = tables
            .order_items
            .iter()
            .find(|i| i.product_id == heart.id)
            .unwrap();
        assert_eq!(heart_item.units, 8);
        assert_eq!(heart_item.unit_price, 2.75);
    }

    #[test]
    fn empty_result_is_an_error() {
        let rows = read_retail(LOG.as_bytes()).unwrap();
        // default threshold removes every country in this tiny log
        assert!(transform(rows, &TransformConfig::default()).is_err());
    }
}
