// src/ingest/mod.rs
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

pub mod date_parser;

use date_parser::parse_invoice_date;

/// One line of the transaction log. Empty and NA cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetailRow {
    pub invoice_no: Option<String>,
    pub stock_code: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub invoice_date: Option<NaiveDateTime>,
    pub customer_id: Option<String>,
    pub country: Option<String>,
}

impl RetailRow {
    /// True when every field is present.
    pub fn is_complete(&self) -> bool {
        self.invoice_no.is_some()
            && self.stock_code.is_some()
            && self.description.is_some()
            && self.quantity.is_some()
            && self.unit_price.is_some()
            && self.invoice_date.is_some()
            && self.customer_id.is_some()
            && self.country.is_some()
    }
}

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    invoice_no: usize,
    stock_code: usize,
    description: usize,
    quantity: usize,
    unit_price: usize,
    invoice_date: usize,
    customer_id: usize,
    country: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
                .with_context(|| format!("Missing required column `{}`", name))
        };
        Ok(Self {
            invoice_no: find("InvoiceNo")?,
            stock_code: find("StockCode")?,
            description: find("Description")?,
            quantity: find("Quantity")?,
            unit_price: find("UnitPrice")?,
            invoice_date: find("InvoiceDate")?,
            customer_id: find("CustomerID")?,
            country: find("Country")?,
        })
    }
}

/// Read `retail.csv` from disk.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_retail_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RetailRow>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open input CSV: {:?}", path.as_ref()))?;
    let rows = read_retail(file)
        .with_context(|| format!("Failed to load {:?}", path.as_ref()))?;
    info!(rows = rows.len(), "loaded retail transactions");
    Ok(rows)
}

/// Parse transaction rows from any reader that yields CSV with a header line.
pub fn read_retail<R: Read>(reader: R) -> Result<Vec<RetailRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let idx = ColumnIndex::from_headers(&headers)?;
    debug!(?idx, "resolved input columns");

    let mut rows = Vec::new();
    for (n, result) in rdr.records().enumerate() {
        // header is line 1
        let line = n + 2;
        let record = result.with_context(|| format!("CSV parse error at line {}", line))?;
        rows.push(parse_record(&record, &idx, line)?);
    }
    Ok(rows)
}

fn parse_record(record: &StringRecord, idx: &ColumnIndex, line: usize) -> Result<RetailRow> {
    let quantity = cell(record, idx.quantity)
        .map(str::trim)
        .map(|s| parse_quantity(s).with_context(|| format!("Bad Quantity `{}` at line {}", s, line)))
        .transpose()?;
    let unit_price = cell(record, idx.unit_price)
        .map(str::trim)
        .map(|s| parse_price(s).with_context(|| format!("Bad UnitPrice `{}` at line {}", s, line)))
        .transpose()?;
    let invoice_date = cell(record, idx.invoice_date)
        .map(|s| {
            parse_invoice_date(s)
                .with_context(|| format!("Bad InvoiceDate `{}` at line {}", s, line))
        })
        .transpose()?;

    Ok(RetailRow {
        invoice_no: cell(record, idx.invoice_no).map(str::to_string),
        stock_code: cell(record, idx.stock_code).map(str::to_string),
        description: cell(record, idx.description).map(str::to_string),
        quantity,
        unit_price,
        invoice_date,
        customer_id: cell(record, idx.customer_id).map(normalize_customer_id),
        country: cell(record, idx.country).map(str::to_string),
    })
}

/// Tokens read as missing, on top of the empty cell.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Raw cell text, or `None` when absent, empty or an NA token.
/// Whitespace is kept as is.
fn cell(record: &StringRecord, i: usize) -> Option<&str> {
    record
        .get(i)
        .filter(|s| !s.is_empty() && !NA_TOKENS.contains(s))
}

/// Quantities are integral, but some exports write them as `6.0`.
fn parse_quantity(s: &str) -> Result<i64> {
    if let Ok(q) = s.parse::<i64>() {
        return Ok(q);
    }
    let f: f64 = s.parse()?;
    if f.fract() != 0.0 {
        anyhow::bail!("quantity is not integral");
    }
    Ok(f as i64)
}

fn parse_price(s: &str) -> Result<f64> {
    let p: f64 = s.parse()?;
    if !p.is_finite() {
        anyhow::bail!("price is not finite");
    }
    Ok(p)
}

/// `17850.0` and `17850` name the same customer.
fn normalize_customer_id(s: &str) -> String {
    s.strip_suffix(".0").unwrap_or(s).to_string()
}
