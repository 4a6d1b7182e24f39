use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::debug;

use super::utils::NaturalKey;
use super::InvoiceLine;

type GroupKey = (String, String, NaturalKey, u32);

/// Collapse duplicate line entries: one line per (stock code, country, customer, invoice).
///
/// Quantities are summed, price and date take the maximum and the description
/// is the first one seen. Groups come out in ascending key order.
pub fn collapse_lines(rows: Vec<InvoiceLine>) -> Result<Vec<InvoiceLine>> {
    let before = rows.len();
    let mut groups: BTreeMap<GroupKey, InvoiceLine> = BTreeMap::new();

    for row in rows {
        let key = (
            row.stock_code.clone(),
            row.country.clone(),
            NaturalKey::new(&row.customer_id),
            row.invoice,
        );
        match groups.get_mut(&key) {
            Some(acc) => {
                acc.quantity = acc.quantity.checked_add(row.quantity).with_context(|| {
                    format!(
                        "quantity overflow summing stock {} on invoice {}",
                        row.stock_code, row.invoice
                    )
                })?;
                if row.unit_price > acc.unit_price {
                    acc.unit_price = row.unit_price;
                }
                if row.date > acc.date {
                    acc.date = row.date;
                }
            }
            None => {
                groups.insert(key, row);
            }
        }
    }

    let collapsed: Vec<InvoiceLine> = groups.into_values().collect();
    debug!(before, after = collapsed.len(), "collapsed duplicate lines");
    Ok(collapsed)
}
