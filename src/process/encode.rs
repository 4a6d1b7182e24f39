use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::utils::NaturalKey;
use super::{CleanRow, InvoiceLine};

/// Dense integer codes for every distinct invoice label, starting at `base`.
/// Codes follow the sorted order of the labels.
pub fn invoice_codes<'a, I>(labels: I, base: u32) -> Result<HashMap<String, u32>>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<(NaturalKey, &str)> = labels
        .into_iter()
        .map(|l| (NaturalKey::new(l), l))
        .collect();

    let mut codes = HashMap::with_capacity(distinct.len());
    for (i, (_, label)) in distinct.into_iter().enumerate() {
        let offset = u32::try_from(i).context("too many invoices to encode")?;
        let code = base
            .checked_add(offset)
            .context("invoice code overflows u32")?;
        codes.entry(label.to_string()).or_insert(code);
    }
    Ok(codes)
}

/// Replace each row's invoice label with its factorized code.
pub fn factorize_invoices(rows: Vec<CleanRow>, base: u32) -> Result<Vec<InvoiceLine>> {
    let codes = invoice_codes(rows.iter().map(|r| r.invoice_no.as_str()), base)?;
    debug!(invoices = codes.len(), base, "factorized invoice numbers");

    rows.into_iter()
        .map(|r| -> Result<InvoiceLine> {
            let invoice = *codes
                .get(&r.invoice_no)
                .with_context(|| format!("no code for invoice {}", r.invoice_no))?;
            Ok(InvoiceLine {
                invoice,
                stock_code: r.stock_code,
                description: r.description,
                quantity: r.quantity,
                unit_price: r.unit_price,
                date: r.date,
                customer_id: r.customer_id,
                country: r.country,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dense_and_ordered() {
        let labels = ["536370", "536365", "536370", "536366"];
        let codes = invoice_codes(labels.iter().copied(), 1001).unwrap();
        assert_eq!(codes.len(), 3);
        assert_eq!(codes["536365"], 1001);
        assert_eq!(codes["536366"], 1002);
        assert_eq!(codes["536370"], 1003);
    }

    #[test]
    fn numeric_labels_sort_by_value() {
        let codes = invoice_codes(["100", "99"].iter().copied(), 1001).unwrap();
        assert_eq!(codes["99"], 1001);
        assert_eq!(codes["100"], 1002);
    }

    #[test]
    fn lettered_labels_follow_numbers() {
        let codes = invoice_codes(["A563185", "581587"].iter().copied(), 1001).unwrap();
        assert_eq!(codes["581587"], 1001);
        assert_eq!(codes["A563185"], 1002);
    }
}
