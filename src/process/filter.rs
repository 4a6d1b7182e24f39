use chrono::Datelike;
use std::collections::HashMap;
use tracing::{debug, info};

use super::CleanRow;
use crate::config::TransformConfig;
use crate::ingest::RetailRow;

/// Drop rows dated inside `year`/`month`. Undated rows pass through.
pub fn trim_month(rows: Vec<RetailRow>, year: i32, month: u32) -> Vec<RetailRow> {
    let before = rows.len();
    let kept: Vec<RetailRow> = rows
        .into_iter()
        .filter(|r| {
            !r.invoice_date
                .is_some_and(|d| d.year() == year && d.month() == month)
        })
        .collect();
    debug!(year, month, dropped = before - kept.len(), "trimmed boundary month");
    kept
}

/// Keep only rows with every field present.
pub fn drop_incomplete(rows: Vec<RetailRow>) -> Vec<CleanRow> {
    let before = rows.len();
    let kept: Vec<CleanRow> = rows.into_iter().filter_map(CleanRow::from_retail).collect();
    debug!(dropped = before - kept.len(), "dropped incomplete rows");
    kept
}

/// Returns, cancellations and zero-unit lines carry no sales.
pub fn drop_non_positive_quantity(rows: Vec<CleanRow>) -> Vec<CleanRow> {
    let before = rows.len();
    let kept: Vec<CleanRow> = rows.into_iter().filter(|r| r.quantity > 0).collect();
    debug!(dropped = before - kept.len(), "dropped non-positive quantities");
    kept
}

/// Row count per country.
pub fn country_counts(rows: &[CleanRow]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in rows {
        *counts.entry(r.country.as_str()).or_default() += 1;
    }
    counts
}

/// Keep countries with more than `min_country_rows` rows, never the excluded one,
/// then relabel `remap_from` as `remap_to`.
pub fn filter_countries(rows: Vec<CleanRow>, cfg: &TransformConfig) -> Vec<CleanRow> {
    let allowed: Vec<String> = {
        let counts = country_counts(&rows);
        let mut allowed: Vec<String> = counts
            .into_iter()
            .filter(|(country, n)| *n > cfg.min_country_rows && *country != cfg.excluded_country)
            .map(|(country, _)| country.to_string())
            .collect();
        allowed.sort();
        allowed
    };
    info!(countries = ?allowed, "countries above threshold");

    rows.into_iter()
        .filter(|r| allowed.binary_search(&r.country).is_ok())
        .map(|mut r| {
            if r.country == cfg.remap_from {
                r.country = cfg.remap_to.clone();
            }
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn retail(date: Option<NaiveDateTime>, customer: Option<&str>) -> RetailRow {
        RetailRow {
            invoice_no: Some("536365".into()),
            stock_code: Some("85123A".into()),
            description: Some("HEART".into()),
            quantity: Some(6),
            unit_price: Some(2.55),
            invoice_date: date,
            customer_id: customer.map(str::to_string),
            country: Some("France".into()),
        }
    }

    fn clean(country: &str, quantity: i64) -> CleanRow {
        CleanRow {
            invoice_no: "1".into(),
            stock_code: "A".into(),
            description: "thing".into(),
            quantity,
            unit_price: 1.0,
            date: date(2016, 1, 1),
            customer_id: "1".into(),
            country: country.into(),
        }
    }

    #[test]
    fn trims_only_the_boundary_month() {
        let rows = vec![
            retail(Some(date(2017, 12, 9)), Some("1")),
            retail(Some(date(2017, 11, 30)), Some("1")),
            retail(Some(date(2016, 12, 9)), Some("1")),
            retail(None, Some("1")),
        ];
        let kept = trim_month(rows, 2017, 12);
        assert_eq!(kept.len(), 3);
        assert!(kept
            .iter()
            .all(|r| r.invoice_date != Some(date(2017, 12, 9))));
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let rows = vec![
            retail(Some(date(2016, 1, 1)), Some("1")),
            retail(Some(date(2016, 1, 1)), None),
            retail(None, Some("1")),
        ];
        assert_eq!(drop_incomplete(rows).len(), 1);
    }

    #[test]
    fn quantity_must_be_positive() {
        let rows = vec![clean("France", 3), clean("France", 0), clean("France", -2)];
        let kept = drop_non_positive_quantity(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].quantity, 3);
    }

    #[test]
    fn country_threshold_exclusion_and_remap() {
        let cfg = TransformConfig {
            min_country_rows: 2,
            ..TransformConfig::default()
        };
        let mut rows = Vec::new();
        rows.extend((0..3).map(|_| clean("France", 1)));
        rows.extend((0..3).map(|_| clean("Belgium", 1)));
        rows.extend((0..5).map(|_| clean("Channel Islands", 1)));
        // exactly at the threshold is not enough
        rows.extend((0..2).map(|_| clean("Spain", 1)));

        let kept = filter_countries(rows, &cfg);
        assert_eq!(kept.len(), 6);
        assert_eq!(kept.iter().filter(|r| r.country == "France").count(), 3);
        assert_eq!(kept.iter().filter(|r| r.country == "United States").count(), 3);
        assert!(kept.iter().all(|r| r.country != "Belgium"));
        assert!(kept.iter().all(|r| r.country != "Channel Islands"));
        assert!(kept.iter().all(|r| r.country != "Spain"));
    }

    #[test]
    fn remap_target_merges_with_existing_rows() {
        let cfg = TransformConfig {
            min_country_rows: 0,
            ..TransformConfig::default()
        };
        let rows = vec![clean("United States", 1), clean("Belgium", 1)];
        let kept = filter_countries(rows, &cfg);
        assert_eq!(country_counts(&kept).get("United States"), Some(&2));
    }
}
