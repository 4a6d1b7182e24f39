use anyhow::{Context, Result};
use chrono::{Months, NaiveDateTime};
use tracing::debug;

use crate::ingest::RetailRow;

/// Add whole calendar years. Feb 29 lands on Feb 28 when the target year is not a leap year.
pub fn shift_years(dt: NaiveDateTime, years: u32) -> Option<NaiveDateTime> {
    let months = years.checked_mul(12)?;
    let date = dt.date().checked_add_months(Months::new(months))?;
    Some(date.and_time(dt.time()))
}

/// Move every invoice date forward by `years`. Rows without a date are left alone.
pub fn shift_invoice_dates(rows: &mut [RetailRow], years: u32) -> Result<()> {
    for row in rows.iter_mut() {
        if let Some(dt) = row.invoice_date {
            let shifted = shift_years(dt, years)
                .with_context(|| format!("Shifting {} by {} years overflows", dt, years))?;
            row.invoice_date = Some(shifted);
        }
    }
    debug!(years, rows = rows.len(), "shifted invoice dates");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    #[test]
    fn shifted_year_is_original_plus_offset() {
        for y in 2009..=2012 {
            for m in 1..=12 {
                let dt = at(y, m, 15, 10, 30);
                let shifted = shift_years(dt, 6).unwrap();
                assert_eq!(shifted.year(), y + 6);
                assert_eq!(shifted.month(), m);
                assert_eq!(shifted.time(), dt.time());
            }
        }
    }

    #[test]
    fn leap_day_clamps() {
        let shifted = shift_years(at(2012, 2, 29, 9, 0), 6).unwrap();
        assert_eq!(shifted, at(2018, 2, 28, 9, 0));
    }

    #[test]
    fn shifts_rows_in_place() {
        let mut rows = vec![
            RetailRow {
                invoice_no: Some("1".into()),
                stock_code: None,
                description: None,
                quantity: None,
                unit_price: None,
                invoice_date: Some(at(2010, 12, 1, 8, 26)),
                customer_id: None,
                country: None,
            },
            RetailRow {
                invoice_no: Some("2".into()),
                stock_code: None,
                description: None,
                quantity: None,
                unit_price: None,
                invoice_date: None,
                customer_id: None,
                country: None,
            },
        ];
        shift_invoice_dates(&mut rows, 6).unwrap();
        assert_eq!(rows[0].invoice_date, Some(at(2016, 12, 1, 8, 26)));
        assert_eq!(rows[1].invoice_date, None);
    }
}
