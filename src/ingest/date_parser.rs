use chrono::NaiveDateTime;

/// Layouts seen in UCI retail exports, tried in order.
const INVOICE_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse an `InvoiceDate` cell, e.g. `"12/1/2010 8:26"` or `"2010-12-01 08:26:00"`.
pub fn parse_invoice_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }
    INVOICE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_us_layout_without_padding() {
        let dt = parse_invoice_date("12/1/2010 8:26").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2010, 12, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (8, 26, 0));
    }

    #[test]
    fn parses_iso_layouts() {
        let a = parse_invoice_date("2011-06-15 14:03:09").unwrap();
        let b = parse_invoice_date("2011-06-15T14:03:09").unwrap();
        assert_eq!(a, b);
        assert!(parse_invoice_date("2011-06-15 14:03").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_invoice_date("").is_none());
        assert!(parse_invoice_date("yesterday").is_none());
        assert!(parse_invoice_date("13/40/2011 10:00").is_none());
    }
}
