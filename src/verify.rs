// src/verify.rs
use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::TransformConfig;
use crate::tables::SeedTables;

/// Broken invariants found in a set of seed tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub products: usize,
    pub orders: usize,
    pub order_items: usize,
    pub violations: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turn any violation into an error listing all of them.
    pub fn ensure_ok(&self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        anyhow::bail!(
            "{} integrity violation(s):\n  {}",
            self.violations.len(),
            self.violations.join("\n  ")
        )
    }
}

/// Ids must be `base, base+1, ...` in row order.
fn check_dense(label: &str, ids: impl Iterator<Item = u32>, base: u32, out: &mut Vec<String>) {
    for (i, id) in ids.enumerate() {
        let expected = u64::from(base) + i as u64;
        if u64::from(id) != expected {
            out.push(format!("{} id at row {} is {}, expected {}", label, i, id, expected));
            // one report per table is enough
            return;
        }
    }
}

/// Check the emitted tables against the invariants of a run made with `cfg`.
pub fn verify_tables(tables: &SeedTables, cfg: &TransformConfig) -> VerifyReport {
    let mut violations = Vec::new();

    check_dense("product", tables.products.iter().map(|p| p.id), cfg.product_base, &mut violations);
    check_dense("order item", tables.order_items.iter().map(|i| i.id), cfg.item_base, &mut violations);
    check_dense("order", tables.orders.iter().map(|o| o.id), cfg.invoice_base, &mut violations);

    let product_ids: HashSet<u32> = tables.products.iter().map(|p| p.id).collect();
    let order_ids: HashSet<u32> = tables.orders.iter().map(|o| o.id).collect();

    for product in &tables.products {
        if !product.price.is_finite() {
            violations.push(format!("product {} has price {}", product.id, product.price));
        }
    }

    for item in &tables.order_items {
        if !item.unit_price.is_finite() {
            violations.push(format!("order item {} has unit price {}", item.id, item.unit_price));
        }
        if !product_ids.contains(&item.product_id) {
            violations.push(format!("order item {} references missing product {}", item.id, item.product_id));
        }
        if !order_ids.contains(&item.order_id) {
            violations.push(format!("order item {} references missing order {}", item.id, item.order_id));
        }
        if item.units <= 0 {
            violations.push(format!("order item {} has {} units", item.id, item.units));
        }
    }

    for order in &tables.orders {
        let country = order.address_country.as_str();
        if country == cfg.excluded_country {
            violations.push(format!("order {} ships to excluded country {}", order.id, country));
        }
        if country == cfg.remap_from && cfg.remap_from != cfg.remap_to {
            violations.push(format!("order {} still uses remapped country {}", order.id, country));
        }
        let d = order.order_date;
        if d.year() == cfg.trim_year && d.month() == cfg.trim_month {
            violations.push(format!("order {} is dated inside the trimmed month ({})", order.id, d));
        }
    }

    let report = VerifyReport {
        products: tables.products.len(),
        orders: tables.orders.len(),
        order_items: tables.order_items.len(),
        violations,
    };
    if report.is_ok() {
        info!(
            products = report.products,
            orders = report.orders,
            order_items = report.order_items,
            "seed tables verified"
        );
    } else {
        warn!(violations = report.violations.len(), "seed tables failed verification");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{Order, OrderItem, Product};
    use chrono::NaiveDate;

    fn product(id: u32) -> Product {
        Product {
            id,
            catalog_brand_id: 5,
            catalog_type_id: 5,
            name: "P".into(),
            description: "P".into(),
            price: 1.0,
            available_stock: 4,
            max_stock_threshold: 5,
            on_reorder: 0,
            restock_threshold: 1,
            stock_code: String::new(),
        }
    }

    fn order(id: u32, country: &str, month: u32) -> Order {
        Order {
            id,
            address_country: country.into(),
            order_date: NaiveDate::from_ymd_opt(2017, month, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            description: String::new(),
        }
    }

    fn item(id: u32, order_id: u32, product_id: u32, units: i64) -> OrderItem {
        OrderItem {
            id,
            order_id,
            product_id,
            unit_price: 1.0,
            units,
            product_name: "P".into(),
        }
    }

    fn valid() -> SeedTables {
        SeedTables {
            products: vec![product(100), product(101)],
            orders: vec![order(1001, "France", 3), order(1002, "United States", 4)],
            order_items: vec![item(1000, 1001, 100, 2), item(1001, 1002, 101, 1)],
        }
    }

    #[test]
    fn valid_tables_pass() {
        let report = verify_tables(&valid(), &TransformConfig::default());
        assert!(report.is_ok(), "{:?}", report.violations);
        assert!(report.ensure_ok().is_ok());
    }

    #[test]
    fn dangling_references_are_reported() {
        let mut tables = valid();
        tables.order_items.push(item(1002, 1999, 999, 1));
        let report = verify_tables(&tables, &TransformConfig::default());
        assert_eq!(report.violations.len(), 2);
        assert!(report.ensure_ok().is_err());
    }

    #[test]
    fn non_finite_prices_are_reported() {
        let mut tables = valid();
        tables.products[0].price = f64::NAN;
        tables.order_items[1].unit_price = f64::INFINITY;
        let report = verify_tables(&tables, &TransformConfig::default());
        let all = report.violations.join("\n");
        assert_eq!(report.violations.len(), 2);
        assert!(all.contains("product 100 has price NaN"));
        assert!(all.contains("order item 1001 has unit price inf"));
    }

    #[test]
    fn id_gaps_and_bad_rows_are_reported() {
        let mut tables = valid();
        tables.products[1].id = 105;
        tables.orders.push(order(1003, "Channel Islands", 12));
        tables.orders.push(order(1004, "Belgium", 5));
        tables.order_items[0].units = 0;
        tables.order_items[0].product_id = 100;

        let report = verify_tables(&tables, &TransformConfig::default());
        let all = report.violations.join("\n");
        assert!(all.contains("product id at row 1"));
        assert!(all.contains("excluded country"));
        assert!(all.contains("trimmed month"));
        assert!(all.contains("remapped country"));
        assert!(all.contains("0 units"));
        // product 101 no longer exists
        assert!(all.contains("missing product 101"));
    }
}
