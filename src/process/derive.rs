use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::InvoiceLine;
use crate::config::TransformConfig;
use crate::tables::{Order, OrderItem, Product};

/// One product per stock code, ids assigned in stock-code order.
///
/// The description is the earliest one by date; the price is the mean of the
/// collapsed line prices.
pub fn build_products(lines: &[InvoiceLine], cfg: &TransformConfig) -> Result<Vec<Product>> {
    struct Acc<'a> {
        description: &'a str,
        price_sum: f64,
        count: usize,
    }

    let mut by_date: Vec<&InvoiceLine> = lines.iter().collect();
    // stable: equal dates keep their aggregated order
    by_date.sort_by_key(|l| l.date);

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for line in by_date {
        let acc = groups.entry(line.stock_code.as_str()).or_insert(Acc {
            description: line.description.as_str(),
            price_sum: 0.0,
            count: 0,
        });
        acc.price_sum += line.unit_price;
        acc.count += 1;
    }

    let p = cfg.placeholders;
    let mut products = Vec::with_capacity(groups.len());
    for (i, (stock_code, acc)) in groups.into_iter().enumerate() {
        products.push(Product {
            id: sequential_id(cfg.product_base, i)?,
            catalog_brand_id: p.catalog_brand_id,
            catalog_type_id: p.catalog_type_id,
            name: acc.description.to_string(),
            description: acc.description.to_string(),
            price: acc.price_sum / acc.count as f64,
            available_stock: p.available_stock,
            max_stock_threshold: p.max_stock_threshold,
            on_reorder: p.on_reorder,
            restock_threshold: p.restock_threshold,
            stock_code: stock_code.to_string(),
        });
    }
    debug!(products = products.len(), "built catalog");
    Ok(products)
}

/// One order per invoice code with the latest date and the greatest country label.
pub fn build_orders(lines: &[InvoiceLine]) -> Vec<Order> {
    let mut groups: BTreeMap<u32, (NaiveDateTime, &str)> = BTreeMap::new();
    for line in lines {
        groups
            .entry(line.invoice)
            .and_modify(|(date, country)| {
                if line.date > *date {
                    *date = line.date;
                }
                if line.country.as_str() > *country {
                    *country = line.country.as_str();
                }
            })
            .or_insert((line.date, line.country.as_str()));
    }

    let orders: Vec<Order> = groups
        .into_iter()
        .map(|(invoice, (date, country))| Order {
            id: invoice,
            address_country: country.to_string(),
            order_date: date,
            description: String::new(),
        })
        .collect();
    debug!(orders = orders.len(), "built orders");
    orders
}

/// Join collapsed lines to their product. Price and name come from the catalog.
pub fn build_order_items(
    lines: &[InvoiceLine],
    products: &[Product],
    cfg: &TransformConfig,
) -> Result<Vec<OrderItem>> {
    let by_code: HashMap<&str, &Product> = products
        .iter()
        .map(|p| (p.stock_code.as_str(), p))
        .collect();

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(product) = by_code.get(line.stock_code.as_str()) else {
            warn!(stock_code = %line.stock_code, "line has no catalog product; skipped");
            continue;
        };
        items.push(OrderItem {
            id: sequential_id(cfg.item_base, items.len())?,
            order_id: line.invoice,
            product_id: product.id,
            unit_price: product.price,
            units: line.quantity,
            product_name: product.description.clone(),
        });
    }
    debug!(items = items.len(), "built order items");
    Ok(items)
}

fn sequential_id(base: u32, index: usize) -> Result<u32> {
    u32::try_from(index)
        .ok()
        .and_then(|i| base.checked_add(i))
        .with_context(|| format!("id {} + {} overflows u32", base, index))
}
