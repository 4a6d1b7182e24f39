// src/tables.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Layout of `OrderDate`, e.g. `2016-12-01T08:26:00`.
pub const ORDER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A catalog entry, one per distinct stock code.
/// Field order is the column order of `catalog.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    pub id: u32,
    pub catalog_brand_id: u32,
    pub catalog_type_id: u32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub available_stock: u32,
    pub max_stock_threshold: u32,
    pub on_reorder: u8,
    pub restock_threshold: u32,
    /// Join key back to the transaction log; not emitted.
    #[serde(skip)]
    pub stock_code: String,
}

/// One order per invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "Id")]
    pub id: u32,
    #[serde(rename = "Address_Country")]
    pub address_country: String,
    #[serde(rename = "OrderDate", with = "order_date")]
    pub order_date: NaiveDateTime,
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItem {
    pub id: u32,
    pub order_id: u32,
    pub product_id: u32,
    pub unit_price: f64,
    pub units: i64,
    pub product_name: String,
}

/// The three tables a run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedTables {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
}

mod order_date {
    use super::ORDER_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&dt.format(ORDER_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, ORDER_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
