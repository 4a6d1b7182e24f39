// src/export/mod.rs
pub mod csv_tables;
pub mod parquet_tables;
pub mod sql;

pub use csv_tables::{load_tables, write_csv_tables};
pub use parquet_tables::write_parquet_tables;
pub use sql::write_sql_scripts;

pub const CATALOG_FILE: &str = "catalog.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const ORDER_ITEMS_FILE: &str = "orderItems.csv";

pub const CATALOG_SQL_FILE: &str = "CatalogItems.sql";
pub const ORDERS_SQL_FILE: &str = "Orders.sql";
pub const ORDER_ITEMS_SQL_FILE: &str = "OrderItems.sql";

pub const CATALOG_PARQUET_FILE: &str = "catalog.parquet";
pub const ORDERS_PARQUET_FILE: &str = "orders.parquet";
pub const ORDER_ITEMS_PARQUET_FILE: &str = "orderItems.parquet";
