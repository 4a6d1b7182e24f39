// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Every literal the transformation depends on.
/// `Default` reproduces the values the demo database was originally seeded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Calendar years added to every invoice date.
    pub year_offset: u32,
    /// Rows whose shifted date falls in `trim_year`/`trim_month` are dropped.
    pub trim_year: i32,
    pub trim_month: u32,
    /// A country survives only with strictly more rows than this.
    pub min_country_rows: usize,
    /// Dropped even when it passes the row threshold.
    pub excluded_country: String,
    /// `remap_from` is relabelled as `remap_to` after the country filter.
    pub remap_from: String,
    pub remap_to: String,
    /// First code handed out by invoice factorization.
    pub invoice_base: u32,
    /// First catalog product id.
    pub product_base: u32,
    /// First order item id.
    pub item_base: u32,
    pub placeholders: CatalogPlaceholders,
}

/// Fixed inventory/catalog fields stamped on every product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPlaceholders {
    pub catalog_brand_id: u32,
    pub catalog_type_id: u32,
    pub available_stock: u32,
    pub max_stock_threshold: u32,
    pub on_reorder: u8,
    pub restock_threshold: u32,
}

impl Default for CatalogPlaceholders {
    fn default() -> Self {
        Self {
            catalog_brand_id: 5,
            catalog_type_id: 5,
            available_stock: 4,
            max_stock_threshold: 5,
            on_reorder: 0,
            restock_threshold: 1,
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            year_offset: 6,
            trim_year: 2017,
            trim_month: 12,
            min_country_rows: 244,
            excluded_country: "Channel Islands".to_string(),
            remap_from: "Belgium".to_string(),
            remap_to: "United States".to_string(),
            invoice_base: 1001,
            product_base: 100,
            item_base: 1000,
            placeholders: CatalogPlaceholders::default(),
        }
    }
}

impl TransformConfig {
    /// Load overrides from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: TransformConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.trim_month) {
            anyhow::bail!("trim_month must be 1..=12, got {}", self.trim_month);
        }
        Ok(())
    }
}
