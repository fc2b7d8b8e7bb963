use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductVariant {
    pub size: String,
    pub color: String,
    pub quantity: i32,
}

/// Товар каталога
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub categories: Vec<String>,
    pub price: Decimal,
    pub sale_price: Decimal,
    pub is_on_sale: bool,
    pub is_new: bool,
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Суммарный остаток по всем вариантам
    pub fn total_stock(&self) -> i32 {
        self.variants.iter().map(|v| v.quantity.max(0)).sum()
    }

    pub fn unique_colors(&self) -> Vec<String> {
        let mut colors: Vec<String> = Vec::new();
        for variant in &self.variants {
            if !variant.color.is_empty() && !colors.contains(&variant.color) {
                colors.push(variant.color.clone());
            }
        }
        colors
    }

    pub fn unique_sizes(&self) -> Vec<String> {
        let mut sizes: Vec<String> = Vec::new();
        for variant in &self.variants {
            if !variant.size.is_empty() && !sizes.contains(&variant.size) {
                sizes.push(variant.size.clone());
            }
        }
        sizes
    }
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            images: Vec::new(),
            categories: Vec::new(),
            price: Decimal::ZERO,
            sale_price: Decimal::ZERO,
            is_on_sale: false,
            is_new: false,
            variants: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Payload создания/обновления товара.
/// Картинки к этому моменту уже загружены во внешнее хранилище.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDto {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub categories: Vec<String>,
    pub price: Decimal,
    pub is_on_sale: bool,
    pub sale_price: Decimal,
    pub variants: Vec<ProductVariant>,
}
