//! crates/ozonxt_core/src/catalog.rs
//!
//! The static product catalog. Prices are whole rupees.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Final price after any discount.
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<u64>,
    pub image_url: String,
    pub category: String,
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: u64,
    original_price: Option<u64>,
    image_url: &'static str,
    category: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "1",
        name: "Dolphin RO",
        description: "Advanced purifier that removes TDS, heavy metals, bacteria, and harmful chemicals, making water safe for consumption.",
        price: 7499,
        original_price: Some(8499),
        image_url: "https://res.cloudinary.com/dckm1rzyh/image/upload/v1750153445/1_nvadlv.png",
        category: "water purifier",
    },
    CatalogEntry {
        id: "2",
        name: "E Series DOLPHIN RO + UV",
        description: "9 litre storage tank, wall mounted or counter top, RO + UV technology with smart indicator.",
        price: 8999,
        original_price: Some(10000),
        image_url: "https://res.cloudinary.com/dckm1rzyh/image/upload/v1750153447/3_jjcrc7.png",
        category: "water purifier",
    },
    CatalogEntry {
        id: "3",
        name: "G SERIES",
        description: "Copper purification unit with card holders included.",
        price: 16999,
        original_price: Some(21000),
        image_url: "https://res.cloudinary.com/dckm1rzyh/image/upload/v1750153459/2_t2sybe.png",
        category: "Accessories",
    },
    CatalogEntry {
        id: "4",
        name: "Aqaua 9090",
        description: "Modern design with LED indicators, UV purification, 7 stage purification and automatic shut off. 10 litre capacity.",
        price: 12999,
        original_price: Some(16999),
        image_url: "https://res.cloudinary.com/dckm1rzyh/image/upload/v1750153447/4_wvk7ht.png",
        category: "Accessories",
    },
    CatalogEntry {
        id: "5",
        name: "DOLPHIN + ALKALINE",
        description: "RO + alkaline with 1 year brand warranty on electrical items.",
        price: 10699,
        original_price: Some(12999),
        image_url: "https://res.cloudinary.com/dckm1rzyh/image/upload/v1750153449/6_wmlbrx.png",
        category: "Commercial Purifiers",
    },
    CatalogEntry {
        id: "6",
        name: "AQUA 2090",
        description: "Powerful ozone generator for large-scale water treatment and sanitation.",
        price: 9999,
        original_price: Some(12999),
        image_url: "https://res.cloudinary.com/dckm1rzyh/image/upload/v1750153448/5_xsxsgw.png",
        category: "Commercial Purifiers",
    },
];

impl From<&CatalogEntry> for Product {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            price: entry.price,
            original_price: entry.original_price,
            image_url: entry.image_url.to_string(),
            category: entry.category.to_string(),
        }
    }
}

pub fn products() -> Vec<Product> {
    CATALOG.iter().map(Product::from).collect()
}

/// Products in `category`, compared case-insensitively.
pub fn products_in_category(category: &str) -> Vec<Product> {
    CATALOG
        .iter()
        .filter(|entry| entry.category.eq_ignore_ascii_case(category))
        .map(Product::from)
        .collect()
}

pub fn find_product(id: &str) -> Option<Product> {
    CATALOG
        .iter()
        .find(|entry| entry.id == id)
        .map(Product::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_are_unique() {
        let mut ids: Vec<String> = products().into_iter().map(|p| p.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn discounts_never_raise_the_price() {
        for product in products() {
            if let Some(original) = product.original_price {
                assert!(product.price <= original, "{} is marked up", product.name);
            }
        }
    }

    #[test]
    fn category_filter_ignores_case() {
        let accessories = products_in_category("accessories");
        assert_eq!(accessories.len(), 2);
        assert!(find_product("4").is_some());
        assert!(find_product("99").is_none());
    }
}
