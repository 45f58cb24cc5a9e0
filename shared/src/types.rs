//! Common types used across the storefront

use serde::{Deserialize, Serialize};

/// Default number of products per catalogue page
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Hard ceiling on page size so a single request cannot pull the whole catalogue
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build pagination from raw query values.
    /// Missing, unparsable or non-positive values fall back to the defaults.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
        };

        Self {
            page: parse(page).unwrap_or(1),
            page_size: parse(page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page - 1)
    }

    /// Total number of pages for a result count
    pub fn total_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            return 0;
        }
        (count + self.page_size - 1) / self.page_size
    }
}

/// Catalogue sort order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProductSort {
    /// Insertion order
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Newest,
    BestRated,
}

impl ProductSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Default => "default",
            ProductSort::PriceAsc => "priceAsc",
            ProductSort::PriceDesc => "priceDesc",
            ProductSort::Newest => "newest",
            ProductSort::BestRated => "bestRated",
        }
    }

    /// Unknown values sort in insertion order
    pub fn parse(s: &str) -> Self {
        match s {
            "priceAsc" => ProductSort::PriceAsc,
            "priceDesc" => ProductSort::PriceDesc,
            "newest" => ProductSort::Newest,
            "bestRated" => ProductSort::BestRated,
            _ => ProductSort::Default,
        }
    }
}

/// Generic `{ "message": ... }` acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
