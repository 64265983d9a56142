//! Catalog browsing: category filter and sort order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rakhshan_core::Product;

/// Category value that disables filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Order in which products are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    /// Alphabetical by name, ignoring case.
    Name,
}

impl SortOrder {
    /// Wire/CLI spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(Self::Default),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            other => Err(format!(
                "unknown sort order '{other}' (expected default, price-asc, price-desc or name)"
            )),
        }
    }
}

/// A category filter plus sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    category: Option<String>,
    sort: SortOrder,
}

impl CatalogQuery {
    /// Build a query. A blank category or `all` (any case) disables filtering.
    #[must_use]
    pub fn new(category: Option<&str>, sort: SortOrder) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
            .map(str::to_lowercase);
        Self { category, sort }
    }

    /// The active category filter, lowercased.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Whether `product` passes the category filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category.to_lowercase() == category)
    }

    /// Filter and sort `products`. Ties keep their original order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut selected: Vec<Product> = products.iter().filter(|p| self.matches(p)).cloned().collect();
        let sort = self.sort;
        selected.sort_by(|a, b| sort.compare(a, b));
        selected
    }
}

/// Distinct categories in first-seen order, compared case-insensitively.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|c| c.eq_ignore_ascii_case(&product.category)) {
            seen.push(product.category.clone());
        }
    }
    seen
}
