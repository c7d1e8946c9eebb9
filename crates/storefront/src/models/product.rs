//! Catalog records: products and the taxonomies that group them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use avira_vastra_core::ProductId;

/// A product as returned by `/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weave_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Product {
    /// Price the customer actually pays per unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    /// Primary image: the first gallery image, else the single image field.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .first()
            .or(self.image.as_ref())
            .map(String::as_str)
    }

    /// Whether any stock remains.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fields accepted when creating or updating a product from the back-office.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounted_price: Option<Decimal>,
    pub images: Vec<String>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub occasions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,
    pub is_active: bool,
}

/// Listing filters for `/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub occasion: Option<String>,
    pub collection: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ProductFilters {
    /// Filters used by the public product listing: active products only.
    #[must_use]
    pub fn storefront() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    /// Set the search term. Blank terms clear the filter.
    #[must_use]
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    /// Query string pairs, skipping unset and blank values.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<&String>| {
            if let Some(v) = value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        };
        push("search", self.search.as_ref());
        push("occasion", self.occasion.as_ref());
        push("collection", self.collection.as_ref());
        push("category", self.category.as_ref());

        if let Some(active) = self.is_active {
            pairs.push(("isActive", active.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

/// Which taxonomy a [`TaxonomyItem`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    Categories,
    Occasions,
    Collections,
}

impl Taxonomy {
    /// Every taxonomy, in back-office display order.
    pub const ALL: [Self; 3] = [Self::Categories, Self::Occasions, Self::Collections];

    /// REST path segment for the taxonomy.
    #[must_use]
    pub const fn segment(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Occasions => "occasions",
            Self::Collections => "collections",
        }
    }
}

impl std::fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

impl std::str::FromStr for Taxonomy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.segment().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown taxonomy: {s}"))
    }
}

/// A category, occasion or collection.
///
/// Categories carry a `name`; occasions and collections carry a `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Back-office form for creating or editing a taxonomy entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyInput {
    pub title: String,
    pub subtitle: String,
    pub slug: String,
    pub image: String,
    pub sort_order: i32,
}

impl TaxonomyInput {
    /// Build a form from user input, deriving the slug from the title when blank.
    #[must_use]
    pub fn new(title: &str, subtitle: &str, slug: &str, image: &str, sort_order: i32) -> Self {
        let slug = if slug.trim().is_empty() {
            slugify(title)
        } else {
            slug.trim().to_string()
        };
        Self {
            title: title.trim().to_string(),
            subtitle: subtitle.trim().to_string(),
            slug,
            image: image.trim().to_string(),
            sort_order,
        }
    }

    /// Prefill the edit form from an existing entry.
    #[must_use]
    pub fn from_item(item: &TaxonomyItem) -> Self {
        Self::new(
            &item.title,
            item.subtitle.as_deref().unwrap_or(""),
            item.slug.as_deref().unwrap_or(""),
            item.image.as_deref().unwrap_or(""),
            item.sort_order,
        )
    }
}

/// Lowercase the title and replace spaces with hyphens.
#[must_use]
pub fn slugify(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "-")
}
