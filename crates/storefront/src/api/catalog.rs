//! Products, categories, occasions and collections.
//!
//! Reads go through the catalog cache. Any write invalidates it so the next
//! listing reflects the change.

use reqwest::Method;
use tracing::instrument;

use avira_vastra_core::ProductId;

use super::{ApiClient, ApiError};
use crate::models::{Product, ProductFilters, ProductInput, Taxonomy, TaxonomyInput, TaxonomyItem};

impl ApiClient {
    // =========================================================================
    // Products
    // =========================================================================

    /// List products matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["products"])?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.get_cached(url).await
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        self.get_cached(url).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self.send_json(Method::POST, &["products"], input).await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self
            .send_json(Method::PUT, &["products", id.as_str()], input)
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.delete(&["products", id.as_str()]).await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Taxonomies
    // =========================================================================

    /// List every entry of a taxonomy.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    #[instrument(skip(self), fields(taxonomy = %taxonomy))]
    pub async fn list_taxonomy(&self, taxonomy: Taxonomy) -> Result<Vec<TaxonomyItem>, ApiError> {
        let url = self.endpoint(&[taxonomy.segment()])?;
        self.get_cached(url).await
    }

    /// Get one taxonomy entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or the request fails.
    #[instrument(skip(self), fields(taxonomy = %taxonomy))]
    pub async fn get_taxonomy_item(
        &self,
        taxonomy: Taxonomy,
        id: &str,
    ) -> Result<TaxonomyItem, ApiError> {
        let url = self.endpoint(&[taxonomy.segment(), id])?;
        self.get_cached(url).await
    }

    /// Create a taxonomy entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the entry.
    #[instrument(skip(self, input), fields(taxonomy = %taxonomy, slug = %input.slug))]
    pub async fn create_taxonomy_item(
        &self,
        taxonomy: Taxonomy,
        input: &TaxonomyInput,
    ) -> Result<TaxonomyItem, ApiError> {
        let item = self
            .send_json(Method::POST, &[taxonomy.segment()], input)
            .await?;
        self.invalidate_catalog();
        Ok(item)
    }

    /// Update a taxonomy entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input), fields(taxonomy = %taxonomy))]
    pub async fn update_taxonomy_item(
        &self,
        taxonomy: Taxonomy,
        id: &str,
        input: &TaxonomyInput,
    ) -> Result<TaxonomyItem, ApiError> {
        let item = self
            .send_json(Method::PUT, &[taxonomy.segment(), id], input)
            .await?;
        self.invalidate_catalog();
        Ok(item)
    }

    /// Delete a taxonomy entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion.
    #[instrument(skip(self), fields(taxonomy = %taxonomy))]
    pub async fn delete_taxonomy_item(&self, taxonomy: Taxonomy, id: &str) -> Result<(), ApiError> {
        self.delete(&[taxonomy.segment(), id]).await?;
        self.invalidate_catalog();
        Ok(())
    }
}
