//! Back-office dashboard, customers, site content and uploads.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::{CustomerSummary, Dashboard, SiteContent, UploadedImage};

/// Multipart field the upload endpoint reads the file from.
const UPLOAD_FIELD: &str = "image";

impl ApiClient {
    /// Dashboard headline numbers and recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an administrator or the request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.get(&["admin", "stats"]).await
    }

    /// Every registered customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an administrator or the request fails.
    #[instrument(skip(self))]
    pub async fn customers(&self) -> Result<Vec<CustomerSummary>, ApiError> {
        self.get(&["admin", "customers"]).await
    }

    /// The site content record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn content(&self) -> Result<SiteContent, ApiError> {
        self.get(&["content"]).await
    }

    /// Replace the site content record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, content))]
    pub async fn update_content(&self, content: &SiteContent) -> Result<SiteContent, ApiError> {
        self.send_json(Method::PUT, &["content"], content).await
    }

    /// Upload a single image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` without sending anything if `mime` is not a valid
    /// MIME type, or the backend error if the upload fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|_| ApiError::InvalidInput(format!("Unsupported file type: {mime}")))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let url = self.endpoint(&["upload"])?;
        self.send(self.request(Method::POST, url).multipart(form))
            .await
    }
}
