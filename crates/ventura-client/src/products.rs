//! Admin product catalogue endpoints

use crate::error::ClientResult;
use crate::http::{HttpClient, segment};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use ventura_core::ProductSummary;

/// Product operations available to admins
#[async_trait]
pub trait ProductService: Send + Sync {
    /// List all products; a missing endpoint yields an empty list
    async fn products(&self) -> ClientResult<Vec<ProductSummary>>;

    /// Permanently delete a product and its pitch deck
    async fn delete_product(&self, product_id: &str) -> ClientResult<()>;
}

/// [`ProductService`] backed by the REST API
#[derive(Debug, Clone)]
pub struct HttpProductService {
    http: Arc<HttpClient>,
}

impl HttpProductService {
    /// Create a service on top of a shared HTTP client
    pub const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProductService for HttpProductService {
    async fn products(&self) -> ClientResult<Vec<ProductSummary>> {
        match self.http.get("/admin/products").await {
            Err(err) if err.is_not_found() => {
                debug!("Product listing endpoint not available");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product_id: &str) -> ClientResult<()> {
        self.http
            .delete(&format!("/admin/products/{}", segment(product_id)))
            .await?;
        info!(product_id, "Product deleted");
        Ok(())
    }
}
