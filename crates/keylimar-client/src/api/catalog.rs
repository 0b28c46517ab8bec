//! Product and category lookup endpoints.

use keylimar_core::types::{Category, Product};

use crate::error::ApiResult;
use crate::http::ApiClient;

pub struct CatalogApi<'a> {
    api: &'a ApiClient,
}

impl<'a> CatalogApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        CatalogApi { api }
    }

    /// Full product listing.
    pub async fn products(&self) -> ApiResult<Vec<Product>> {
        self.api.get("products/").await
    }

    /// Name/description search.
    pub async fn search_products(&self, query: &str) -> ApiResult<Vec<Product>> {
        let q: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("search", query)
            .finish();
        self.api.get(&format!("products/?{}", q)).await
    }

    /// Barcode lookup; `None` when the code is unknown.
    pub async fn product_by_barcode(&self, barcode: &str) -> ApiResult<Option<Product>> {
        self.api
            .get_optional(&format!("products/by-barcode/{}/", barcode))
            .await
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.api.get("categories/").await
    }

    /// Cedula nationality prefixes accepted by the backend ("V", "E", ...).
    pub async fn cedula_prefixes(&self) -> ApiResult<Vec<String>> {
        self.api.get("prefixes/").await
    }
}
