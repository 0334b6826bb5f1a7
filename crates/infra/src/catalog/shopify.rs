//! Shopify Admin GraphQL catalog gateway.
//!
//! Fetches the first page of products in a single request. Anything other than
//! a well-formed `data.products` payload (transport errors, non-2xx statuses,
//! GraphQL `errors`, missing fields) is reported as `UpstreamUnavailable`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use premier_catalog::{CatalogError, CatalogGateway, CatalogItem, CatalogPage, Money, MAX_PAGE_SIZE};
use premier_core::ProductId;

use crate::config::ShopifyConfig;

const PRODUCTS_QUERY: &str = r#"
query fetchProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        description
        featuredImage {
          url
          altText
        }
        priceRange {
          minVariantPrice {
            amount
            currencyCode
          }
        }
        totalInventory
        vendor
        tags
      }
    }
    pageInfo {
      hasNextPage
    }
  }
}
"#;

/// Catalog gateway backed by the Shopify Admin GraphQL API.
#[derive(Clone)]
pub struct ShopifyAdminGateway {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl core::fmt::Debug for ShopifyAdminGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShopifyAdminGateway")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl ShopifyAdminGateway {
    /// Gateway for `https://{shop}/admin/api/{version}/graphql.json`.
    pub fn new(config: &ShopifyConfig, timeout: Duration) -> Result<Self, CatalogError> {
        Self::with_endpoint(config.graphql_endpoint(), config.access_token.clone(), timeout)
    }

    /// Gateway for an explicit GraphQL endpoint URL.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        })
    }
}

#[async_trait::async_trait]
impl CatalogGateway for ShopifyAdminGateway {
    #[instrument(skip(self), fields(endpoint = %self.endpoint), err)]
    async fn fetch_page(&self, limit: usize) -> Result<CatalogPage, CatalogError> {
        let first = limit.min(MAX_PAGE_SIZE);
        if first == 0 {
            return Ok(CatalogPage::default());
        }

        let body = GraphQlRequest {
            query: PRODUCTS_QUERY,
            variables: Variables { first },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CatalogError::upstream(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::upstream(format!("catalog answered HTTP {status}")));
        }

        let payload: GraphQlResponse = resp
            .json()
            .await
            .map_err(|e| CatalogError::upstream(format!("malformed catalog payload: {e}")))?;

        let page = payload.into_page()?;
        debug!(items = page.len(), has_next_page = page.has_next_page(), "catalog page fetched");
        Ok(page)
    }
}

// GraphQL wire types

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: &'static str,
    variables: Variables,
}

#[derive(Debug, Serialize)]
struct Variables {
    first: usize,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ProductsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: ProductConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductConnection {
    edges: Vec<ProductEdge>,
    #[serde(default)]
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct ProductEdge {
    node: ProductNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    featured_image: Option<ImageNode>,
    #[serde(default)]
    price_range: Option<PriceRangeNode>,
    #[serde(default)]
    total_inventory: Option<i64>,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageNode {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRangeNode {
    #[serde(default)]
    min_variant_price: Option<MoneyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoneyNode {
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    currency_code: Option<String>,
}

impl GraphQlResponse {
    fn into_page(self) -> Result<CatalogPage, CatalogError> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(CatalogError::upstream(format!(
                "catalog returned errors: {}",
                messages.join("; ")
            )));
        }

        let data = self
            .data
            .ok_or_else(|| CatalogError::upstream("catalog payload has no data"))?;

        let has_next_page = data
            .products
            .page_info
            .map(|p| p.has_next_page)
            .unwrap_or(false);

        let items = data
            .products
            .edges
            .into_iter()
            .map(|edge| edge.node.into_item())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CatalogPage::new(items, has_next_page))
    }
}

impl ProductNode {
    fn into_item(self) -> Result<CatalogItem, CatalogError> {
        let id = ProductId::new(self.id)
            .map_err(|e| CatalogError::upstream(format!("malformed catalog item: {e}")))?;

        let (image_url, image_alt) = match self.featured_image {
            Some(img) => (img.url, img.alt_text),
            None => (None, None),
        };

        // No amount means no price; a missing currency code degrades to "".
        let price = self
            .price_range
            .and_then(|r| r.min_variant_price)
            .and_then(|m| {
                m.amount
                    .map(|amount| Money::new(amount, m.currency_code.unwrap_or_default()))
            });

        Ok(CatalogItem {
            id,
            title: self.title,
            description: self.description,
            image_url,
            image_alt,
            price,
            stock_count: self.total_inventory,
            vendor: self.vendor.unwrap_or_default(),
            tags: self.tags.into_iter().collect(),
        })
    }
}
