// API module - async client for the storefront REST API
//
// Every request goes through `ApiClient::request`, which reads the bearer
// token from the injected `RequestContext` at dispatch time. Nothing else in
// the crate touches the session.
//
// Wire conventions:
// - List endpoints take pageIndex/pageSize/SearchTerm/Status query parameters
//   and return `{ items, totalItemsCount }`
// - Mutations return either the entity or `{ message }`
// - Export endpoints return a spreadsheet as a binary body

pub mod models;
pub mod resources;

use crate::session::RequestContext;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use models::{MessageResponse, Mutation, Page};
pub use resources::{
    Addresses, Batches, Categories, News, Orders, Products, Resource, ResourceKind,
};

/// MIME type requested from export endpoints
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors surfaced by the API layer
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Request never completed (DNS, connect, timeout, reset)
    Transport(String),
    /// Server rejected the session (401)
    Unauthorized,
    /// Non-success status with the server's message when it sent one
    Status { status: u16, message: String },
    /// Response body did not match the expected shape
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Network error: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Status { status, message } => {
                if message.is_empty() {
                    write!(f, "API error ({})", status)
                } else {
                    write!(f, "API error ({}): {}", status, message)
                }
            }
            Self::Decode(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// Status filter accepted by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    Active,
    UnActive,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "Active",
            StatusFilter::UnActive => "UnActive",
        }
    }

    /// All → Active → UnActive → All
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(StatusFilter::Active),
            Some(StatusFilter::Active) => Some(StatusFilter::UnActive),
            Some(StatusFilter::UnActive) => None,
        }
    }
}

/// Pagination and filter parameters for a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_index: usize,
    pub page_size: usize,
    pub search_term: Option<String>,
    pub status: Option<StatusFilter>,
}

impl ListQuery {
    pub fn page(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
            search_term: None,
            status: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search_term = (!term.trim().is_empty()).then(|| term.trim().to_string());
        self
    }

    pub fn status(mut self, status: Option<StatusFilter>) -> Self {
        self.status = status;
        self
    }

    /// Query-string pairs in the server's parameter names
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageIndex", self.page_index.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(term) = &self.search_term {
            pairs.push(("SearchTerm", term.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("Status", status.as_str().to_string()));
        }
        pairs
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Async client for the storefront API
///
/// Cheap to clone: the underlying reqwest client and the request context are
/// both shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    context: RequestContext,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        context: RequestContext,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("API client targeting {}", base_url);

        Ok(Self {
            client,
            base_url,
            context,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request, attaching the bearer token if a session exists
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match self.context.bearer_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Fetch one page of a list endpoint
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, ApiError> {
        tracing::debug!(
            path,
            page = query.page_index,
            size = query.page_size,
            "list request"
        );
        let response = self
            .request(Method::GET, path)
            .query(&query.to_pairs())
            .send()
            .await?;
        decode_json(check_status(response).await?).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        decode_json(check_status(response).await?).await
    }

    /// POST a new entity
    pub async fn create<B, T>(&self, path: &str, body: &B) -> Result<Mutation<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::POST, path, Some(body)).await
    }

    /// PUT a full replacement
    pub async fn update<B, T>(&self, path: &str, body: &B) -> Result<Mutation<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::PUT, path, Some(body)).await
    }

    /// PATCH a partial update
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<Mutation<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Mutation<serde_json::Value>, ApiError> {
        self.mutate::<(), _>(Method::DELETE, path, None).await
    }

    async fn mutate<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Mutation<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "mutation request");
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = check_status(req.send().await?).await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Mutation::Empty);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Download a spreadsheet export
    pub async fn export(&self, path: &str, query: &ListQuery) -> Result<Vec<u8>, ApiError> {
        let response = self
            .request(Method::GET, path)
            .header(reqwest::header::ACCEPT, SPREADSHEET_MIME)
            .query(&query.to_pairs())
            .send()
            .await?;
        let bytes = check_status(response).await?.bytes().await?;
        tracing::info!(path, size = bytes.len(), "export downloaded");
        Ok(bytes.to_vec())
    }
}

/// Map non-success statuses to `ApiError`, reading the server's message
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().to_string());

    tracing::warn!(status = status.as_u16(), %message, "API request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::models::{CartItem, Product};
    use super::*;
    use crate::demo;
    use crate::session::Session;

    #[test]
    fn resource_types_are_reachable_from_api_root() {
        let paths = [
            crate::api::Products::PATH,
            crate::api::Categories::PATH,
            crate::api::Orders::PATH,
            crate::api::News::PATH,
            crate::api::Batches::PATH,
            crate::api::Addresses::PATH,
        ];
        let kinds: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.path()).collect();
        assert_eq!(kinds, paths);
    }

    async fn client_against_demo(context: RequestContext) -> (ApiClient, tokio::sync::oneshot::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let addr = demo::start_demo_server("127.0.0.1:0".parse().unwrap(), shutdown_rx)
            .await
            .expect("demo server");
        let client = ApiClient::new(
            format!("http://{}", addr),
            Duration::from_secs(5),
            context,
        )
        .expect("client");
        (client, shutdown_tx)
    }

    fn signed_in() -> RequestContext {
        RequestContext::with_session(Session::new("demo-token", Some("demo".into())))
    }

    #[test]
    fn list_query_uses_server_parameter_names() {
        let pairs = ListQuery::page(2, 25)
            .search("  sữa ")
            .status(Some(StatusFilter::UnActive))
            .to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("pageIndex", "2".to_string()),
                ("pageSize", "25".to_string()),
                ("SearchTerm", "sữa".to_string()),
                ("Status", "UnActive".to_string()),
            ]
        );
        assert_eq!(ListQuery::page(0, 10).search("   ").search_term, None);
    }

    #[test]
    fn status_filter_cycles_through_all() {
        assert_eq!(StatusFilter::cycle(None), Some(StatusFilter::Active));
        assert_eq!(
            StatusFilter::cycle(Some(StatusFilter::Active)),
            Some(StatusFilter::UnActive)
        );
        assert_eq!(StatusFilter::cycle(Some(StatusFilter::UnActive)), None);
    }

    #[tokio::test]
    async fn lists_pages_from_server() {
        let (client, _shutdown) = client_against_demo(RequestContext::anonymous()).await;

        let page: Page<Product> = client
            .list("/products", &ListQuery::page(0, 5))
            .await
            .expect("list");
        assert_eq!(page.items.len(), 5);
        assert!(page.total_items_count > 5);

        let searched: Page<Product> = client
            .list("/products", &ListQuery::page(0, 50).search("sữa"))
            .await
            .expect("search");
        assert!(searched.items.iter().all(|p| p.name.to_lowercase().contains("sữa")));
    }

    #[tokio::test]
    async fn anonymous_cart_request_is_unauthorized() {
        let (client, _shutdown) = client_against_demo(RequestContext::anonymous()).await;
        let result: Result<Page<CartItem>, _> = client.list("/carts", &ListQuery::page(0, 10)).await;
        assert_eq!(result.unwrap_err(), ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn bearer_token_comes_from_context() {
        let (client, _shutdown) = client_against_demo(signed_in()).await;
        let cart: Page<CartItem> = client
            .list("/carts", &ListQuery::page(0, 10))
            .await
            .expect("cart");
        assert!(!cart.items.is_empty());

        // Signing out through the context affects the very next request
        client.context().clear();
        let result: Result<Page<CartItem>, _> = client.list("/carts", &ListQuery::page(0, 10)).await;
        assert_eq!(result.unwrap_err(), ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn mutation_errors_carry_server_message() {
        let (client, _shutdown) = client_against_demo(signed_in()).await;
        let cart: Page<CartItem> = client
            .list("/carts", &ListQuery::page(0, 10))
            .await
            .expect("cart");
        let item = &cart.items[0];

        let too_many = serde_json::json!({ "quantity": item.remaining_quantity + 1 });
        let err = client
            .patch::<_, serde_json::Value>(&format!("/carts/{}", item.id), &too_many)
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert!(!message.is_empty());
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_returns_message() {
        let (client, _shutdown) = client_against_demo(signed_in()).await;
        let outcome = client.delete("/news/n-1").await.expect("delete");
        assert!(matches!(outcome, Mutation::Message(_)));

        let missing = client.delete("/news/does-not-exist").await.unwrap_err();
        assert!(matches!(missing, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn export_requests_spreadsheet() {
        let (client, _shutdown) = client_against_demo(signed_in()).await;
        let bytes = client
            .export("/orders/export", &ListQuery::page(0, 10))
            .await
            .expect("export");
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let client = ApiClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            RequestContext::anonymous(),
        )
        .expect("client");
        let result: Result<Page<Product>, _> = client.list("/products", &ListQuery::page(0, 5)).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
