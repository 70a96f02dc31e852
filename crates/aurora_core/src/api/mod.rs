//! Thin JSON-over-HTTP wrapper for backend collaborators.
//!
//! # Responsibility
//! - Send requests through a pluggable `Transport`.
//! - Resolve with parsed JSON on 2xx; reject on non-2xx, transport failure or
//!   undecodable body.
//!
//! # Invariants
//! - The client never retries; retry policy belongs to the caller.
//! - Log events carry method, path and status only, never bodies.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

mod http;
mod models;

pub use http::HttpTransport;
pub use models::{
    Category, Page, PageRequest, PaymentIntent, Product, Profile, ProfileUpdate,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request never produced an HTTP response.
    Network(String),
    /// Backend answered with a non-2xx status.
    Status { status: u16, body: String },
    /// Response body was not the expected JSON shape.
    Decode(String),
    /// Request parameters were rejected before sending.
    InvalidRequest(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::Status { .. } => "http_status",
            Self::Decode(_) => "decode_error",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Whether the backend rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network failure: {message}"),
            Self::Status { status, .. } => write!(f, "request failed with HTTP {status}"),
            Self::Decode(message) => write!(f, "invalid response body: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
        }
    }
}

impl Error for ApiError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations report only transport failures as errors; any HTTP status
/// is a successful `HttpResponse`.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> ApiResult<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        (**self).send(request)
    }
}

/// Client over a type-erased transport, as held by the store registry.
pub type SharedApiClient = ApiClient<Arc<dyn Transport>>;

/// Typed client for the storefront backend.
pub struct ApiClient<T: Transport> {
    transport: T,
    bearer_token: Option<String>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<R> {
        self.execute(Method::Get, path, query, None)
    }

    pub fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<R> {
        let body = encode_body(body)?;
        self.execute(Method::Post, path, &[], Some(body))
    }

    pub fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<R> {
        let body = encode_body(body)?;
        self.execute(Method::Put, path, &[], Some(body))
    }

    pub fn fetch_profile(&self) -> ApiResult<Profile> {
        self.get_json("/profile", &[])
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Profile> {
        self.put_json("/profile", update)
    }

    pub fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.get_json("/categories", &[])
    }

    /// Lists one page of products, optionally filtered by category.
    pub fn list_products(
        &self,
        request: PageRequest,
        category_id: Option<&str>,
    ) -> ApiResult<Page<Product>> {
        let mut query = request.query_pairs();
        if let Some(category_id) = category_id {
            query.push(("category", category_id.to_string()));
        }
        self.get_json("/products", &query)
    }

    /// Creates a payment intent and returns its client secret.
    pub fn create_payment_intent(&self, amount_cents: u64, currency: &str) -> ApiResult<String> {
        if amount_cents == 0 {
            return Err(ApiError::InvalidRequest(
                "payment amount must be positive".to_string(),
            ));
        }
        let intent: PaymentIntent = self.post_json(
            "/payments/intent",
            &serde_json::json!({ "amount": amount_cents, "currency": currency }),
        )?;
        Ok(intent.client_secret)
    }

    fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<R> {
        let request = HttpRequest {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            body,
            bearer_token: self.bearer_token.clone(),
        };

        let started_at = Instant::now();
        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=api_request module=api status=error method={} path={} duration_ms={} error_code={}",
                    method.as_str(),
                    path,
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                return Err(err);
            }
        };

        if !response.is_success() {
            warn!(
                "event=api_request module=api status=error method={} path={} http_status={} duration_ms={} error_code=http_status",
                method.as_str(),
                path,
                response.status,
                started_at.elapsed().as_millis()
            );
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        info!(
            "event=api_request module=api status=ok method={} path={} http_status={} duration_ms={}",
            method.as_str(),
            path,
            response.status,
            started_at.elapsed().as_millis()
        );

        let text = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(text).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|err| ApiError::InvalidRequest(err.to_string()))
}
