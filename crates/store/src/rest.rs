//! REST client for the hosted backend's PostgREST endpoint.
//!
//! Every table is exposed at `{base}/rest/v1/{resource}`. Filters, ordering
//! and the row window travel as query parameters; the exact total comes back
//! in the `Content-Range` header when `Prefer: count=exact` is sent.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::StoreError;
use crate::remote::{Condition, Filter, OrderBy, RemoteStore, RowRange, RowsPage};

/// Path prefix of the PostgREST API on the hosted backend.
const REST_PATH: &str = "rest/v1";

/// HTTP client for one hosted backend project.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestStore {
    /// Create a client for the project at `base_url` (e.g.
    /// `https://xyz.supabase.co`) authenticating with the public anon key.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            anon_key: anon_key.into(),
        }
    }

    fn table_url(&self, resource: &str) -> String {
        format!("{}/{REST_PATH}/{resource}", self.base_url)
    }

    fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| StoreError::Unavailable("anon key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|_| StoreError::Unavailable("anon key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`StoreError::Api`] with the status and
    /// body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode a JSON array body into rows.
    async fn parse_rows(response: reqwest::Response) -> Result<Vec<Value>, StoreError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<Vec<Value>>(&body)?)
    }
}

/// Build the PostgREST query parameters for a filter and ordering.
///
/// `in` lists are double-quoted so values containing commas survive.
pub fn query_params(filter: &Filter, order: &[OrderBy]) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for condition in &filter.conditions {
        match condition {
            Condition::Eq { column, value } => {
                params.push((column.clone(), format!("eq.{value}")));
            }
            Condition::In { column, values } => {
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
                    .collect();
                params.push((column.clone(), format!("in.({})", quoted.join(","))));
            }
        }
    }
    if !order.is_empty() {
        let clauses: Vec<String> = order
            .iter()
            .map(|o| format!("{}.{}", o.column, o.direction.as_str()))
            .collect();
        params.push(("order".to_string(), clauses.join(",")));
    }
    params
}

/// Extract the total from a `Content-Range` header value such as
/// `0-49/120` or `*/0`.
pub fn parse_content_range_total(value: &str) -> Result<u64, StoreError> {
    let (_, total) = value
        .rsplit_once('/')
        .ok_or_else(|| StoreError::Decode(format!("Content-Range without total: '{value}'")))?;
    total
        .trim()
        .parse::<u64>()
        .map_err(|_| StoreError::Decode(format!("Content-Range total is not a count: '{value}'")))
}

fn content_range_total(headers: &HeaderMap) -> Result<u64, StoreError> {
    let raw = headers
        .get(CONTENT_RANGE)
        .ok_or_else(|| StoreError::Decode("missing Content-Range header".into()))?
        .to_str()
        .map_err(|_| StoreError::Decode("Content-Range is not ASCII".into()))?;
    parse_content_range_total(raw)
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn fetch_page(
        &self,
        resource: &str,
        filter: &Filter,
        range: RowRange,
        order: &[OrderBy],
    ) -> Result<RowsPage, StoreError> {
        let mut params = query_params(filter, order);
        params.push(("offset".into(), range.offset.to_string()));
        params.push(("limit".into(), range.limit.to_string()));

        tracing::debug!(
            resource,
            offset = range.offset,
            limit = range.limit,
            "Fetching store page",
        );

        let response = self
            .client
            .get(self.table_url(resource))
            .headers(self.auth_headers()?)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;

        // Asking for a window past the end yields 416 with `*/total`.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            let total_matching = content_range_total(response.headers())?;
            return Ok(RowsPage {
                rows: Vec::new(),
                total_matching,
            });
        }

        let response = Self::ensure_success(response).await?;
        let total_matching = content_range_total(response.headers())?;
        let rows = Self::parse_rows(response).await?;

        Ok(RowsPage {
            rows,
            total_matching,
        })
    }

    async fn fetch_all(
        &self,
        resource: &str,
        filter: &Filter,
        order: &[OrderBy],
    ) -> Result<Vec<Value>, StoreError> {
        let response = self
            .client
            .get(self.table_url(resource))
            .headers(self.auth_headers()?)
            .query(&query_params(filter, order))
            .send()
            .await?;

        Self::parse_rows(response).await
    }

    async fn fetch_one(
        &self,
        resource: &str,
        key_column: &str,
        key: &str,
    ) -> Result<Option<Value>, StoreError> {
        let mut params = query_params(&Filter::new().eq(key_column, key), &[]);
        params.push(("limit".into(), "1".into()));

        let response = self
            .client
            .get(self.table_url(resource))
            .headers(self.auth_headers()?)
            .query(&params)
            .send()
            .await?;

        Ok(Self::parse_rows(response).await?.into_iter().next())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(format!("{}/{REST_PATH}/", self.base_url))
            .headers(self.auth_headers()?)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }
}
