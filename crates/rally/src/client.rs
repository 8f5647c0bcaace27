//! HTTP client implementing [`Transport`] against Rally WSAPI v2.0.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracker::{
    CreateResult, CreateSpec, QueryResult, QuerySpec, RallyConfig, RequestOptions, ResultSet,
    Transport, TransportError,
};

use crate::wire;

/// Path of the WSAPI root below the server URL.
pub const WSAPI_PATH: &str = "/slm/webservice/v2.0";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "zsessionid";

/// Rally WSAPI client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RallyClient {
    http: Client,
    base_url: String,
}

impl RallyClient {
    /// Creates a client for `server` authenticating with `api_key`.
    ///
    /// `options.headers` are sent with every request; `options.timeout_ms`
    /// bounds each HTTP request.
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidRequest`] if a header name or value is not
    /// valid HTTP, or the HTTP client cannot be built.
    pub fn new(
        server: &str,
        api_key: &str,
        options: &RequestOptions,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidRequest {
                    message: format!("header name '{name}': {e}"),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| TransportError::InvalidRequest {
                message: format!("header '{name}': {e}"),
            })?;
            headers.insert(name, value);
        }
        let mut key = HeaderValue::from_str(api_key).map_err(|e| TransportError::InvalidRequest {
            message: format!("api key: {e}"),
        })?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(ms) = options.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().map_err(|e| TransportError::InvalidRequest {
            message: format!("http client: {e}"),
        })?;

        Ok(Self {
            http,
            base_url: format!("{}{WSAPI_PATH}", server.trim_end_matches('/')),
        })
    }

    /// Creates a client from the `server`, `apiKey` and `requestOptions`
    /// configuration keys.
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidRequest`] if `apiKey` is absent, or as
    /// [`RallyClient::new`].
    pub fn from_config(config: &RallyConfig) -> Result<Self, TransportError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TransportError::InvalidRequest {
                message: "apiKey is not configured".to_owned(),
            })?;
        let options = config.request_options.clone().unwrap_or_default();
        Self::new(config.server(), api_key, &options)
    }

    /// WSAPI root, e.g. `https://rally1.rallydev.com/slm/webservice/v2.0`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_page(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<wire::QueryPage, TransportError> {
        let body = self.send(self.http.get(self.url(path)).query(params)).await?;
        wire::parse_query_page(&body)
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, TransportError> {
        let response = request.send().await.map_err(network)?;
        let status = response.status();
        let body = response.text().await.map_err(network)?;

        if status.is_success() {
            return Ok(body);
        }
        let message = wire::error_message(&body);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                TransportError::Authentication { message }
            }
            _ => TransportError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn network(e: reqwest::Error) -> TransportError {
    TransportError::Network {
        message: e.to_string(),
    }
}

#[async_trait]
impl Transport for RallyClient {
    async fn query(&self, spec: &QuerySpec) -> Result<QueryResult, TransportError> {
        let path = wire::query_path(spec);
        let mut results = ResultSet::default();
        let mut start = spec.pagination.start;

        loop {
            let params = wire::query_params(spec, start);
            let page = self.fetch_page(&path, &params).await?;
            for warning in &page.warnings {
                tracing::warn!(path = %path, warning = %warning, "WSAPI warning");
            }
            let page_len = page.results.len();
            results.extend(page.results);
            tracing::debug!(
                path = %path,
                start,
                page_len,
                collected = results.len(),
                total = ?page.total_result_count,
                "fetched query page"
            );

            match wire::next_start(
                &spec.pagination,
                start,
                page_len,
                results.len(),
                page.total_result_count,
            ) {
                Some(next) => start = next,
                None => break,
            }
        }

        if let Some(limit) = spec.pagination.limit.as_option() {
            results.truncate(limit as usize);
        }
        Ok(QueryResult { results })
    }

    async fn create(&self, spec: &CreateSpec) -> Result<CreateResult, TransportError> {
        let path = wire::create_path(spec);
        let request = self
            .http
            .post(self.url(&path))
            .query(&wire::create_params(spec))
            .json(&wire::create_body(spec));
        let body = self.send(request).await?;
        let page = wire::parse_create_result(&body)?;
        for warning in &page.warnings {
            tracing::warn!(path = %path, warning = %warning, "WSAPI warning");
        }
        tracing::debug!(
            path = %path,
            created = page.object.is_some(),
            "create completed"
        );
        Ok(CreateResult {
            object: page.object,
        })
    }
}

impl std::fmt::Debug for RallyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RallyClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
