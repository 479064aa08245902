//! HTTP fetch strategy
//!
//! Offset pagination against a JSON endpoint: `GET url?offset=N&limit=M`,
//! records taken from the body at an optional dot path.

use super::types::{PageFuture, PageSource};
use crate::config::HttpSourceConfig;
use crate::error::{Error, Result};
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;
use url::Url;

/// Offset pagination over HTTP
pub struct HttpSource<T> {
    client: Client,
    url: Url,
    offset_param: String,
    limit_param: String,
    records_path: Option<String>,
    _items: PhantomData<fn() -> T>,
}

impl<T> HttpSource<T> {
    /// Build the source and its HTTP client from config
    pub fn new(config: &HttpSourceConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("Invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("Invalid value for header '{key}': {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .user_agent(format!("pagewise/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: Url::parse(&config.url)?,
            offset_param: config.offset_param.clone(),
            limit_param: config.limit_param.clone(),
            records_path: config.records_path.clone(),
            _items: PhantomData,
        })
    }

    /// URL of the page starting at `offset`
    pub fn page_url(&self, offset: usize, limit: usize) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair(&self.offset_param, &offset.to_string())
            .append_pair(&self.limit_param, &limit.to_string());
        url
    }
}

impl<T> std::fmt::Debug for HttpSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("url", &self.url.as_str())
            .field("offset_param", &self.offset_param)
            .field("limit_param", &self.limit_param)
            .field("records_path", &self.records_path)
            .finish_non_exhaustive()
    }
}

impl<T> PageSource<T> for HttpSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn load_page(&self, existing: Option<&[T]>, limit: usize) -> PageFuture<T> {
        let offset = existing.map_or(0, <[T]>::len);
        let url = self.page_url(offset, limit);
        let client = self.client.clone();
        let records_path = self.records_path.clone();

        async move {
            debug!(%url, offset, limit, "requesting page");
            let response = client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::http_status(status.as_u16(), body));
            }

            let body: Value = response.json().await?;
            decode_records(body, records_path.as_deref())
        }
        .boxed()
    }
}

/// Pull the records array out of a response body
fn decode_records<T: DeserializeOwned>(body: Value, records_path: Option<&str>) -> Result<Vec<T>> {
    let records = match records_path {
        Some(path) => match extract_path(body, path) {
            Some(value) => value,
            // A missing key is an empty page
            None => return Ok(Vec::new()),
        },
        None => body,
    };

    match records {
        Value::Array(_) => serde_json::from_value(records).map_err(|e| Error::Decode {
            message: format!("Failed to decode records: {e}"),
        }),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::decode(format!(
            "Expected an array of records, found {}",
            json_kind(&other)
        ))),
    }
}

/// Walk a dot path (`$.data.items`, `results.0.rows`)
fn extract_path(value: Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Object(mut map) => map.remove(part)?,
            Value::Array(mut items) => {
                let index = part.parse::<usize>().ok()?;
                if index >= items.len() {
                    return None;
                }
                items.swap_remove(index)
            }
            _ => return None,
        };
    }
    Some(current)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
