//! Stateless request builder and response parser for the query API.
//!
//! # Design
//! `QueryClient` holds only the resolved `ClientConfig`. Each operation is
//! split into a `build_*` method producing an `HttpRequest` and a `parse_*`
//! method consuming an `HttpResponse`; the caller (or `FilterClient`)
//! performs the round-trip in between. Nothing here touches the network.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::form_urlencoded;

use crate::config::{ClientConfig, ClientOptions};
use crate::error::{ApiError, Result};
use crate::filter::{format_filter, FilterOptions};
use crate::hex::HexColor;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE_FORM};
use crate::record::ColorRecord;

/// Options for `parse_query`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Unwrap `[[{"Value": v}]]` payloads to `v`.
    pub get_first_value: bool,
}

impl QueryOptions {
    pub fn first_value() -> Self {
        Self {
            get_first_value: true,
        }
    }
}

/// The SQL statement that selects one color row.
pub fn color_lookup_sql(color: HexColor) -> String {
    format!("SELECT * FROM 'color' WHERE ID = {}", color.id())
}

/// Synchronous, stateless client for the query API.
#[derive(Debug, Clone)]
pub struct QueryClient {
    config: ClientConfig,
}

impl QueryClient {
    pub fn new(api_key: &str, options: ClientOptions) -> Result<Self> {
        ClientConfig::new(api_key, options).map(Self::from_config)
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the POST for an arbitrary SQL statement.
    pub fn build_query(&self, sql: &str) -> Result<HttpRequest> {
        if sql.trim().is_empty() {
            return Err(ApiError::InvalidArgument("sql"));
        }
        Ok(self.encode_request(sql))
    }

    /// Decode a query response body.
    ///
    /// The status code is not inspected: whatever JSON came back is handed
    /// to the caller, including `null` and error objects.
    pub fn parse_query(&self, response: HttpResponse, options: QueryOptions) -> Result<Value> {
        let payload = decode_body(&response)?;
        if options.get_first_value {
            if let Some(value) = first_value(&payload) {
                return Ok(value);
            }
            trace!("payload is not a nested value array, returning it unchanged");
        }
        Ok(payload)
    }

    /// Build the POST that fetches the table row for `color`.
    pub fn build_color_lookup(&self, color: HexColor) -> HttpRequest {
        self.encode_request(&color_lookup_sql(color))
    }

    /// Decode a color lookup response without mapping the row.
    ///
    /// `null` becomes `ColorNotFound` and `{"error": ...}` becomes
    /// `RemoteQuery`; any other payload is returned as received.
    pub fn parse_color_lookup(&self, response: HttpResponse, color: HexColor) -> Result<Value> {
        let payload = decode_body(&response)?;
        if payload.is_null() {
            return Err(not_found(color));
        }
        if let Some(message) = remote_error(&payload) {
            return Err(ApiError::RemoteQuery(message));
        }
        Ok(payload)
    }

    /// Decode a color lookup response into a `ColorRecord`.
    pub fn parse_color_record(&self, response: HttpResponse, color: HexColor) -> Result<ColorRecord> {
        let payload = self.parse_color_lookup(response, color)?;
        let record = ColorRecord::from_rows(&payload)?.ok_or_else(|| not_found(color))?;
        debug!(%color, fields = record.len(), "decoded color record");
        Ok(record)
    }

    /// Decode a color lookup response straight into a CSS filter value.
    pub fn parse_filter(
        &self,
        response: HttpResponse,
        color: HexColor,
        options: FilterOptions,
    ) -> Result<String> {
        let record = self.parse_color_record(response, color)?;
        Ok(format_filter(&record, options))
    }

    fn encode_request(&self, sql: &str) -> HttpRequest {
        let encoded_sql = BASE64.encode(sql.as_bytes());
        trace!(sql, encoded_sql = %encoded_sql, "encoding query");

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("apikey", self.config.api_key())
            .append_pair("dbowner", &self.config.db_owner)
            .append_pair("dbname", &self.config.db_name)
            .append_pair("sql", &encoded_sql)
            .finish();

        HttpRequest {
            method: HttpMethod::Post,
            path: self.config.query_url(),
            headers: vec![("content-type".to_string(), CONTENT_TYPE_FORM.to_string())],
            body: Some(body),
        }
    }
}

/// The one cell of a `[[{"Value": v}]]` payload that matters.
#[derive(Deserialize)]
struct FirstValueCell {
    #[serde(rename = "Value")]
    value: Value,
}

fn first_value(payload: &Value) -> Option<Value> {
    let rows = Vec::<Vec<FirstValueCell>>::deserialize(payload).ok()?;
    let cell = rows.into_iter().next()?.into_iter().next()?;
    Some(cell.value)
}

fn remote_error(payload: &Value) -> Option<String> {
    let error = payload.as_object()?.get("error")?;
    Some(match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

fn decode_body(response: &HttpResponse) -> Result<Value> {
    debug!(status = response.status, bytes = response.body.len(), "query response");
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Transport(format!("response body is not JSON: {e}")))
}

fn not_found(color: HexColor) -> ApiError {
    ApiError::ColorNotFound {
        hex: color.to_string(),
        id: color.id(),
    }
}
