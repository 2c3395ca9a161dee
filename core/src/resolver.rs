//! Transport-driving client: one round-trip per operation.
//!
//! `FilterClient` pairs a `QueryClient` with an injected `Transport`. Every
//! public method validates its input first, so invalid arguments and bad
//! hex colors never reach the transport.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::{QueryClient, QueryOptions};
use crate::config::{ClientConfig, ClientOptions};
use crate::error::Result;
use crate::filter::{format_filter, FilterOptions};
use crate::hex::HexColor;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::record::ColorRecord;

/// Hex color to CSS filter client.
#[derive(Debug, Clone)]
pub struct FilterClient<T> {
    queries: QueryClient,
    transport: T,
}

impl<T: Transport> FilterClient<T> {
    /// Create a client for `api_key`, resolving `options` against the
    /// defaults. Fails with `InvalidArgument` when `api_key` is empty.
    pub fn new(api_key: &str, options: ClientOptions, transport: T) -> Result<Self> {
        Ok(Self::with_config(ClientConfig::new(api_key, options)?, transport))
    }

    pub fn with_config(config: ClientConfig, transport: T) -> Self {
        Self {
            queries: QueryClient::from_config(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.queries.config()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `sql` against the dataset and return the decoded JSON.
    #[instrument(skip(self))]
    pub fn query_db(&self, sql: &str, options: QueryOptions) -> Result<Value> {
        let request = self.queries.build_query(sql)?;
        let response = self.send(request)?;
        self.queries.parse_query(response, options)
    }

    /// Fetch and decode the coefficient row for `hex_color`.
    #[instrument(skip(self))]
    pub fn fetch_color_record(&self, hex_color: &str) -> Result<ColorRecord> {
        let color = HexColor::parse(hex_color)?;
        let response = self.send(self.queries.build_color_lookup(color))?;
        self.queries.parse_color_record(response, color)
    }

    /// Fetch the row for `hex_color` without mapping it, for callers that
    /// need the tabular shape. `null` and error payloads still fail.
    #[instrument(skip(self))]
    pub fn fetch_color_record_raw(&self, hex_color: &str) -> Result<Value> {
        let color = HexColor::parse(hex_color)?;
        let response = self.send(self.queries.build_color_lookup(color))?;
        self.queries.parse_color_lookup(response, color)
    }

    /// Fetch the row for `hex_color` and render it as a CSS filter value.
    #[instrument(skip(self))]
    pub fn fetch_filter(&self, hex_color: &str, options: FilterOptions) -> Result<String> {
        let record = self.fetch_color_record(hex_color)?;
        let filter = format_filter(&record, options);
        debug!(%filter, "resolved filter");
        Ok(filter)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), path = %request.path, "sending query");
        Ok(self.transport.execute(request)?)
    }
}
