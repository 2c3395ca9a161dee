//! Hex color to CSS `filter` client.
//!
//! # Overview
//! Looks up precomputed filter coefficients for a hex color in a hosted
//! SQLite dataset (DBHub.io query API) and renders them as a CSS `filter`
//! value such as `invert(66%) sepia(56%) hue-rotate(110deg)`.
//!
//! # Design
//! - `QueryClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`.
//! - `FilterClient` drives one round-trip per call through an injected
//!   `Transport`; there is no global HTTP state.
//! - `HexColor`, `ColorRecord` and `format_filter` are pure and usable on
//!   their own.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod hex;
pub mod http;
pub mod record;
pub mod resolver;

pub use client::{color_lookup_sql, QueryClient, QueryOptions};
pub use config::{ClientConfig, ClientOptions};
pub use error::{ApiError, Result, TransportError};
pub use filter::{format_filter, FilterOptions};
pub use hex::HexColor;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use record::{Coefficient, ColorRecord};
pub use resolver::FilterClient;
