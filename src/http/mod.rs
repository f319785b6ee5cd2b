//! HTTP transport layer
//!
//! The `Requester` owns everything below the pagination protocol:
//! - Bearer-token authentication
//! - Automatic retries with configurable backoff
//! - Rate limiting to prevent API throttling
//! - JSON body parsing and RFC 5988 `Link` header extraction
//!
//! Retry and backoff live here and only here; the collection layer above
//! never retries a failed fetch.

mod client;
mod rate_limit;

pub use client::{
    parse_link_header, ApiResponse, RequestConfig, Requester, RequesterConfig,
    RequesterConfigBuilder,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
