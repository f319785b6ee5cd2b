//! # lms-client
//!
//! A Rust client for learning-management REST APIs whose list endpoints
//! follow the link-header pagination convention.
//!
//! The heart of the crate is [`PaginatedList`]: an indexable, iterable,
//! lazily-growing collection of JSON records. It walks the next-page cursor
//! transparently, applies columnar filters to each page as it arrives, and
//! supports bulk invocation of typed actions across every item.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use lms_client::{InvokeOptions, ListRequest, LmsClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = LmsClient::new("https://lms.example.edu", "access-token")?;
//!
//!     // Pages are fetched on demand as iteration advances
//!     let mut courses = client.courses();
//!     let mut iter = courses.iter();
//!     while let Some(course) = iter.next().await? {
//!         println!("{}", course["name"]);
//!     }
//!
//!     // Filters narrow each page as it is materialized
//!     let mut active = client.list::<lms_client::Course>(
//!         ListRequest::get("/courses").filter("workflow_state", ["available"]),
//!     );
//!     let names = active.load_all().await?.len();
//!     println!("{names} active courses");
//!
//!     // Bulk invocation fans one action out across every item
//!     let rosters = active.invoke_all("users", InvokeOptions::new()).await?;
//!     println!("{} enrollments", rosters.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     PaginatedList<T>                      │
//! │  get(i) / iter() / column(name) / invoke_all(action)      │
//! └───────────────────────────────────────────────────────────┘
//!          │                  │                    │
//! ┌────────┴───────┐ ┌────────┴────────┐ ┌─────────┴─────────┐
//! │  Page Fetcher  │ │  Filter Engine  │ │  Action Registry  │
//! ├────────────────┤ ├─────────────────┤ ├───────────────────┤
//! │ Link header    │ │ Numeric ops     │ │ Scalar            │
//! │ meta.pagination│ │ Globs           │ │ Nested list       │
//! │ Root key       │ │ Negation        │ │ Projectable       │
//! └────────┬───────┘ └─────────────────┘ └───────────────────┘
//!          │
//! ┌────────┴──────────────────────────┐
//! │      Requester (transport)        │
//! │  bearer auth, retry, rate limit   │
//! └───────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Columnar record filtering
pub mod filter;

/// Single-page fetching for the pagination protocol
pub mod page;

/// Lazy paginated collections
pub mod list;

/// Domain objects and their action registries
pub mod resource;

/// Top-level API client
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::LmsClient;
pub use error::{Error, Result};
pub use filter::{apply_filters, FilterSpec};
pub use list::{InvokeOptions, ListContext, ListIter, ListRequest, PaginatedList};
pub use resource::{Account, ActionOutput, ActionRegistry, Course, Resource, RowSource, User};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
