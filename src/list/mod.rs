//! Lazy paginated collections
//!
//! `PaginatedList<T>` is the externally visible abstraction of this crate:
//! an indexable, iterable, lazily-growing sequence of records. It fetches
//! pages on demand through [`fetch_page`](crate::page::fetch_page), applies
//! the configured filters to each page before caching it, and exposes bulk
//! invocation across all materialized items (see [`invoke`]).
//!
//! Growth is strictly triggered by a consuming access: an index beyond the
//! materialized bound, iteration advancing past it, or [`load_all`].
//! Already-fetched pages are cached for the lifetime of the collection and
//! never re-fetched; the materialized sequence only ever appends. A failed
//! later fetch leaves earlier cached pages intact.
//!
//! [`load_all`]: PaginatedList::load_all

mod invoke;

#[cfg(test)]
mod tests;

pub use invoke::InvokeOptions;

use crate::error::{Error, Result};
use crate::filter::{apply_filters, FilterSpec};
use crate::http::Requester;
use crate::page::{fetch_page, PageRequest};
use crate::resource::Resource;
use crate::types::{JsonValue, Method, Record, StringMap, ValueMap};
use futures::Stream;
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

/// Records fetched per page unless the caller overrides `per_page`
const DEFAULT_PER_PAGE: &str = "100";

// ============================================================================
// Request template
// ============================================================================

/// Template for the first request of a paginated collection
#[derive(Debug, Clone)]
pub struct ListRequest {
    method: Method,
    url: String,
    params: StringMap,
    filters: FilterSpec,
    extra_attribs: ValueMap,
    root: Option<String>,
    url_override: Option<String>,
}

impl ListRequest {
    /// Create a request template with an explicit method
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: StringMap::new(),
            filters: FilterSpec::new(),
            extra_attribs: ValueMap::new(),
            root: None,
            url_override: None,
        }
    }

    /// Create a GET request template
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a query parameter to the first request
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the page size for the first request
    #[must_use]
    pub fn per_page(self, per_page: u32) -> Self {
        self.param("per_page", per_page.to_string())
    }

    /// Add OR-combined filter predicates for one field
    #[must_use]
    pub fn filter<I, S>(mut self, field: impl Into<String>, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .insert(field.into(), predicates.into_iter().map(Into::into).collect());
        self
    }

    /// Set the whole filter specification at once
    #[must_use]
    pub fn filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    /// Merge a static attribute into every fetched record
    #[must_use]
    pub fn extra_attrib(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra_attribs.insert(key.into(), value.into());
        self
    }

    /// Unwrap the record list from this body field
    #[must_use]
    pub fn root(mut self, key: impl Into<String>) -> Self {
        self.root = Some(key.into());
        self
    }

    /// Replace base-URL resolution with this full URL for the first request
    #[must_use]
    pub fn url_override(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }
}

// ============================================================================
// List context
// ============================================================================

/// Immutable snapshot of a collection, handed to wrapped items as their
/// contextual parent during bulk invocation.
#[derive(Debug, Clone)]
pub struct ListContext {
    rows: Arc<Vec<Record>>,
}

impl ListContext {
    /// Snapshot a sequence of rows
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    /// The snapshotted rows
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }
}

// ============================================================================
// Paginated list
// ============================================================================

/// A lazily-growing, filterable collection of records of kind `T`.
pub struct PaginatedList<T: Resource> {
    requester: Arc<Requester>,
    method: Method,
    next_url: Option<String>,
    next_params: StringMap,
    filters: FilterSpec,
    extra_attribs: ValueMap,
    root: Option<String>,
    url_override: Option<String>,
    rows: Vec<Record>,
    _content: PhantomData<T>,
}

impl<T: Resource> PaginatedList<T> {
    /// Create a collection from a request template. No fetch happens until
    /// an access requires one.
    pub fn new(requester: Arc<Requester>, request: ListRequest) -> Self {
        let mut params = request.params;
        params
            .entry("per_page".to_string())
            .or_insert_with(|| DEFAULT_PER_PAGE.to_string());

        Self {
            requester,
            method: request.method,
            next_url: Some(request.url),
            next_params: params,
            filters: request.filters,
            extra_attribs: request.extra_attribs,
            root: request.root,
            url_override: request.url_override,
            rows: Vec::new(),
            _content: PhantomData,
        }
    }

    /// Whether further pages may exist
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }

    /// Number of records materialized so far (not the remote total)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing has been materialized yet
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The records materialized so far, in remote order
    pub fn materialized(&self) -> &[Record] {
        &self.rows
    }

    /// Fetch and append one page. Returns false once the cursor is
    /// exhausted. The materialized prefix is untouched on error.
    async fn grow(&mut self) -> Result<bool> {
        let Some(url) = self.next_url.clone() else {
            return Ok(false);
        };

        let request = PageRequest {
            method: self.method,
            url,
            params: std::mem::take(&mut self.next_params),
            root: self.root.clone(),
            url_override: self.url_override.clone(),
            extra_attribs: self.extra_attribs.clone(),
        };

        let page = match fetch_page(&self.requester, &request).await {
            Ok(page) => page,
            Err(e) => {
                // Put the consumed parameters back so a later retry of the
                // same cursor sends the same request.
                self.next_params = request.params;
                return Err(e);
            }
        };

        // Continuation is carried entirely by the next link; the first
        // request's parameters are never re-sent.
        self.next_url = page.next_url;
        self.rows.extend(apply_filters(page.records, &self.filters));
        Ok(true)
    }

    /// Grow until the index is materialized or the cursor is exhausted
    async fn ensure_index(&mut self, index: usize) -> Result<()> {
        while self.rows.len() <= index && self.has_next() {
            self.grow().await?;
        }
        Ok(())
    }

    /// The record at a position, growing as needed. Out of range after
    /// exhaustion is a usage error.
    pub async fn get(&mut self, index: usize) -> Result<&Record> {
        self.ensure_index(index).await?;
        let len = self.rows.len();
        self.rows
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// The records in a position range, growing as needed
    pub async fn get_range(&mut self, range: Range<usize>) -> Result<&[Record]> {
        if range.end > 0 {
            self.ensure_index(range.end - 1).await?;
        }
        let len = self.rows.len();
        self.rows
            .get(range.clone())
            .ok_or(Error::IndexOutOfRange {
                index: range.end.saturating_sub(1),
                len,
            })
    }

    /// The ordered values of one field across all materialized records.
    ///
    /// Does not trigger growth. Records lacking the field contribute JSON
    /// null; a field present on no materialized record is a usage error.
    pub fn column(&self, name: &str) -> Result<Vec<JsonValue>> {
        if !self.rows.iter().any(|row| row.contains_key(name)) {
            return Err(Error::column_not_found(name));
        }

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(JsonValue::Null))
            .collect())
    }

    /// Materialize every remaining page and return the full sequence
    pub async fn load_all(&mut self) -> Result<&[Record]> {
        while self.grow().await? {}
        Ok(&self.rows)
    }

    /// Iterate over records from the start of the cache, growing past the
    /// materialized boundary as needed
    pub fn iter(&mut self) -> ListIter<'_, T> {
        ListIter { list: self, pos: 0 }
    }

    /// The same iteration as [`iter`](Self::iter), as a `Stream`
    pub fn stream(&mut self) -> impl Stream<Item = Result<Record>> + '_ {
        futures::stream::try_unfold(self.iter(), |mut iter| async move {
            Ok(iter.next().await?.map(|record| (record, iter)))
        })
    }

    fn requester(&self) -> &Arc<Requester> {
        &self.requester
    }
}

impl<T: Resource> std::fmt::Display for PaginatedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<PaginatedList of type {}>", T::KIND)
    }
}

impl<T: Resource> std::fmt::Debug for PaginatedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedList")
            .field("kind", &T::KIND)
            .field("materialized", &self.rows.len())
            .field("next_url", &self.next_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Cursor over a collection; restarts replay the cached prefix without
/// re-fetching pages.
pub struct ListIter<'a, T: Resource> {
    list: &'a mut PaginatedList<T>,
    pos: usize,
}

impl<T: Resource> ListIter<'_, T> {
    /// The next record, fetching further pages when the cursor passes the
    /// materialized boundary. Returns None once the collection is exhausted.
    pub async fn next(&mut self) -> Result<Option<Record>> {
        while self.list.rows.len() <= self.pos && self.list.has_next() {
            self.list.grow().await?;
        }

        match self.list.rows.get(self.pos) {
            Some(record) => {
                self.pos += 1;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}
