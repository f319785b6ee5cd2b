//! Single-page fetching for the pagination protocol
//!
//! One `fetch_page` call performs exactly one HTTP round trip and reduces
//! the response to a `Page`: the raw records of that page plus the next-page
//! cursor, already relativized against the requester's base URL.
//!
//! Cursor priority follows the wire convention of the LMS APIs this crate
//! targets: the `Link` response header carries `rel="next"` on most
//! endpoints, but a handful instead embed a `meta.pagination.next` field in
//! the body.

use crate::error::{Error, Result};
use crate::http::{RequestConfig, Requester};
use crate::types::{JsonValue, Method, Record, StringMap, ValueMap};
use tracing::debug;


/// Descriptor for one page request
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// HTTP method
    pub method: Method,
    /// URL, relative to the requester's base URL
    pub url: String,
    /// Query parameters for this request
    pub params: StringMap,
    /// Body field under which the record list is wrapped, if any
    pub root: Option<String>,
    /// Full URL replacing base-URL resolution, if any
    pub url_override: Option<String>,
    /// Static columns merged into every record of the page
    pub extra_attribs: ValueMap,
}

/// One fetched page of records
#[derive(Debug, Clone)]
pub struct Page {
    /// Records extracted from the response body, nulls dropped
    pub records: Vec<Record>,
    /// Next-page cursor, relative to the base URL; None when exhausted
    pub next_url: Option<String>,
}

/// Fetch one page and extract its records and next-page cursor.
pub async fn fetch_page(requester: &Requester, request: &PageRequest) -> Result<Page> {
    let mut config = RequestConfig::new().query_map(request.params.clone());
    if let Some(url) = &request.url_override {
        config = config.url_override(url);
    }

    let response = requester.request(request.method, &request.url, config).await?;

    let next_url = next_cursor(requester.base_url(), &response.links, &response.body)?;
    let records = extract_records(response.body, request)?;

    debug!(
        url = %request.url,
        records = records.len(),
        has_next = next_url.is_some(),
        "fetched page"
    );

    Ok(Page { records, next_url })
}

/// Determine the next-page cursor and reduce it to a base-relative path.
///
/// The `Link` header takes priority; a body-embedded `meta.pagination.next`
/// is the fallback. A missing cursor means the collection is exhausted.
fn next_cursor(
    base_url: &str,
    links: &StringMap,
    body: &JsonValue,
) -> Result<Option<String>> {
    let next_link = links
        .get("next")
        .map(String::as_str)
        .or_else(|| meta_pagination_next(body));

    let Some(link) = next_link else {
        return Ok(None);
    };

    match link.strip_prefix(base_url) {
        Some(relative) => Ok(Some(relative.to_string())),
        None => Err(Error::foreign_next_link(link, base_url)),
    }
}

/// Body-embedded cursor: `meta.pagination.next`, when the body is an object
/// carrying a `meta` key. Absent intermediate keys mean no further pages.
fn meta_pagination_next(body: &JsonValue) -> Option<&str> {
    body.as_object()?
        .get("meta")?
        .get("pagination")?
        .get("next")?
        .as_str()
}

/// Extract the page's records, unwrapping the configured root key and
/// merging static extra attributes into every record.
fn extract_records(body: JsonValue, request: &PageRequest) -> Result<Vec<Record>> {
    let data = match &request.root {
        Some(root) => match body {
            JsonValue::Object(mut map) => map
                .remove(root)
                .ok_or_else(|| Error::missing_root_key(root.clone()))?,
            _ => return Err(Error::missing_root_key(root.clone())),
        },
        None => body,
    };

    let JsonValue::Array(elements) = data else {
        return Err(Error::unexpected_body(
            "expected an array of records in the response",
        ));
    };

    let mut records = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            JsonValue::Null => {}
            JsonValue::Object(mut record) => {
                for (key, value) in &request.extra_attribs {
                    record.insert(key.clone(), value.clone());
                }
                records.push(record);
            }
            other => {
                return Err(Error::unexpected_body(format!(
                    "expected record objects in the response, found {other}"
                )));
            }
        }
    }

    Ok(records)
}
