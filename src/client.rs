//! Top-level API client
//!
//! `LmsClient` is the entry point application code holds on to: it owns the
//! shared transport and hands out lazy paginated collections for the common
//! top-level resources. Construction normalizes the instance URL to the
//! versioned API root, so both `https://lms.example.edu` and
//! `https://lms.example.edu/api/v1` are accepted.

use crate::error::Result;
use crate::http::{Requester, RequesterConfig};
use crate::list::{ListRequest, PaginatedList};
use crate::resource::{Account, Course, Resource, User};
use std::sync::Arc;

/// Versioned API root appended to instance URLs
const API_ROOT: &str = "/api/v1";

/// Client for one LMS instance
#[derive(Debug, Clone)]
pub struct LmsClient {
    requester: Arc<Requester>,
}

impl LmsClient {
    /// Create a client for an instance URL and access token
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let config = RequesterConfig::builder()
            .base_url(normalize_base_url(&instance_url.into()))
            .access_token(access_token)
            .build();
        Self::with_config(config)
    }

    /// Create a client from a full requester configuration. The base URL is
    /// used verbatim.
    pub fn with_config(config: RequesterConfig) -> Result<Self> {
        Ok(Self {
            requester: Arc::new(Requester::new(config)?),
        })
    }

    /// The shared transport
    pub fn requester(&self) -> Arc<Requester> {
        Arc::clone(&self.requester)
    }

    /// A collection from an arbitrary request template
    pub fn list<T: Resource>(&self, request: ListRequest) -> PaginatedList<T> {
        PaginatedList::new(self.requester(), request)
    }

    /// The courses visible to the current user
    pub fn courses(&self) -> PaginatedList<Course> {
        self.list(ListRequest::get("/courses"))
    }

    /// The accounts visible to the current user
    pub fn accounts(&self) -> PaginatedList<Account> {
        self.list(ListRequest::get("/accounts"))
    }

    /// The users enrolled in a course
    pub fn course_users(&self, course_id: i64) -> PaginatedList<User> {
        self.list(ListRequest::get(format!("/courses/{course_id}/users")))
    }
}

fn normalize_base_url(instance_url: &str) -> String {
    let trimmed = instance_url.trim_end_matches('/');
    if trimmed.ends_with(API_ROOT) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_ROOT}")
    }
}
