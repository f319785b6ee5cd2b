//! Concrete LMS resources
//!
//! Thin typed wrappers over the raw records the API returns. Each type
//! registers its callable behaviors in a static [`ActionRegistry`]; the
//! registries deliberately cover all three action output shapes.

use super::{ActionOutput, ActionRegistry, Resource};
use crate::error::{Error, Result};
use crate::http::Requester;
use crate::list::{ListContext, ListRequest, PaginatedList};
use crate::types::{JsonValue, Record};
use async_trait::async_trait;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use std::sync::Arc;

fn record_id(kind: &'static str, record: &Record) -> Result<i64> {
    record
        .get("id")
        .and_then(JsonValue::as_i64)
        .ok_or_else(|| Error::Other(format!("{kind} record has no id field")))
}

/// Fetch a single object endpoint and return its record
async fn fetch_object(requester: &Requester, path: &str) -> Result<Record> {
    let response = requester.get(path).await?;
    match response.body {
        JsonValue::Object(record) => Ok(record),
        _ => Err(Error::unexpected_body(format!(
            "expected an object from {path}"
        ))),
    }
}

// ============================================================================
// Course
// ============================================================================

/// One course
pub struct Course {
    requester: Arc<Requester>,
    record: Record,
}

impl Course {
    /// Course name, when present
    pub fn name(&self) -> Option<&str> {
        self.record.get("name").and_then(JsonValue::as_str)
    }

    /// The course's workflow state field as a raw value
    pub fn workflow_state(&self) -> JsonValue {
        self.record
            .get("workflow_state")
            .cloned()
            .unwrap_or(JsonValue::Null)
    }

    /// The users enrolled in this course, as a lazy paginated collection
    pub fn users(&self) -> Result<PaginatedList<User>> {
        let id = record_id(Self::KIND, &self.record)?;
        Ok(PaginatedList::new(
            Arc::clone(&self.requester),
            ListRequest::get(format!("/courses/{id}/users")),
        ))
    }

    /// The course settings object
    pub async fn settings(&self) -> Result<Record> {
        let id = record_id(Self::KIND, &self.record)?;
        fetch_object(&self.requester, &format!("/courses/{id}/settings")).await
    }
}

fn course_users(course: &Course) -> BoxFuture<'_, Result<ActionOutput>> {
    Box::pin(async move { Ok(ActionOutput::Nested(Box::new(course.users()?))) })
}

fn course_settings(course: &Course) -> BoxFuture<'_, Result<ActionOutput>> {
    Box::pin(async move { Ok(ActionOutput::Projectable(course.settings().await?)) })
}

fn course_workflow_state(course: &Course) -> BoxFuture<'_, Result<ActionOutput>> {
    Box::pin(async move { Ok(ActionOutput::Scalar(course.workflow_state())) })
}

static COURSE_ACTIONS: Lazy<ActionRegistry<Course>> = Lazy::new(|| {
    ActionRegistry::new()
        .with("users", course_users)
        .with("settings", course_settings)
        .with("workflow_state", course_workflow_state)
});

#[async_trait]
impl Resource for Course {
    const KIND: &'static str = "Course";

    fn from_record(
        requester: Arc<Requester>,
        record: Record,
        _context: Option<ListContext>,
    ) -> Self {
        Self { requester, record }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn registry() -> &'static ActionRegistry<Self> {
        &COURSE_ACTIONS
    }
}

// ============================================================================
// User
// ============================================================================

/// One user
pub struct User {
    requester: Arc<Requester>,
    record: Record,
    context: Option<ListContext>,
}

impl User {
    /// Display name, when present
    pub fn name(&self) -> Option<&str> {
        self.record.get("name").and_then(JsonValue::as_str)
    }

    /// The user's profile object
    pub async fn profile(&self) -> Result<Record> {
        let id = record_id(Self::KIND, &self.record)?;
        fetch_object(&self.requester, &format!("/users/{id}/profile")).await
    }
}

fn user_profile(user: &User) -> BoxFuture<'_, Result<ActionOutput>> {
    Box::pin(async move { Ok(ActionOutput::Projectable(user.profile().await?)) })
}

static USER_ACTIONS: Lazy<ActionRegistry<User>> =
    Lazy::new(|| ActionRegistry::new().with("profile", user_profile));

#[async_trait]
impl Resource for User {
    const KIND: &'static str = "User";

    fn from_record(
        requester: Arc<Requester>,
        record: Record,
        context: Option<ListContext>,
    ) -> Self {
        Self {
            requester,
            record,
            context,
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn registry() -> &'static ActionRegistry<Self> {
        &USER_ACTIONS
    }

    /// A user created from a course's user collection resolves "course" to
    /// the rows of that parent collection.
    async fn related(&self, kind: &str) -> Result<Option<Vec<Record>>> {
        if kind.eq_ignore_ascii_case("course") {
            return Ok(self.context.as_ref().map(|c| c.rows().to_vec()));
        }
        Ok(None)
    }
}

// ============================================================================
// Account
// ============================================================================

/// One account
pub struct Account {
    requester: Arc<Requester>,
    record: Record,
}

impl Account {
    /// Account name, when present
    pub fn name(&self) -> Option<&str> {
        self.record.get("name").and_then(JsonValue::as_str)
    }

    /// The courses under this account, as a lazy paginated collection
    pub fn courses(&self) -> Result<PaginatedList<Course>> {
        let id = record_id(Self::KIND, &self.record)?;
        Ok(PaginatedList::new(
            Arc::clone(&self.requester),
            ListRequest::get(format!("/accounts/{id}/courses")),
        ))
    }
}

fn account_courses(account: &Account) -> BoxFuture<'_, Result<ActionOutput>> {
    Box::pin(async move { Ok(ActionOutput::Nested(Box::new(account.courses()?))) })
}

static ACCOUNT_ACTIONS: Lazy<ActionRegistry<Account>> =
    Lazy::new(|| ActionRegistry::new().with("courses", account_courses));

#[async_trait]
impl Resource for Account {
    const KIND: &'static str = "Account";

    fn from_record(
        requester: Arc<Requester>,
        record: Record,
        _context: Option<ListContext>,
    ) -> Self {
        Self { requester, record }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn registry() -> &'static ActionRegistry<Self> {
        &ACCOUNT_ACTIONS
    }
}
