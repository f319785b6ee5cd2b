//! Domain objects wrapped around raw records
//!
//! A `Resource` is a typed wrapper over one [`Record`], built with the
//! transport capability and an optional contextual parent (the collection
//! the record came from). Each resource type publishes its callable
//! behaviors in a static [`ActionRegistry`]; the collection's bulk
//! invocation resolves action names against that registry, so an unknown
//! name is a usage error rather than a runtime reflection failure.

mod models;


pub use models::{Account, Course, User};

use crate::error::Result;
use crate::http::Requester;
use crate::list::ListContext;
use crate::types::{JsonValue, Record};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Action outputs
// ============================================================================

/// Result shape of one action invocation.
///
/// Bulk invocation branches on this tag to aggregate per-item results into
/// one combined tabular result.
pub enum ActionOutput {
    /// A single value, aggregated as a one-column record
    Scalar(JsonValue),
    /// A nested paginated collection, aggregated as all of its rows
    Nested(Box<dyn RowSource>),
    /// An object with a flat field-to-value view, aggregated as one row
    Projectable(Record),
}

impl std::fmt::Debug for ActionOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Nested(_) => f.debug_tuple("Nested").finish(),
            Self::Projectable(record) => f.debug_tuple("Projectable").field(record).finish(),
        }
    }
}

/// Anything that can be drained into a flat sequence of rows.
///
/// Implemented by `PaginatedList` so nested collections returned from
/// actions can be fully materialized during aggregation.
#[async_trait]
pub trait RowSource: Send {
    /// Materialize every remaining row and hand the full sequence back
    async fn collect_rows(self: Box<Self>) -> Result<Vec<Record>>;
}

// ============================================================================
// Action registry
// ============================================================================

/// A registered action: borrows the resource, returns one [`ActionOutput`]
pub type ActionFn<T> = for<'a> fn(&'a T) -> BoxFuture<'a, Result<ActionOutput>>;

/// Capability registry for one resource type: action name -> typed function
pub struct ActionRegistry<T> {
    actions: HashMap<&'static str, ActionFn<T>>,
}

impl<T> ActionRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Register an action under a name
    #[must_use]
    pub fn with(mut self, name: &'static str, action: ActionFn<T>) -> Self {
        self.actions.insert(name, action);
        self
    }

    /// Look up an action by name
    pub fn get(&self, name: &str) -> Option<ActionFn<T>> {
        self.actions.get(name).copied()
    }

    /// Check whether an action is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Names of all registered actions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl<T> Default for ActionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ActionRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

// ============================================================================
// Resource trait
// ============================================================================

/// A typed domain object over one raw record.
#[async_trait]
pub trait Resource: Sized + Send + Sync + 'static {
    /// Human-readable type name, used in errors and diagnostics
    const KIND: &'static str;

    /// Wrap a raw record, given the transport capability and an optional
    /// contextual parent
    fn from_record(
        requester: Arc<Requester>,
        record: Record,
        context: Option<ListContext>,
    ) -> Self;

    /// The raw field mapping backing this resource
    fn record(&self) -> &Record;

    /// The capability registry for this resource type
    fn registry() -> &'static ActionRegistry<Self>;

    /// Flat field-to-value view of this resource
    fn projection(&self) -> Record {
        self.record().clone()
    }

    /// The `id` field, when the record carries one
    fn id(&self) -> Option<i64> {
        self.record().get("id").and_then(JsonValue::as_i64)
    }

    /// Resolve a related/contextual object by type name and return its
    /// tabular projection. The default knows no related types.
    async fn related(&self, _kind: &str) -> Result<Option<Vec<Record>>> {
        Ok(None)
    }
}
