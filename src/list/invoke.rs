//! Bulk invocation across a collection
//!
//! Wraps every materialized record as a domain object, calls a named action
//! on each, and aggregates the per-item results into one combined tabular
//! result. Action names resolve against the resource type's capability
//! registry; a name with no entry is a usage error before any item runs.

use super::{ListContext, PaginatedList};
use crate::error::{Error, Result};
use crate::resource::{ActionOutput, Resource, RowSource};
use crate::types::Record;
use async_trait::async_trait;
use std::sync::Arc;

/// Options for one bulk invocation
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// When set, each item's result is replaced by the tabular projection
    /// of the item's related object of this kind
    pub return_type: Option<String>,
}

impl InvokeOptions {
    /// Default options: aggregate the action's own results
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the related object of this kind instead of action results
    #[must_use]
    pub fn return_type(mut self, kind: impl Into<String>) -> Self {
        self.return_type = Some(kind.into());
        self
    }
}

impl<T: Resource> PaginatedList<T> {
    /// Invoke a named action on every materialized record and aggregate the
    /// results into one combined sequence of rows.
    ///
    /// Each record is wrapped as a `T` with this collection's snapshot as
    /// its contextual parent. Scalars aggregate as one-column rows, nested
    /// collections as all of their rows, projectable objects as one row
    /// each.
    pub async fn invoke_all(&self, action: &str, options: InvokeOptions) -> Result<Vec<Record>> {
        let Some(handler) = T::registry().get(action) else {
            return Err(Error::unknown_action(T::KIND, action));
        };

        let context = ListContext::new(self.materialized().to_vec());
        let mut combined = Vec::new();

        for row in self.materialized() {
            let item = T::from_record(
                Arc::clone(self.requester()),
                row.clone(),
                Some(context.clone()),
            );

            if let Some(kind) = &options.return_type {
                // The per-item action still runs (with any side effects);
                // only its result is discarded in favor of the related
                // projection.
                handler(&item).await?;
                if let Some(mut rows) = item.related(kind).await? {
                    combined.append(&mut rows);
                }
                continue;
            }

            match handler(&item).await? {
                ActionOutput::Scalar(value) => {
                    let mut record = Record::new();
                    record.insert("value".to_string(), value);
                    combined.push(record);
                }
                ActionOutput::Nested(source) => combined.extend(source.collect_rows().await?),
                ActionOutput::Projectable(record) => combined.push(record),
            }
        }

        Ok(combined)
    }
}

#[async_trait]
impl<T: Resource> RowSource for PaginatedList<T> {
    async fn collect_rows(mut self: Box<Self>) -> Result<Vec<Record>> {
        self.load_all().await?;
        Ok(self.rows)
    }
}
