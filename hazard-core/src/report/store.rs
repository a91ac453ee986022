//! Opaque document-store seam for persisted reports.
//!
//! The query engine only ever talks to [`ReportStore`]'s find/count/insert/
//! update/delete primitives; the persistence engine behind them is out of
//! scope. [`MemoryStore`] is the reference implementation used by tests and
//! embedding binaries.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::ReportError;

use super::{Report, query::SortOrder};

#[async_trait]
pub trait ReportStore<R: Report>: Send + Sync {
    async fn insert(&self, report: R) -> Result<(), ReportError>;

    async fn get(&self, id: Uuid) -> Result<Option<R>, ReportError>;

    /// Bounded read: filter, sort, skip, limit.
    async fn find(
        &self,
        filter: &R::Filter,
        sort_key: R::SortKey,
        sort_order: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<R>, ReportError>;

    /// Unbounded count over the same filter predicate `find` uses.
    async fn count(&self, filter: &R::Filter) -> Result<u64, ReportError>;

    /// Apply a partial update; `None` when the id does not exist.
    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<Option<R>, ReportError>;

    /// Remove a document; `None` when the id does not exist.
    async fn delete(&self, id: Uuid) -> Result<Option<R>, ReportError>;
}

/// In-memory document store. Single writer at a time via the RwLock; each
/// primitive is one atomic step, matching the single-document atomicity the
/// report operations rely on.
#[derive(Debug, Default)]
pub struct MemoryStore<R> {
    docs: RwLock<Vec<R>>,
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<R: Report> ReportStore<R> for MemoryStore<R> {
    async fn insert(&self, report: R) -> Result<(), ReportError> {
        self.docs.write().await.push(report);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>, ReportError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| doc.id() == id).cloned())
    }

    async fn find(
        &self,
        filter: &R::Filter,
        sort_key: R::SortKey,
        sort_order: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<R>, ReportError> {
        let docs = self.docs.read().await;

        let mut matched: Vec<R> = docs.iter().filter(|doc| doc.matches(filter)).cloned().collect();
        matched.sort_by(|a, b| {
            let ord = a.compare(b, sort_key);
            match sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(matched
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, filter: &R::Filter) -> Result<u64, ReportError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|doc| doc.matches(filter)).count() as u64)
    }

    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<Option<R>, ReportError> {
        let mut docs = self.docs.write().await;

        Ok(docs.iter_mut().find(|doc| doc.id() == id).map(|doc| {
            doc.apply(patch, Utc::now());
            doc.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<R>, ReportError> {
        let mut docs = self.docs.write().await;

        match docs.iter().position(|doc| doc.id() == id) {
            Some(index) => Ok(Some(docs.remove(index))),
            None => Ok(None),
        }
    }
}
