use crate::auth::Principal;
use crate::error::ApiError;
use crate::models::{NewSearchHistoryEntry, SearchHistoryEntry};
use crate::store::{
  query_newest_first, sort_newest_first, DocumentStore, Listing, Query, StoreError, SEARCH_HISTORY,
};
use std::sync::Arc;
use tracing::{debug, error};

pub const RECENT_LIMIT: usize = 20;

/// Append-only log of the items a user looked at.
#[derive(Clone)]
pub struct SearchHistory {
  store: Arc<dyn DocumentStore>,
}

impl SearchHistory {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  pub async fn record(&self, entry: NewSearchHistoryEntry) -> Result<(), ApiError> {
    let user_id = entry.user_id.clone();

    match self.store.create(SEARCH_HISTORY, entry.into_fields()).await {
      Ok(document) => {
        debug!(entry_id = %document.id, %user_id, "search recorded");
        Ok(())
      }
      Err(err) => {
        error!(%user_id, error = %err, "failed to record search");
        Err(ApiError::upstream("Failed to track search", err))
      }
    }
  }

  /// The user's [`RECENT_LIMIT`] most recent entries, newest first.
  pub async fn recent(&self, user_id: &str) -> Result<Vec<SearchHistoryEntry>, StoreError> {
    let query = Query::filter("userId", user_id).limit(RECENT_LIMIT);

    let documents = match query_newest_first(self.store.as_ref(), SEARCH_HISTORY, query).await? {
      Listing::Ordered(documents) => documents,
      Listing::Unordered(mut documents) => {
        sort_newest_first(&mut documents);
        documents.truncate(RECENT_LIMIT);
        documents
      }
    };

    Ok(documents.into_iter().map(SearchHistoryEntry::from).collect())
  }

  pub async fn record_for(
    &self,
    principal: &Principal,
    item_id: Option<String>,
    item_name: Option<String>,
    item_type: Option<String>,
  ) -> Result<(), ApiError> {
    self
      .record(NewSearchHistoryEntry {
        item_id,
        item_name,
        item_type,
        ..NewSearchHistoryEntry::new(principal)
      })
      .await
  }
}
