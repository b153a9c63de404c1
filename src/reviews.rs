use crate::auth::Principal;
use crate::data_types::ItemType;
use crate::error::ApiError;
use crate::history::SearchHistory;
use crate::models::review::{coerce_rating, rating_from_json};
use crate::models::{NewReview, Review, ReviewChangeset, SearchHistoryEntry};
use crate::store::{
  is_valid_document_id, query_newest_first, sort_newest_first, DocumentStore, Listing, Query,
  StoreError, REVIEWS,
};
use rocket::futures::future::try_join;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct CreateReview {
  pub rating: Option<Value>,
  pub comment: Option<String>,
  pub item_type: Option<String>,
  pub item_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct UpdateReview {
  pub rating: Option<Value>,
  pub comment: Option<String>,
}

/// Reviews keyed by item id. Mutations are restricted to the review's author.
#[derive(Clone)]
pub struct ReviewStore {
  store: Arc<dyn DocumentStore>,
}

impl ReviewStore {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  /// Newest first when the store can order the query; otherwise in whatever
  /// order the store returns.
  pub async fn list_by_item(&self, item_id: &str) -> Result<Listing<Review>, ApiError> {
    let listing = query_newest_first(self.store.as_ref(), REVIEWS, Query::filter("itemId", item_id))
      .await
      .map_err(|e| ApiError::upstream("Failed to fetch reviews", e))?;

    Ok(listing.map(Review::from))
  }

  pub async fn create(
    &self,
    item_id: &str,
    principal: &Principal,
    input: CreateReview,
  ) -> Result<Review, ApiError> {
    let rating = rating_from_json(input.rating.as_ref())
      .ok_or_else(|| ApiError::InvalidArgument("Invalid rating".to_owned()))?;

    let mut review = NewReview::new(item_id, principal, rating);
    review.item_type = input
      .item_type
      .as_deref()
      .map(ItemType::parse_lenient)
      .unwrap_or_default();
    review.item_name = input.item_name.filter(|name| !name.is_empty());
    review.comment = input.comment.unwrap_or_default();

    let document = self
      .store
      .create(REVIEWS, review.into_fields())
      .await
      .map_err(|e| ApiError::upstream("Failed to create review", e))?;

    info!(review_id = %document.id, item_id, user_id = %principal.id, "review created");

    Ok(Review::from(document))
  }

  pub async fn update(
    &self,
    review_id: &str,
    principal: &Principal,
    input: UpdateReview,
  ) -> Result<Review, ApiError> {
    self
      .find_owned(review_id, principal, "Failed to update review")
      .await?;

    let rating = coerce_rating(input.rating.as_ref())
      .ok_or_else(|| ApiError::InvalidArgument("Invalid rating".to_owned()))?;

    let changeset = ReviewChangeset {
      rating,
      comment: input.comment.unwrap_or_default(),
    };

    let document = self
      .store
      .update(REVIEWS, review_id, changeset.into_fields())
      .await
      .map_err(|e| ApiError::from_store("Failed to update review", e))?;

    info!(review_id, user_id = %principal.id, "review updated");

    Ok(Review::from(document))
  }

  pub async fn delete(&self, review_id: &str, principal: &Principal) -> Result<(), ApiError> {
    self
      .find_owned(review_id, principal, "Failed to delete review")
      .await?;

    self
      .store
      .delete(REVIEWS, review_id)
      .await
      .map_err(|e| ApiError::from_store("Failed to delete review", e))?;

    info!(review_id, user_id = %principal.id, "review deleted");

    Ok(())
  }

  /// The principal's reviews newest first, sorted here so no composite index is needed.
  pub async fn list_by_user(&self, principal: &Principal) -> Result<Vec<Review>, StoreError> {
    let mut documents = self
      .store
      .query(REVIEWS, &Query::filter("userId", principal.id.as_str()))
      .await?;

    sort_newest_first(&mut documents);

    Ok(documents.into_iter().map(Review::from).collect())
  }

  pub async fn list_mine_with_history(
    &self,
    principal: &Principal,
    history: &SearchHistory,
  ) -> Result<(Vec<Review>, Vec<SearchHistoryEntry>), ApiError> {
    try_join(self.list_by_user(principal), history.recent(&principal.id))
      .await
      .map_err(|e| ApiError::upstream("Failed to fetch my reviews & history", e))
  }

  /// Mean rating of an item's reviews, 0 when it has none.
  pub async fn average_rating(&self, item_id: &str) -> Result<f64, StoreError> {
    let documents = self
      .store
      .query(REVIEWS, &Query::filter("itemId", item_id))
      .await?;

    if documents.is_empty() {
      return Ok(0.0);
    }

    let count = documents.len() as f64;
    let total: f64 = documents
      .into_iter()
      .map(|document| Review::from(document).rating_value())
      .sum();

    Ok(total / count)
  }

  async fn find_owned(
    &self,
    review_id: &str,
    principal: &Principal,
    message: &str,
  ) -> Result<Review, ApiError> {
    if !is_valid_document_id(review_id) {
      return Err(ApiError::NotFound("Review not found".to_owned()));
    }

    let review = self
      .store
      .get(REVIEWS, review_id)
      .await
      .map_err(|e| ApiError::from_store(message, e))?
      .map(Review::from)
      .ok_or_else(|| ApiError::NotFound("Review not found".to_owned()))?;

    if !review.is_owned_by(principal) {
      return Err(ApiError::Forbidden("Unauthorized".to_owned()));
    }

    Ok(review)
  }
}
