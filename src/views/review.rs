use super::{iso_timestamp, SearchHistoryView};
use crate::data_types::ItemType;
use crate::models::{Review, SearchHistoryEntry};
use serde::Serialize;
use serde_json::Number;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
  pub id: String,
  pub item_id: String,
  pub item_name: Option<String>,
  pub rating: Number,
  pub comment: String,
  pub item_type: ItemType,
  pub user_id: Option<String>,
  pub username: String,
  pub created_at: Option<String>,
  pub updated_at: Option<String>,
}

impl From<Review> for ReviewView {
  fn from(review: Review) -> Self {
    ReviewView {
      id: review.id,
      item_id: review.item_id,
      item_name: review.item_name,
      rating: review.rating,
      comment: review.comment,
      item_type: review.item_type,
      user_id: review.user_id,
      username: review.username,
      created_at: iso_timestamp(review.created_at),
      updated_at: iso_timestamp(review.updated_at),
    }
  }
}

#[derive(Serialize, Debug)]
pub struct MyReviewsView {
  pub reviews: Vec<ReviewView>,
  pub history: Vec<SearchHistoryView>,
}

impl MyReviewsView {
  pub fn new(reviews: Vec<Review>, history: Vec<SearchHistoryEntry>) -> Self {
    MyReviewsView {
      reviews: reviews.into_iter().map(ReviewView::from).collect(),
      history: history.into_iter().map(SearchHistoryView::from).collect(),
    }
  }
}

#[derive(Serialize, Debug)]
pub struct UserReviewsView {
  pub success: bool,
  pub reviews: Vec<ReviewView>,
  pub history: Vec<SearchHistoryView>,
}

impl From<MyReviewsView> for UserReviewsView {
  fn from(view: MyReviewsView) -> Self {
    UserReviewsView {
      success: true,
      reviews: view.reviews,
      history: view.history,
    }
  }
}

#[derive(Serialize, Debug)]
pub struct SuccessView {
  pub success: bool,
}

impl SuccessView {
  pub fn ok() -> Self {
    SuccessView { success: true }
  }
}
