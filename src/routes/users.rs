use crate::auth::Principal;
use crate::guards::Auth;
use crate::history::SearchHistory;
use crate::response::{MutationResponse, QueryResponse, Response};
use crate::reviews::ReviewStore;
use crate::views::{MyReviewsView, SuccessView, UserReviewsView};
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackSearchMutation {
  item_id: Option<Value>,
  item_name: Option<String>,
  item_type: Option<String>,
}

/// Item ids arrive as strings or, for movies, as bare numbers.
fn item_id(value: Option<Value>) -> Option<String> {
  match value? {
    Value::String(id) => Some(id),
    Value::Number(id) => Some(id.to_string()),
    _ => None,
  }
}

#[post("/api/users/track-search", data = "<body>")]
pub async fn track_search(
  auth: Auth<Principal>,
  body: Json<TrackSearchMutation>,
  history: &State<SearchHistory>,
) -> MutationResponse<SuccessView> {
  let body = body.into_inner();

  history
    .record_for(&auth.0, item_id(body.item_id), body.item_name, body.item_type)
    .await?;

  Response::success(SuccessView::ok())
}

#[get("/api/users/my-reviews")]
pub async fn my_reviews(
  auth: Auth<Principal>,
  reviews: &State<ReviewStore>,
  history: &State<SearchHistory>,
) -> QueryResponse<UserReviewsView> {
  let (reviews, history) = reviews.list_mine_with_history(&auth.0, history).await?;

  Response::success(MyReviewsView::new(reviews, history).into())
}

pub fn build() -> Vec<Route> {
  routes![track_search, my_reviews]
}
