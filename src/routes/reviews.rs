use crate::auth::Principal;
use crate::error::ApiError;
use crate::guards::Auth;
use crate::history::SearchHistory;
use crate::response::{MutationResponse, QueryResponse, Response};
use crate::reviews::{CreateReview, ReviewStore, UpdateReview};
use crate::views::{MyReviewsView, ReviewView, SuccessView};
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewMutation {
  rating: Option<Value>,
  comment: Option<String>,
  item_type: Option<String>,
  item_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateReviewMutation {
  rating: Option<Value>,
  comment: Option<String>,
}

#[get("/api/items/<item_id>/reviews")]
pub async fn list(item_id: &str, reviews: &State<ReviewStore>) -> QueryResponse<Vec<ReviewView>> {
  let reviews = reviews
    .list_by_item(item_id)
    .await?
    .into_inner()
    .into_iter()
    .map(ReviewView::from)
    .collect();

  Response::success(reviews)
}

#[post("/api/items/<item_id>/reviews", data = "<body>")]
pub async fn create(
  auth: Auth<Principal>,
  item_id: &str,
  body: Json<CreateReviewMutation>,
  reviews: &State<ReviewStore>,
) -> Result<Created<Json<ReviewView>>, ApiError> {
  let body = body.into_inner();

  let review = reviews
    .create(
      item_id,
      &auth.0,
      CreateReview {
        rating: body.rating,
        comment: body.comment,
        item_type: body.item_type,
        item_name: body.item_name,
      },
    )
    .await?;

  let location = format!("/api/items/{}/reviews", review.item_id);
  Ok(Created::new(location).body(Json(ReviewView::from(review))))
}

#[put("/api/items/reviews/<id>", data = "<body>")]
pub async fn update(
  auth: Auth<Principal>,
  id: &str,
  body: Json<UpdateReviewMutation>,
  reviews: &State<ReviewStore>,
) -> MutationResponse<ReviewView> {
  let body = body.into_inner();

  let review = reviews
    .update(
      id,
      &auth.0,
      UpdateReview {
        rating: body.rating,
        comment: body.comment,
      },
    )
    .await?;

  Response::success(ReviewView::from(review))
}

#[delete("/api/items/reviews/<id>")]
pub async fn delete(
  auth: Auth<Principal>,
  id: &str,
  reviews: &State<ReviewStore>,
) -> MutationResponse<SuccessView> {
  reviews.delete(id, &auth.0).await?;

  Response::success(SuccessView::ok())
}

#[get("/api/items/my-reviews")]
pub async fn mine(
  auth: Auth<Principal>,
  reviews: &State<ReviewStore>,
  history: &State<SearchHistory>,
) -> QueryResponse<MyReviewsView> {
  let (reviews, history) = reviews.list_mine_with_history(&auth.0, history).await?;

  Response::success(MyReviewsView::new(reviews, history))
}

pub fn build() -> Vec<Route> {
  routes![list, create, update, delete, mine]
}
