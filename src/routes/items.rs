use crate::data_types::SearchCategory;
use crate::items::ItemDetails;
use crate::response::{QueryResponse, Response};
use rocket::{Route, State};
use serde_json::Value;

#[derive(FromForm, Debug)]
pub struct ItemParams {
  #[field(name = "type")]
  category: Option<String>,
}

#[get("/api/items/<id>?<params..>")]
pub async fn get(
  id: &str,
  params: ItemParams,
  items: &State<ItemDetails>,
) -> QueryResponse<Value> {
  let details = items
    .get(id, SearchCategory::parse(params.category.as_deref()))
    .await?;

  Response::success(details)
}

pub fn build() -> Vec<Route> {
  routes![get]
}
