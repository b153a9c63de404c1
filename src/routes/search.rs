use crate::data_types::SearchCategory;
use crate::response::{QueryResponse, Response};
use crate::search::SearchAggregator;
use crate::views::SearchView;
use rocket::{Route, State};

#[derive(FromForm, Debug)]
pub struct SearchParams {
  q: Option<String>,
  #[field(name = "type")]
  category: Option<String>,
  location: Option<String>,
}

#[get("/api/search?<params..>")]
pub async fn search(
  params: SearchParams,
  aggregator: &State<SearchAggregator>,
) -> QueryResponse<SearchView> {
  let results = aggregator
    .search(
      params.q.as_deref(),
      SearchCategory::parse(params.category.as_deref()),
      params.location.as_deref(),
    )
    .await?;

  Response::success(SearchView {
    results: results.into_values(),
  })
}

pub fn build() -> Vec<Route> {
  routes![search]
}
