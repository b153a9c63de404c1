use crate::home_feed::HomeFeed;
use crate::response::{QueryResponse, Response};
use crate::views::HomeMoviesView;
use rocket::{Route, State};

#[get("/api/home-movies")]
pub async fn list(feed: &State<HomeFeed>) -> QueryResponse<HomeMoviesView> {
  let movies = feed.movies().await?;

  Response::success(HomeMoviesView { movies })
}

pub fn build() -> Vec<Route> {
  routes![list]
}
