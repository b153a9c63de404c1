use serde::Serialize;
use serde_json::Value;

#[derive(Serialize, Debug)]
pub struct SearchView {
  pub results: Vec<Value>,
}

#[derive(Serialize, Debug)]
pub struct HomeMoviesView {
  pub movies: Vec<Value>,
}
