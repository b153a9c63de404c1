use crate::data_types::SearchCategory;
use crate::error::ApiError;
use crate::providers::{MovieCatalog, PlaceDirectory};
use serde_json::Value;
use std::sync::Arc;

/// Fetches a single item's provider record, unmodified.
#[derive(Clone)]
pub struct ItemDetails {
  movies: Arc<dyn MovieCatalog>,
  places: Arc<dyn PlaceDirectory>,
}

impl ItemDetails {
  pub fn new(movies: Arc<dyn MovieCatalog>, places: Arc<dyn PlaceDirectory>) -> Self {
    Self { movies, places }
  }

  pub async fn get(&self, id: &str, category: SearchCategory) -> Result<Value, ApiError> {
    let details = match category {
      SearchCategory::Restaurant => self.places.details(id).await,
      SearchCategory::Movie | SearchCategory::Multi => self.movies.details(id).await,
    };

    details.map_err(|e| ApiError::from_provider("Failed to fetch item details", e))
  }
}
