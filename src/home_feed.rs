use crate::data_types::CuratedList;
use crate::error::ApiError;
use crate::providers::MovieCatalog;
use crate::reviews::ReviewStore;
use itertools::Itertools;
use rocket::futures::future::try_join_all;
use rocket::futures::{stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

const LISTS: [CuratedList; 3] = [
  CuratedList::Popular,
  CuratedList::Trending,
  CuratedList::NowPlaying,
];
const PAGES: [u32; 2] = [1, 2];

/// Curated movies, deduplicated and annotated with their average review rating.
#[derive(Clone)]
pub struct HomeFeed {
  movies: Arc<dyn MovieCatalog>,
  reviews: ReviewStore,
  concurrency: usize,
}

fn movie_id(movie: &Value) -> Option<String> {
  match movie.get("id") {
    Some(Value::String(id)) => Some(id.clone()),
    Some(Value::Number(id)) => Some(id.to_string()),
    _ => None,
  }
}

impl HomeFeed {
  pub fn new(movies: Arc<dyn MovieCatalog>, reviews: ReviewStore, concurrency: usize) -> Self {
    Self {
      movies,
      reviews,
      concurrency: concurrency.max(1),
    }
  }

  pub async fn movies(&self) -> Result<Vec<Value>, ApiError> {
    let pages = LISTS
      .iter()
      .flat_map(|list| PAGES.iter().map(move |page| self.movies.curated(*list, *page)));

    let movies: Vec<Value> = try_join_all(pages)
      .await
      .map_err(|e| ApiError::from_provider("Failed to fetch home movies", e))?
      .into_iter()
      .flatten()
      .unique_by(movie_id)
      .collect();

    let enriched: Vec<Value> = stream::iter(movies)
      .map(|movie| self.with_average_rating(movie))
      .buffered(self.concurrency)
      .collect()
      .await;

    Ok(enriched)
  }

  async fn with_average_rating(&self, mut movie: Value) -> Value {
    let average = match movie_id(&movie) {
      Some(id) => self.reviews.average_rating(&id).await.unwrap_or_else(|err| {
        warn!(movie_id = %id, error = %err, "failed to compute average rating");
        0.0
      }),
      None => 0.0,
    };

    if let Value::Object(fields) = &mut movie {
      fields.insert("avgRating".to_owned(), average.into());
    }

    movie
  }
}
