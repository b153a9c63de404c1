use crate::data_types::SearchCategory;
use crate::error::ApiError;
use crate::providers::{GeocodeRecord, Geocoder, MovieCatalog, PlaceDirectory};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const PLACES_LIMIT: usize = 20;

/// Outcome of a search. Primary and fallback records are never mixed.
#[derive(Debug, PartialEq)]
pub enum SearchResults {
  Movies(Vec<Value>),
  Places(Vec<Value>),
  Geocoded(Vec<GeocodeRecord>),
}

impl SearchResults {
  pub fn into_values(self) -> Vec<Value> {
    match self {
      SearchResults::Movies(values) | SearchResults::Places(values) => values,
      SearchResults::Geocoded(records) => records.into_iter().map(geocoded_place).collect(),
    }
  }
}

/// Geocoder hits in a place-like shape.
fn geocoded_place(record: GeocodeRecord) -> Value {
  json!({
    "osm_id": record.osm_id,
    "name": record.display_name,
    "location": {
      "address": record.display_name,
      "lat": record.lat,
      "lon": record.lon,
    },
  })
}

#[derive(Clone)]
pub struct SearchAggregator {
  movies: Arc<dyn MovieCatalog>,
  places: Arc<dyn PlaceDirectory>,
  geocoder: Arc<dyn Geocoder>,
}

impl SearchAggregator {
  pub fn new(
    movies: Arc<dyn MovieCatalog>,
    places: Arc<dyn PlaceDirectory>,
    geocoder: Arc<dyn Geocoder>,
  ) -> Self {
    Self {
      movies,
      places,
      geocoder,
    }
  }

  pub async fn search(
    &self,
    query: Option<&str>,
    category: SearchCategory,
    location: Option<&str>,
  ) -> Result<SearchResults, ApiError> {
    let query = query
      .map(str::trim)
      .filter(|q| !q.is_empty())
      .ok_or_else(|| ApiError::InvalidArgument("Missing query parameter 'q'".to_owned()))?;

    match category {
      SearchCategory::Movie | SearchCategory::Multi => {
        let results = self
          .movies
          .search(query, category == SearchCategory::Multi)
          .await
          .map_err(|e| ApiError::from_provider("External API error", e))?;

        Ok(SearchResults::Movies(results))
      }
      SearchCategory::Restaurant => {
        let location = location.map(str::trim).filter(|l| !l.is_empty());
        Ok(self.search_places(query, location).await)
      }
    }
  }

  async fn search_places(&self, query: &str, location: Option<&str>) -> SearchResults {
    match self.places.search(query, location, PLACES_LIMIT).await {
      Ok(places) if !places.is_empty() => return SearchResults::Places(places),
      Ok(_) => debug!(query, "no places found, falling back to geocoder"),
      Err(err) => warn!(query, error = %err, "places search failed, falling back to geocoder"),
    }

    let fallback_query = match location {
      Some(location) => format!("{}, {}", query, location),
      None => query.to_owned(),
    };

    match self.geocoder.search(&fallback_query, PLACES_LIMIT).await {
      Ok(records) => SearchResults::Geocoded(records),
      Err(err) => {
        warn!(query = %fallback_query, error = %err, "geocoder fallback failed");
        SearchResults::Geocoded(vec![])
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data_types::CuratedList;
  use crate::providers::ProviderError;
  use async_mutex::Mutex;

  struct Movies;

  #[rocket::async_trait]
  impl MovieCatalog for Movies {
    async fn search(&self, query: &str, multi: bool) -> Result<Vec<Value>, ProviderError> {
      Ok(vec![json!({ "title": query, "multi": multi })])
    }

    async fn details(&self, _id: &str) -> Result<Value, ProviderError> {
      Err(ProviderError::NotConfigured("TMDB_API_KEY"))
    }

    async fn curated(&self, _list: CuratedList, _page: u32) -> Result<Vec<Value>, ProviderError> {
      Ok(vec![])
    }
  }

  struct Places(Result<Vec<Value>, &'static str>);

  #[rocket::async_trait]
  impl PlaceDirectory for Places {
    async fn search(
      &self,
      _query: &str,
      _near: Option<&str>,
      _limit: usize,
    ) -> Result<Vec<Value>, ProviderError> {
      self.0.clone().map_err(|_| ProviderError::NotConfigured("FOURSQUARE_API_KEY"))
    }

    async fn details(&self, _id: &str) -> Result<Value, ProviderError> {
      Ok(Value::Null)
    }
  }

  #[derive(Default)]
  struct Geocode {
    queries: Mutex<Vec<String>>,
  }

  #[rocket::async_trait]
  impl Geocoder for Geocode {
    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<GeocodeRecord>, ProviderError> {
      self.queries.lock().await.push(query.to_owned());
      Ok(vec![GeocodeRecord {
        osm_id: json!(123),
        display_name: "Pizza Place, Berlin".into(),
        lat: "52.5".into(),
        lon: "13.4".into(),
      }])
    }
  }

  fn aggregator(places: Places, geocoder: Arc<Geocode>) -> SearchAggregator {
    SearchAggregator::new(Arc::new(Movies), Arc::new(places), geocoder)
  }

  #[rocket::async_test]
  async fn blank_queries_are_rejected() {
    let search = aggregator(Places(Ok(vec![])), Arc::default());

    for query in [None, Some(""), Some("   ")] {
      let result = search.search(query, SearchCategory::Movie, None).await;
      assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
    }
  }

  #[rocket::async_test]
  async fn movie_queries_are_trimmed() {
    let search = aggregator(Places(Ok(vec![])), Arc::default());
    let results = search
      .search(Some("  inception "), SearchCategory::Multi, None)
      .await
      .unwrap();

    assert_eq!(
      results,
      SearchResults::Movies(vec![json!({ "title": "inception", "multi": true })])
    );
  }

  #[rocket::async_test]
  async fn places_are_returned_as_is() {
    let place = json!({ "fsq_id": "abc", "name": "Pizza" });
    let search = aggregator(Places(Ok(vec![place.clone()])), Arc::default());

    let results = search
      .search(Some("pizza"), SearchCategory::Restaurant, Some("Berlin"))
      .await
      .unwrap();

    assert_eq!(results, SearchResults::Places(vec![place]));
  }

  #[rocket::async_test]
  async fn empty_places_fall_back_to_the_geocoder() {
    let geocoder = Arc::new(Geocode::default());
    let search = aggregator(Places(Ok(vec![])), geocoder.clone());

    let results = search
      .search(Some("pizza"), SearchCategory::Restaurant, Some(" Berlin "))
      .await
      .unwrap()
      .into_values();

    assert_eq!(*geocoder.queries.lock().await, vec!["pizza, Berlin".to_owned()]);
    assert_eq!(
      results,
      vec![json!({
        "osm_id": 123,
        "name": "Pizza Place, Berlin",
        "location": { "address": "Pizza Place, Berlin", "lat": "52.5", "lon": "13.4" },
      })]
    );
  }

  #[rocket::async_test]
  async fn failing_places_fall_back_without_location() {
    let geocoder = Arc::new(Geocode::default());
    let search = aggregator(Places(Err("down")), geocoder.clone());

    let results = search
      .search(Some("pizza"), SearchCategory::Restaurant, None)
      .await
      .unwrap();

    assert!(matches!(results, SearchResults::Geocoded(ref records) if records.len() == 1));
    assert_eq!(*geocoder.queries.lock().await, vec!["pizza".to_owned()]);
  }
}
