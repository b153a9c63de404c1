#![allow(dead_code)]

use reviewhub_api::auth::{AuthError, CredentialVerifier, Principal};
use reviewhub_api::data_types::CuratedList;
use reviewhub_api::providers::{
  GeocodeRecord, Geocoder, MovieCatalog, PlaceDirectory, ProviderError,
};
use reviewhub_api::store::{
  Document, DocumentStore, FieldValue, Fields, MemoryStore, Query, StoreError,
};
use reviewhub_api::{app, Services};
use rocket::http::Header;
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use std::sync::Arc;

/// Accepts `token-<user id>` and nothing else.
pub struct FakeVerifier;

#[rocket::async_trait]
impl CredentialVerifier for FakeVerifier {
  async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
    let id = token
      .strip_prefix("token-")
      .ok_or_else(|| AuthError::Invalid("unknown test token".into()))?;

    Ok(Principal {
      id: id.to_owned(),
      email: Some(format!("{}@example.com", id)),
    })
  }
}

pub fn bearer(user: &str) -> Header<'static> {
  Header::new("Authorization", format!("Bearer token-{}", user))
}

type Curated = Box<dyn Fn(CuratedList, u32) -> Result<Vec<Value>, ProviderError> + Send + Sync>;

pub struct FakeMovies {
  curated: Curated,
}

impl FakeMovies {
  pub fn new() -> Self {
    Self::with_curated(|_, _| Ok(vec![]))
  }

  pub fn with_curated(
    curated: impl Fn(CuratedList, u32) -> Result<Vec<Value>, ProviderError> + Send + Sync + 'static,
  ) -> Self {
    Self {
      curated: Box::new(curated),
    }
  }
}

#[rocket::async_trait]
impl MovieCatalog for FakeMovies {
  async fn search(&self, query: &str, multi: bool) -> Result<Vec<Value>, ProviderError> {
    Ok(vec![json!({ "id": 557, "title": query, "multi": multi })])
  }

  async fn details(&self, id: &str) -> Result<Value, ProviderError> {
    Ok(json!({ "id": id, "title": "Spider-Man" }))
  }

  async fn curated(&self, list: CuratedList, page: u32) -> Result<Vec<Value>, ProviderError> {
    (self.curated)(list, page)
  }
}

/// A places directory that never finds anything.
pub struct EmptyPlaces;

#[rocket::async_trait]
impl PlaceDirectory for EmptyPlaces {
  async fn search(
    &self,
    _query: &str,
    _near: Option<&str>,
    _limit: usize,
  ) -> Result<Vec<Value>, ProviderError> {
    Ok(vec![])
  }

  async fn details(&self, _id: &str) -> Result<Value, ProviderError> {
    Err(ProviderError::NotConfigured("FOURSQUARE_API_KEY"))
  }
}

pub struct FakeGeocoder;

#[rocket::async_trait]
impl Geocoder for FakeGeocoder {
  async fn search(&self, query: &str, _limit: usize) -> Result<Vec<GeocodeRecord>, ProviderError> {
    Ok(vec![GeocodeRecord {
      osm_id: json!(42),
      display_name: query.to_owned(),
      lat: "52.52".into(),
      lon: "13.40".into(),
    }])
  }
}

/// Fails every query filtering on `itemId == failing_item`.
pub struct FailingStore {
  pub inner: Arc<MemoryStore>,
  pub failing_item: String,
}

#[rocket::async_trait]
impl DocumentStore for FailingStore {
  async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
    self.inner.create(collection, fields).await
  }

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    self.inner.get(collection, id).await
  }

  async fn update(
    &self,
    collection: &str,
    id: &str,
    fields: Fields,
  ) -> Result<Document, StoreError> {
    self.inner.update(collection, id, fields).await
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
    self.inner.delete(collection, id).await
  }

  async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
    if query.field == "itemId" && query.value == FieldValue::from(self.failing_item.as_str()) {
      return Err(StoreError::Backend("deadline exceeded".into()));
    }
    self.inner.query(collection, query).await
  }
}

pub fn services(store: Arc<dyn DocumentStore>) -> Services {
  Services {
    store,
    verifier: Arc::new(FakeVerifier),
    movies: Arc::new(FakeMovies::new()),
    places: Arc::new(EmptyPlaces),
    geocoder: Arc::new(FakeGeocoder),
    home_feed_concurrency: 4,
  }
}

pub async fn client(services: Services) -> Client {
  Client::tracked(app(rocket::build(), services))
    .await
    .expect("valid rocket instance")
}

pub async fn memory_client() -> Client {
  client(services(Arc::new(MemoryStore::new()))).await
}
