//! Ports for the external content providers. The reqwest-backed
//! implementations live in [`crate::clients`].

use crate::data_types::CuratedList;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
  /// The provider's API key is not configured.
  #[error("{0} not set")]
  NotConfigured(&'static str),
  #[error(transparent)]
  Transport(#[from] reqwest::Error),
  #[error("{provider} responded with {status}: {body}")]
  Status {
    provider: &'static str,
    status: u16,
    body: String,
  },
}

/// Movie catalog (TMDB). Records are passed through in the provider's own shape.
#[rocket::async_trait]
pub trait MovieCatalog: Send + Sync {
  /// Text search. `multi` selects the mixed movie/tv/person search.
  async fn search(&self, query: &str, multi: bool) -> Result<Vec<Value>, ProviderError>;

  async fn details(&self, id: &str) -> Result<Value, ProviderError>;

  async fn curated(&self, list: CuratedList, page: u32) -> Result<Vec<Value>, ProviderError>;
}

/// Places directory (Foursquare).
#[rocket::async_trait]
pub trait PlaceDirectory: Send + Sync {
  async fn search(
    &self,
    query: &str,
    near: Option<&str>,
    limit: usize,
  ) -> Result<Vec<Value>, ProviderError>;

  async fn details(&self, id: &str) -> Result<Value, ProviderError>;
}

/// A geocoder hit (Nominatim `format=json`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GeocodeRecord {
  pub osm_id: Value,
  #[serde(default)]
  pub display_name: String,
  #[serde(default)]
  pub lat: String,
  #[serde(default)]
  pub lon: String,
}

#[rocket::async_trait]
pub trait Geocoder: Send + Sync {
  async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodeRecord>, ProviderError>;
}
