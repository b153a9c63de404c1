#[macro_use]
extern crate rocket;

pub mod auth;
pub mod clients;
pub mod config;
pub mod data_types;
pub mod error;
pub mod fairings;
pub mod guards;
pub mod history;
pub mod home_feed;
pub mod items;
pub mod models;
pub mod oidc;
pub mod providers;
pub mod response;
pub mod reviews;
pub mod routes;
pub mod search;
pub mod store;
pub mod views;

use crate::auth::{CredentialVerifier, FirebaseVerifier, Verifier};
use crate::clients::{FoursquareClient, NominatimClient, TmdbClient};
use crate::config::{Config, StoreBackend};
use crate::history::SearchHistory;
use crate::home_feed::HomeFeed;
use crate::items::ItemDetails;
use crate::oidc::KeyCache;
use crate::providers::{Geocoder, MovieCatalog, PlaceDirectory};
use crate::reviews::ReviewStore;
use crate::search::SearchAggregator;
use crate::store::{DocumentStore, FirestoreStore, MemoryStore, ServiceAccount, StoreError};
use rocket::{Build, Rocket};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StartupError {
  #[error("failed to build HTTP client: {0}")]
  HttpClient(#[from] reqwest::Error),
  #[error("failed to load Firebase service account: {0}")]
  ServiceAccount(#[from] StoreError),
  #[error("FIREBASE_PROJECT_ID not set and no service account to take it from")]
  MissingProjectId,
}

/// Everything the routes need, constructed once at ignite and handed to Rocket as managed state.
pub struct Services {
  pub store: Arc<dyn DocumentStore>,
  pub verifier: Arc<dyn CredentialVerifier>,
  pub movies: Arc<dyn MovieCatalog>,
  pub places: Arc<dyn PlaceDirectory>,
  pub geocoder: Arc<dyn Geocoder>,
  pub home_feed_concurrency: usize,
}

impl Services {
  pub fn from_config(config: &Config) -> Result<Self, StartupError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.http_timeout_secs))
      .build()?;

    let account = match config.document_store {
      StoreBackend::Firestore => Some(ServiceAccount::from_file(&config.firebase_credentials)?),
      StoreBackend::Memory => ServiceAccount::from_file(&config.firebase_credentials).ok(),
    };

    let project_id = config
      .firebase_project_id
      .clone()
      .filter(|id| !id.is_empty())
      .or_else(|| account.as_ref().map(|account| account.project_id.clone()))
      .ok_or(StartupError::MissingProjectId)?;

    let store: Arc<dyn DocumentStore> = match account {
      Some(account) if config.document_store == StoreBackend::Firestore => {
        info!(project_id = %account.project_id, "using firestore document store");
        Arc::new(FirestoreStore::new(account, client.clone()))
      }
      _ => {
        info!("using in-memory document store");
        Arc::new(MemoryStore::new())
      }
    };

    let keys = KeyCache::new(client.clone(), &config.firebase_jwks_url);

    Ok(Services {
      store,
      verifier: Arc::new(FirebaseVerifier::new(&project_id, keys)),
      movies: Arc::new(TmdbClient::new(config, client.clone())),
      places: Arc::new(FoursquareClient::new(config, client.clone())),
      geocoder: Arc::new(NominatimClient::new(config, client)),
      home_feed_concurrency: config.home_feed_concurrency,
    })
  }
}

/// Manages the components, mounts every route and registers the JSON catchers.
pub fn app(rocket: Rocket<Build>, services: Services) -> Rocket<Build> {
  let reviews = ReviewStore::new(services.store.clone());
  let history = SearchHistory::new(services.store);
  let search = SearchAggregator::new(
    services.movies.clone(),
    services.places.clone(),
    services.geocoder,
  );
  let items = ItemDetails::new(services.movies.clone(), services.places);
  let home_feed = HomeFeed::new(
    services.movies,
    reviews.clone(),
    services.home_feed_concurrency,
  );

  rocket
    .manage(Verifier(services.verifier))
    .manage(reviews)
    .manage(history)
    .manage(search)
    .manage(items)
    .manage(home_feed)
    .attach(fairings::Cors::fairing())
    .mount("/", routes::index())
    .mount("/", routes::search())
    .mount("/", routes::items())
    .mount("/", routes::reviews())
    .mount("/", routes::users())
    .mount("/", routes::home())
    .register(
      "/",
      catchers![
        response::unauthorized,
        response::unprocessable,
        response::not_found,
        response::default
      ],
    )
}
