use rocket::figment::providers::Env;
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

/// Environment variables read without the `ROCKET_` prefix, under the names
/// the service has always been deployed with.
const PLAIN_ENV: &[&str] = &[
  "PORT",
  "TMDB_API_KEY",
  "FOURSQUARE_API_KEY",
  "FIREBASE_PROJECT_ID",
  "FIREBASE_CREDENTIALS",
  "DOCUMENT_STORE",
  "SENTRY_DSN",
];

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Firestore,
  Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
  pub tmdb_api_key: Option<String>,
  pub foursquare_api_key: Option<String>,
  /// Falls back to the service account's project when unset.
  pub firebase_project_id: Option<String>,
  /// Path to the service-account key file.
  pub firebase_credentials: String,
  pub document_store: StoreBackend,
  pub tmdb_base_url: String,
  pub foursquare_base_url: String,
  pub nominatim_base_url: String,
  pub nominatim_user_agent: String,
  pub firebase_jwks_url: String,
  pub http_timeout_secs: u64,
  pub home_feed_concurrency: usize,
  pub sentry_dsn: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      tmdb_api_key: None,
      foursquare_api_key: None,
      firebase_project_id: None,
      firebase_credentials: "./serviceAccountKey.json".into(),
      document_store: StoreBackend::default(),
      tmdb_base_url: "https://api.themoviedb.org/3".into(),
      foursquare_base_url: "https://api.foursquare.com/v3".into(),
      nominatim_base_url: "https://nominatim.openstreetmap.org".into(),
      nominatim_user_agent: "review-platform-app/1.0".into(),
      firebase_jwks_url:
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
          .into(),
      http_timeout_secs: 10,
      home_feed_concurrency: 16,
      sentry_dsn: None,
    }
  }
}

impl Config {
  /// Rocket's figment (Rocket.toml, `ROCKET_*`) plus the plain variables above.
  pub fn figment() -> Figment {
    rocket::Config::figment().merge(Env::raw().only(PLAIN_ENV))
  }
}
