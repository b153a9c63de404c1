#[macro_use]
extern crate rocket;

use reviewhub_api::config::Config;
use reviewhub_api::fairings::SentryFairing;
use reviewhub_api::{app, Services};
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[launch]
fn rocket() -> Rocket<Build> {
  dotenv::dotenv().ok();
  fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let figment = Config::figment();
  let sentry_dsn = figment
    .extract_inner::<Option<String>>("sentry_dsn")
    .ok()
    .flatten();

  rocket::custom(figment)
    .attach(SentryFairing::fairing(sentry_dsn))
    .attach(AdHoc::try_on_ignite("Services", |rocket| async move {
      let config = match rocket.figment().extract::<Config>() {
        Ok(config) => config,
        Err(err) => {
          error!(error = %err, "invalid configuration");
          return Err(rocket);
        }
      };

      match Services::from_config(&config) {
        Ok(services) => Ok(app(rocket, services)),
        Err(err) => {
          error!(error = %err, "failed to start");
          Err(rocket)
        }
      }
    }))
}
