use std::sync::Mutex;

use rocket::fairing::{self, Fairing, Info, Kind};
use rocket::{Build, Rocket};
use sentry::ClientInitGuard;
use tracing::info;

pub struct SentryFairing {
  dsn: Option<String>,
  guard: Mutex<Option<ClientInitGuard>>,
}

impl SentryFairing {
  pub fn fairing(dsn: Option<String>) -> impl Fairing {
    Self {
      dsn: dsn.filter(|dsn| !dsn.is_empty()),
      guard: Mutex::new(None),
    }
  }

  fn init(&self) {
    let Some(dsn) = &self.dsn else {
      return;
    };

    let guard = sentry::init(dsn.as_str());

    if let Ok(mut slot) = self.guard.lock() {
      *slot = Some(guard);
      info!("sentry error reporting enabled");
    }
  }
}

#[rocket::async_trait]
impl Fairing for SentryFairing {
  fn info(&self) -> Info {
    Info {
      name: "sentry",
      kind: Kind::Ignite,
    }
  }

  async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
    self.init();
    Ok(rocket)
  }
}
