mod cors;
mod sentry;

pub use self::cors::Cors;
pub use self::sentry::SentryFairing;
