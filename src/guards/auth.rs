use crate::auth::{AuthError, Principal, Verifier};
use lazy_static::lazy_static;
use regex::Regex;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use tracing::warn;

lazy_static! {
  static ref JWT_REGEX: Regex = Regex::new(r"^Bearer (?P<jwt>\S+)\s*$").unwrap();
}

pub struct Auth<T>(pub T);

/// Why authentication failed, for the 401 catcher to report.
pub struct AuthFailure(pub String);

pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
  let authorization = authorization.ok_or(AuthError::Missing)?;

  JWT_REGEX
    .captures(authorization)
    .and_then(|captures| captures.name("jwt"))
    .map(|jwt| jwt.as_str())
    .ok_or(AuthError::Missing)
}

async fn authenticate(req: &Request<'_>) -> Result<Principal, AuthError> {
  let token = bearer_token(req.headers().get_one("authorization"))?;
  let verifier = req
    .rocket()
    .state::<Verifier>()
    .ok_or_else(|| AuthError::Invalid("no credential verifier configured".to_string()))?;

  verifier.0.verify(token).await
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Auth<Principal> {
  type Error = AuthError;

  async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
    match authenticate(req).await {
      Ok(principal) => Outcome::Success(Auth(principal)),
      Err(error) => {
        warn!(uri = %req.uri(), reason = error.reason(), "authentication failed");
        req.local_cache(|| AuthFailure(error.to_string()));
        Outcome::Error((Status::Unauthorized, error))
      }
    }
  }
}
