use crate::error::ApiError;
use crate::guards::auth::AuthFailure;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::{response, Request};
use serde::Serialize;
use tracing::error;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

pub type MutationResponse<T> = Result<Json<T>, ApiError>;
pub type QueryResponse<T> = Result<Json<T>, ApiError>;
pub struct Response;

impl Response {
  pub fn success<T, E>(response: T) -> Result<Json<T>, E> {
    Ok(Json(response))
  }
}

impl ApiError {
  pub fn status(&self) -> Status {
    match self {
      ApiError::Unauthenticated(_) => Status::Unauthorized,
      ApiError::InvalidArgument(_) => Status::BadRequest,
      ApiError::Forbidden(_) => Status::Forbidden,
      ApiError::NotFound(_) => Status::NotFound,
      ApiError::Upstream { .. } | ApiError::Configuration(_) => Status::InternalServerError,
    }
  }
}

impl<'r> Responder<'r, 'static> for ApiError {
  fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
    let status = self.status();

    if status == Status::InternalServerError {
      error!(uri = %req.uri(), error = %self, details = ?self.details(), "request failed");
    }

    let body = ErrorBody {
      error: self.to_string(),
      details: self.details().map(str::to_owned),
    };

    Custom(status, Json(body)).respond_to(req)
  }
}

fn error_body(error: &str) -> Json<ErrorBody> {
  Json(ErrorBody {
    error: error.to_owned(),
    details: None,
  })
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> ApiError {
  let failure = req.local_cache(|| AuthFailure("No token".to_owned()));
  ApiError::Unauthenticated(failure.0.clone())
}

/// Bodies that parse as JSON but not into the expected shape, e.g. a numeric `comment`.
#[catch(422)]
pub fn unprocessable() -> ApiError {
  ApiError::InvalidArgument("Invalid request body".to_owned())
}

#[catch(404)]
pub fn not_found() -> Json<ErrorBody> {
  error_body("Not found")
}

#[catch(default)]
pub fn default(status: Status, _req: &Request) -> Json<ErrorBody> {
  error_body(status.reason().unwrap_or("Unknown error"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_errors_to_statuses() {
    let cases = [
      (ApiError::Unauthenticated("No token".into()), Status::Unauthorized),
      (ApiError::InvalidArgument("Invalid rating".into()), Status::BadRequest),
      (ApiError::Forbidden("Unauthorized".into()), Status::Forbidden),
      (ApiError::NotFound("Review not found".into()), Status::NotFound),
      (ApiError::upstream("Failed to fetch reviews", "boom"), Status::InternalServerError),
      (ApiError::Configuration("TMDB_API_KEY not set".into()), Status::InternalServerError),
    ];

    for (error, status) in cases {
      assert_eq!(error.status(), status);
    }
  }

  #[test]
  fn details_are_only_rendered_when_present() {
    let body = serde_json::to_value(ErrorBody {
      error: "Invalid rating".into(),
      details: None,
    })
    .unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Invalid rating" }));
  }
}
