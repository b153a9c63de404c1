use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::{Request, Response};
use std::io::Cursor;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Authorization, Content-Type";
const MAX_AGE_SECS: &str = "3600";

/// Allows any origin and answers preflight requests.
pub struct Cors;

impl Cors {
  pub fn fairing() -> impl Fairing {
    Self
  }
}

#[rocket::async_trait]
impl Fairing for Cors {
  fn info(&self) -> Info {
    Info {
      name: "cors",
      kind: Kind::Response,
    }
  }

  async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
    res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
    res.set_header(Header::new("Access-Control-Allow-Methods", ALLOW_METHODS));
    res.set_header(Header::new("Access-Control-Allow-Headers", ALLOW_HEADERS));
    res.set_header(Header::new("Access-Control-Max-Age", MAX_AGE_SECS));

    // no route handles OPTIONS, so preflights arrive here as 404s
    if req.method() == Method::Options && res.status() == Status::NotFound {
      res.set_status(Status::NoContent);
      res.set_sized_body(None, Cursor::new(""));
    }
  }
}
