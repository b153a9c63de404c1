mod token;
mod value;

use super::{
  auto_id, is_valid_document_id, Direction, Document, DocumentStore, Fields, Query, StoreError,
};
use crate::clients::urlencode;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use self::token::{TokenError, TokenManager};
use self::value::{decode_document, encode, encode_fields, RawDocument};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

fn default_token_uri() -> String {
  "https://oauth2.googleapis.com/token".to_owned()
}

/// The parts of a Google service-account key file the store needs.
#[derive(Deserialize, Clone)]
pub struct ServiceAccount {
  pub project_id: String,
  pub client_email: String,
  pub private_key: String,
  #[serde(default = "default_token_uri")]
  pub token_uri: String,
}

impl ServiceAccount {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
      .map_err(|e| StoreError::Token(format!("reading {}: {}", path.display(), e)))?;

    serde_json::from_str(&contents)
      .map_err(|e| StoreError::Token(format!("parsing {}: {}", path.display(), e)))
  }
}

#[derive(Deserialize)]
struct ErrorStatus {
  #[serde(default)]
  status: String,
  #[serde(default)]
  message: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
  error: ErrorStatus,
}

#[derive(Deserialize)]
struct RunQueryItem {
  document: Option<RawDocument>,
}

/// Maps a Firestore error status to a [`StoreError`]. Missing composite indexes
/// surface as FAILED_PRECONDITION/INVALID_ARGUMENT with a message pointing at
/// the index console.
fn classify(status: &str, message: &str) -> StoreError {
  if status == "NOT_FOUND" {
    return StoreError::NotFound;
  }

  if status == "INVALID_ARGUMENT"
    || message.contains("INVALID_ARGUMENT")
    || message.to_lowercase().contains("index")
  {
    return StoreError::MissingIndex(message.to_owned());
  }

  StoreError::Backend(format!("{}: {}", status, message))
}

impl From<TokenError> for StoreError {
  fn from(error: TokenError) -> Self {
    StoreError::Token(error.to_string())
  }
}

/// Cloud Firestore over its REST API.
pub struct FirestoreStore {
  client: reqwest::Client,
  project_id: String,
  token: TokenManager,
}

impl FirestoreStore {
  pub fn new(account: ServiceAccount, client: reqwest::Client) -> Self {
    Self {
      project_id: account.project_id.clone(),
      token: TokenManager::new(account, client.clone()),
      client,
    }
  }

  fn database(&self) -> String {
    format!("projects/{}/databases/(default)", self.project_id)
  }

  fn document_name(&self, collection: &str, id: &str) -> String {
    format!("{}/documents/{}/{}", self.database(), collection, id)
  }

  fn document_url(&self, collection: &str, id: &str) -> String {
    format!(
      "{}/{}/documents/{}/{}",
      FIRESTORE_BASE_URL,
      self.database(),
      urlencode(collection),
      urlencode(id)
    )
  }

  async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, StoreError> {
    let token = self.token.get_token().await?;
    let res = req.bearer_auth(&token).send().await?;

    if res.status().is_success() {
      return Ok(res);
    }

    let status = res.status();
    let body = res.text().await?;

    // runQuery reports failures as a one-element array
    let parsed = serde_json::from_str::<ErrorResponse>(&body)
      .ok()
      .or_else(|| {
        serde_json::from_str::<Vec<ErrorResponse>>(&body)
          .ok()
          .and_then(|mut errors| errors.pop())
      });

    match parsed {
      Some(err) => Err(classify(&err.error.status, &err.error.message)),
      None if status == StatusCode::NOT_FOUND => Err(StoreError::NotFound),
      None => Err(StoreError::Backend(format!("{}: {}", status, body))),
    }
  }

  async fn commit(
    &self,
    collection: &str,
    id: &str,
    fields: &Fields,
    exists: bool,
    mask: bool,
  ) -> Result<(), StoreError> {
    let (encoded, server_timestamps) = encode_fields(fields);
    let transforms: Vec<Value> = server_timestamps
      .iter()
      .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
      .collect();

    let mut write = json!({
      "update": { "name": self.document_name(collection, id), "fields": encoded },
      "currentDocument": { "exists": exists },
      "updateTransforms": transforms,
    });

    if mask {
      let field_paths: Vec<&String> = encoded.keys().collect();
      write["updateMask"] = json!({ "fieldPaths": field_paths });
    }

    let url = format!("{}/{}/documents:commit", FIRESTORE_BASE_URL, self.database());
    self
      .send(self.client.post(url).json(&json!({ "writes": [write] })))
      .await?;

    Ok(())
  }
}

#[rocket::async_trait]
impl DocumentStore for FirestoreStore {
  async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
    let id = auto_id();
    self.commit(collection, &id, &fields, false, false).await?;
    debug!(collection, %id, "document created");

    self
      .get(collection, &id)
      .await?
      .ok_or_else(|| StoreError::Backend(format!("{}/{} missing after write", collection, id)))
  }

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    if !is_valid_document_id(id) {
      return Ok(None);
    }

    let req = self.client.get(self.document_url(collection, id));

    match self.send(req).await {
      Ok(res) => Ok(Some(decode_document(res.json::<RawDocument>().await?))),
      Err(StoreError::NotFound) => Ok(None),
      Err(err) => Err(err),
    }
  }

  async fn update(
    &self,
    collection: &str,
    id: &str,
    fields: Fields,
  ) -> Result<Document, StoreError> {
    if !is_valid_document_id(id) {
      return Err(StoreError::NotFound);
    }

    self.commit(collection, id, &fields, true, true).await?;
    self.get(collection, id).await?.ok_or(StoreError::NotFound)
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
    if !is_valid_document_id(id) {
      return Err(StoreError::NotFound);
    }

    self
      .send(self.client.delete(self.document_url(collection, id)))
      .await?;
    Ok(())
  }

  async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
    let mut structured = json!({
      "from": [{ "collectionId": collection }],
      "where": {
        "fieldFilter": {
          "field": { "fieldPath": query.field },
          "op": "EQUAL",
          "value": encode(&query.value),
        }
      },
    });

    if let Some(order_by) = &query.order_by {
      let direction = match order_by.direction {
        Direction::Ascending => "ASCENDING",
        Direction::Descending => "DESCENDING",
      };
      structured["orderBy"] =
        json!([{ "field": { "fieldPath": order_by.field }, "direction": direction }]);
    }

    if let Some(limit) = query.limit {
      structured["limit"] = json!(limit);
    }

    let url = format!("{}/{}/documents:runQuery", FIRESTORE_BASE_URL, self.database());
    let items = self
      .send(
        self
          .client
          .post(url)
          .json(&json!({ "structuredQuery": structured })),
      )
      .await?
      .json::<Vec<RunQueryItem>>()
      .await?;

    Ok(
      items
        .into_iter()
        .filter_map(|item| item.document)
        .map(decode_document)
        .collect(),
    )
  }
}
