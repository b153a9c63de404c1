mod firestore;
mod memory;

pub use firestore::{FirestoreStore, ServiceAccount};
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

pub const REVIEWS: &str = "reviews";
pub const SEARCH_HISTORY: &str = "searchHistory";

const AUTO_ID_LENGTH: usize = 20;

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("document not found")]
  NotFound,
  /// The backend refused an ordered query because the composite index it needs does not exist.
  #[error("missing index: {0}")]
  MissingIndex(String),
  #[error("{0}")]
  Backend(String),
  #[error(transparent)]
  Transport(#[from] reqwest::Error),
  #[error("authentication with the document store failed: {0}")]
  Token(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Null,
  Bool(bool),
  String(String),
  Number(serde_json::Number),
  Timestamp(DateTime<Utc>),
  /// Write-only sentinel, resolved by the store to its own clock.
  ServerTimestamp,
}

impl From<&str> for FieldValue {
  fn from(value: &str) -> Self {
    FieldValue::String(value.to_owned())
  }
}

impl From<String> for FieldValue {
  fn from(value: String) -> Self {
    FieldValue::String(value)
  }
}

impl From<Option<String>> for FieldValue {
  fn from(value: Option<String>) -> Self {
    value.map(FieldValue::String).unwrap_or(FieldValue::Null)
  }
}

impl From<serde_json::Number> for FieldValue {
  fn from(value: serde_json::Number) -> Self {
    FieldValue::Number(value)
  }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// A stored document: its store-assigned id plus whatever fields it happens to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub fields: Fields,
}

impl Document {
  /// Non-empty string field.
  pub fn string(&self, key: &str) -> Option<String> {
    match self.fields.get(key) {
      Some(FieldValue::String(value)) if !value.is_empty() => Some(value.clone()),
      _ => None,
    }
  }

  pub fn number(&self, key: &str) -> Option<serde_json::Number> {
    match self.fields.get(key) {
      Some(FieldValue::Number(value)) => Some(value.clone()),
      _ => None,
    }
  }

  pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
    match self.fields.get(key) {
      Some(FieldValue::Timestamp(value)) => Some(*value),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Ascending,
  Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
  pub field: String,
  pub direction: Direction,
}

/// Equality filter on a single field, optionally ordered and limited.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
  pub field: String,
  pub value: FieldValue,
  pub order_by: Option<OrderBy>,
  pub limit: Option<usize>,
}

impl Query {
  pub fn filter(field: &str, value: impl Into<FieldValue>) -> Self {
    Self {
      field: field.to_owned(),
      value: value.into(),
      order_by: None,
      limit: None,
    }
  }

  pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
    self.order_by = Some(OrderBy {
      field: field.to_owned(),
      direction,
    });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn unordered(&self) -> Self {
    Self {
      order_by: None,
      ..self.clone()
    }
  }
}

#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
  /// Creates a document under a fresh auto-id and returns it as stored.
  async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

  /// Overwrites only the given fields of an existing document. Fails with
  /// [`StoreError::NotFound`] when the document no longer exists.
  async fn update(&self, collection: &str, id: &str, fields: Fields)
    -> Result<Document, StoreError>;

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

  async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;
}

/// Which path [`query_newest_first`] ended up taking.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
  Ordered(Vec<T>),
  Unordered(Vec<T>),
}

impl<T> Listing<T> {
  pub fn is_ordered(&self) -> bool {
    matches!(self, Listing::Ordered(_))
  }

  pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Listing<U> {
    match self {
      Listing::Ordered(items) => Listing::Ordered(items.into_iter().map(f).collect()),
      Listing::Unordered(items) => Listing::Unordered(items.into_iter().map(f).collect()),
    }
  }

  pub fn into_inner(self) -> Vec<T> {
    match self {
      Listing::Ordered(items) | Listing::Unordered(items) => items,
    }
  }
}

/// Runs `query` ordered by `createdAt` descending. When the store lacks the
/// composite index for that, the same predicate is re-run without ordering or
/// limit and returned as [`Listing::Unordered`].
pub async fn query_newest_first(
  store: &dyn DocumentStore,
  collection: &str,
  query: Query,
) -> Result<Listing<Document>, StoreError> {
  let ordered = query.clone().order_by("createdAt", Direction::Descending);

  match store.query(collection, &ordered).await {
    Ok(documents) => Ok(Listing::Ordered(documents)),
    Err(StoreError::MissingIndex(message)) => {
      warn!(
        collection,
        field = %query.field,
        %message,
        "ordered query rejected, retrying without ordering"
      );

      let unordered = Query {
        limit: None,
        ..query.unordered()
      };

      let documents = store.query(collection, &unordered).await?;
      Ok(Listing::Unordered(documents))
    }
    Err(err) => Err(err),
  }
}

/// Sorts by `createdAt` descending; documents without a timestamp go last.
pub fn sort_newest_first(documents: &mut [Document]) {
  documents.sort_by(|a, b| b.timestamp("createdAt").cmp(&a.timestamp("createdAt")));
}

/// A document id must name exactly one path segment below its collection.
pub fn is_valid_document_id(id: &str) -> bool {
  !id.is_empty() && id != "." && id != ".." && !id.contains('/')
}

pub fn auto_id() -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(AUTO_ID_LENGTH)
    .map(char::from)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn doc(id: &str, created_at: Option<DateTime<Utc>>) -> Document {
    let mut fields = Fields::new();
    if let Some(created_at) = created_at {
      fields.insert("createdAt".into(), FieldValue::Timestamp(created_at));
    }
    Document {
      id: id.into(),
      fields,
    }
  }

  #[test]
  fn missing_timestamps_sort_last() {
    let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut documents = vec![doc("a", None), doc("b", Some(older)), doc("c", Some(newer))];

    sort_newest_first(&mut documents);

    let ids: Vec<_> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
  }

  #[test]
  fn auto_ids_are_alphanumeric() {
    let id = auto_id();
    assert_eq!(id.len(), 20);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(id, auto_id());
  }

  #[test]
  fn ids_that_leave_the_collection_are_rejected() {
    assert!(is_valid_document_id(&auto_id()));
    assert!(is_valid_document_id("a..b"));

    for id in ["", ".", "..", "../searchHistory/x", "a/b"] {
      assert!(!is_valid_document_id(id), "{:?} should be rejected", id);
    }
  }

  #[test]
  fn empty_strings_read_as_absent() {
    let mut fields = Fields::new();
    fields.insert("itemName".into(), FieldValue::from(""));
    fields.insert("itemId".into(), FieldValue::from("557"));
    let document = Document {
      id: "x".into(),
      fields,
    };

    assert_eq!(document.string("itemName"), None);
    assert_eq!(document.string("itemId").as_deref(), Some("557"));
    assert_eq!(document.string("missing"), None);
  }
}
