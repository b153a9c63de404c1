use super::{auto_id, Direction, Document, DocumentStore, FieldValue, Fields, Query, StoreError};
use async_mutex::Mutex;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
  collections: HashMap<String, Vec<Document>>,
  clock: Option<DateTime<Utc>>,
}

impl Inner {
  /// Strictly increasing so that documents written back to back still order deterministically.
  fn tick(&mut self) -> DateTime<Utc> {
    let now = Utc::now();
    let next = match self.clock {
      Some(last) if now <= last => last + Duration::microseconds(1),
      _ => now,
    };
    self.clock = Some(next);
    next
  }

  fn resolve(&mut self, fields: Fields) -> Fields {
    let now = if fields.values().any(|v| *v == FieldValue::ServerTimestamp) {
      Some(self.tick())
    } else {
      None
    };

    fields
      .into_iter()
      .map(|(key, value)| match (value, now) {
        (FieldValue::ServerTimestamp, Some(now)) => (key, FieldValue::Timestamp(now)),
        (value, _) => (key, value),
      })
      .collect()
  }
}

/// In-process document store. Used for local development and as the test backend.
pub struct MemoryStore {
  inner: Mutex<Inner>,
  composite_indexes: bool,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner::default()),
      composite_indexes: true,
    }
  }

  /// Rejects ordered queries whose order field differs from the filter field,
  /// the way Firestore does before the composite index has been created.
  pub fn without_composite_indexes() -> Self {
    Self {
      composite_indexes: false,
      ..Self::new()
    }
  }
}

fn compare(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
  match (a, b) {
    (Some(FieldValue::Timestamp(a)), Some(FieldValue::Timestamp(b))) => a.cmp(b),
    (Some(FieldValue::String(a)), Some(FieldValue::String(b))) => a.cmp(b),
    (Some(FieldValue::Number(a)), Some(FieldValue::Number(b))) => a
      .as_f64()
      .partial_cmp(&b.as_f64())
      .unwrap_or(Ordering::Equal),
    (Some(_), None) => Ordering::Greater,
    (None, Some(_)) => Ordering::Less,
    _ => Ordering::Equal,
  }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
  async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
    let mut inner = self.inner.lock().await;
    let document = Document {
      id: auto_id(),
      fields: inner.resolve(fields),
    };

    inner
      .collections
      .entry(collection.to_owned())
      .or_default()
      .push(document.clone());

    Ok(document)
  }

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    let inner = self.inner.lock().await;

    Ok(
      inner
        .collections
        .get(collection)
        .and_then(|documents| documents.iter().find(|d| d.id == id))
        .cloned(),
    )
  }

  async fn update(
    &self,
    collection: &str,
    id: &str,
    fields: Fields,
  ) -> Result<Document, StoreError> {
    let mut inner = self.inner.lock().await;
    let fields = inner.resolve(fields);

    let document = inner
      .collections
      .get_mut(collection)
      .and_then(|documents| documents.iter_mut().find(|d| d.id == id))
      .ok_or(StoreError::NotFound)?;

    document.fields.extend(fields);
    Ok(document.clone())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().await;

    if let Some(documents) = inner.collections.get_mut(collection) {
      documents.retain(|d| d.id != id);
    }

    Ok(())
  }

  async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
    if let Some(order_by) = &query.order_by {
      if !self.composite_indexes && order_by.field != query.field {
        return Err(StoreError::MissingIndex(format!(
          "The query requires an index on {} ({}) and {}",
          collection, query.field, order_by.field
        )));
      }
    }

    let inner = self.inner.lock().await;

    let mut documents: Vec<Document> = inner
      .collections
      .get(collection)
      .map(|documents| {
        documents
          .iter()
          .filter(|d| d.fields.get(&query.field) == Some(&query.value))
          .cloned()
          .collect()
      })
      .unwrap_or_default();

    if let Some(order_by) = &query.order_by {
      documents.sort_by(|a, b| {
        let ordering = compare(a.fields.get(&order_by.field), b.fields.get(&order_by.field));
        match order_by.direction {
          Direction::Ascending => ordering,
          Direction::Descending => ordering.reverse(),
        }
      });
    }

    if let Some(limit) = query.limit {
      documents.truncate(limit);
    }

    Ok(documents)
  }
}
