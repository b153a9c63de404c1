use crate::auth::Principal;
use crate::data_types::ItemType;
use crate::store::{Document, FieldValue, Fields};
use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

/// A review as read back from the store, with every optional field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
  pub id: String,
  pub item_id: String,
  pub item_type: ItemType,
  pub item_name: Option<String>,
  pub user_id: Option<String>,
  pub username: String,
  pub rating: Number,
  pub comment: String,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Review {
  pub fn is_owned_by(&self, principal: &Principal) -> bool {
    self.user_id.as_deref() == Some(principal.id.as_str())
  }

  pub fn rating_value(&self) -> f64 {
    self.rating.as_f64().unwrap_or(0.0)
  }
}

impl From<Document> for Review {
  fn from(document: Document) -> Self {
    Review {
      item_id: document.string("itemId").unwrap_or_default(),
      item_type: document
        .string("itemType")
        .map(|value| ItemType::parse_lenient(&value))
        .unwrap_or_default(),
      item_name: document.string("itemName"),
      user_id: document.string("userId"),
      username: document
        .string("username")
        .unwrap_or_else(|| "Anonymous".to_owned()),
      rating: document.number("rating").unwrap_or_else(|| 0.into()),
      comment: document.string("comment").unwrap_or_default(),
      created_at: document.timestamp("createdAt"),
      updated_at: document.timestamp("updatedAt"),
      id: document.id,
    }
  }
}

/// Accepts JSON numbers only.
pub fn rating_from_json(value: Option<&Value>) -> Option<Number> {
  match value {
    Some(Value::Number(number)) => Some(number.clone()),
    _ => None,
  }
}

/// Like [`rating_from_json`], but numeric strings such as `"4"` are coerced.
pub fn coerce_rating(value: Option<&Value>) -> Option<Number> {
  match value {
    Some(Value::String(raw)) => {
      let raw = raw.trim();
      raw
        .parse::<i64>()
        .map(Number::from)
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64))
    }
    value => rating_from_json(value),
  }
}

pub struct NewReview {
  pub item_id: String,
  pub item_type: ItemType,
  pub item_name: Option<String>,
  pub rating: Number,
  pub comment: String,
  pub user_id: String,
  pub username: String,
}

impl NewReview {
  pub fn new(item_id: &str, principal: &Principal, rating: Number) -> Self {
    Self {
      item_id: item_id.to_owned(),
      item_type: ItemType::default(),
      item_name: None,
      rating,
      comment: String::new(),
      user_id: principal.id.clone(),
      username: principal.display_name(),
    }
  }

  pub fn into_fields(self) -> Fields {
    let mut fields = Fields::new();
    fields.insert("itemId".into(), self.item_id.into());
    fields.insert("itemType".into(), self.item_type.as_str().into());
    fields.insert("itemName".into(), self.item_name.filter(|n| !n.is_empty()).into());
    fields.insert("userId".into(), self.user_id.into());
    fields.insert("username".into(), self.username.into());
    fields.insert("rating".into(), self.rating.into());
    fields.insert("comment".into(), self.comment.into());
    fields.insert("createdAt".into(), FieldValue::ServerTimestamp);
    fields.insert("updatedAt".into(), FieldValue::ServerTimestamp);
    fields
  }
}

/// The mutable part of a review.
pub struct ReviewChangeset {
  pub rating: Number,
  pub comment: String,
}

impl ReviewChangeset {
  pub fn into_fields(self) -> Fields {
    let mut fields = Fields::new();
    fields.insert("rating".into(), self.rating.into());
    fields.insert("comment".into(), self.comment.into());
    fields.insert("updatedAt".into(), FieldValue::ServerTimestamp);
    fields
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn sparse_documents_get_defaults() {
    let document = Document {
      id: "r1".into(),
      fields: Fields::from([("itemId".to_string(), FieldValue::from("557"))]),
    };

    let review = Review::from(document);

    assert_eq!(review.id, "r1");
    assert_eq!(review.item_id, "557");
    assert_eq!(review.item_type, ItemType::Movie);
    assert_eq!(review.item_name, None);
    assert_eq!(review.user_id, None);
    assert_eq!(review.username, "Anonymous");
    assert_eq!(review.rating, Number::from(0));
    assert_eq!(review.comment, "");
    assert_eq!(review.created_at, None);
  }

  #[test]
  fn only_numbers_are_ratings_on_create() {
    assert_eq!(rating_from_json(Some(&json!(4))), Some(4.into()));
    assert_eq!(rating_from_json(Some(&json!("4"))), None);
    assert_eq!(rating_from_json(Some(&Value::Null)), None);
    assert_eq!(rating_from_json(None), None);
  }

  #[test]
  fn numeric_strings_are_coerced_on_update() {
    assert_eq!(coerce_rating(Some(&json!("5"))), Some(5.into()));
    assert_eq!(
      coerce_rating(Some(&json!("4.5"))).and_then(|n| n.as_f64()),
      Some(4.5)
    );
    assert_eq!(coerce_rating(Some(&json!(3))), Some(3.into()));
    assert_eq!(coerce_rating(Some(&json!("great"))), None);
    assert_eq!(coerce_rating(Some(&json!(true))), None);
  }

  #[test]
  fn new_reviews_use_server_timestamps() {
    let principal = Principal {
      id: "u1".into(),
      email: Some("u1@example.com".into()),
    };
    let mut review = NewReview::new("557", &principal, 4.into());
    review.item_name = Some(String::new());

    let fields = review.into_fields();

    assert_eq!(fields["username"], FieldValue::from("u1@example.com"));
    assert_eq!(fields["itemName"], FieldValue::Null);
    assert_eq!(fields["createdAt"], FieldValue::ServerTimestamp);
    assert_eq!(fields["updatedAt"], FieldValue::ServerTimestamp);
  }
}
