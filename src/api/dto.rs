//! Request DTOs
//!
//! Post payloads are accepted loosely and coerced field by field, so every
//! problem in a request can be reported at once.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::data::{NewPost, PostChanges};
use crate::error::{AppError, FieldErrors};

/// Body of `POST /posts`
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    #[serde(rename = "userId", default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl CreatePostRequest {
    /// Coerce every field, collecting all violations
    pub fn validate(self) -> Result<NewPost, AppError> {
        let mut errors = FieldErrors::new();

        let user_id = self.user_id.as_ref().and_then(coerce_integer);
        if user_id.is_none() {
            errors.insert(
                "userId",
                "userId cannot be blank or cannot be converted!".to_string(),
            );
        }

        let title = self.title.as_ref().and_then(coerce_text);
        if title.is_none() {
            errors.insert("title", "title cannot be blank!".to_string());
        }

        let body = self.body.as_ref().and_then(coerce_text);
        if body.is_none() {
            errors.insert("body", "body cannot be blank!".to_string());
        }

        match (user_id, title, body) {
            (Some(user_id), Some(title), Some(body)) => Ok(NewPost {
                user_id,
                title,
                body,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Body of `PUT /posts/{id}`
///
/// Any other keys, `userId` and `id` included, are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl UpdatePostRequest {
    /// Coerce the optional fields; `null` counts as absent
    pub fn validate(self) -> Result<PostChanges, AppError> {
        let mut errors = FieldErrors::new();

        let title = optional_text(self.title.as_ref(), "title", &mut errors);
        let body = optional_text(self.body.as_ref(), "body", &mut errors);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(PostChanges { title, body })
    }
}

/// Decode a request body leniently
///
/// An empty body, invalid JSON, or a non-object document all decode as
/// the default (all fields missing), which validation then reports.
pub fn decode_body<T>(bytes: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_slice::<Value>(bytes) {
        Ok(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_default(),
        _ => T::default(),
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn optional_text(
    value: Option<&Value>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = value?;
    let text = coerce_text(value);
    if text.is_none() {
        errors.insert(field, format!("{field} must be a string!"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(payload: Value) -> Result<NewPost, AppError> {
        decode_body::<CreatePostRequest>(payload.to_string().as_bytes()).validate()
    }

    fn update(payload: Value) -> Result<PostChanges, AppError> {
        decode_body::<UpdatePostRequest>(payload.to_string().as_bytes()).validate()
    }

    fn field_errors(error: AppError) -> FieldErrors {
        match error {
            AppError::Validation(fields) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_accepts_complete_payload() {
        let post = create(json!({"userId": 1, "title": "a", "body": "b"})).unwrap();
        assert_eq!(
            post,
            NewPost {
                user_id: 1,
                title: "a".to_string(),
                body: "b".to_string(),
            }
        );
    }

    #[test]
    fn create_coerces_numeric_strings_and_scalars() {
        let post = create(json!({"userId": " 12 ", "title": 5, "body": true})).unwrap();
        assert_eq!(post.user_id, 12);
        assert_eq!(post.title, "5");
        assert_eq!(post.body, "true");
    }

    #[test]
    fn create_reports_missing_title() {
        let fields = field_errors(create(json!({"userId": 1, "body": "b"})).unwrap_err());
        assert_eq!(fields.len(), 1);
        assert!(fields["title"].contains("title"));
    }

    #[test]
    fn create_bundles_every_violation() {
        let fields = field_errors(
            create(json!({"userId": "one", "title": null, "body": ["x"]})).unwrap_err(),
        );
        assert_eq!(
            fields.keys().copied().collect::<Vec<_>>(),
            vec!["body", "title", "userId"]
        );
    }

    #[test]
    fn create_rejects_fractional_user_id() {
        let fields =
            field_errors(create(json!({"userId": 1.5, "title": "a", "body": "b"})).unwrap_err());
        assert!(fields.contains_key("userId"));
    }

    #[test]
    fn create_treats_garbage_body_as_empty() {
        let fields = field_errors(
            decode_body::<CreatePostRequest>(b"not json")
                .validate()
                .unwrap_err(),
        );
        assert_eq!(fields.len(), 3);

        let fields = field_errors(
            decode_body::<CreatePostRequest>(br#"[1, "a", "b"]"#)
                .validate()
                .unwrap_err(),
        );
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn update_allows_empty_payload() {
        assert_eq!(update(json!({})).unwrap(), PostChanges::default());
        assert_eq!(
            decode_body::<UpdatePostRequest>(b"").validate().unwrap(),
            PostChanges::default()
        );
    }

    #[test]
    fn update_ignores_immutable_fields() {
        let changes = update(json!({"id": 9, "userId": 9, "body": "new"})).unwrap();
        assert_eq!(
            changes,
            PostChanges {
                title: None,
                body: Some("new".to_string()),
            }
        );
    }

    #[test]
    fn update_treats_null_as_absent() {
        let changes = update(json!({"title": null, "body": "x"})).unwrap();
        assert_eq!(changes.title, None);
        assert_eq!(changes.body.as_deref(), Some("x"));
    }

    #[test]
    fn update_rejects_structured_values() {
        let fields = field_errors(update(json!({"title": {"nested": true}})).unwrap_err());
        assert_eq!(fields["title"], "title must be a string!");
    }
}
