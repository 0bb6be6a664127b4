// Schema types
// Field rules checked by Repository::create_one

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ValidationError, ValidationReason};
use crate::store::Entity;

/// Expected JSON type of a field
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Any,
    String,
    Number,
    Boolean,
}

impl FieldKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Any => "value",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            required: false,
            unique: false,
            kind,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    #[serde(flatten)]
    pub rule: FieldRule,
}

/// Ordered field rules; validation reports the first failing field
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

impl Schema {
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn field(mut self, name: &str, rule: FieldRule) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            rule,
        });
        self
    }

    /// Check required fields and field types.
    ///
    /// A `null` value counts as absent.
    pub fn validate(&self, item: &Entity) -> Result<(), ValidationError> {
        for field in &self.fields {
            match item.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.rule.required {
                        return Err(ValidationError {
                            field: field.name.clone(),
                            reason: ValidationReason::Missing,
                        });
                    }
                }
                Some(value) if !field.rule.kind.accepts(value) => {
                    return Err(ValidationError {
                        field: field.name.clone(),
                        reason: ValidationReason::InvalidType {
                            expected: field.rule.kind.name(),
                        },
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Names of fields marked unique, in schema order
    pub fn unique_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.rule.unique)
            .map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_like() -> Schema {
        Schema::new()
            .field("username", FieldRule::new(FieldKind::String).required().unique())
            .field("password", FieldRule::new(FieldKind::String).required())
            .field("age", FieldRule::new(FieldKind::Number))
    }

    fn entity(value: Value) -> Entity {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let err = user_like().validate(&entity(json!({}))).unwrap_err();
        assert_eq!(err.field, "username");
        assert_eq!(err.reason, ValidationReason::Missing);

        let err = user_like()
            .validate(&entity(json!({"username": "a", "password": null})))
            .unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn test_validate_checks_kind() {
        let err = user_like()
            .validate(&entity(json!({"username": 5, "password": "x"})))
            .unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::InvalidType { expected: "string" }
        );
        assert_eq!(err.to_string(), "Field 'username' must be a string");

        // Optional fields are still type checked when present
        assert!(user_like()
            .validate(&entity(json!({"username": "a", "password": "x", "age": "old"})))
            .is_err());
        assert!(user_like()
            .validate(&entity(json!({"username": "a", "password": "x", "age": 3})))
            .is_ok());
    }

    #[test]
    fn test_unique_fields() {
        let schema = user_like();
        assert_eq!(schema.unique_fields().collect::<Vec<_>>(), vec!["username"]);
    }

    #[test]
    fn test_schema_deserializes_from_config_shape() {
        let schema: Schema = serde_json::from_value(json!({
            "fields": [
                {"name": "email", "required": true, "unique": true, "kind": "string"},
                {"name": "note"}
            ]
        }))
        .unwrap();
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.fields[0].rule.unique);
        assert_eq!(schema.fields[1].rule, FieldRule::default());
    }
}
