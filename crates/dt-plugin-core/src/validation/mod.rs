//! # Validation
//!
//! Schema validation of request input. Failures are values, not errors:
//! callers get the human-readable message to show back to the user.
use serde_json::Value;

/// JSON Schema validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `data` against `schema`.
    ///
    /// Returns the data unchanged on success. Invalid data and invalid
    /// schemas both produce a message; multiple violations are joined by
    /// `; `.
    pub fn validate(&self, schema: &Value, data: &Value) -> Result<Value, String> {
        let validator = jsonschema::validator_for(schema).map_err(|e| format!("Invalid schema: {}", e))?;
        let messages: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();
        if messages.is_empty() {
            Ok(data.clone())
        } else {
            log::debug!("Validation failed: {}", messages.join("; "));
            Err(messages.join("; "))
        }
    }
}

/// Validate with a default [`SchemaValidator`].
pub fn validate(schema: &Value, data: &Value) -> Result<Value, String> {
    SchemaValidator::new().validate(schema, data)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::validate;

    fn greeting_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": { "greeting": { "type": "string", "minLength": 1 } },
            "required": ["greeting"]
        })
    }

    #[test]
    fn test_valid_data_is_returned() {
        let data = json!({"greeting": "Hello"});
        assert_eq!(validate(&greeting_schema(), &data), Ok(data));
    }

    #[test]
    fn test_invalid_data_gives_message() {
        let message = validate(&greeting_schema(), &json!({})).unwrap_err();
        assert!(message.contains("greeting"), "message was: {message}");

        let message = validate(&greeting_schema(), &json!({"greeting": ""})).unwrap_err();
        assert!(!message.is_empty());
    }

    #[test]
    fn test_invalid_schema_gives_message() {
        let message = validate(&json!({"type": 12}), &json!({})).unwrap_err();
        assert!(message.starts_with("Invalid schema"));
    }
}
