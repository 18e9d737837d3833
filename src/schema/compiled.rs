//! Compiled schema wrapper

use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// One failed schema rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value (`""` for the root)
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors from compiling or applying a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema '{schema}' does not compile: {message}")]
    Compile {
        schema: &'static str,
        message: String,
    },

    #[error("Body does not match schema '{schema}': {}", join(.violations))]
    Invalid {
        schema: &'static str,
        violations: Vec<Violation>,
    },
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A named, compiled JSON Schema
pub struct Schema {
    name: &'static str,
    validator: Validator,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("name", &self.name).finish()
    }
}

impl Schema {
    pub fn compile(name: &'static str, definition: &Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(definition).map_err(|e| SchemaError::Compile {
                schema: name,
                message: e.to_string(),
            })?;
        Ok(Self { name, validator })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Validate, collecting every violation
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid {
                schema: self.name,
                violations,
            })
        }
    }
}

/// Compile a built-in schema. Definitions are literals checked by unit tests.
pub(super) fn builtin(name: &'static str, definition: Value) -> Schema {
    match Schema::compile(name, &definition) {
        Ok(schema) => schema,
        Err(e) => panic!("built-in {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_all_violations() {
        let schema = Schema::compile(
            "pair",
            &json!({
                "type": "object",
                "required": ["a", "b"],
                "properties": {"a": {"type": "string"}, "b": {"type": "string"}}
            }),
        )
        .unwrap();

        let err = schema.validate(&json!({"a": 1})).unwrap_err();
        match err {
            SchemaError::Invalid { schema, violations } => {
                assert_eq!(schema, "pair");
                assert_eq!(violations.len(), 2);
                assert!(violations.iter().any(|v| v.path == "/a"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compile_error() {
        let err = Schema::compile("broken", &json!({"type": 12})).unwrap_err();
        assert!(matches!(err, SchemaError::Compile { schema: "broken", .. }));
    }

    #[test]
    fn test_debug_shows_name() {
        let schema = Schema::compile("any", &json!({})).unwrap();
        assert_eq!(format!("{schema:?}"), "Schema { name: \"any\" }");
    }
}
