use serde_json::{Map, Number, Value, json};

use crate::model::Field;

/// Placeholder value for a field without an authored example.
fn default_value(field: &Field) -> Value {
    match field.field_type.as_deref() {
        Some("integer") if field.format.as_deref() == Some("int64") => json!(100000),
        Some("integer") => json!(12345),
        Some("number") => json!(99.99),
        Some("boolean") => Value::Bool(true),
        Some("string") => match field.format.as_deref() {
            Some("date-time") => json!("2024-01-15T10:30:00Z"),
            Some("date") => json!("2024-01-15"),
            Some("uuid") => json!("550e8400-e29b-41d4-a716-446655440000"),
            _ => json!("string_value"),
        },
        Some("array") => Value::Array(Vec::new()),
        Some("object") => Value::Object(Map::new()),
        _ => Value::Null,
    }
}

/// An authored example, typed after the field where it parses.
fn coerce_example(field: &Field, example: &str) -> Value {
    let text = || Value::String(example.to_string());
    match field.field_type.as_deref() {
        Some("integer") => example.parse::<i64>().map(Value::from).unwrap_or_else(|_| text()),
        Some("number") => {
            if let Ok(n) = example.parse::<i64>() {
                Value::from(n)
            } else {
                example
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(text)
            }
        }
        Some("boolean") => Value::Bool(example == "true"),
        _ => text(),
    }
}

fn field_value(field: &Field) -> Value {
    if field.has_children() {
        let object = Value::Object(synthesize_map(&field.children));
        if field.is_array {
            return Value::Array(vec![object]);
        }
        return object;
    }
    match field.example.as_deref().filter(|e| !e.is_empty()) {
        Some(example) => coerce_example(field, example),
        None => default_value(field),
    }
}

fn synthesize_map(fields: &[Field]) -> Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.name.clone(), field_value(f)))
        .collect()
}

/// Example object for a field tree, keys in field order.
pub fn synthesize(fields: &[Field]) -> Value {
    Value::Object(synthesize_map(fields))
}

/// [`synthesize`] rendered as two-space indented JSON.
pub fn example_json(fields: &[Field]) -> String {
    format!("{:#}", synthesize(fields))
}
