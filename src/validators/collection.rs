//! Field-level checks for collection payloads.
//!
//! Both validators take the raw JSON body and return every violation found,
//! in field order (name, description, is_public, tags, refs) and element
//! order within arrays. An empty list means the payload is valid.

use serde_json::{Map, Value};

pub const MAX_NAME_LENGTH: usize = 255;

/// Validate a create payload: `name` is required, everything else optional
pub fn validate_create(data: &Value) -> Vec<String> {
    let Some(fields) = data.as_object() else {
        return vec!["request body must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();

    match fields.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => {
            check_name_length(name, &mut errors)
        }
        _ => errors.push("name is required and must be a non-empty string".to_string()),
    }

    check_optional_fields(fields, &mut errors);
    errors
}

/// Validate an update payload: every field is optional but checked if present
pub fn validate_update(data: &Value) -> Vec<String> {
    let Some(fields) = data.as_object() else {
        return vec!["request body must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();

    match fields.get("name") {
        None => {}
        Some(Value::String(name)) if !name.trim().is_empty() => {
            check_name_length(name, &mut errors)
        }
        Some(_) => errors.push("name must be a non-empty string".to_string()),
    }

    check_optional_fields(fields, &mut errors);
    errors
}

fn check_name_length(name: &str, errors: &mut Vec<String>) {
    if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(format!("name must not exceed {} characters", MAX_NAME_LENGTH));
    }
}

fn check_optional_fields(fields: &Map<String, Value>, errors: &mut Vec<String>) {
    match fields.get("description") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => errors.push("description must be a string".to_string()),
    }

    if let Some(is_public) = fields.get("is_public") {
        if !is_public.is_boolean() {
            errors.push("is_public must be a boolean".to_string());
        }
    }

    check_string_list(fields, "tags", errors);
    check_string_list(fields, "refs", errors);
}

fn check_string_list(fields: &Map<String, Value>, field: &str, errors: &mut Vec<String>) {
    let Some(value) = fields.get(field) else {
        return;
    };

    let Some(items) = value.as_array() else {
        errors.push(format!("{} must be an array", field));
        return;
    };

    for (idx, item) in items.iter().enumerate() {
        match item.as_str() {
            None => errors.push(format!("{}[{}] must be a string", field, idx)),
            Some(s) if s.trim().is_empty() => {
                errors.push(format!("{}[{}] cannot be empty", field, idx))
            }
            Some(_) => {}
        }
    }
}

/// Canonical textual UUID: 8-4-4-4-12 hex digits, any case
pub fn is_valid_uuid(value: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let mut parts = value.split('-');
    for len in GROUPS {
        match parts.next() {
            Some(part) if part.len() == len && part.bytes().all(|b| b.is_ascii_hexdigit()) => {}
            _ => return false,
        }
    }
    parts.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_requires_name() {
        for body in [
            json!({}),
            json!({ "name": "" }),
            json!({ "name": "   " }),
            json!({ "name": null }),
            json!({ "name": 42 }),
        ] {
            let errors = validate_create(&body);
            assert_eq!(errors.len(), 1, "body: {}", body);
            assert!(errors[0].contains("name"));
        }
    }

    #[test]
    fn test_name_length_limit() {
        let ok = "a".repeat(255);
        assert!(validate_create(&json!({ "name": ok })).is_empty());

        let too_long = "a".repeat(256);
        let errors = validate_create(&json!({ "name": too_long }));
        assert_eq!(errors, vec!["name must not exceed 255 characters"]);

        // Counted in characters, not bytes
        let accented = "é".repeat(255);
        assert!(validate_create(&json!({ "name": accented })).is_empty());
    }

    #[test]
    fn test_array_elements_are_reported_by_index() {
        let errors = validate_create(&json!({
            "name": "Notes",
            "tags": ["ok", "", 7],
            "refs": ["  ", "r2"]
        }));
        assert_eq!(
            errors,
            vec![
                "tags[1] cannot be empty",
                "tags[2] must be a string",
                "refs[0] cannot be empty",
            ]
        );
    }

    #[test]
    fn test_violations_follow_field_order() {
        let errors = validate_create(&json!({
            "refs": "r1",
            "tags": "t1",
            "is_public": "yes",
            "description": 3,
        }));
        assert_eq!(
            errors,
            vec![
                "name is required and must be a non-empty string",
                "description must be a string",
                "is_public must be a boolean",
                "tags must be an array",
                "refs must be an array",
            ]
        );
    }

    #[test]
    fn test_null_description_is_allowed() {
        assert!(validate_create(&json!({ "name": "N", "description": null })).is_empty());
        assert!(validate_update(&json!({ "description": null })).is_empty());
    }

    #[test]
    fn test_update_accepts_empty_payload() {
        assert!(validate_update(&json!({})).is_empty());
    }

    #[test]
    fn test_update_checks_present_fields() {
        assert_eq!(
            validate_update(&json!({ "name": " " })),
            vec!["name must be a non-empty string"]
        );
        assert_eq!(
            validate_update(&json!({ "name": null })),
            vec!["name must be a non-empty string"]
        );
        assert_eq!(
            validate_update(&json!({ "name": "x".repeat(256) })),
            vec!["name must not exceed 255 characters"]
        );
        assert_eq!(
            validate_update(&json!({ "is_public": null, "tags": [""] })),
            vec!["is_public must be a boolean", "tags[0] cannot be empty"]
        );
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(
            validate_create(&json!(["name"])),
            vec!["request body must be a JSON object"]
        );
        assert_eq!(validate_update(&json!("x")).len(), 1);
    }

    #[test]
    fn test_uuid_format() {
        assert!(is_valid_uuid("0b6f1f0e-2f59-4a43-9d3b-8f8f5a8e2c11"));
        assert!(is_valid_uuid("0B6F1F0E-2F59-4A43-9D3B-8F8F5A8E2C11"));
        assert!(!is_valid_uuid("not-a-uuid"));
        assert!(!is_valid_uuid("0b6f1f0e2f594a439d3b8f8f5a8e2c11"));
        assert!(!is_valid_uuid("0b6f1f0e-2f59-4a43-9d3b-8f8f5a8e2c1"));
        assert!(!is_valid_uuid("0b6f1f0e-2f59-4a43-9d3b-8f8f5a8e2c11-00"));
        assert!(!is_valid_uuid("zb6f1f0e-2f59-4a43-9d3b-8f8f5a8e2c11"));
        assert!(!is_valid_uuid(""));
    }
}
