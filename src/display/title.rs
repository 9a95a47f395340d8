use serde_json::Value;

pub const PLACEHOLDER: &str = "-";

/// Keys checked first, in priority order
pub const PREFERRED_TITLE_KEYS: &[&str] = &["name", "Name", "title", "Title"];

/// Keys never used as a display title
pub const SYSTEM_KEYS: &[&str] = &["id", "entityDefinitionId", "projectId", "createdAt", "updatedAt"];

/// Human readable title of a record-like value.
///
/// First non-blank of `name`, `Name`, `title`, `Title`; then the first
/// non-blank string property that is not a system key, in enumeration order;
/// then the id; then `"-"`.
pub fn resolve_title(item: &Value) -> String {
    let Some(map) = item.as_object() else {
        return PLACEHOLDER.to_string();
    };

    for key in PREFERRED_TITLE_KEYS {
        if let Some(value) = map.get(*key) {
            if value.is_null() {
                continue;
            }
            let text = value_to_string(value);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    for (key, value) in map {
        if SYSTEM_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Value::String(s) = value {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    match map.get("id") {
        Some(Value::Null) | None => PLACEHOLDER.to_string(),
        Some(id) => {
            let id = value_to_string(id);
            if id.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                id
            }
        }
    }
}

/// String form of a JSON value: strings verbatim, everything else as JSON text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
