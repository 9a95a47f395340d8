use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use super::relation::{format_relation_detail, format_relation_list};
use super::title::value_to_string;
use crate::sdk::{EntityFile, Field};

/// Empty marker of the detail view and of scalar list cells
pub const EMPTY_MARKER: &str = "—";

/// Presentation-neutral rendering of one field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DisplayValue {
    Empty,
    Text(String),
    Lines(Vec<String>),
    Images(Vec<EntityFile>),
    Files(Vec<EntityFile>),
}

impl DisplayValue {
    /// Plain text form, used by the CLI
    pub fn to_plain(&self) -> String {
        match self {
            DisplayValue::Empty => EMPTY_MARKER.to_string(),
            DisplayValue::Text(text) => text.clone(),
            DisplayValue::Lines(lines) => lines.join("\n"),
            DisplayValue::Images(files) | DisplayValue::Files(files) => files
                .iter()
                .map(|f| format!("{} <{}>", f.file_name, f.file_url))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Value of a field in the detail view
pub fn format_field_value(field: &Field, value: Option<&Value>) -> DisplayValue {
    let value = match value {
        None | Some(Value::Null) => return DisplayValue::Empty,
        Some(v) => v,
    };

    if let Some(kind) = field.relation_kind() {
        return format_relation_detail(Some(value), kind);
    }

    if field.is_field_type("images") || field.is_field_type("files") {
        let files = parse_files(value);
        if files.is_empty() {
            return DisplayValue::Empty;
        }
        return if field.is_field_type("images") {
            DisplayValue::Images(files)
        } else {
            DisplayValue::Files(files)
        };
    }

    if field.db_type.is_scalar("timestamptz") {
        if let Value::String(raw) = value {
            return DisplayValue::Text(format_timestamp(raw));
        }
    }

    if field.db_type.is_scalar("boolean") {
        let truthy = match value {
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
            _ => true,
        };
        return DisplayValue::Text(if truthy { "Yes" } else { "No" }.to_string());
    }

    DisplayValue::Text(join_scalar(value))
}

/// Cell of the list table
pub fn format_list_cell(field: &Field, value: Option<&Value>) -> String {
    if let Some(kind) = field.relation_kind() {
        return format_relation_list(value, kind);
    }
    match value {
        None | Some(Value::Null) => EMPTY_MARKER.to_string(),
        Some(v) => join_scalar(v),
    }
}

fn join_scalar(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(value_to_string).collect::<Vec<_>>().join(", "),
        other => value_to_string(other),
    }
}

fn parse_files(value: &Value) -> Vec<EntityFile> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<EntityFile>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Local date-time of an RFC 3339 timestamp, the raw text when unparsable
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}
