use serde_json::Value;

use super::title::{resolve_title, PLACEHOLDER};
use super::value::DisplayValue;
use crate::sdk::RelationKind;

/// Names shown in a list cell before summarizing the rest
pub const MAX_LIST_NAMES: usize = 3;

/// The single related record of a to-one value.
///
/// Some upstream responses still deliver to-one relations as an array; the
/// first element is used then.
fn to_one_item(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Array(items) => items.first().filter(|item| is_truthy(item)),
        Value::Object(_) => value,
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        _ => true,
    }
}

/// Resolved titles of a to-many value, placeholders dropped.
/// `None` when the value is not a non-empty array.
fn to_many_names(value: Option<&Value>) -> Option<(usize, Vec<String>)> {
    let items = value?.as_array().filter(|items| !items.is_empty())?;
    let names = items
        .iter()
        .map(resolve_title)
        .filter(|name| !name.is_empty() && name != PLACEHOLDER)
        .collect();
    Some((items.len(), names))
}

/// Relation cell of the list table
pub fn format_relation_list(value: Option<&Value>, kind: RelationKind) -> String {
    if kind.is_to_one() {
        return match to_one_item(value) {
            Some(item) => resolve_title(item),
            None => PLACEHOLDER.to_string(),
        };
    }

    let Some((count, names)) = to_many_names(value) else {
        return PLACEHOLDER.to_string();
    };
    if names.is_empty() {
        return PLACEHOLDER.to_string();
    }

    if names.len() <= MAX_LIST_NAMES {
        return format!("{} ({})", count, names.join(", "));
    }

    let shown = names[..MAX_LIST_NAMES].join(", ");
    let remaining = names.len() - MAX_LIST_NAMES;
    format!("{} ({}, +{} more)", count, shown, remaining)
}

/// Relation value of the detail view: one resolved name per line
pub fn format_relation_detail(value: Option<&Value>, kind: RelationKind) -> DisplayValue {
    if kind.is_to_one() {
        return match to_one_item(value) {
            Some(item) => DisplayValue::Text(resolve_title(item)),
            None => DisplayValue::Empty,
        };
    }

    match to_many_names(value) {
        Some((_, names)) if !names.is_empty() => DisplayValue::Lines(names),
        _ => DisplayValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_many_list_summarizes_after_three_names() {
        let value = json!([
            {"id": "1", "name": "A"},
            {"id": "2", "name": "B"},
            {"id": "3", "name": "C"},
            {"id": "4", "name": "D"},
            {"id": "5", "name": "E"}
        ]);
        assert_eq!(
            format_relation_list(Some(&value), RelationKind::OneToMany),
            "5 (A, B, C, +2 more)"
        );
    }

    #[test]
    fn to_many_list_with_few_names_lists_them_all() {
        let value = json!([{"name": "A"}, {"title": "B"}]);
        assert_eq!(format_relation_list(Some(&value), RelationKind::ManyToMany), "2 (A, B)");
    }

    #[test]
    fn to_many_count_uses_raw_length() {
        let value = json!([{"name": "A"}, {"count": 1}, null]);
        assert_eq!(format_relation_list(Some(&value), RelationKind::ManyToMany), "3 (A)");
    }

    #[test]
    fn to_many_without_names_is_placeholder() {
        let value = json!([{"count": 1}, null]);
        assert_eq!(format_relation_list(Some(&value), RelationKind::OneToMany), "-");
        assert_eq!(format_relation_list(Some(&json!([])), RelationKind::OneToMany), "-");
        assert_eq!(format_relation_list(None, RelationKind::OneToMany), "-");
        assert_eq!(format_relation_list(Some(&json!({"name": "x"})), RelationKind::OneToMany), "-");
    }

    #[test]
    fn to_one_resolves_single_object() {
        let value = json!({"id": "c1", "title": "Shoes"});
        assert_eq!(format_relation_list(Some(&value), RelationKind::ManyToOne), "Shoes");
    }

    #[test]
    fn to_one_accepts_legacy_array() {
        let value = json!([{"id": "c1", "name": "Hats"}, {"id": "c2", "name": "Caps"}]);
        assert_eq!(format_relation_list(Some(&value), RelationKind::OneToOne), "Hats");
        assert_eq!(format_relation_list(Some(&json!([])), RelationKind::OneToOne), "-");
    }

    #[test]
    fn to_one_non_object_is_placeholder() {
        assert_eq!(format_relation_list(Some(&json!("c1")), RelationKind::ManyToOne), "-");
        assert_eq!(format_relation_list(Some(&json!(null)), RelationKind::ManyToOne), "-");
        assert_eq!(
            format_relation_detail(Some(&json!(null)), RelationKind::ManyToOne),
            DisplayValue::Empty
        );
    }

    #[test]
    fn detail_lists_every_name() {
        let value = json!([{"name": "A"}, {"name": "B"}, {"name": "C"}, {"name": "D"}]);
        assert_eq!(
            format_relation_detail(Some(&value), RelationKind::ManyToMany),
            DisplayValue::Lines(vec!["A".into(), "B".into(), "C".into(), "D".into()])
        );
    }

    #[test]
    fn list_and_detail_agree_on_titles() {
        let item = json!({"id": "9", "Name": "  Widget "});
        let list = format_relation_list(Some(&item), RelationKind::ManyToOne);
        let detail = format_relation_detail(Some(&item), RelationKind::ManyToOne);
        assert_eq!(detail, DisplayValue::Text(list));
    }
}
