use std::collections::BTreeMap;

use serde::Serialize;

use super::value::{format_field_value, DisplayValue};
use crate::sdk::{EntityDefinition, Instance};

/// Fields never shown on the detail page
pub const DETAIL_SYSTEM_FIELDS: &[&str] = &["id", "slug", "entityDefinitionId", "projectId", "createdAt", "updatedAt"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub name: String,
    pub label: String,
    pub value: DisplayValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSection {
    pub index: u32,
    pub title: Option<String>,
    pub fields: Vec<DetailField>,
}

/// Non-system fields grouped by section index, sections ascending
pub fn detail_sections(definition: &EntityDefinition, instance: &Instance) -> Vec<DetailSection> {
    let mut grouped: BTreeMap<u32, Vec<DetailField>> = BTreeMap::new();

    for field in definition
        .fields
        .iter()
        .filter(|f| !DETAIL_SYSTEM_FIELDS.contains(&f.name.as_str()))
    {
        grouped
            .entry(field.section_index.unwrap_or(0))
            .or_default()
            .push(DetailField {
                name: field.name.clone(),
                label: field.label.clone(),
                value: format_field_value(field, instance.get(&field.name)),
            });
    }

    grouped
        .into_iter()
        .map(|(index, fields)| DetailSection {
            index,
            title: definition.section_title(index).map(str::to_string),
            fields,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{products_definition, scalar_field};
    use serde_json::json;

    #[test]
    fn groups_fields_by_section_and_skips_system_fields() {
        let mut definition = products_definition();
        definition.title_section0 = Some("General".into());
        let mut price = scalar_field("price", "numeric");
        price.section_index = Some(1);
        definition.fields.push(price);
        definition.fields.push(scalar_field("slug", "varchar"));
        definition.fields.push(scalar_field("createdAt", "timestamptz"));

        let instance = Instance::from(json!({
            "id": "p1",
            "slug": "boots",
            "name": "Boots",
            "category": {"id": "c1", "title": "Shoes"},
            "price": 12.5,
        }));

        let sections = detail_sections(&definition, &instance);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title.as_deref(), Some("General"));
        let names: Vec<_> = sections[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "category"]);
        assert_eq!(sections[0].fields[1].value, DisplayValue::Text("Shoes".into()));
        assert_eq!(sections[1].index, 1);
        assert_eq!(sections[1].title, None);
        assert_eq!(sections[1].fields[0].value, DisplayValue::Text("12.5".into()));
    }
}
