//! Display rules shared by the list table, the detail view and option labels.

pub mod detail;
pub mod relation;
pub mod title;
pub mod value;

pub use detail::{detail_sections, DetailField, DetailSection, DETAIL_SYSTEM_FIELDS};
pub use relation::{format_relation_detail, format_relation_list};
pub use title::{resolve_title, value_to_string, PLACEHOLDER};
pub use value::{format_field_value, format_list_cell, DisplayValue, EMPTY_MARKER};
