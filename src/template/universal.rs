use serde::Serialize;

use super::{OrderedMap, UNTITLED};
use crate::markdown::{build_outline, classify, Outline, StructuredValue};

/// Key under which text preceding the first `###` of a section is stored.
pub const OVERVIEW_KEY: &str = "overview";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    Value(StructuredValue),
    Nested(OrderedMap<StructuredValue>),
}

/// Schema-free view of a template: every `##` header becomes a key.
#[derive(Debug, Clone, Serialize)]
pub struct UniversalTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sections: OrderedMap<SectionValue>,
}

pub fn parse_universal(id: &str, doc: &str) -> UniversalTemplate {
    from_outline(id, &build_outline(doc))
}

pub fn from_outline(id: &str, outline: &Outline) -> UniversalTemplate {
    let mut sections = OrderedMap::default();

    for section in &outline.sections {
        let value = if section.children.is_empty() {
            SectionValue::Value(classify(section.body))
        } else {
            let mut nested = OrderedMap::default();
            if !section.intro.trim().is_empty() {
                nested.insert_first(OVERVIEW_KEY, classify(section.intro));
            }
            for child in &section.children {
                nested.insert_first(child.header, classify(child.body));
            }
            SectionValue::Nested(nested)
        };
        sections.insert_first(section.header, value);
    }

    UniversalTemplate {
        id: id.to_string(),
        title: outline.title.unwrap_or(UNTITLED).to_string(),
        description: outline.description.clone().unwrap_or_default(),
        sections,
    }
}
