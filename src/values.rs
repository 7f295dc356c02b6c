//! Custom construct value sets

use std::collections::HashMap;

use crate::transform;

/// The three mappings collected from sources and consumed by the
/// substitution engines. Keys are stored exactly as written (`--name` for
/// media and properties, `:--name` for selectors); lookups are
/// case-sensitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueSet {
    pub custom_media: HashMap<String, String>,
    pub custom_properties: HashMap<String, String>,
    pub custom_selectors: HashMap<String, Vec<String>>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.custom_media.is_empty()
            && self.custom_properties.is_empty()
            && self.custom_selectors.is_empty()
    }

    pub fn with_media(mut self, name: &str, condition: &str) -> Self {
        self.custom_media
            .insert(name.to_string(), condition.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.custom_properties
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_selector(mut self, name: &str, alternatives: &[&str]) -> Self {
        self.custom_selectors.insert(
            name.to_string(),
            alternatives.iter().map(|each| each.to_string()).collect(),
        );
        self
    }

    /// Fold `incoming` into this set. Incoming keys overwrite existing keys
    /// of the same name; non-overlapping keys are added. Nothing is ever
    /// deleted.
    pub fn merge_from(&mut self, incoming: ValueSet) {
        self.custom_media.extend(incoming.custom_media);
        self.custom_properties.extend(incoming.custom_properties);
        self.custom_selectors.extend(incoming.custom_selectors);
    }

    pub fn substitute_media(&self, fragment: &str) -> String {
        transform::substitute_media(fragment, &self.custom_media)
    }

    pub fn substitute_properties(&self, fragment: &str) -> String {
        transform::substitute_properties(fragment, &self.custom_properties)
    }

    pub fn substitute_selectors(&self, fragment: &str) -> String {
        transform::substitute_selectors(fragment, &self.custom_selectors)
    }
}
