//! Structured-data source form. Both key spellings are accepted on read
//! (`customMedia` and `custom-media`); the writer emits the hyphenated
//! spellings with selector lists joined back into comma-separated strings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transform::split_commas;
use crate::values::ValueSet;

#[derive(Default, Deserialize)]
#[serde(default)]
struct JsonSource {
    #[serde(rename = "customMedia", alias = "custom-media")]
    custom_media: HashMap<String, String>,
    #[serde(rename = "customProperties", alias = "custom-properties")]
    custom_properties: HashMap<String, String>,
    #[serde(rename = "customSelectors", alias = "custom-selectors")]
    custom_selectors: HashMap<String, SelectorList>,
}

/// Selector replacements appear either as one comma-separated string or as
/// an explicit array of selector strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorList {
    Joined(String),
    Split(Vec<String>),
}

impl SelectorList {
    fn into_alternatives(self) -> Vec<String> {
        match self {
            SelectorList::Joined(joined) => split_commas(&joined)
                .iter()
                .map(|piece| piece.trim().to_string())
                .filter(|piece| !piece.is_empty())
                .collect(),
            SelectorList::Split(alternatives) => alternatives,
        }
    }
}

pub fn parse(content: &str) -> Result<ValueSet, String> {
    let source: JsonSource = serde_json::from_str(content).map_err(|error| error.to_string())?;
    Ok(ValueSet {
        custom_media: source.custom_media,
        custom_properties: source.custom_properties,
        custom_selectors: source
            .custom_selectors
            .into_iter()
            .map(|(name, list)| (name, list.into_alternatives()))
            .collect(),
    })
}

#[derive(Serialize)]
struct JsonExport<'a> {
    #[serde(rename = "custom-media")]
    custom_media: &'a HashMap<String, String>,
    #[serde(rename = "custom-properties")]
    custom_properties: &'a HashMap<String, String>,
    #[serde(rename = "custom-selectors")]
    custom_selectors: HashMap<&'a str, String>,
}

pub fn render(values: &ValueSet) -> Result<String, String> {
    let export = JsonExport {
        custom_media: &values.custom_media,
        custom_properties: &values.custom_properties,
        custom_selectors: values
            .custom_selectors
            .iter()
            .map(|(name, alternatives)| (name.as_str(), alternatives.join(", ")))
            .collect(),
    };
    serde_json::to_string_pretty(&export)
        .map(|mut rendered| {
            rendered.push('\n');
            rendered
        })
        .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hyphenated_key_spellings() {
        let content = r#"{
            "custom-media": { "--mq-a": "(max-width: 30em), (max-height: 30em)" },
            "custom-properties": { "--length-4": "25px" },
            "custom-selectors": { ":--heading": "h1, h2, h3" }
        }"#;
        let values = parse(content).unwrap();

        assert_eq!(
            values.custom_media["--mq-a"],
            "(max-width: 30em), (max-height: 30em)"
        );
        assert_eq!(values.custom_properties["--length-4"], "25px");
        assert_eq!(
            values.custom_selectors[":--heading"],
            vec!["h1", "h2", "h3"]
        );
    }

    #[test]
    fn accepts_camel_case_spellings_and_selector_arrays() {
        let content = r#"{
            "customMedia": { "--mq-a": "(min-width: 60em)" },
            "customSelectors": { ":--heading": ["h1", "h2", "h3"] }
        }"#;
        let values = parse(content).unwrap();

        assert_eq!(values.custom_media["--mq-a"], "(min-width: 60em)");
        assert_eq!(
            values.custom_selectors[":--heading"],
            vec!["h1", "h2", "h3"]
        );
        assert!(values.custom_properties.is_empty());
    }

    #[test]
    fn selector_strings_split_only_on_top_level_commas() {
        let content = r#"{ "custom-selectors": { ":--inputs": "input, select, :is(button, a)" } }"#;
        let values = parse(content).unwrap();

        assert_eq!(
            values.custom_selectors[":--inputs"],
            vec!["input", "select", ":is(button, a)"]
        );
    }

    #[test]
    fn rejects_a_non_object_top_level() {
        assert!(parse("[1, 2, 3]").is_err());
        assert!(parse("\"custom-media\"").is_err());
    }

    #[test]
    fn renders_hyphenated_spellings_that_read_back_equal() {
        let values = ValueSet::new()
            .with_media("--mq-a", "(max-width: 30em)")
            .with_property("--length-0", "5px")
            .with_selector(":--heading", &["h1", "h2"]);

        let rendered = render(&values).unwrap();
        assert!(rendered.contains("\"custom-media\""));
        assert!(rendered.contains("\"custom-properties\""));
        assert!(rendered.contains("\"custom-selectors\""));
        assert_eq!(parse(&rendered).unwrap(), values);
    }
}
