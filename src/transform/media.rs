//! Custom media alias substitution

use std::collections::HashMap;

use log::debug;

use super::{Combinations, matching_paren, split_commas};

struct Reference<'a> {
    start: usize,
    end: usize,
    condition: &'a str,
}

/// Rewrite a media-query list, replacing `(--alias)` pseudo features with
/// their stored condition expressions. A stored condition that is itself a
/// comma-separated list distributes over the surrounding query, so
/// `all and (--mq-a)` with `--mq-a: (max-width: 30em), (max-height: 30em)`
/// becomes `all and (max-width: 30em),all and (max-height: 30em)`.
pub fn substitute_media(fragment: &str, custom_media: &HashMap<String, String>) -> String {
    let mut expanded: Vec<String> = Vec::new();
    for query in split_commas(fragment) {
        expand_query(query, custom_media, &mut expanded);
    }
    expanded.join(",")
}

fn expand_query(query: &str, custom_media: &HashMap<String, String>, expanded: &mut Vec<String>) {
    let references = find_references(query, custom_media);
    if references.is_empty() {
        expanded.push(query.to_string());
        return;
    }

    // Each reference contributes the top-level alternatives of its stored
    // condition; the full query is emitted once per combination, first
    // reference varying slowest.
    let alternatives: Vec<Vec<&str>> = references
        .iter()
        .map(|reference| {
            split_commas(reference.condition)
                .into_iter()
                .map(str::trim)
                .collect()
        })
        .collect();

    let lengths = alternatives.iter().map(Vec::len).collect();
    for combination in Combinations::new(lengths) {
        let mut rebuilt = String::with_capacity(query.len());
        let mut cursor = 0;
        for (slot, reference) in references.iter().enumerate() {
            rebuilt.push_str(&query[cursor..reference.start]);
            rebuilt.push_str(alternatives[slot][combination[slot]]);
            cursor = reference.end;
        }
        rebuilt.push_str(&query[cursor..]);
        expanded.push(rebuilt);
    }
}

fn find_references<'m>(query: &str, custom_media: &'m HashMap<String, String>) -> Vec<Reference<'m>> {
    let mut references = Vec::new();
    let mut position = 0;

    while let Some(offset) = query[position..].find('(') {
        let open = position + offset;
        let Some(close) = matching_paren(query, open) else {
            break;
        };
        let inner = query[open + 1..close].trim();
        if inner.starts_with("--") {
            if let Some(condition) = custom_media.get(inner) {
                references.push(Reference {
                    start: open,
                    end: close + 1,
                    condition: condition.as_str(),
                });
                position = close + 1;
                continue;
            }
            debug!(target: "transform", "unresolved custom media reference ({})", inner);
        }
        position = open + 1;
    }
    references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> HashMap<String, String> {
        let mut custom_media = HashMap::new();
        custom_media.insert(
            "--mq-a".to_string(),
            "(max-width: 30em), (max-height: 30em)".to_string(),
        );
        custom_media.insert("--mq-b".to_string(), "(min-width: 60em)".to_string());
        custom_media
    }

    #[test]
    fn distributes_a_list_valued_alias_over_the_query() {
        assert_eq!(
            substitute_media("all and (--mq-a)", &mapping()),
            "all and (max-width: 30em),all and (max-height: 30em)"
        );
    }

    #[test]
    fn replaces_a_single_valued_alias_in_place() {
        assert_eq!(
            substitute_media("screen and (--mq-b)", &mapping()),
            "screen and (min-width: 60em)"
        );
    }

    #[test]
    fn is_idempotent_without_matching_aliases() {
        let fragment = "screen and (min-width: 40em), print";
        assert_eq!(substitute_media(fragment, &mapping()), fragment);
    }

    #[test]
    fn leaves_an_unresolved_alias_byte_for_byte() {
        let fragment = "all and (--unknown)";
        assert_eq!(substitute_media(fragment, &mapping()), fragment);
    }

    #[test]
    fn expands_multiple_references_row_major() {
        let mut custom_media = HashMap::new();
        custom_media.insert("--a".to_string(), "(a1), (a2)".to_string());
        custom_media.insert("--b".to_string(), "(b1), (b2)".to_string());

        assert_eq!(
            substitute_media("print and (--a) and (--b)", &custom_media),
            "print and (a1) and (b1),print and (a1) and (b2),\
             print and (a2) and (b1),print and (a2) and (b2)"
        );
    }

    #[test]
    fn keeps_other_queries_in_the_list_untouched() {
        assert_eq!(
            substitute_media("screen, (--mq-a)", &mapping()),
            "screen, (max-width: 30em), (max-height: 30em)"
        );
    }

    #[test]
    fn tolerates_whitespace_inside_the_reference() {
        assert_eq!(
            substitute_media("all and ( --mq-b )", &mapping()),
            "all and (min-width: 60em)"
        );
    }
}
