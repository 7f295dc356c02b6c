//! Custom selector alias expansion

use std::collections::HashMap;

use log::debug;

use super::{Combinations, is_ident_char, split_commas};

struct Reference<'a> {
    start: usize,
    end: usize,
    alternatives: &'a [String],
}

/// Expand `:--alias` tokens inside a (possibly comma-separated) selector
/// list. A selector containing several aliases yields the cartesian product
/// of their alternatives, first alias varying slowest; a selector without
/// aliases passes through unchanged. The output list is joined with `,`.
pub fn substitute_selectors(
    fragment: &str,
    custom_selectors: &HashMap<String, Vec<String>>,
) -> String {
    let mut expanded: Vec<String> = Vec::new();
    for selector in split_commas(fragment) {
        expand_selector(selector, custom_selectors, &mut expanded);
    }
    expanded.join(",")
}

fn expand_selector(
    selector: &str,
    custom_selectors: &HashMap<String, Vec<String>>,
    expanded: &mut Vec<String>,
) {
    let references = find_references(selector, custom_selectors);
    if references.is_empty() {
        expanded.push(selector.to_string());
        return;
    }

    let lengths = references
        .iter()
        .map(|reference| reference.alternatives.len())
        .collect();
    for combination in Combinations::new(lengths) {
        let mut rebuilt = String::with_capacity(selector.len());
        let mut cursor = 0;
        for (slot, reference) in references.iter().enumerate() {
            rebuilt.push_str(&selector[cursor..reference.start]);
            rebuilt.push_str(&reference.alternatives[combination[slot]]);
            cursor = reference.end;
        }
        rebuilt.push_str(&selector[cursor..]);
        expanded.push(rebuilt);
    }
}

fn find_references<'m>(
    selector: &str,
    custom_selectors: &'m HashMap<String, Vec<String>>,
) -> Vec<Reference<'m>> {
    let mut references = Vec::new();
    let bytes = selector.as_bytes();
    let mut position = 0;
    let mut quote: Option<u8> = None;

    while position < bytes.len() {
        let byte = bytes[position];
        if let Some(open) = quote {
            match byte {
                b'\\' => position += 2,
                _ => {
                    if byte == open {
                        quote = None;
                    }
                    position += 1;
                }
            }
            continue;
        }
        match byte {
            b'\'' | b'"' => {
                quote = Some(byte);
                position += 1;
            }
            b':' if selector[position..].starts_with(":--") => {
                let end = position + 3 + ident_len(&selector[position + 3..]);
                let token = &selector[position..end];
                match custom_selectors.get(token).filter(|list| !list.is_empty()) {
                    Some(alternatives) => references.push(Reference {
                        start: position,
                        end,
                        alternatives,
                    }),
                    None => {
                        debug!(target: "transform", "unresolved custom selector reference {}", token);
                    }
                }
                position = end;
            }
            _ => position += 1,
        }
    }
    references
}

fn ident_len(tail: &str) -> usize {
    tail.char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(tail.len(), |(index, _)| index)
}
