//! Custom property reference substitution

use std::collections::HashMap;

use log::debug;

use super::{is_ident_char, matching_paren, split_commas};

/// Rewrite `var(--name)` and `var(--name, fallback)` references against a
/// flat name-to-value mapping. A known name is replaced by its value, an
/// unknown name by its fallback when one is present, and otherwise the
/// reference is left byte-for-byte intact. Single pass: replacement text is
/// never re-scanned, so values referencing other properties do not recurse.
pub fn substitute_properties(fragment: &str, custom_properties: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(fragment.len());
    let mut cursor = 0;

    while let Some((start, open)) = find_reference(fragment, cursor) {
        let Some(close) = matching_paren(fragment, open) else {
            // Unterminated reference: keep the remainder as written.
            break;
        };
        let inner = &fragment[open + 1..close];
        let (name, fallback) = split_reference(inner);

        output.push_str(&fragment[cursor..start]);
        match custom_properties.get(name) {
            Some(value) => output.push_str(value),
            None => match fallback {
                Some(fallback) => output.push_str(fallback),
                None => {
                    debug!(target: "transform", "unresolved custom property reference {}", name);
                    output.push_str(&fragment[start..=close]);
                }
            },
        }
        cursor = close + 1;
    }
    output.push_str(&fragment[cursor..]);
    output
}

/// Next `var(` at or after `from`, at a non-identifier boundary, matched
/// ASCII case-insensitively. Returns (start of `var`, index of `(`).
fn find_reference(fragment: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = fragment.as_bytes();
    let mut position = from;

    while position + 4 <= bytes.len() {
        let matches = (bytes[position] | 0x20) == b'v'
            && (bytes[position + 1] | 0x20) == b'a'
            && (bytes[position + 2] | 0x20) == b'r'
            && bytes[position + 3] == b'(';
        if matches {
            // An ASCII match guarantees `position` sits on a char boundary.
            let boundary = fragment[..position]
                .chars()
                .next_back()
                .is_none_or(|previous| !is_ident_char(previous));
            if boundary {
                return Some((position, position + 3));
            }
        }
        position += 1;
    }
    None
}

/// Split the reference body into the alias name and the optional fallback:
/// everything after the first top-level comma, leading whitespace trimmed.
fn split_reference(inner: &str) -> (&str, Option<&str>) {
    let pieces = split_commas(inner);
    if pieces.len() > 1 {
        let head = pieces[0];
        (head.trim(), Some(inner[head.len() + 1..].trim_start()))
    } else {
        (inner.trim(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> HashMap<String, String> {
        let mut custom_properties = HashMap::new();
        custom_properties.insert("--length-1".to_string(), "10px".to_string());
        custom_properties.insert("--length-2".to_string(), "15px".to_string());
        custom_properties.insert("--length-3".to_string(), "20px".to_string());
        custom_properties
    }

    #[test]
    fn replaces_every_reference_in_a_value_list() {
        assert_eq!(
            substitute_properties(
                "var(--length-1) var(--length-2) var(--length-3)",
                &mapping()
            ),
            "10px 15px 20px"
        );
    }

    #[test]
    fn uses_the_fallback_when_the_name_is_unknown() {
        assert_eq!(
            substitute_properties("margin: var(--missing, 4px)", &mapping()),
            "margin: 4px"
        );
    }

    #[test]
    fn ignores_the_fallback_when_the_name_resolves() {
        assert_eq!(
            substitute_properties("margin: var(--length-1, 4px)", &mapping()),
            "margin: 10px"
        );
    }

    #[test]
    fn leaves_an_unresolved_reference_byte_for_byte() {
        let fragment = "color: VAR( --Missing )";
        assert_eq!(substitute_properties(fragment, &mapping()), fragment);
    }

    #[test]
    fn fallback_may_contain_nested_commas() {
        assert_eq!(
            substitute_properties("var(--missing, rgba(0, 0, 0, .5))", &mapping()),
            "rgba(0, 0, 0, .5)"
        );
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        let mut custom_properties = HashMap::new();
        custom_properties.insert("--outer".to_string(), "var(--inner)".to_string());
        custom_properties.insert("--inner".to_string(), "1px".to_string());

        assert_eq!(
            substitute_properties("var(--outer)", &custom_properties),
            "var(--inner)"
        );
    }

    #[test]
    fn matches_var_case_insensitively_at_word_boundaries() {
        assert_eq!(
            substitute_properties("VAR(--length-1)", &mapping()),
            "10px"
        );
        // `invar(` is an ordinary function, not a reference.
        let fragment = "invar(--length-1)";
        assert_eq!(substitute_properties(fragment, &mapping()), fragment);
    }

    #[test]
    fn keeps_an_unterminated_reference_as_written() {
        let fragment = "width: var(--length-1";
        assert_eq!(substitute_properties(fragment, &mapping()), fragment);
    }
}
