//! Script-module source form. Module files are parsed structurally, never
//! evaluated: the scanner recognizes the `module.exports = { ... }`
//! (CommonJS) and `export const customMedia = { ... }` (ESM) shapes with
//! string-literal entries. Either flavor is accepted on read regardless
//! of extension; the writer emits CommonJS for `.js` and ESM for `.mjs`.

use log::debug;

use crate::transform::split_commas;
use crate::values::ValueSet;

pub fn parse(content: &str) -> Result<ValueSet, String> {
    ModuleParser {
        input: content,
        position: 0,
    }
    .parse()
}

struct ModuleParser<'a> {
    input: &'a str,
    position: usize,
}

impl ModuleParser<'_> {
    fn parse(mut self) -> Result<ValueSet, String> {
        let mut values = ValueSet::new();
        loop {
            self.skip_trivia()?;
            if self.eof() {
                return Ok(values);
            }
            if self.eat_word("module") {
                self.parse_cjs_exports(&mut values)?;
            } else if self.eat_word("export") {
                self.parse_esm_binding(&mut values)?;
            } else {
                return Err(format!("unexpected content at byte {}", self.position));
            }
        }
    }

    fn parse_cjs_exports(&mut self, values: &mut ValueSet) -> Result<(), String> {
        self.skip_trivia()?;
        if !self.expect_char('.') {
            return Err("expected '.' after module".to_string());
        }
        self.skip_trivia()?;
        if !self.eat_word("exports") {
            return Err("expected module.exports".to_string());
        }
        self.skip_trivia()?;
        if !self.expect_char('=') {
            return Err("expected '=' after module.exports".to_string());
        }

        self.skip_trivia()?;
        if !self.expect_char('{') {
            return Err("expected '{' after module.exports =".to_string());
        }
        loop {
            self.skip_trivia()?;
            if self.expect_char('}') {
                break;
            }
            if self.eof() {
                return Err("unterminated exports object".to_string());
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            if !self.expect_char(':') {
                return Err(format!("expected ':' after {:?}", key));
            }
            let entries = self.parse_string_object()?;
            store_binding(values, &key, entries);
            self.skip_trivia()?;
            self.expect_char(',');
        }
        self.skip_trivia()?;
        self.expect_char(';');
        Ok(())
    }

    fn parse_esm_binding(&mut self, values: &mut ValueSet) -> Result<(), String> {
        self.skip_trivia()?;
        if !self.eat_word("const") {
            return Err("expected 'const' after export".to_string());
        }
        self.skip_trivia()?;
        let binding = self.parse_identifier();
        if binding.is_empty() {
            return Err("expected a binding name after export const".to_string());
        }
        self.skip_trivia()?;
        if !self.expect_char('=') {
            return Err(format!("expected '=' after {:?}", binding));
        }
        let entries = self.parse_string_object()?;
        store_binding(values, &binding, entries);
        self.skip_trivia()?;
        self.expect_char(';');
        Ok(())
    }

    fn parse_string_object(&mut self) -> Result<Vec<(String, String)>, String> {
        self.skip_trivia()?;
        if !self.expect_char('{') {
            return Err("expected '{'".to_string());
        }
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.expect_char('}') {
                return Ok(entries);
            }
            if self.eof() {
                return Err("unterminated object literal".to_string());
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            if !self.expect_char(':') {
                return Err(format!("expected ':' after {:?}", key));
            }
            self.skip_trivia()?;
            let value = self.parse_string_literal()?;
            entries.push((key, value));
            self.skip_trivia()?;
            self.expect_char(',');
        }
    }

    fn parse_key(&mut self) -> Result<String, String> {
        match self.peek_char() {
            '\'' | '"' => self.parse_string_literal(),
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => Ok(self.parse_identifier()),
            c => Err(format!("expected an object key, found {:?}", c)),
        }
    }

    fn parse_string_literal(&mut self) -> Result<String, String> {
        let quote = self.peek_char();
        if quote != '\'' && quote != '"' {
            return Err(format!("expected a string literal, found {:?}", quote));
        }
        self.next_char();
        let mut literal = String::new();
        loop {
            if self.eof() {
                return Err("unterminated string literal".to_string());
            }
            let c = self.next_char();
            if c == quote {
                return Ok(literal);
            }
            if c == '\\' {
                literal.push(match self.next_char() {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    escaped => escaped,
                });
            } else {
                literal.push(c);
            }
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let tail = &self.input[self.position..];
        if !tail.starts_with(word) {
            return false;
        }
        let follows_word = tail[word.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if follows_word {
            return false;
        }
        self.position += word.len();
        true
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.position;
        while !self.eof() {
            let c = self.peek_char();
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.position].to_string()
    }

    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            while !self.eof() && self.peek_char().is_whitespace() {
                self.next_char();
            }
            let tail = &self.input[self.position..];
            if tail.starts_with("//") {
                match tail.find('\n') {
                    Some(offset) => self.position += offset + 1,
                    None => self.position = self.input.len(),
                }
            } else if tail.starts_with("/*") {
                self.position += 2;
                match self.input[self.position..].find("*/") {
                    Some(offset) => self.position += offset + 2,
                    None => return Err("unterminated comment".to_string()),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn next_char(&mut self) -> char {
        match self.input[self.position..].chars().next() {
            Some(c) => {
                self.position += c.len_utf8();
                c
            }
            None => '\0',
        }
    }

    fn peek_char(&self) -> char {
        self.input[self.position..].chars().next().unwrap_or('\0')
    }

    fn expect_char(&mut self, expected: char) -> bool {
        if self.peek_char() == expected {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn eof(&self) -> bool {
        self.position >= self.input.len()
    }
}

fn store_binding(values: &mut ValueSet, name: &str, entries: Vec<(String, String)>) {
    match name {
        "customMedia" | "custom-media" => values.custom_media.extend(entries),
        "customProperties" | "custom-properties" => values.custom_properties.extend(entries),
        "customSelectors" | "custom-selectors" => {
            for (alias, joined) in entries {
                let alternatives: Vec<String> = split_commas(&joined)
                    .iter()
                    .map(|piece| piece.trim().to_string())
                    .filter(|piece| !piece.is_empty())
                    .collect();
                if !alternatives.is_empty() {
                    values.custom_selectors.insert(alias, alternatives);
                }
            }
        }
        _ => debug!(target: "adapter", "ignoring unrecognized binding {:?}", name),
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' | '\'' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

fn render_entries(entries: &[(String, String)], indent: &str) -> String {
    let mut body = String::from("{\n");
    for (index, (key, value)) in entries.iter().enumerate() {
        body.push_str(indent);
        body.push('\t');
        body.push_str(&quote(key));
        body.push_str(": ");
        body.push_str(&quote(value));
        if index + 1 < entries.len() {
            body.push(',');
        }
        body.push('\n');
    }
    body.push_str(indent);
    body.push('}');
    body
}

fn sections(values: &ValueSet) -> [(&'static str, Vec<(String, String)>); 3] {
    [
        (
            "customMedia",
            values
                .custom_media
                .iter()
                .map(|(name, condition)| (name.clone(), condition.clone()))
                .collect(),
        ),
        (
            "customSelectors",
            values
                .custom_selectors
                .iter()
                .map(|(name, alternatives)| (name.clone(), alternatives.join(", ")))
                .collect(),
        ),
        (
            "customProperties",
            values
                .custom_properties
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        ),
    ]
}

pub fn render_cjs(values: &ValueSet) -> String {
    let sections = sections(values);
    let mut output = String::from("module.exports = {\n");
    for (index, (name, entries)) in sections.iter().enumerate() {
        output.push('\t');
        output.push_str(name);
        output.push_str(": ");
        output.push_str(&render_entries(entries, "\t"));
        if index + 1 < sections.len() {
            output.push(',');
        }
        output.push('\n');
    }
    output.push_str("};\n");
    output
}

pub fn render_esm(values: &ValueSet) -> String {
    let mut output = String::new();
    for (name, entries) in sections(values) {
        output.push_str("export const ");
        output.push_str(name);
        output.push_str(" = ");
        output.push_str(&render_entries(&entries, ""));
        output.push_str(";\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_commonjs_flavor() {
        let content = "\
            // exported custom values\n\
            module.exports = {\n\
            \tcustomMedia: { '--mq-a': '(max-width: 30em), (max-height: 30em)' },\n\
            \tcustomSelectors: { ':--heading': 'h1, h2, h3' },\n\
            \tcustomProperties: { '--length-0': '5px' }\n\
            };\n";
        let values = parse(content).unwrap();

        assert_eq!(
            values.custom_media["--mq-a"],
            "(max-width: 30em), (max-height: 30em)"
        );
        assert_eq!(
            values.custom_selectors[":--heading"],
            vec!["h1", "h2", "h3"]
        );
        assert_eq!(values.custom_properties["--length-0"], "5px");
    }

    #[test]
    fn reads_the_esm_flavor() {
        let content = "\
            export const customMedia = { '--mq-a': '(min-width: 60em)' };\n\
            export const customSelectors = { ':--heading': 'h1, h2, h3' };\n\
            export const customProperties = { '--length-0': '5px' };\n";
        let values = parse(content).unwrap();

        assert_eq!(values.custom_media["--mq-a"], "(min-width: 60em)");
        assert_eq!(
            values.custom_selectors[":--heading"],
            vec!["h1", "h2", "h3"]
        );
        assert_eq!(values.custom_properties["--length-0"], "5px");
    }

    #[test]
    fn accepts_hyphenated_quoted_keys() {
        let content = "module.exports = {\n\t'custom-properties': { '--length-0': '5px' }\n};\n";
        let values = parse(content).unwrap();

        assert_eq!(values.custom_properties["--length-0"], "5px");
    }

    #[test]
    fn unescapes_string_literals() {
        let content = "module.exports = {\n\tcustomProperties: { '--quote': '\\'quoted\\'' }\n};\n";
        let values = parse(content).unwrap();

        assert_eq!(values.custom_properties["--quote"], "'quoted'");
    }

    #[test]
    fn rejects_an_unterminated_object() {
        assert!(parse("module.exports = { customMedia: { '--mq-a': '(x)'").is_err());
    }

    #[test]
    fn rejects_arbitrary_script_content() {
        assert!(parse("console.log('hello');").is_err());
    }

    #[test]
    fn both_flavors_round_trip() {
        let values = ValueSet::new()
            .with_media("--mq-a", "(max-width: 30em), (max-height: 30em)")
            .with_property("--length-0", "5px")
            .with_selector(":--heading", &["h1", "h2", "h3"]);

        assert_eq!(parse(&render_cjs(&values)).unwrap(), values);
        assert_eq!(parse(&render_esm(&values)).unwrap(), values);
    }
}
