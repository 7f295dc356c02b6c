//! Stylesheet source form: `@custom-media` and `@custom-selector` at-rules
//! plus `--`-prefixed declarations inside `:root` blocks. Everything else in
//! the sheet is skipped brace-balanced.

use crate::transform::{is_ident_char, split_commas};
use crate::values::ValueSet;

pub fn parse(content: &str) -> Result<ValueSet, String> {
    SheetParser {
        input: content,
        position: 0,
    }
    .parse()
}

struct SheetParser<'a> {
    input: &'a str,
    position: usize,
}

impl SheetParser<'_> {
    fn parse(mut self) -> Result<ValueSet, String> {
        let mut values = ValueSet::new();
        loop {
            self.skip_trivia()?;
            if self.eof() {
                return Ok(values);
            }
            if self.peek_char() == '@' {
                self.parse_at_rule(&mut values)?;
            } else {
                self.parse_rule(&mut values)?;
            }
        }
    }

    fn parse_at_rule(&mut self, values: &mut ValueSet) -> Result<(), String> {
        self.next_char(); // '@'
        let name = self.parse_identifier();
        match name.as_str() {
            "custom-media" => {
                self.skip_trivia()?;
                let alias = self.parse_identifier();
                if !alias.starts_with("--") {
                    return Err(format!(
                        "@custom-media expects a --prefixed name, found {:?}",
                        alias
                    ));
                }
                let condition = self.consume_statement()?;
                values
                    .custom_media
                    .insert(alias, condition.trim().to_string());
            }
            "custom-selector" => {
                self.skip_trivia()?;
                if !self.expect_char(':') {
                    return Err("@custom-selector expects a :--prefixed alias".to_string());
                }
                let name = self.parse_identifier();
                if !name.starts_with("--") {
                    return Err(format!(
                        "@custom-selector expects a :--prefixed alias, found {:?}",
                        name
                    ));
                }
                let body = self.consume_statement()?;
                let alternatives: Vec<String> = split_commas(&body)
                    .iter()
                    .map(|piece| piece.trim().to_string())
                    .filter(|piece| !piece.is_empty())
                    .collect();
                if alternatives.is_empty() {
                    return Err(format!(
                        "@custom-selector :{} has no replacement selectors",
                        name
                    ));
                }
                values
                    .custom_selectors
                    .insert(format!(":{}", name), alternatives);
            }
            _ => self.skip_at_rule()?,
        }
        Ok(())
    }

    fn parse_rule(&mut self, values: &mut ValueSet) -> Result<(), String> {
        let selector = self.consume_selector()?;
        if selector_targets_root(&selector) {
            self.parse_root_block(values)
        } else {
            self.skip_block()
        }
    }

    fn parse_root_block(&mut self, values: &mut ValueSet) -> Result<(), String> {
        self.next_char(); // '{'
        loop {
            self.skip_trivia()?;
            if self.eof() {
                return Err("unterminated :root block".to_string());
            }
            match self.peek_char() {
                '}' => {
                    self.next_char();
                    return Ok(());
                }
                ';' => {
                    self.next_char();
                }
                _ => {
                    let property = self.parse_identifier();
                    if property.is_empty() {
                        return Err(format!(
                            "unexpected character {:?} in :root block",
                            self.peek_char()
                        ));
                    }
                    self.skip_trivia()?;
                    if !self.expect_char(':') {
                        return Err(format!("expected ':' after {:?}", property));
                    }
                    let value = self.consume_declaration_value()?;
                    if property.starts_with("--") {
                        values
                            .custom_properties
                            .insert(property, value.trim().to_string());
                    }
                }
            }
        }
    }

    /// Raw text up to the `;` closing the current at-rule prelude.
    fn consume_statement(&mut self) -> Result<String, String> {
        let start = self.position;
        let mut depth = 0usize;
        loop {
            if self.eof() {
                return Err("unexpected end of input in at-rule".to_string());
            }
            if self.input[self.position..].starts_with("/*") {
                self.skip_comment()?;
                continue;
            }
            match self.peek_char() {
                ';' if depth == 0 => {
                    let body = self.input[start..self.position].to_string();
                    self.next_char();
                    return Ok(body);
                }
                '(' | '[' => {
                    depth += 1;
                    self.next_char();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    self.next_char();
                }
                '\'' | '"' => self.consume_string()?,
                _ => {
                    self.next_char();
                }
            }
        }
    }

    fn consume_declaration_value(&mut self) -> Result<String, String> {
        let start = self.position;
        let mut depth = 0usize;
        loop {
            if self.eof() {
                return Err("unterminated declaration".to_string());
            }
            if self.input[self.position..].starts_with("/*") {
                self.skip_comment()?;
                continue;
            }
            match self.peek_char() {
                ';' if depth == 0 => {
                    let value = self.input[start..self.position].to_string();
                    self.next_char();
                    return Ok(value);
                }
                // The closing brace ends the declaration but stays unconsumed.
                '}' if depth == 0 => {
                    return Ok(self.input[start..self.position].to_string());
                }
                '(' | '[' => {
                    depth += 1;
                    self.next_char();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    self.next_char();
                }
                '\'' | '"' => self.consume_string()?,
                _ => {
                    self.next_char();
                }
            }
        }
    }

    /// Selector text up to (but excluding) the opening `{`.
    fn consume_selector(&mut self) -> Result<String, String> {
        let start = self.position;
        loop {
            if self.eof() {
                return Err("unexpected end of input in selector".to_string());
            }
            if self.input[self.position..].starts_with("/*") {
                self.skip_comment()?;
                continue;
            }
            match self.peek_char() {
                '{' => return Ok(self.input[start..self.position].to_string()),
                '\'' | '"' => self.consume_string()?,
                _ => {
                    self.next_char();
                }
            }
        }
    }

    fn skip_at_rule(&mut self) -> Result<(), String> {
        let mut depth = 0usize;
        loop {
            if self.eof() {
                return Err("unexpected end of input in at-rule".to_string());
            }
            if self.input[self.position..].starts_with("/*") {
                self.skip_comment()?;
                continue;
            }
            match self.peek_char() {
                ';' if depth == 0 => {
                    self.next_char();
                    return Ok(());
                }
                '{' if depth == 0 => return self.skip_block(),
                '(' | '[' => {
                    depth += 1;
                    self.next_char();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    self.next_char();
                }
                '\'' | '"' => self.consume_string()?,
                _ => {
                    self.next_char();
                }
            }
        }
    }

    fn skip_block(&mut self) -> Result<(), String> {
        self.next_char(); // '{'
        let mut depth = 1usize;
        loop {
            if self.eof() {
                return Err("unterminated block".to_string());
            }
            if self.input[self.position..].starts_with("/*") {
                self.skip_comment()?;
                continue;
            }
            match self.peek_char() {
                '{' => {
                    depth += 1;
                    self.next_char();
                }
                '}' => {
                    depth -= 1;
                    self.next_char();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '\'' | '"' => self.consume_string()?,
                _ => {
                    self.next_char();
                }
            }
        }
    }

    fn consume_string(&mut self) -> Result<(), String> {
        let quote = self.next_char();
        loop {
            if self.eof() {
                return Err("unterminated string".to_string());
            }
            let c = self.next_char();
            if c == '\\' {
                self.next_char();
            } else if c == quote {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), String> {
        self.position += 2;
        match self.input[self.position..].find("*/") {
            Some(offset) => {
                self.position += offset + 2;
                Ok(())
            }
            None => Err("unterminated comment".to_string()),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            self.consume_while(|c| c.is_whitespace());
            if self.input[self.position..].starts_with("/*") {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        self.consume_while(is_ident_char)
    }

    fn consume_while<F>(&mut self, test: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let start = self.position;
        while !self.eof() && test(self.peek_char()) {
            self.next_char();
        }
        self.input[start..self.position].to_string()
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

fn selector_targets_root(selector: &str) -> bool {
    split_commas(selector)
        .iter()
        .any(|piece| piece.trim() == ":root")
}

pub fn render(values: &ValueSet) -> String {
    let mut output = String::new();
    for (name, condition) in &values.custom_media {
        output.push_str("@custom-media ");
        output.push_str(name);
        output.push(' ');
        output.push_str(condition);
        output.push_str(";\n");
    }
    for (name, alternatives) in &values.custom_selectors {
        output.push_str("@custom-selector ");
        output.push_str(name);
        output.push(' ');
        output.push_str(&alternatives.join(", "));
        output.push_str(";\n");
    }
    if !values.custom_properties.is_empty() {
        output.push_str(":root {\n");
        for (name, value) in &values.custom_properties {
            output.push('\t');
            output.push_str(name);
            output.push_str(": ");
            output.push_str(value);
            output.push_str(";\n");
        }
        output.push_str("}\n");
    }
    output
}
