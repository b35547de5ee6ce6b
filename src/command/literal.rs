//! Permissive literal decoder for command arguments.
//!
//! The agent is supposed to emit strict JSON inside command parentheses, but
//! in practice replies show up with single-quoted strings, unquoted keys, and
//! Python-style `True`/`False`/`None`. This module is the compatibility shim
//! for those shapes: a small recursive-descent parser that produces a
//! [`serde_json::Value`]. Strict JSON remains the canonical encoding; callers
//! must try [`serde_json::from_str`] first and fall back to [`parse`] only on
//! failure.

use serde_json::{Map, Number, Value};

/// Parse a loosely-quoted literal into a JSON value.
///
/// Accepts everything strict JSON accepts, plus:
/// - single-quoted string literals (`'dentist'`)
/// - unquoted identifier keys in objects (`{summary: 'x'}`)
/// - `True` / `False` / `None` as aliases for `true` / `false` / `null`
///
/// The entire input must be consumed; trailing garbage is an error.
pub fn parse(input: &str) -> Result<Value, String> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(format!(
            "unexpected trailing input at offset {}",
            parser.offset()
        ));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Parser {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected `{expected}`, found `{c}`")),
            None => Err(format!("expected `{expected}`, found end of input")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') | Some('\'') => self.parse_string().map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_bareword(),
            Some(c) => Err(format!("unexpected character `{c}`")),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_object(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => return Err(format!("expected `,` or `}}` in object, found `{c}`")),
                None => return Err("unterminated object".to_string()),
            }
        }
    }

    /// Object keys may be quoted (either style) or bare identifiers.
    fn parse_key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_alphabetic() || c == '_' => Ok(self.take_identifier()),
            Some(c) => Err(format!("invalid object key starting with `{c}`")),
            None => Err("unexpected end of input in object key".to_string()),
        }
    }

    fn parse_array(&mut self) -> Result<Value, String> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::Array(items)),
                Some(c) => return Err(format!("expected `,` or `]` in array, found `{c}`")),
                None => return Err("unterminated array".to_string()),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let quote = self
            .bump()
            .ok_or_else(|| "unexpected end of input".to_string())?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('u') => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let digit = self
                                .bump()
                                .and_then(|c| c.to_digit(16))
                                .ok_or_else(|| "invalid \\u escape".to_string())?;
                            code = code * 16 + digit;
                        }
                        let c = char::from_u32(code)
                            .ok_or_else(|| format!("invalid unicode escape \\u{code:04x}"))?;
                        out.push(c);
                    }
                    // \' , \" , \\ , \/ and anything else: keep the escaped char.
                    Some(c) => out.push(c),
                    None => return Err("unterminated string escape".to_string()),
                },
                Some(c) => out.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '-' || c == '+'
        ) {
            self.bump();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(n)));
        }
        match text.parse::<f64>() {
            Ok(f) => Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| format!("non-finite number `{text}`")),
            Err(_) => Err(format!("invalid number `{text}`")),
        }
    }

    fn parse_bareword(&mut self) -> Result<Value, String> {
        let word = self.take_identifier();
        match word.as_str() {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            "null" | "None" => Ok(Value::Null),
            other => Err(format!("unexpected bareword `{other}`")),
        }
    }

    fn take_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        self.chars[start..self.pos].iter().collect()
    }
}
