use super::value::{MapValue, Value};

/// Parse failure with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

/// Parse a top-level `map:{ ... }` or `list:{ ... }`.
///
/// Scalars run until an unescaped `;` or `}` and are trimmed; a backslash
/// escapes the next character (`\;`, `\=`, `\{`, `\}`, `\\`). Duplicate keys
/// within one map are rejected.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_whitespace();
    let value = cursor.parse_value(true)?;
    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(cursor.error("trailing content after the top-level value"));
    }
    Ok(value)
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        if c == '\n' {
            self.line += 1;
        }
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn consume(&mut self, prefix: &str) {
        for _ in prefix.chars() {
            self.advance();
        }
    }

    /// Parse a map, list, or scalar starting at the cursor.
    ///
    /// `top_level` requires a map or list; scalars are only valid nested
    /// inside a container.
    fn parse_value(&mut self, top_level: bool) -> Result<Value, ParseError> {
        if self.starts_with("map:{") {
            self.consume("map:{");
            self.parse_map_body().map(Value::Map)
        } else if self.starts_with("list:{") {
            self.consume("list:{");
            self.parse_list_body().map(Value::List)
        } else if top_level {
            Err(self.error("expected 'map:{' or 'list:{'"))
        } else {
            self.parse_scalar().map(Value::Str)
        }
    }

    fn parse_map_body(&mut self) -> Result<MapValue, ParseError> {
        let mut map = MapValue::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated map: missing '}'")),
                Some('}') => {
                    self.advance();
                    return Ok(map);
                }
                Some(';') => {
                    self.advance();
                }
                Some(_) => {
                    let key = self.parse_key()?;
                    if map.contains_key(&key) {
                        return Err(self.error(format!("duplicate key '{key}'")));
                    }
                    self.skip_whitespace();
                    let value = self.parse_value(false)?;
                    map.insert(key, value);
                }
            }
        }
    }

    /// Read characters up to the unescaped `=` separating key from value.
    fn parse_key(&mut self) -> Result<String, ParseError> {
        let mut key = String::new();
        loop {
            match self.peek() {
                None | Some('}') | Some(';') => {
                    return Err(self.error("map entry is missing '=' between key and value"));
                }
                Some('=') => {
                    self.advance();
                    let trimmed = key.trim().to_string();
                    if trimmed.is_empty() {
                        return Err(self.error("map entry has an empty key"));
                    }
                    return Ok(trimmed);
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some(c) => key.push(c),
                        None => return Err(self.error("dangling escape at end of input")),
                    }
                }
                Some(_) => {
                    if let Some(c) = self.advance() {
                        key.push(c);
                    }
                }
            }
        }
    }

    fn parse_list_body(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated list: missing '}'")),
                Some('}') => {
                    self.advance();
                    return Ok(items);
                }
                Some(';') => {
                    self.advance();
                }
                Some(_) => {
                    let value = self.parse_value(false)?;
                    // Stray separators produce empty scalars; drop them.
                    if !matches!(&value, Value::Str(s) if s.is_empty()) {
                        items.push(value);
                    }
                }
            }
        }
    }

    /// Read a scalar up to an unescaped `;` or `}` (the terminator stays).
    fn parse_scalar(&mut self) -> Result<String, ParseError> {
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated value: missing ';' or '}'")),
                Some(';') | Some('}') => {
                    return Ok(raw.trim().to_string());
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some(c) => raw.push(c),
                        None => return Err(self.error("dangling escape at end of input")),
                    }
                }
                Some(_) => {
                    if let Some(c) = self.advance() {
                        raw.push(c);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_map(text: &str) -> MapValue {
        match parse(text).unwrap() {
            Value::Map(m) => m,
            other => panic!("expected map, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_parse_flat_map() {
        let map = parse_map("map:{ ; name = MEMBER ; comment = member table }");
        assert_eq!(map.required_str("name").unwrap(), "MEMBER");
        assert_eq!(map.required_str("comment").unwrap(), "member table");
    }

    #[test]
    fn test_parse_preserves_order() {
        let map = parse_map("map:{ ; b = 2 ; a = 1 ; c = 3 }");
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_nested_map_and_list() {
        let map = parse_map(
            "map:{\n    ; tableList = list:{\n        ; map:{ ; tableName = MEMBER }\n        ; map:{ ; tableName = PRODUCT }\n    }\n}",
        );
        let tables = map.required_list("tableList").unwrap();
        assert_eq!(tables.len(), 2);
        let first = tables[0].as_map().unwrap();
        assert_eq!(first.required_str("tableName").unwrap(), "MEMBER");
    }

    #[test]
    fn test_parse_empty_containers() {
        let map = parse_map("map:{ ; inner = map:{} ; items = list:{} }");
        assert!(map.required_map("inner").unwrap().is_empty());
        assert!(map.required_list("items").unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_value() {
        let map = parse_map("map:{ ; comment = ; next = x }");
        assert_eq!(map.required_str("comment").unwrap(), "");
        assert_eq!(map.required_str("next").unwrap(), "x");
    }

    #[test]
    fn test_parse_escapes() {
        let map = parse_map(r"map:{ ; text = a\;b\=c\}d\\e }");
        assert_eq!(map.required_str("text").unwrap(), r"a;b=c}d\e");
    }

    #[test]
    fn test_escaped_brace_is_not_a_container() {
        let map = parse_map(r"map:{ ; text = map:\{ not a map }");
        assert_eq!(map.required_str("text").unwrap(), "map:{ not a map");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = parse("map:{ ; a = 1 ; a = 2 }").unwrap_err();
        assert!(err.reason.contains("duplicate key 'a'"), "{}", err.reason);
    }

    #[test]
    fn test_missing_equals_rejected() {
        let err = parse("map:{ ; loose }").unwrap_err();
        assert!(err.reason.contains("missing '='"), "{}", err.reason);
    }

    #[test]
    fn test_unterminated_map_reports_line() {
        let err = parse("map:{\n ; a = 1\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.reason.contains("unterminated map"));
    }

    #[test]
    fn test_trailing_content_rejected() {
        let err = parse("map:{} extra").unwrap_err();
        assert!(err.reason.contains("trailing content"));
    }

    #[test]
    fn test_top_level_scalar_rejected() {
        let err = parse("just text").unwrap_err();
        assert!(err.reason.contains("expected 'map:{'"));
    }

    #[test]
    fn test_multiline_scalar_keeps_interior_newline() {
        let map = parse_map("map:{ ; text = first line\nsecond line ; next = x }");
        assert_eq!(map.required_str("text").unwrap(), "first line\nsecond line");
    }
}
