use super::ast::{Clause, Filter};
use crate::crumbs::Crumb;
use serde_json::Value;

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError {
            message: strip_position(&err.to_string()),
            line: err.line(),
            column: err.column(),
        }
    }
}

fn strip_position(message: &str) -> String {
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

fn shape_error(message: &str) -> ParseError {
    ParseError {
        message: message.to_string(),
        line: 1,
        column: 1,
    }
}

/// Parses a filter from JSON text: `null` or an MBQL clause array.
pub fn parse(input: &str) -> Result<Filter, ParseError> {
    let value: Value = serde_json::from_str(input.trim())?;
    match value {
        Value::Null => Ok(None),
        Value::Array(values) => Ok(Some(Clause::from_values(values))),
        _ => Err(shape_error("Expected a filter array or null")),
    }
}

/// Parses a breadcrumb list. Falsy entries (`null`, `false`, `0`, `""`)
/// become `None`.
pub fn parse_crumbs(input: &str) -> Result<Vec<Option<Crumb>>, ParseError> {
    let value: Value = serde_json::from_str(input.trim())?;
    let Value::Array(items) = value else {
        return Err(shape_error("Expected an array of crumbs"));
    };

    items
        .into_iter()
        .map(|item| {
            if is_falsy(&item) {
                Ok(None)
            } else {
                serde_json::from_value(item).map(Some).map_err(ParseError::from)
            }
        })
        .collect()
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_filter() {
        assert_eq!(parse("null").unwrap(), None);
        assert_eq!(parse("  null\n").unwrap(), None);
    }

    #[test]
    fn test_clause() {
        let filter = parse(r#"["<", ["field-id", 1], "2024-01-01"]"#).unwrap();
        let clause = filter.unwrap();
        assert_eq!(clause.tag(), Some("<"));
        assert_eq!(clause.operand(0).and_then(Value::as_str), Some("2024-01-01"));
    }

    #[test]
    fn test_not_a_filter() {
        let err = parse(r#"{"op": "<"}"#).unwrap_err();
        assert!(err.message.contains("filter array"));
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse("[\"<\",\n  1,,]").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.column > 0);
        assert!(!err.message.contains(" at line "));
    }

    #[test]
    fn test_crumbs_skip_falsy() {
        let crumbs =
            parse_crumbs(r#"[{"title": "A", "to": "/a"}, null, false, {"title": "C"}]"#).unwrap();
        assert_eq!(crumbs.len(), 4);
        assert!(crumbs[1].is_none());
        assert!(crumbs[2].is_none());
        assert_eq!(crumbs[3].as_ref().map(|c| c.title.as_str()), Some("C"));
    }
}
