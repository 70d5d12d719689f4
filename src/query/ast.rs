use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const TIME_INTERVAL: &str = "time-interval";
pub const DATETIME_FIELD: &str = "datetime-field";
pub const BETWEEN: &str = "BETWEEN";
pub const IS_NULL: &str = "IS_NULL";
pub const NOT_NULL: &str = "NOT_NULL";
pub const CURRENT: &str = "current";

/// A filter as the host hands it over. `None` is the null filter.
pub type Filter = Option<Clause>;

/// One MBQL clause: `[tag, field, operand...]`.
///
/// The clause is kept as raw JSON so that unknown tags and odd operand
/// shapes survive untouched until an operator rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clause(Vec<Value>);

impl Clause {
    pub fn new(tag: &str, field: FieldRef, operands: impl IntoIterator<Item = Value>) -> Self {
        let mut values = vec![Value::String(tag.to_string()), field.into_value()];
        values.extend(operands);
        Self(values)
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    pub fn tag(&self) -> Option<&str> {
        self.0.first().and_then(Value::as_str)
    }

    /// Exact tag comparison.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// Loose MBQL tag comparison, see [`mbql_eq`].
    pub fn is(&self, tag: &str) -> bool {
        self.0.first().is_some_and(|v| mbql_eq(v, tag))
    }

    /// The field reference, or a null reference when the clause has none.
    pub fn field(&self) -> FieldRef {
        FieldRef(self.0.get(1).cloned().unwrap_or(Value::Null))
    }

    /// Operand `index`, counted from the first value after the field.
    pub fn operand(&self, index: usize) -> Option<&Value> {
        self.0.get(2 + index)
    }

    /// Copy of this clause with operand `index` replaced, padding any gap
    /// with nulls.
    pub fn with_operand(&self, index: usize, value: Value) -> Self {
        let mut values = self.0.clone();
        let slot = 2 + index;
        if values.len() <= slot {
            values.resize(slot + 1, Value::Null);
        }
        values[slot] = value;
        Self(values)
    }
}

/// Compares an MBQL tag case-insensitively, treating `_` and `-` alike.
pub fn mbql_eq(value: &Value, tag: &str) -> bool {
    match value.as_str() {
        Some(s) => normalize_tag(s) == normalize_tag(tag),
        None => false,
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase().replace('_', "-")
}

/// Opaque column reference, possibly bucketed as
/// `["datetime-field", target, unit]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldRef(Value);

impl FieldRef {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn is_bucketed(&self) -> bool {
        match &self.0 {
            Value::Array(items) => items.len() >= 2 && mbql_eq(&items[0], DATETIME_FIELD),
            _ => false,
        }
    }

    /// The reference with any bucketing removed.
    pub fn target(&self) -> FieldRef {
        match &self.0 {
            Value::Array(items) if self.is_bucketed() => FieldRef(items[1].clone()),
            _ => self.clone(),
        }
    }

    /// Buckets the target by `unit`. Never nests an existing bucketing.
    pub fn bucketed(&self, unit: &str) -> FieldRef {
        FieldRef(Value::Array(vec![
            Value::String(DATETIME_FIELD.to_string()),
            self.target().into_value(),
            Value::String(unit.to_string()),
        ]))
    }
}

/// Interval count of a `time-interval` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalCount {
    Number(Number),
    Current,
}

impl IntervalCount {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(IntervalCount::Number(n.clone())),
            Value::String(s) if s == CURRENT => Some(IntervalCount::Current),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            IntervalCount::Number(n) => Value::Number(n),
            IntervalCount::Current => Value::String(CURRENT.to_string()),
        }
    }
}

pub fn is_negative_zero(n: &Number) -> bool {
    n.is_f64() && n.as_f64().is_some_and(|v| v == 0.0 && v.is_sign_negative())
}

pub fn is_negative(n: &Number) -> bool {
    n.as_f64().is_some_and(|v| v < 0.0) || is_negative_zero(n)
}

pub fn abs(n: &Number) -> Number {
    if let Some(i) = n.as_i64() {
        return Number::from(i.unsigned_abs());
    }
    if n.is_u64() {
        return n.clone();
    }
    n.as_f64()
        .and_then(|v| Number::from_f64(v.abs()))
        .unwrap_or_else(|| n.clone())
}

/// Arithmetic negation. Zero negates to `-0.0` so the sign survives.
pub fn negate(n: &Number) -> Number {
    if let Some(i) = n.as_i64() {
        if i == 0 {
            return Number::from_f64(-0.0).unwrap_or_else(|| Number::from(0));
        }
        if let Some(neg) = i.checked_neg() {
            return Number::from(neg);
        }
    }
    if let Some(u) = n.as_u64() {
        if let Ok(i) = i64::try_from(u) {
            return Number::from(-i);
        }
    }
    n.as_f64()
        .and_then(|v| Number::from_f64(-v))
        .unwrap_or_else(|| n.clone())
}

pub fn empty_options() -> Map<String, Value> {
    Map::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clause(value: Value) -> Clause {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_loose_tag_match() {
        let c = clause(json!(["TIME_INTERVAL", 1, -3, "day"]));
        assert!(c.is(TIME_INTERVAL));
        assert!(!c.has_tag(TIME_INTERVAL));
        assert!(clause(json!(["between", 1])).is(BETWEEN));
    }

    #[test]
    fn test_bucketing_never_nests() {
        let field = FieldRef::new(json!(["field-id", 7]));
        let once = field.bucketed("minute");
        let twice = once.bucketed("minute");
        assert_eq!(once, twice);
        assert_eq!(
            twice.into_value(),
            json!(["datetime-field", ["field-id", 7], "minute"])
        );
    }

    #[test]
    fn test_target_unwraps_one_level() {
        let field = FieldRef::new(json!(["datetime-field", ["field-id", 7], "day"]));
        assert!(field.is_bucketed());
        assert_eq!(field.target().into_value(), json!(["field-id", 7]));
        assert_eq!(field.target().target(), field.target());
    }

    #[test]
    fn test_with_operand_pads() {
        let c = clause(json!(["<", 1]));
        let c = c.with_operand(1, json!("2024-01-01"));
        assert_eq!(
            Value::Array(c.into_values()),
            json!(["<", 1, null, "2024-01-01"])
        );
    }

    #[test]
    fn test_negate_zero_keeps_sign() {
        let neg = negate(&Number::from(0));
        assert!(is_negative_zero(&neg));
        assert!(is_negative(&neg));
        assert_eq!(negate(&Number::from(30)), Number::from(-30));
        assert_eq!(abs(&Number::from(-30)), Number::from(30u64));
    }

    #[test]
    fn test_negative_zero_from_json() {
        let n: Number = serde_json::from_str("-0.0").unwrap();
        assert!(is_negative_zero(&n));
        let n: Number = serde_json::from_str("0").unwrap();
        assert!(!is_negative_zero(&n));
    }
}
