//! The date filter operators and how they recognise and rebuild filters.
//!
//! Every operator knows two things: whether a filter already has its shape
//! (`test`) and how to turn any previous filter into its own canonical
//! shape (`init`). `init` keeps the field reference of the previous filter
//! and rebuilds everything else.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::widget::WidgetKind;
use crate::query::ast::{
    self, Clause, FieldRef, Filter, IntervalCount, BETWEEN, IS_NULL, NOT_NULL, TIME_INTERVAL,
};
use crate::query::dates;

pub const DEFAULT_INTERVALS: u64 = 30;
pub const DEFAULT_UNIT: &str = "day";

/// Granularity applied to the field when a date operand carries a time.
pub const TIME_BUCKETING: &str = "minute";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    AllTime,
    Previous,
    Next,
    Current,
    Before,
    After,
    On,
    Between,
    IsEmpty,
    NotEmpty,
}

pub const DATE_OPERATORS: &[Operator] = &[
    Operator::Previous,
    Operator::Next,
    Operator::Current,
    Operator::Before,
    Operator::After,
    Operator::On,
    Operator::Between,
];

pub const EMPTINESS_OPERATORS: &[Operator] = &[Operator::IsEmpty, Operator::NotEmpty];

pub const ALL_OPERATORS: &[Operator] = &[
    Operator::Previous,
    Operator::Next,
    Operator::Current,
    Operator::Before,
    Operator::After,
    Operator::On,
    Operator::Between,
    Operator::IsEmpty,
    Operator::NotEmpty,
];

/// How the operator selector and the value widget sit next to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Inline,
    Stacked,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::AllTime => "All Time",
            Operator::Previous => "Previous",
            Operator::Next => "Next",
            Operator::Current => "Current",
            Operator::Before => "Before",
            Operator::After => "After",
            Operator::On => "On",
            Operator::Between => "Between",
            Operator::IsEmpty => "Is Empty",
            Operator::NotEmpty => "Not Empty",
        }
    }

    /// Looks an operator up by display name, ignoring case.
    pub fn from_name(name: &str) -> Option<Operator> {
        std::iter::once(Operator::AllTime)
            .chain(ALL_OPERATORS.iter().copied())
            .find(|op| op.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn widget(self) -> Option<WidgetKind> {
        match self {
            Operator::Previous | Operator::Next => Some(WidgetKind::Relative),
            Operator::Current => Some(WidgetKind::CurrentUnit),
            Operator::Before | Operator::After | Operator::On => Some(WidgetKind::SingleDate),
            Operator::Between => Some(WidgetKind::DateRange),
            Operator::AllTime | Operator::IsEmpty | Operator::NotEmpty => None,
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            Operator::Previous | Operator::Next | Operator::Current => Layout::Inline,
            _ => Layout::Stacked,
        }
    }

    /// Tag and operand count of the date comparison operators.
    fn comparison(self) -> Option<(&'static str, usize)> {
        match self {
            Operator::Before => Some(("<", 1)),
            Operator::After => Some((">", 1)),
            Operator::On => Some(("=", 1)),
            Operator::Between => Some((BETWEEN, 2)),
            _ => None,
        }
    }

    pub fn test(self, filter: &Filter) -> bool {
        let Some(clause) = filter else {
            return self == Operator::AllTime;
        };

        match self {
            Operator::AllTime => false,
            Operator::Previous => {
                clause.is(TIME_INTERVAL)
                    && matches!(count_of(clause), Some(IntervalCount::Number(n)) if ast::is_negative(&n))
            }
            Operator::Next => {
                clause.is(TIME_INTERVAL)
                    && matches!(count_of(clause), Some(IntervalCount::Number(n)) if !ast::is_negative(&n))
            }
            Operator::Current => {
                clause.is(TIME_INTERVAL) && count_of(clause) == Some(IntervalCount::Current)
            }
            Operator::Before => clause.has_tag("<"),
            Operator::After => clause.has_tag(">"),
            Operator::On => clause.has_tag("="),
            Operator::Between => clause.is(BETWEEN),
            Operator::IsEmpty => clause.has_tag(IS_NULL),
            Operator::NotEmpty => clause.has_tag(NOT_NULL),
        }
    }

    pub fn init(self, filter: &Filter) -> Filter {
        self.init_at(filter, dates::today())
    }

    /// Rebuilds `filter` into this operator's shape, using `today` for any
    /// date operand that has to be defaulted.
    pub fn init_at(self, filter: &Filter, today: NaiveDate) -> Filter {
        let prev = filter.as_ref();
        let target = field_of(prev).target();

        match self {
            Operator::AllTime => None,
            Operator::Previous => Some(time_interval(
                target,
                Value::Number(ast::negate(&intervals(prev))),
                prev,
            )),
            Operator::Next => Some(time_interval(target, Value::Number(intervals(prev)), prev)),
            Operator::Current => Some(time_interval(
                target,
                IntervalCount::Current.into_value(),
                prev,
            )),
            Operator::Before | Operator::After | Operator::On | Operator::Between => {
                let (tag, arity) = self.comparison()?;
                Some(comparison(tag, arity, prev, today))
            }
            Operator::IsEmpty => Some(Clause::new(IS_NULL, target, [])),
            Operator::NotEmpty => Some(Clause::new(NOT_NULL, target, [])),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// First operator in `operators` whose test matches `filter`.
pub fn resolve(operators: &[Operator], filter: &Filter) -> Option<Operator> {
    debug_assert!(
        operators.iter().filter(|op| op.test(filter)).count() <= 1,
        "more than one operator matches {filter:?}"
    );

    let found = operators.iter().copied().find(|op| op.test(filter));
    tracing::trace!(operator = ?found, ?filter, "resolved date operator");
    found
}

fn field_of(prev: Option<&Clause>) -> FieldRef {
    prev.map_or_else(|| FieldRef::new(Value::Null), Clause::field)
}

fn count_of(clause: &Clause) -> Option<IntervalCount> {
    clause.operand(0).and_then(IntervalCount::from_value)
}

fn intervals(prev: Option<&Clause>) -> Number {
    match prev {
        Some(clause) if clause.is(TIME_INTERVAL) => match clause.operand(0) {
            Some(Value::Number(n)) => ast::abs(n),
            _ => Number::from(DEFAULT_INTERVALS),
        },
        _ => Number::from(DEFAULT_INTERVALS),
    }
}

fn unit(prev: Option<&Clause>) -> String {
    prev.filter(|clause| clause.is(TIME_INTERVAL))
        .and_then(|clause| clause.operand(1))
        .and_then(Value::as_str)
        .filter(|unit| !unit.is_empty())
        .unwrap_or(DEFAULT_UNIT)
        .to_string()
}

fn options(prev: Option<&Clause>) -> Map<String, Value> {
    match prev.and_then(|clause| clause.operand(2)) {
        Some(Value::Object(options)) => options.clone(),
        _ => ast::empty_options(),
    }
}

fn time_interval(field: FieldRef, count: Value, prev: Option<&Clause>) -> Clause {
    Clause::new(
        TIME_INTERVAL,
        field,
        [
            count,
            Value::String(unit(prev)),
            Value::Object(options(prev)),
        ],
    )
}

/// Builds `[tag, field, date...]`. Operands are only carried over from a
/// previous filter that already has `tag`; switching operators starts from
/// fresh dates.
fn comparison(tag: &str, arity: usize, prev: Option<&Clause>, today: NaiveDate) -> Clause {
    let carried = prev.filter(|clause| clause.is(tag));
    let values: Vec<String> = (0..arity)
        .map(|i| dates::normalize_date_at(carried.and_then(|clause| clause.operand(i)), today))
        .collect();

    let field = field_of(prev);
    let field = if values.iter().any(|v| dates::has_time(v)) {
        field.bucketed(TIME_BUCKETING)
    } else {
        field.target()
    };

    Clause::new(tag, field, values.into_iter().map(Value::String))
}
