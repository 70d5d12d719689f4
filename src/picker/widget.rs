//! Value widgets shown next to the operator selector.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Number, Value};

use super::operator::{Operator, DEFAULT_UNIT};
use crate::config::PickerConfig;
use crate::query::ast::{self, Clause, Filter};
use crate::query::dates;

pub const DATE_PERIODS: &[&str] = &["day", "week", "month", "year"];
pub const TIME_PERIODS: &[&str] = &["minute", "hour"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    SingleDate,
    DateRange,
    Relative,
    CurrentUnit,
}

/// UI state owned by the picker instance, reset whenever the operator
/// changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub units_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetView {
    SingleDate {
        value: Option<String>,
        hide_time_selectors: bool,
    },
    DateRange {
        start: Option<String>,
        end: Option<String>,
        /// First day of the month the dual calendar opens on.
        calendar_month: String,
        hide_time_selectors: bool,
    },
    Relative {
        intervals: Option<Number>,
        unit: String,
        periods: Vec<&'static str>,
    },
    CurrentUnit {
        unit: String,
        periods: Vec<&'static str>,
        open: bool,
    },
}

/// A single user interaction with a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEdit {
    SetDate { slot: usize, value: String },
    SetRange { start: String, end: String },
    SetTime { slot: usize, hour: u32, minute: u32 },
    ClearTime { slot: usize },
    SetIntervals(u64),
    SetUnit(String),
    ToggleUnits,
}

impl WidgetKind {
    fn slots(self) -> usize {
        match self {
            WidgetKind::SingleDate => 1,
            WidgetKind::DateRange => 2,
            WidgetKind::Relative | WidgetKind::CurrentUnit => 0,
        }
    }

    pub fn view(
        self,
        operator: Operator,
        clause: &Clause,
        state: &WidgetState,
        config: &PickerConfig,
        today: NaiveDate,
    ) -> WidgetView {
        let date = |slot: usize| clause.operand(slot).and_then(Value::as_str).map(String::from);

        match self {
            WidgetKind::SingleDate => WidgetView::SingleDate {
                value: date(0),
                hide_time_selectors: config.hide_time_selectors,
            },
            WidgetKind::DateRange => {
                let start = date(0);
                let month = start
                    .as_deref()
                    .and_then(dates::parse_date)
                    .unwrap_or(today)
                    .format("%Y-%m-01")
                    .to_string();
                WidgetView::DateRange {
                    start,
                    end: date(1),
                    calendar_month: month,
                    hide_time_selectors: config.hide_time_selectors,
                }
            }
            WidgetKind::Relative => {
                let count = match clause.operand(0) {
                    Some(Value::Number(n)) if operator == Operator::Previous => Some(ast::negate(n)),
                    Some(Value::Number(n)) => Some(n.clone()),
                    _ => None,
                };
                let periods = if config.hide_time_selectors {
                    DATE_PERIODS.to_vec()
                } else {
                    TIME_PERIODS.iter().chain(DATE_PERIODS).copied().collect()
                };
                WidgetView::Relative {
                    intervals: count,
                    unit: unit_of(clause),
                    periods,
                }
            }
            WidgetKind::CurrentUnit => WidgetView::CurrentUnit {
                unit: unit_of(clause),
                periods: DATE_PERIODS.to_vec(),
                open: state.units_open,
            },
        }
    }

    /// Applies `edit` to `filter`. Returns the edited filter, or `None`
    /// when the edit changes nothing the host needs to hear about.
    pub fn apply(
        self,
        operator: Operator,
        filter: &Filter,
        edit: WidgetEdit,
        state: &mut WidgetState,
        config: &PickerConfig,
        today: NaiveDate,
    ) -> Option<Filter> {
        let clause = filter.as_ref()?;

        match (self, edit) {
            (WidgetKind::SingleDate | WidgetKind::DateRange, WidgetEdit::SetDate { slot, value })
                if slot < self.slots() =>
            {
                Some(Some(clause.with_operand(slot, Value::String(value))))
            }
            (WidgetKind::DateRange, WidgetEdit::SetRange { start, end }) => Some(Some(
                clause
                    .with_operand(0, Value::String(start))
                    .with_operand(1, Value::String(end)),
            )),
            (
                WidgetKind::SingleDate | WidgetKind::DateRange,
                WidgetEdit::SetTime { slot, hour, minute },
            ) if slot < self.slots() => {
                if config.hide_time_selectors {
                    return None;
                }
                let current = dates::normalize_date_at(clause.operand(slot), today);
                let value = dates::with_time(&current, hour, minute);
                Some(Some(clause.with_operand(slot, Value::String(value))))
            }
            (WidgetKind::SingleDate | WidgetKind::DateRange, WidgetEdit::ClearTime { slot })
                if slot < self.slots() =>
            {
                let current = dates::normalize_date_at(clause.operand(slot), today);
                let value = dates::without_time(&current);
                Some(Some(clause.with_operand(slot, Value::String(value))))
            }
            (WidgetKind::Relative, WidgetEdit::SetIntervals(n)) => {
                let n = Number::from(n);
                let count = if operator == Operator::Previous {
                    ast::negate(&n)
                } else {
                    n
                };
                Some(Some(clause.with_operand(0, Value::Number(count))))
            }
            (WidgetKind::Relative, WidgetEdit::SetUnit(unit)) => {
                Some(Some(clause.with_operand(1, Value::String(unit))))
            }
            (WidgetKind::CurrentUnit, WidgetEdit::SetUnit(unit)) => {
                state.units_open = false;
                Some(Some(clause.with_operand(1, Value::String(unit))))
            }
            (WidgetKind::CurrentUnit, WidgetEdit::ToggleUnits) => {
                state.units_open = !state.units_open;
                None
            }
            (kind, edit) => {
                tracing::debug!(?kind, ?edit, "edit does not apply to widget");
                None
            }
        }
    }
}

fn unit_of(clause: &Clause) -> String {
    clause
        .operand(1)
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_UNIT)
        .to_string()
}
