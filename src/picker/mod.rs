pub mod operator;
pub mod widget;

pub use operator::{resolve, Layout, Operator, ALL_OPERATORS, DATE_OPERATORS, EMPTINESS_OPERATORS};
pub use widget::{WidgetEdit, WidgetKind, WidgetState, WidgetView};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PickerConfig;
use crate::query::ast::Filter;
use crate::query::dates;

/// What the picker shows for a given filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickerView {
    pub operator: Option<&'static str>,
    pub operators: Vec<&'static str>,
    pub layout: Layout,
    pub widget: Option<WidgetView>,
}

/// Date filter picker.
///
/// The host owns the filter and passes the current one into every call;
/// the picker reports replacements through `on_change` and never keeps a
/// filter of its own.
pub struct DatePicker<F>
where
    F: FnMut(Filter),
{
    config: PickerConfig,
    operators: &'static [Operator],
    widget_state: WidgetState,
    today: Option<NaiveDate>,
    on_change: F,
}

impl<F> DatePicker<F>
where
    F: FnMut(Filter),
{
    pub fn new(config: PickerConfig, on_change: F) -> Self {
        let operators = if config.hide_emptiness_operators {
            DATE_OPERATORS
        } else {
            ALL_OPERATORS
        };

        Self {
            config,
            operators,
            widget_state: WidgetState::default(),
            today: None,
            on_change,
        }
    }

    /// Pins the date used for defaulted date operands.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(dates::today)
    }

    /// Operators on offer, with All Time in front when configured.
    pub fn operators(&self) -> Vec<Operator> {
        let mut operators = Vec::with_capacity(self.operators.len() + 1);
        if self.config.include_all_time {
            operators.push(Operator::AllTime);
        }
        operators.extend_from_slice(self.operators);
        operators
    }

    pub fn resolve(&self, filter: &Filter) -> Option<Operator> {
        resolve(&self.operators(), filter)
    }

    /// Normalizes the filter the picker was opened with and reports it,
    /// even though nothing was edited yet. Unrecognised filters are
    /// rewritten into the first date operator's shape.
    pub fn mount(&mut self, filter: &Filter) {
        let operator = self.resolve(filter).unwrap_or(self.operators[0]);
        tracing::debug!(%operator, "mounting date picker");

        self.widget_state = WidgetState::default();
        let normalized = operator.init_at(filter, self.today());
        self.emit(normalized);
    }

    pub fn view(&self, filter: &Filter) -> PickerView {
        let operator = self.resolve(filter);
        let widget = match (operator, filter) {
            (Some(op), Some(clause)) => op.widget().map(|kind| {
                kind.view(op, clause, &self.widget_state, &self.config, self.today())
            }),
            _ => None,
        };

        PickerView {
            operator: operator.map(Operator::name),
            operators: self.operators().into_iter().map(Operator::name).collect(),
            layout: operator.map_or(Layout::Stacked, Operator::layout),
            widget,
        }
    }

    /// The user picked `operator` in the selector.
    pub fn select_operator(&mut self, filter: &Filter, operator: Operator) {
        if self.resolve(filter) != Some(operator) {
            self.widget_state = WidgetState::default();
        }
        let next = operator.init_at(filter, self.today());
        self.emit(next);
    }

    /// The user interacted with the value widget of the current operator.
    pub fn edit(&mut self, filter: &Filter, edit: WidgetEdit) {
        let Some(operator) = self.resolve(filter) else {
            tracing::debug!(?edit, "no operator resolved, edit dropped");
            return;
        };
        let Some(kind) = operator.widget() else {
            return;
        };

        let today = self.today();
        let edited = kind.apply(
            operator,
            filter,
            edit,
            &mut self.widget_state,
            &self.config,
            today,
        );
        if let Some(edited) = edited {
            self.forward(Some(operator), edited);
        }
    }

    /// Entry point for value widgets that build the edited filter
    /// themselves. The edit goes through the current operator's `init`
    /// before it reaches the host.
    pub fn widget_changed(&mut self, filter: &Filter, edited: Filter) {
        let operator = self.resolve(filter);
        self.forward(operator, edited);
    }

    fn forward(&mut self, operator: Option<Operator>, edited: Filter) {
        match operator {
            Some(op) => {
                let next = op.init_at(&edited, self.today());
                self.emit(next);
            }
            None => self.emit(edited),
        }
    }

    fn emit(&mut self, filter: Filter) {
        tracing::trace!(?filter, "date filter changed");
        (self.on_change)(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn filter(value: Value) -> Filter {
        serde_json::from_value(value).unwrap()
    }

    fn picker(config: PickerConfig) -> (DatePicker<impl FnMut(Filter)>, Rc<RefCell<Vec<Value>>>) {
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&emitted);
        let picker = DatePicker::new(config, move |f: Filter| {
            sink.borrow_mut().push(serde_json::to_value(f).unwrap());
        })
        .with_today(day());
        (picker, emitted)
    }

    #[test]
    fn test_mount_normalizes_and_emits() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.mount(&filter(json!(["time-interval", 1, -3, "week"])));
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["time-interval", 1, -3, "week", {}])]
        );
    }

    #[test]
    fn test_mount_falls_back_to_first_operator() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.mount(&filter(json!(["STARTS_WITH", 4, "abc"])));
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["time-interval", 4, -30, "day", {}])]
        );
    }

    #[test]
    fn test_mount_with_hidden_emptiness_converts_is_null() {
        let config = PickerConfig {
            hide_emptiness_operators: true,
            ..PickerConfig::default()
        };
        let (mut picker, emitted) = picker(config);
        picker.mount(&filter(json!(["IS_NULL", 4])));
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["time-interval", 4, -30, "day", {}])]
        );
    }

    #[test]
    fn test_mount_keeps_all_time() {
        let config = PickerConfig {
            include_all_time: true,
            ..PickerConfig::default()
        };
        let (mut picker, emitted) = picker(config);
        picker.mount(&None);
        assert_eq!(*emitted.borrow(), vec![Value::Null]);
    }

    #[test]
    fn test_mount_null_without_all_time_falls_back() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.mount(&None);
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["time-interval", null, -30, "day", {}])]
        );
    }

    #[test]
    fn test_view_lists_operators() {
        let config = PickerConfig {
            include_all_time: true,
            ..PickerConfig::default()
        };
        let (picker, _) = picker(config);
        let view = picker.view(&None);
        assert_eq!(view.operator, Some("All Time"));
        assert_eq!(view.operators.first(), Some(&"All Time"));
        assert_eq!(view.operators.len(), 10);
        assert_eq!(view.layout, Layout::Stacked);
        assert!(view.widget.is_none());
    }

    #[test]
    fn test_view_without_match_has_no_widget() {
        let (picker, _) = picker(PickerConfig::default());
        let view = picker.view(&filter(json!(["contains", 1, "x"])));
        assert_eq!(view.operator, None);
        assert!(view.widget.is_none());
        assert_eq!(view.operators.len(), 9);
    }

    #[test]
    fn test_view_inline_layout_for_relative() {
        let (picker, _) = picker(PickerConfig::default());
        let view = picker.view(&filter(json!(["time-interval", 1, 5, "day", {}])));
        assert_eq!(view.operator, Some("Next"));
        assert_eq!(view.layout, Layout::Inline);
        assert!(matches!(view.widget, Some(WidgetView::Relative { .. })));
    }

    #[test]
    fn test_select_operator_rewrites() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.select_operator(&filter(json!(["<", 1, "2024-01-01"])), Operator::Between);
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["BETWEEN", 1, "2026-03-09", "2026-03-09"])]
        );
    }

    #[test]
    fn test_edit_reinitializes_before_emitting() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.edit(
            &filter(json!(["=", 1, "2024-01-01"])),
            WidgetEdit::SetTime {
                slot: 0,
                hour: 10,
                minute: 30,
            },
        );
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["=", ["datetime-field", 1, "minute"], "2024-01-01T10:30:00"])]
        );
    }

    #[test]
    fn test_edit_invalid_date_defaults() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.edit(
            &filter(json!(["<", 1, "2024-01-01"])),
            WidgetEdit::SetDate {
                slot: 0,
                value: "not a date".to_string(),
            },
        );
        assert_eq!(*emitted.borrow(), vec![json!(["<", 1, "2026-03-09"])]);
    }

    #[test]
    fn test_widget_changed_without_operator_passes_through() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        let edited = filter(json!(["contains", 1, "y"]));
        picker.widget_changed(&filter(json!(["contains", 1, "x"])), edited);
        assert_eq!(*emitted.borrow(), vec![json!(["contains", 1, "y"])]);
    }

    #[test]
    fn test_current_unit_picker_opens_and_closes() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        let current = filter(json!(["time-interval", 1, "current", "day", {}]));

        picker.edit(&current, WidgetEdit::ToggleUnits);
        assert!(emitted.borrow().is_empty());
        assert!(matches!(
            picker.view(&current).widget,
            Some(WidgetView::CurrentUnit { open: true, .. })
        ));

        picker.edit(&current, WidgetEdit::SetUnit("year".to_string()));
        assert_eq!(
            *emitted.borrow(),
            vec![json!(["time-interval", 1, "current", "year", {}])]
        );
        assert!(matches!(
            picker.view(&current).widget,
            Some(WidgetView::CurrentUnit { open: false, .. })
        ));
    }

    #[test]
    fn test_edit_on_emptiness_does_nothing() {
        let (mut picker, emitted) = picker(PickerConfig::default());
        picker.edit(&filter(json!(["IS_NULL", 1])), WidgetEdit::SetIntervals(3));
        assert!(emitted.borrow().is_empty());
    }
}
