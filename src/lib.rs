pub mod config;
pub mod crumbs;
pub mod error;
pub mod picker;
pub mod query;

pub use config::PickerConfig;
pub use error::{Error, Result};
pub use picker::{DatePicker, Operator, WidgetEdit};
pub use query::{Clause, FieldRef, Filter};
