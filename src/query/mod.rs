pub mod ast;
pub mod dates;
pub mod parser;

pub use ast::{Clause, FieldRef, Filter};
pub use parser::{parse, parse_crumbs, ParseError};
