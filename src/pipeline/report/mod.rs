pub mod parser;
pub mod types;

pub use parser::parse_report;
pub use types::{Report, TestRecord};
